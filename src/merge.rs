// WHY: merge rule is a single forward pass; decisions look only at the previous raw
// line, never at the growing buffer

use anyhow::{Context, Result};
use regex_automata::meta::Regex;
use tracing::debug;

use crate::config::MergeOptions;
use crate::profiler::{find_wrap_band, line_lengths, WrapBand};

/// Sentence/clause terminators and closing quotes/brackets, Latin and full-width CJK
pub const DEFAULT_END_PUNCTUATION: &str =
    "[.!?,;:\"'\u{201C}\u{201D}\u{2018}\u{2019}()\u{3002}\u{FF01}\u{FF1F}\u{FF0C}\u{FF1B}\u{FF1A}\u{FF08}\u{FF09}]";

/// Compiled end-of-line punctuation pattern
///
/// The pattern is run against the last character of a line only, so any
/// single-character class works; alternatives needing two or more characters never match.
#[derive(Debug, Clone)]
pub struct EndPunctuation {
    pattern: String,
    regex: Regex,
}

impl EndPunctuation {
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)
            .with_context(|| format!("Invalid end punctuation pattern: {pattern}"))?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// True when the last character of `line` matches the pattern
    pub fn ends_line(&self, line: &str) -> bool {
        match line.chars().next_back() {
            Some(last) => {
                let mut buf = [0u8; 4];
                let last: &str = last.encode_utf8(&mut buf);
                self.regex.is_match(last)
            }
            None => false,
        }
    }
}

impl Default for EndPunctuation {
    fn default() -> Self {
        Self::new(DEFAULT_END_PUNCTUATION).expect("default end punctuation pattern compiles")
    }
}

/// Result of running the heuristic over one document
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub text: String,
    /// Band used for merging; `None` when no band was found
    pub band: Option<WrapBand>,
    pub lines_in: usize,
    pub lines_out: usize,
    /// False when the document was passed through untouched
    pub merged: bool,
}

/// Split on `\n`, drop empty lines and trim the rest.
///
/// A whitespace-only line survives as `""`; it never joins and so acts as a
/// paragraph separator during merging.
pub fn prepare_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .filter(|line| !line.is_empty())
        .map(str::trim)
        .collect()
}

/// Join each line onto the previous one when the previous raw line sits inside
/// `band` and does not end in punctuation. No separator is inserted.
///
/// With `band == None` every line stands alone.
pub fn merge_lines<S: AsRef<str>>(
    lines: &[S],
    band: Option<WrapBand>,
    punctuation: &EndPunctuation,
) -> Vec<String> {
    let mut merged = Vec::new();
    let mut buffer = String::new();
    let mut previous: Option<&str> = None;

    for line in lines {
        let line = line.as_ref();

        let joins_previous = match (previous, band) {
            (Some(prev), Some(band)) => {
                !prev.is_empty()
                    && band.contains(prev.chars().count())
                    && !punctuation.ends_line(prev)
            }
            _ => false,
        };

        if joins_previous {
            buffer.push_str(line);
        } else {
            if !buffer.is_empty() {
                merged.push(std::mem::take(&mut buffer));
            }
            buffer.push_str(line);
        }

        previous = Some(line);
    }

    if !buffer.is_empty() {
        merged.push(buffer);
    }

    merged
}

/// Profile `text`, pick a wrap band and merge wrapped lines back together.
///
/// When `options.frequency_threshold` is set and no band clears it, the text is
/// returned unchanged.
pub fn remove_line_breaks(text: &str, options: &MergeOptions) -> MergeOutcome {
    let lines = prepare_lines(text);
    let lengths = line_lengths(&lines);
    let band = find_wrap_band(&lengths, options.range_size, options.frequency_threshold);

    // band reporting at info/warn belongs to the caller
    match band {
        Some(band) => debug!("Most common line length range: {}", band),
        None if options.frequency_threshold.is_some() => {
            debug!(
                "No line length range reached frequency threshold {:?}; leaving text unchanged",
                options.frequency_threshold
            );
            return MergeOutcome {
                text: text.to_string(),
                band: None,
                lines_in: lines.len(),
                lines_out: lines.len(),
                merged: false,
            };
        }
        None => debug!("Most common line length range: (0, 0)"),
    }

    let merged = merge_lines(&lines, band, &options.end_punctuation);
    debug!("Merged {} lines into {}", lines.len(), merged.len());

    MergeOutcome {
        text: merged.join("\n"),
        band,
        lines_in: lines.len(),
        lines_out: merged.len(),
        merged: true,
    }
}
