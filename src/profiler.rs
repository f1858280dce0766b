// WHY: wrap-width detection is the statistical half of the heuristic; kept pure so
// the single-file and folder paths share one implementation

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Lines shorter than this never count toward the length histogram
pub const MIN_COUNTED_LENGTH: usize = 3;

/// Inclusive range of line lengths treated as "wrapped at the column limit"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrapBand {
    pub low: usize,
    pub high: usize,
}

impl WrapBand {
    /// Band of `center ± range_size`; the low end saturates at zero
    pub fn around(center: usize, range_size: usize) -> Self {
        Self {
            low: center.saturating_sub(range_size),
            high: center + range_size,
        }
    }

    pub fn contains(&self, length: usize) -> bool {
        (self.low..=self.high).contains(&length)
    }
}

impl fmt::Display for WrapBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.low, self.high)
    }
}

/// Occurrence count per line length, restricted to lengths >= `MIN_COUNTED_LENGTH`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LengthHistogram {
    counts: BTreeMap<usize, usize>,
    total: usize,
}

impl LengthHistogram {
    pub fn from_lengths<I>(lengths: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        let mut histogram = Self::default();
        for length in lengths {
            if length >= MIN_COUNTED_LENGTH {
                *histogram.counts.entry(length).or_insert(0) += 1;
                histogram.total += 1;
            }
        }
        histogram
    }

    /// Number of lines that passed the length filter
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn count(&self, length: usize) -> usize {
        self.counts.get(&length).copied().unwrap_or(0)
    }

    /// Distinct lengths in ascending order
    pub fn lengths(&self) -> impl Iterator<Item = usize> + '_ {
        self.counts.keys().copied()
    }

    /// Sum of occurrences of every length in `[center - range_size, center + range_size]`
    pub fn window_count(&self, center: usize, range_size: usize) -> usize {
        let band = WrapBand::around(center, range_size);
        self.counts
            .range(band.low..=band.high)
            .map(|(_, count)| *count)
            .sum()
    }
}

/// Character length of each line, as used by the profiler and the merge rule
pub fn line_lengths<S: AsRef<str>>(lines: &[S]) -> Vec<usize> {
    lines.iter().map(|line| line.as_ref().chars().count()).collect()
}

/// Find the band of line lengths holding the most lines.
///
/// Every distinct length is tried as a band center, in ascending order, and the
/// first strictly-greater window count wins, so ties go to the lowest length.
/// With `frequency_threshold` set, a candidate is only eligible when its window
/// holds at least that fraction of all counted lines.
///
/// Returns `None` when nothing qualifies: no line of length >= 3, or no window
/// clearing the threshold.
pub fn find_wrap_band(
    lengths: &[usize],
    range_size: usize,
    frequency_threshold: Option<f64>,
) -> Option<WrapBand> {
    let histogram = LengthHistogram::from_lengths(lengths.iter().copied());
    best_band(&histogram, range_size, frequency_threshold)
}

/// Band selection over an already-built histogram
pub fn best_band(
    histogram: &LengthHistogram,
    range_size: usize,
    frequency_threshold: Option<f64>,
) -> Option<WrapBand> {
    if histogram.is_empty() {
        return None;
    }

    let total = histogram.total() as f64;
    let mut best: Option<(usize, usize)> = None;

    for length in histogram.lengths() {
        let count = histogram.window_count(length, range_size);

        if let Some(threshold) = frequency_threshold {
            if (count as f64) / total < threshold {
                continue;
            }
        }

        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((length, count));
        }
    }

    best.map(|(center, _)| WrapBand::around(center, range_size))
}
