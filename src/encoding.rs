//! Byte-encoding detection for corpus files.
//!
//! Detection order:
//! 1. Byte order mark (UTF-8, UTF-16 LE/BE)
//! 2. Strict UTF-8 validation
//! 3. `chardetng` statistical guess over legacy encodings
//!
//! Decoding never fails: undecodable sequences become U+FFFD.

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use std::fmt;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16_LE_BOM: &[u8] = &[0xFF, 0xFE];
const UTF16_BE_BOM: &[u8] = &[0xFE, 0xFF];

/// Encoding a file was decoded with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectedEncoding {
    Ascii,
    Utf8,
    Utf8Bom,
    Utf16Le,
    Utf16Be,
    /// Non-Unicode encoding guessed by chardetng (windows-1252, GBK, Shift_JIS, ...)
    Legacy(&'static Encoding),
}

impl DetectedEncoding {
    /// encoding_rs decoder for this encoding
    pub fn encoding(&self) -> &'static Encoding {
        match self {
            DetectedEncoding::Ascii | DetectedEncoding::Utf8 | DetectedEncoding::Utf8Bom => UTF_8,
            DetectedEncoding::Utf16Le => UTF_16LE,
            DetectedEncoding::Utf16Be => UTF_16BE,
            DetectedEncoding::Legacy(enc) => *enc,
        }
    }
}

impl fmt::Display for DetectedEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectedEncoding::Ascii => write!(f, "ASCII"),
            DetectedEncoding::Utf8 => write!(f, "UTF-8"),
            DetectedEncoding::Utf8Bom => write!(f, "UTF-8 with BOM"),
            DetectedEncoding::Utf16Le => write!(f, "UTF-16LE"),
            DetectedEncoding::Utf16Be => write!(f, "UTF-16BE"),
            DetectedEncoding::Legacy(enc) => write!(f, "{}", enc.name()),
        }
    }
}

/// Text decoded from raw file bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    pub encoding: DetectedEncoding,
    /// True when at least one byte sequence was replaced with U+FFFD
    pub had_errors: bool,
}

pub fn detect_encoding(bytes: &[u8]) -> DetectedEncoding {
    if bytes.starts_with(UTF8_BOM) {
        return DetectedEncoding::Utf8Bom;
    }
    if bytes.starts_with(UTF16_LE_BOM) {
        return DetectedEncoding::Utf16Le;
    }
    if bytes.starts_with(UTF16_BE_BOM) {
        return DetectedEncoding::Utf16Be;
    }

    if bytes.is_ascii() {
        return DetectedEncoding::Ascii;
    }
    if std::str::from_utf8(bytes).is_ok() {
        return DetectedEncoding::Utf8;
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let guess = detector.guess(None, true);

    // WHY: chardetng may still answer UTF-8 for bytes that failed strict validation
    if guess == UTF_8 {
        DetectedEncoding::Utf8
    } else {
        DetectedEncoding::Legacy(guess)
    }
}

/// Detect the encoding of `bytes` and decode them to UTF-8, BOM stripped
pub fn decode_to_utf8(bytes: &[u8]) -> DecodedText {
    let encoding = detect_encoding(bytes);
    let body = match encoding {
        DetectedEncoding::Utf8Bom => &bytes[UTF8_BOM.len()..],
        DetectedEncoding::Utf16Le | DetectedEncoding::Utf16Be => &bytes[UTF16_LE_BOM.len()..],
        _ => bytes,
    };

    let (text, had_errors) = encoding.encoding().decode_without_bom_handling(body);
    DecodedText {
        text: text.into_owned(),
        encoding,
        had_errors,
    }
}
