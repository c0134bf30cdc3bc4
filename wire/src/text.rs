//! Codepoint representation, encoding and display-width classification.
//!
//! `vtparse` already assembles raw bytes into `char`s before they reach
//! this crate (its `Utf8Sequence` state validates leading bytes 0xC2..=0xF4
//! and `10xxxxxx` continuation bytes), so this module only needs to carry
//! the decoded scalar forward: a single `Codepoint` with a precomputed
//! `wide` flag, paired with the `encode` used to write a cell's glyph back
//! out on the wire, and the `width` classification screens and lines use
//! to size cells.

use unicode_width::UnicodeWidthChar;

/// A decoded Unicode scalar value plus a precomputed East-Asian-Width
/// classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Codepoint {
    pub value: char,
    pub wide: bool,
}

impl Codepoint {
    pub fn new(value: char) -> Self {
        Codepoint {
            wide: width(value) == 2,
            value,
        }
    }

    pub const fn space() -> Self {
        Codepoint {
            value: ' ',
            wide: false,
        }
    }

    pub const REPLACEMENT: Codepoint = Codepoint {
        value: '\u{fffd}',
        wide: false,
    };
}

impl Default for Codepoint {
    fn default() -> Self {
        Codepoint::space()
    }
}

/// Encode a codepoint back to UTF-8 bytes.
pub fn encode(cp: char) -> ([u8; 4], usize) {
    let mut buf = [0u8; 4];
    let s = cp.encode_utf8(&mut buf);
    let len = s.len();
    (buf, len)
}

/// Display width of a single codepoint: 0 for combining/zero-width marks,
/// 2 for East-Asian Wide/FullWidth, 1 otherwise.
pub fn width(c: char) -> usize {
    UnicodeWidthChar::width(c).unwrap_or(0)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn encode_ascii_roundtrip() {
        let (buf, len) = encode('a');
        assert_eq!(len, 1);
        assert_eq!(&buf[..len], b"a");
    }

    #[test]
    fn encode_wide_cjk_roundtrip() {
        let (buf, len) = encode('中');
        assert_eq!(len, 3);
        assert_eq!(std::str::from_utf8(&buf[..len]).unwrap(), "中");
    }

    #[test]
    fn combining_mark_is_zero_width() {
        assert_eq!(width('\u{0301}'), 0);
    }
}
