//! Lenient UTF-8 walking over raw line bytes.
//!
//! Lines may hold truncated or invalid sequences (the decoder keeps whatever
//! arrived). Each invalid byte becomes its own glyph with value U+FFFD so the
//! walk always makes progress and never fails.

/// UTF-8 encoding of U+FFFD.
pub const REPLACEMENT_UTF8: &[u8] = "\u{FFFD}".as_bytes();

/// One code point within a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph<'a> {
    pub value: u32,
    /// Source bytes this glyph was decoded from.
    pub bytes: &'a [u8],
    pub valid: bool,
}

impl<'a> Glyph<'a> {
    /// Bytes to send to the terminal for this glyph.
    pub fn display_bytes(&self) -> &'a [u8] {
        if self.valid { self.bytes } else { REPLACEMENT_UTF8 }
    }
}

pub struct Glyphs<'a> {
    rest: &'a [u8],
}

/// Iterate the code points of `line`.
pub fn glyphs(line: &[u8]) -> Glyphs<'_> {
    Glyphs { rest: line }
}

impl<'a> Iterator for Glyphs<'a> {
    type Item = Glyph<'a>;

    fn next(&mut self) -> Option<Glyph<'a>> {
        let first = *self.rest.first()?;
        let want = match first {
            0x00..=0x7f => 1,
            0xc2..=0xdf => 2,
            0xe0..=0xef => 3,
            0xf0..=0xf4 => 4,
            _ => 0,
        };
        let decoded = self
            .rest
            .get(..want)
            .filter(|_| want > 0)
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
            .and_then(|s| s.chars().next());
        let (glyph, used) = match decoded {
            Some(ch) => (
                Glyph {
                    value: ch as u32,
                    bytes: &self.rest[..want],
                    valid: true,
                },
                want,
            ),
            None => (
                Glyph {
                    value: char::REPLACEMENT_CHARACTER as u32,
                    bytes: &self.rest[..1],
                    valid: false,
                },
                1,
            ),
        };
        self.rest = &self.rest[used..];
        Some(glyph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(line: &[u8]) -> Vec<u32> {
        glyphs(line).map(|g| g.value).collect()
    }

    #[test]
    fn walks_mixed_widths() {
        assert_eq!(values("a€漢😀".as_bytes()), vec![0x61, 0x20ac, 0x6f22, 0x1f600]);
    }

    #[test]
    fn truncated_sequence_degrades_per_byte() {
        let gs: Vec<_> = glyphs(b"\xe2\x82x").collect();
        assert_eq!(gs.len(), 3);
        assert!(!gs[0].valid);
        assert!(!gs[1].valid);
        assert_eq!(gs[2].value, u32::from(b'x'));
        assert_eq!(gs[0].display_bytes(), REPLACEMENT_UTF8);
    }

    #[test]
    fn overlong_and_surrogate_encodings_are_invalid() {
        assert!(glyphs(b"\xc0\xaf").all(|g| !g.valid));
        assert!(glyphs(b"\xed\xa0\x80").all(|g| !g.valid));
    }

    #[test]
    fn valid_glyph_displays_its_own_bytes() {
        let g = glyphs("€".as_bytes()).next().unwrap();
        assert_eq!(g.display_bytes(), "€".as_bytes());
        assert_eq!(g.bytes.len(), 3);
    }
}
