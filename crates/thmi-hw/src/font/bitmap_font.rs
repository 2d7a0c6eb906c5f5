use crate::{Error, Result};

/// Fixed-width bitmap font.
///
/// Glyphs are stored back to back, `height` rows of `width / 8` bytes each,
/// most significant bit leftmost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitmapFont<'a> {
    width: u16,
    height: u16,
    first: u32,
    last: u32,
    data: &'a [u8],
}

impl<'a> BitmapFont<'a> {
    /// Creates a font covering `first..last`, checking the glyph data size.
    pub fn new(width: u16, height: u16, first: u32, last: u32, data: &'a [u8]) -> Result<Self> {
        if width == 0 || width % 8 != 0 || height == 0 {
            return Err(Error::FontFormat(format!(
                "unsupported glyph size {width}x{height}"
            )));
        }
        if first >= last {
            return Err(Error::FontFormat(format!(
                "empty character range {first:#x}..{last:#x}"
            )));
        }
        let font = Self::from_raw(width, height, first, last, data);
        let expected = (last - first) as usize * font.glyph_len();
        if data.len() != expected {
            return Err(Error::FontFormat(format!(
                "expected {expected} bytes of glyph data, got {}",
                data.len()
            )));
        }
        Ok(font)
    }

    /// Creates a font without checking the data.
    pub const fn from_raw(width: u16, height: u16, first: u32, last: u32, data: &'a [u8]) -> Self {
        Self {
            width,
            height,
            first,
            last,
            data,
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// First character code covered.
    pub fn first(&self) -> u32 {
        self.first
    }

    /// One past the last character code covered.
    pub fn last(&self) -> u32 {
        self.last
    }

    /// Bytes per glyph.
    pub fn glyph_len(&self) -> usize {
        self.height as usize * (self.width as usize / 8)
    }

    /// Returns the rows of `ch`, or `None` outside the font's range.
    pub fn glyph(&self, ch: char) -> Option<&'a [u8]> {
        let code = ch as u32;
        if code < self.first || code >= self.last {
            return None;
        }
        let len = self.glyph_len();
        let start = (code - self.first) as usize * len;
        self.data.get(start..start + len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATA: [u8; 4] = [0x81, 0x42, 0x24, 0x18];

    #[test]
    fn test_glyph_lookup() {
        let font = BitmapFont::new(8, 2, 0x41, 0x43, &DATA).unwrap();
        assert_eq!(font.glyph('A'), Some(&DATA[..2]));
        assert_eq!(font.glyph('B'), Some(&DATA[2..]));
        assert_eq!(font.glyph('C'), None);
        assert_eq!(font.glyph('@'), None);
        assert_eq!(font.glyph('\u{1F600}'), None);
    }

    #[test]
    fn test_wide_glyph_len() {
        let font = BitmapFont::new(16, 1, 0x20, 0x22, &DATA).unwrap();
        assert_eq!(font.glyph_len(), 2);
        assert_eq!(font.glyph('!'), Some(&DATA[2..]));
    }

    #[test]
    fn test_new_rejects_bad_data() {
        assert!(matches!(
            BitmapFont::new(8, 2, 0x41, 0x44, &DATA),
            Err(Error::FontFormat(_))
        ));
        assert!(BitmapFont::new(12, 2, 0x41, 0x43, &DATA).is_err());
        assert!(BitmapFont::new(8, 2, 0x43, 0x43, &[]).is_err());
    }
}
