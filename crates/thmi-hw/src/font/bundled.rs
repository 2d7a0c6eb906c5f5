//! Built-in fonts covering printable ASCII (0x20..0x80).
//!
//! All sizes derive at compile time from the public-domain 8x8 glyphs in
//! the `font8x8` crate. Those store the leftmost pixel in bit 0; the tables
//! here are flipped to most significant bit first and scaled up by
//! repeating rows and doubling columns.

use font8x8::legacy::BASIC_LEGACY;

use super::BitmapFont;

const FIRST: u32 = 0x20;
const LAST: u32 = 0x80;
const GLYPHS: usize = (LAST - FIRST) as usize;

/// Spreads each bit of `row` over two adjacent bits.
const fn widen(row: u8) -> [u8; 2] {
    let mut wide = 0u16;
    let mut bit = 0;
    while bit < 8 {
        if row & (0x80 >> bit) != 0 {
            wide |= 0xC000 >> (2 * bit);
        }
        bit += 1;
    }
    wide.to_be_bytes()
}

/// Builds a table of `row_repeat * 8` rows per glyph, `wide` selecting
/// 16-pixel rows.
const fn scale<const N: usize>(row_repeat: usize, wide: bool) -> [u8; N] {
    let mut out = [0u8; N];
    let mut i = 0;
    let mut glyph = 0;
    while glyph < GLYPHS {
        let src = BASIC_LEGACY[FIRST as usize + glyph];
        let mut row = 0;
        while row < 8 {
            let bits = src[row].reverse_bits();
            let mut r = 0;
            while r < row_repeat {
                if wide {
                    let pair = widen(bits);
                    out[i] = pair[0];
                    out[i + 1] = pair[1];
                    i += 2;
                } else {
                    out[i] = bits;
                    i += 1;
                }
                r += 1;
            }
            row += 1;
        }
        glyph += 1;
    }
    out
}

static DATA_8X8: [u8; GLYPHS * 8] = scale(1, false);
static DATA_8X16: [u8; GLYPHS * 16] = scale(2, false);
static DATA_16X16: [u8; GLYPHS * 32] = scale(2, true);
static DATA_16X32: [u8; GLYPHS * 64] = scale(4, true);

pub static BASIC_8X8: BitmapFont<'static> = BitmapFont::from_raw(8, 8, FIRST, LAST, &DATA_8X8);
pub static BASIC_8X16: BitmapFont<'static> =
    BitmapFont::from_raw(8, 16, FIRST, LAST, &DATA_8X16);
pub static BASIC_16X16: BitmapFont<'static> =
    BitmapFont::from_raw(16, 16, FIRST, LAST, &DATA_16X16);
pub static BASIC_16X32: BitmapFont<'static> =
    BitmapFont::from_raw(16, 32, FIRST, LAST, &DATA_16X32);

/// Names accepted by [`by_name`].
pub const NAMES: [&str; 4] = ["basic_8x8", "basic_8x16", "basic_16x16", "basic_16x32"];

/// Looks up a bundled font by name, with or without the `basic_` prefix.
pub fn by_name(name: &str) -> Option<&'static BitmapFont<'static>> {
    let name = name.to_ascii_lowercase().replace('-', "_");
    match name.strip_prefix("basic_").unwrap_or(&name) {
        "8x8" => Some(&BASIC_8X8),
        "8x16" => Some(&BASIC_8X16),
        "16x16" => Some(&BASIC_16X16),
        "16x32" => Some(&BASIC_16X32),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_order_flipped() {
        let bang = BASIC_LEGACY['!' as usize];
        let glyph = BASIC_8X8.glyph('!').unwrap();
        for (row, &bits) in glyph.iter().enumerate() {
            assert_eq!(bits, bang[row].reverse_bits());
        }
        assert_eq!(BASIC_8X8.glyph(' ').unwrap(), &[0u8; 8]);
    }

    #[test]
    fn test_tall_font_doubles_rows() {
        let small = BASIC_8X8.glyph('A').unwrap();
        let tall = BASIC_8X16.glyph('A').unwrap();
        assert_eq!(tall.len(), 16);
        for (row, &bits) in small.iter().enumerate() {
            assert_eq!(tall[row * 2], bits);
            assert_eq!(tall[row * 2 + 1], bits);
        }
    }

    #[test]
    fn test_wide_font_doubles_columns() {
        assert_eq!(widen(0x80), [0xC0, 0x00]);
        assert_eq!(widen(0x81), [0xC0, 0x03]);
        assert_eq!(widen(0xFF), [0xFF, 0xFF]);

        let small = BASIC_8X8.glyph('W').unwrap();
        let big = BASIC_16X32.glyph('W').unwrap();
        assert_eq!(big.len(), 64);
        for (row, &bits) in small.iter().enumerate() {
            for r in 0..4 {
                let at = (row * 4 + r) * 2;
                assert_eq!([big[at], big[at + 1]], widen(bits));
            }
        }
    }

    #[test]
    fn test_range_and_lookup() {
        assert!(BASIC_16X16.glyph('~').is_some());
        assert!(BASIC_16X16.glyph('\u{7f}').is_some());
        assert!(BASIC_16X16.glyph('\u{80}').is_none());
        assert!(BASIC_16X16.glyph('\n').is_none());

        for name in NAMES {
            assert!(by_name(name).is_some(), "{name}");
        }
        assert_eq!(by_name("16X32").map(|f| f.height()), Some(32));
        assert!(by_name("vga").is_none());
    }

    #[test]
    fn test_tables_validate() {
        assert!(BitmapFont::new(8, 8, FIRST, LAST, &DATA_8X8).is_ok());
        assert!(BitmapFont::new(8, 16, FIRST, LAST, &DATA_8X16).is_ok());
        assert!(BitmapFont::new(16, 16, FIRST, LAST, &DATA_16X16).is_ok());
        assert!(BitmapFont::new(16, 32, FIRST, LAST, &DATA_16X32).is_ok());
    }
}
