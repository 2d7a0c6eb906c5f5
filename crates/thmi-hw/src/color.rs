//! RGB565 colors and conversions.

pub const BLACK: u16 = 0x0000;
pub const BLUE: u16 = 0x001F;
pub const RED: u16 = 0xF800;
pub const GREEN: u16 = 0x07E0;
pub const CYAN: u16 = 0x07FF;
pub const MAGENTA: u16 = 0xF81F;
pub const YELLOW: u16 = 0xFFE0;
pub const WHITE: u16 = 0xFFFF;

/// Converts 8-bit red, green and blue values into a 16-bit 565 encoding.
#[inline]
pub const fn color565(red: u8, green: u8, blue: u8) -> u16 {
    ((red as u16 & 0xF8) << 8) | ((green as u16 & 0xFC) << 3) | (blue as u16 >> 3)
}

/// Converts RGB888 to RGB565.
#[inline]
pub fn rgb888_to_rgb565(r: u8, g: u8, b: u8) -> u16 {
    color565(r, g, b)
}

/// Converts RGB565 to RGB888.
#[inline]
pub fn rgb565_to_rgb888(pixel: u16) -> (u8, u8, u8) {
    let r = ((pixel >> 11) & 0x1F) as u8;
    let g = ((pixel >> 5) & 0x3F) as u8;
    let b = (pixel & 0x1F) as u8;
    // Expand to 8-bit
    let r8 = (r << 3) | (r >> 2);
    let g8 = (g << 2) | (g >> 4);
    let b8 = (b << 3) | (b >> 2);
    (r8, g8, b8)
}

/// Parses a hex color string (`#RRGGBB` or `RRGGBB`) to RGB565.
pub fn parse_hex_color(hex: &str) -> Option<u16> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(color565(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color565() {
        assert_eq!(color565(255, 0, 0), RED);
        assert_eq!(color565(0, 255, 0), GREEN);
        assert_eq!(color565(0, 0, 255), BLUE);
        assert_eq!(color565(255, 255, 255), WHITE);
        assert_eq!(color565(0, 0, 0), BLACK);
        // Low bits are discarded
        assert_eq!(color565(0x07, 0x03, 0x07), BLACK);
        assert_eq!(color565(0x08, 0x04, 0x08), 0x0821);
    }

    #[test]
    fn test_rgb565_roundtrip_extremes() {
        assert_eq!(rgb565_to_rgb888(WHITE), (255, 255, 255));
        assert_eq!(rgb565_to_rgb888(BLACK), (0, 0, 0));
        assert_eq!(rgb565_to_rgb888(RED), (255, 0, 0));
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#FF0000"), Some(RED));
        assert_eq!(parse_hex_color("00FF00"), Some(GREEN));
        assert_eq!(parse_hex_color("#ffff00"), Some(YELLOW));
        assert_eq!(parse_hex_color("invalid"), None);
        assert_eq!(parse_hex_color("#12345"), None);
    }
}
