//! ST7796 command set and parameter encoding.
//!
//! Multi-byte parameters (addresses, scroll areas, pixels) are sent
//! big-endian, high byte first.

/// Controller commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Command {
    Nop = 0x00,
    SoftReset = 0x01,
    ReadDisplayId = 0x04,
    ReadDisplayStatus = 0x09,
    SleepIn = 0x10,
    SleepOut = 0x11,
    PartialOn = 0x12,
    NormalOn = 0x13,
    InversionOff = 0x20,
    InversionOn = 0x21,
    DisplayOff = 0x28,
    DisplayOn = 0x29,
    /// Column address set.
    ColumnAddress = 0x2A,
    /// Row address set.
    RowAddress = 0x2B,
    /// Memory write.
    MemoryWrite = 0x2C,
    MemoryRead = 0x2E,
    PartialArea = 0x30,
    /// Vertical scrolling definition.
    ScrollDefinition = 0x33,
    /// Memory data access control.
    MemoryAccess = 0x36,
    /// Vertical scroll start address.
    ScrollStart = 0x37,
    /// Interface pixel format.
    ColorMode = 0x3A,
    ReadId1 = 0xDA,
    ReadId2 = 0xDB,
    ReadId3 = 0xDC,
    ReadId4 = 0xDD,
}

impl Command {
    /// Decodes a command byte.
    pub fn from_byte(value: u8) -> Option<Self> {
        use Command::*;
        Some(match value {
            0x00 => Nop,
            0x01 => SoftReset,
            0x04 => ReadDisplayId,
            0x09 => ReadDisplayStatus,
            0x10 => SleepIn,
            0x11 => SleepOut,
            0x12 => PartialOn,
            0x13 => NormalOn,
            0x20 => InversionOff,
            0x21 => InversionOn,
            0x28 => DisplayOff,
            0x29 => DisplayOn,
            0x2A => ColumnAddress,
            0x2B => RowAddress,
            0x2C => MemoryWrite,
            0x2E => MemoryRead,
            0x30 => PartialArea,
            0x33 => ScrollDefinition,
            0x36 => MemoryAccess,
            0x37 => ScrollStart,
            0x3A => ColorMode,
            0xDA => ReadId1,
            0xDB => ReadId2,
            0xDC => ReadId3,
            0xDD => ReadId4,
            _ => return None,
        })
    }

    /// Number of parameter bytes the command takes.
    pub fn param_len(&self) -> usize {
        match self {
            Command::ColumnAddress | Command::RowAddress | Command::PartialArea => 4,
            Command::ScrollDefinition => 6,
            Command::ScrollStart => 2,
            Command::MemoryAccess | Command::ColorMode => 1,
            _ => 0,
        }
    }
}

impl From<Command> for u8 {
    fn from(command: Command) -> u8 {
        command as u8
    }
}

// MADCTL bits
pub const MADCTL_MY: u8 = 0x80;
pub const MADCTL_MX: u8 = 0x40;
pub const MADCTL_MV: u8 = 0x20;
pub const MADCTL_ML: u8 = 0x10;
pub const MADCTL_BGR: u8 = 0x08;
pub const MADCTL_MH: u8 = 0x04;
pub const MADCTL_RGB: u8 = 0x00;

// COLMOD values
pub const COLOR_MODE_65K: u8 = 0x50;
pub const COLOR_MODE_262K: u8 = 0x60;
pub const COLOR_MODE_12BIT: u8 = 0x03;
pub const COLOR_MODE_16BIT: u8 = 0x05;
pub const COLOR_MODE_18BIT: u8 = 0x06;
pub const COLOR_MODE_16M: u8 = 0x07;

/// Mask of the defined COLMOD bits.
pub const COLOR_MODE_MASK: u8 = 0x77;

/// Encodes a start/end address pair for CASET or RASET.
pub fn encode_pos(start: u16, end: u16) -> [u8; 4] {
    let [s_hi, s_lo] = start.to_be_bytes();
    let [e_hi, e_lo] = end.to_be_bytes();
    [s_hi, s_lo, e_hi, e_lo]
}

/// Encodes a single RGB565 pixel.
pub fn encode_pixel(color: u16) -> [u8; 2] {
    color.to_be_bytes()
}

/// Encodes the VSCRDEF parameters: top fixed, scrolling and bottom fixed
/// area heights.
pub fn encode_scroll_definition(tfa: u16, vsa: u16, bfa: u16) -> [u8; 6] {
    let mut out = [0u8; 6];
    out[0..2].copy_from_slice(&tfa.to_be_bytes());
    out[2..4].copy_from_slice(&vsa.to_be_bytes());
    out[4..6].copy_from_slice(&bfa.to_be_bytes());
    out
}

/// Encodes the VSCSAD parameter.
pub fn encode_scroll_start(vssa: u16) -> [u8; 2] {
    vssa.to_be_bytes()
}

/// Decodes a big-endian u16 at `offset`.
pub(crate) fn decode_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([bytes[offset], bytes[offset + 1]])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_pos() {
        assert_eq!(encode_pos(0, 239), [0x00, 0x00, 0x00, 0xEF]);
        assert_eq!(encode_pos(0x0102, 0x0304), [0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn test_encode_pixel_is_big_endian() {
        assert_eq!(encode_pixel(0xF800), [0xF8, 0x00]);
        assert_eq!(encode_pixel(0x001F), [0x00, 0x1F]);
    }

    #[test]
    fn test_encode_scroll() {
        assert_eq!(
            encode_scroll_definition(40, 240, 40),
            [0x00, 0x28, 0x00, 0xF0, 0x00, 0x28]
        );
        assert_eq!(encode_scroll_start(300), [0x01, 0x2C]);
    }

    #[test]
    fn test_command_byte_roundtrip() {
        for byte in 0..=u8::MAX {
            if let Some(command) = Command::from_byte(byte) {
                assert_eq!(u8::from(command), byte);
            }
        }
        assert_eq!(Command::from_byte(0x2C), Some(Command::MemoryWrite));
        assert_eq!(Command::from_byte(0xFF), None);
    }

    #[test]
    fn test_color_mode_value() {
        assert_eq!((COLOR_MODE_65K | COLOR_MODE_16BIT) & COLOR_MODE_MASK, 0x55);
    }
}
