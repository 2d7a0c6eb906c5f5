//! Display driver.

use tracing::{debug, info};

use super::protocol::{
    encode_pixel, encode_pos, encode_scroll_definition, encode_scroll_start, Command,
    COLOR_MODE_MASK,
};
use crate::bitmap::{bit_set, read_bits, Bitmap};
use crate::bus::Bus;
use crate::config::DisplayConfig;
use crate::font::{BitmapFont, ProportionalFont};
use crate::rotation::Rotation;
use crate::{Error, Result};

/// Byte strobed by [`Display::clear`].
///
/// Converts from `bool` (white/black), a 565 color (low byte only) or a raw
/// byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClearValue(pub u8);

impl From<bool> for ClearValue {
    fn from(white: bool) -> Self {
        ClearValue(if white { 0xFF } else { 0x00 })
    }
}

impl From<u16> for ClearValue {
    fn from(color: u16) -> Self {
        ClearValue((color & 0xFF) as u8)
    }
}

impl From<u8> for ClearValue {
    fn from(byte: u8) -> Self {
        ClearValue(byte)
    }
}

impl From<Option<u16>> for ClearValue {
    fn from(color: Option<u16>) -> Self {
        color.map(ClearValue::from).unwrap_or_default()
    }
}

/// T-HMI display driver.
///
/// Coordinates are signed so callers can pass positions computed off the
/// edge of the screen; anything that does not fit the current window is not
/// drawn.
pub struct Display<B> {
    bus: B,
    rotation: Rotation,
    madctls: [u8; 4],
    width: u16,
    height: u16,
}

impl<B: Bus> Display<B> {
    /// Powers up and initialises the panel.
    pub fn new(bus: B, config: &DisplayConfig) -> Result<Self> {
        let (width, height) = config.rotation.dimensions();
        let mut lcd = Self {
            bus,
            rotation: config.rotation,
            madctls: config.madctls(),
            width,
            height,
        };

        lcd.bus.set_power(true)?;
        lcd.bus.delay_ms(100);

        lcd.soft_reset()?;
        lcd.sleep_mode(false)?;
        lcd.set_color_mode(config.color_mode)?;
        lcd.bus.delay_ms(50);
        lcd.rotation(config.rotation.index())?;
        lcd.inversion_mode(config.inverted)?;
        lcd.bus.delay_ms(10);
        lcd.send(Command::NormalOn, &[])?;
        lcd.bus.delay_ms(10);
        lcd.backlight_on()?;
        lcd.send(Command::DisplayOn, &[])?;
        lcd.bus.delay_ms(125);

        info!(
            "Display initialised ({}x{}, {})",
            lcd.width, lcd.height, lcd.rotation
        );
        Ok(lcd)
    }

    /// Returns the current width in pixels.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Returns the current height in pixels.
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Returns the current rotation.
    pub fn current_rotation(&self) -> Rotation {
        self.rotation
    }

    /// Borrows the bus.
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Mutably borrows the bus.
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Consumes the driver, returning the bus.
    pub fn release(self) -> B {
        self.bus
    }

    fn send(&mut self, command: Command, data: &[u8]) -> Result<()> {
        debug!("{:?} {:02X?}", command, data);
        self.bus.write_command_data(command.into(), data)
    }

    pub fn backlight_on(&mut self) -> Result<()> {
        self.bus.set_backlight(true)
    }

    pub fn backlight_off(&mut self) -> Result<()> {
        self.bus.set_backlight(false)
    }

    /// Soft resets the controller.
    pub fn soft_reset(&mut self) -> Result<()> {
        self.send(Command::SoftReset, &[])?;
        self.bus.delay_ms(150);
        Ok(())
    }

    /// Enters (`true`) or leaves sleep mode.
    pub fn sleep_mode(&mut self, enable: bool) -> Result<()> {
        if enable {
            self.send(Command::SleepIn, &[])
        } else {
            self.send(Command::SleepOut, &[])
        }
    }

    /// Enables or disables color inversion.
    pub fn inversion_mode(&mut self, enable: bool) -> Result<()> {
        if enable {
            self.send(Command::InversionOn, &[])
        } else {
            self.send(Command::InversionOff, &[])
        }
    }

    /// Sets the interface pixel format (COLMOD).
    pub fn set_color_mode(&mut self, mode: u8) -> Result<()> {
        self.send(Command::ColorMode, &[mode & COLOR_MODE_MASK])
    }

    /// Sets the rotation: 0 portrait, 1 landscape, 2 inverted portrait,
    /// 3 inverted landscape. Values wrap modulo 4.
    pub fn rotation(&mut self, rotation: usize) -> Result<()> {
        let rotation = Rotation::from_index(rotation);
        let madctl = rotation.madctl(&self.madctls);
        self.rotation = rotation;
        (self.width, self.height) = rotation.dimensions();
        self.send(Command::MemoryAccess, &[madctl])?;
        info!("Rotation set to {} ({}x{})", rotation, self.width, self.height);
        Ok(())
    }

    /// Sets the column/row window and starts a memory write.
    ///
    /// Nothing is sent unless `x0 <= x1 <= width` and `y0 <= y1 <= height`;
    /// returns whether the window was set.
    pub fn set_window(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) -> Result<bool> {
        let (width, height) = (self.width as i32, self.height as i32);
        if !(0 <= x0 && x0 <= x1 && x1 <= width && 0 <= y0 && y0 <= y1 && y1 <= height) {
            debug!("Window ({}, {})-({}, {}) rejected", x0, y0, x1, y1);
            return Ok(false);
        }
        self.send(Command::ColumnAddress, &encode_pos(x0 as u16, x1 as u16))?;
        self.send(Command::RowAddress, &encode_pos(y0 as u16, y1 as u16))?;
        self.send(Command::MemoryWrite, &[])?;
        Ok(true)
    }

    /// Sets the window or reports it as invalid.
    fn require_window(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) -> Result<()> {
        if self.set_window(x0, y0, x1, y1)? {
            Ok(())
        } else {
            Err(Error::InvalidWindow {
                x0,
                y0,
                x1,
                y1,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Draws a single pixel.
    pub fn pixel(&mut self, x: i32, y: i32, color: u16) -> Result<()> {
        if self.set_window(x, y, x, y)? {
            self.bus.write_data(&encode_pixel(color))?;
        }
        Ok(())
    }

    /// Draws a vertical line.
    pub fn vline(&mut self, x: i32, y: i32, length: u16, color: u16) -> Result<()> {
        self.fill_rect(x, y, 1, length, color)
    }

    /// Draws a horizontal line.
    pub fn hline(&mut self, x: i32, y: i32, length: u16, color: u16) -> Result<()> {
        self.fill_rect(x, y, length, 1, color)
    }

    /// Draws a rectangle outline.
    pub fn rect(&mut self, x: i32, y: i32, width: u16, height: u16, color: u16) -> Result<()> {
        self.hline(x, y, width, color)?;
        self.vline(x, y, height, color)?;
        self.vline(x.saturating_add(width as i32 - 1), y, height, color)?;
        self.hline(x, y.saturating_add(height as i32 - 1), width, color)
    }

    /// Draws a filled rectangle.
    pub fn fill_rect(&mut self, x: i32, y: i32, width: u16, height: u16, color: u16) -> Result<()> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        let x1 = x.saturating_add(width as i32 - 1);
        let y1 = y.saturating_add(height as i32 - 1);
        if self.set_window(x, y, x1, y1)? {
            self.bus
                .write_repeated(color.to_be_bytes(), width as usize * height as usize)?;
        }
        Ok(())
    }

    /// Fills the whole screen with a color.
    pub fn fill(&mut self, color: u16) -> Result<()> {
        self.fill_rect(0, 0, self.width, self.height, color)
    }

    /// Fast clear: strobes one byte value into every pixel byte, so only
    /// colors with equal high and low bytes are reachable.
    pub fn clear(&mut self, value: impl Into<ClearValue>) -> Result<()> {
        let ClearValue(byte) = value.into();
        let (width, height) = (self.width as usize, self.height as usize);
        self.set_window(0, 0, width as i32, height as i32)?;
        self.bus.fill_bytes(byte, width * (height + 1) * 2)?;
        debug!("Cleared to {:#04x}", byte);
        Ok(())
    }

    /// Draws a one pixel wide line between two points, inclusive.
    ///
    /// Only the part of the line inside the screen is walked, so endpoints
    /// may lie anywhere in the `i32` range.
    pub fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: u16) -> Result<()> {
        let (mut x0, mut y0, mut x1, mut y1) = (x0 as i64, y0 as i64, x1 as i64, y1 as i64);
        let steep = (y1 - y0).abs() > (x1 - x0).abs();
        if steep {
            std::mem::swap(&mut x0, &mut y0);
            std::mem::swap(&mut x1, &mut y1);
        }
        if x0 > x1 {
            std::mem::swap(&mut x0, &mut x1);
            std::mem::swap(&mut y0, &mut y1);
        }
        let dx = x1 - x0;
        let dy = (y1 - y0).abs();
        let ystep = if y0 < y1 { 1 } else { -1 };
        let major = i64::from(if steep { self.height } else { self.width });

        for x in x0.max(0)..=x1.min(major - 1) {
            // Bresenham minor steps taken after `x - x0` major steps,
            // starting from an error of dx / 2.
            let excess = (x - x0) as i128 * dy as i128 - (dx / 2) as i128;
            let steps = if excess > 0 {
                (excess + dx as i128 - 1) / dx as i128
            } else {
                0
            };
            let y = y0 + ystep * steps as i64;
            let (Ok(major_pos), Ok(minor_pos)) = (i32::try_from(x), i32::try_from(y)) else {
                continue;
            };
            if steep {
                self.pixel(minor_pos, major_pos, color)?;
            } else {
                self.pixel(major_pos, minor_pos, color)?;
            }
        }
        Ok(())
    }

    /// Sets the vertical scrolling definition: top fixed area, scrolling
    /// area and bottom fixed area, in physical rows.
    ///
    /// A 135x240 panel centred in frame memory would use 40, 240, 40: the
    /// 40 hidden lines above and below can be drawn off screen and scrolled
    /// into view.
    pub fn vscrdef(&mut self, tfa: u16, vsa: u16, bfa: u16) -> Result<()> {
        self.send(
            Command::ScrollDefinition,
            &encode_scroll_definition(tfa, vsa, bfa),
        )
    }

    /// Sets the vertical scroll start address: the frame memory line shown
    /// first after the top fixed area.
    pub fn vscsad(&mut self, vssa: u16) -> Result<()> {
        self.send(Command::ScrollStart, &encode_scroll_start(vssa))
    }

    /// Copies big-endian RGB565 bytes into the given rectangle.
    pub fn blit_buffer(&mut self, buffer: &[u8], x: i32, y: i32, width: u16, height: u16) -> Result<()> {
        let expected = width as usize * height as usize * 2;
        if buffer.len() != expected {
            return Err(Error::BufferSize {
                expected,
                actual: buffer.len(),
            });
        }
        self.require_window(
            x,
            y,
            x.saturating_add(width as i32 - 1),
            y.saturating_add(height as i32 - 1),
        )?;
        self.bus.write_data(buffer)
    }

    /// Draws text in a fixed-width bitmap font.
    ///
    /// Characters outside the font, or that would not fit on screen, are
    /// skipped without moving the cursor.
    pub fn text(
        &mut self,
        font: &BitmapFont<'_>,
        text: &str,
        x: i32,
        y: i32,
        color: u16,
        background: u16,
    ) -> Result<()> {
        let (fw, fh) = (font.width() as i32, font.height() as i32);
        let (width, height) = (self.width as i32, self.height as i32);
        let mut buffer = vec![0u8; font.width() as usize * font.height() as usize * 2];
        let mut x = x;

        for ch in text.chars() {
            let Some(glyph) = font.glyph(ch) else {
                continue;
            };
            if x.saturating_add(fw) > width || y.saturating_add(fh) > height {
                continue;
            }
            let bits = (0..glyph.len() * 8).map(|bit| bit_set(glyph, bit));
            render_bits(&mut buffer, bits, color, background);
            if self.set_window(x, y, x + fw - 1, y + fh - 1)? {
                self.bus.write_data(&buffer)?;
            }
            x += fw;
        }
        Ok(())
    }

    /// Draws frame `index` of a converted bitmap with its top left corner
    /// at (x, y). Bitmaps that do not fit on screen are not drawn.
    pub fn bitmap(&mut self, bitmap: &Bitmap, x: i32, y: i32, index: usize) -> Result<()> {
        if index >= bitmap.count as usize {
            return Err(Error::BitmapIndex {
                index,
                count: bitmap.count as usize,
            });
        }
        let pixels = bitmap.width as usize * bitmap.height as usize;
        let bpp = bitmap.bpp as usize;
        let mut bit = bpp * pixels * index;
        let mut buffer = vec![0u8; pixels * 2];

        for pixel in buffer.chunks_exact_mut(2) {
            let color_index = read_bits(&bitmap.bitmap, bit, bpp);
            bit += bpp;
            let color = bitmap.palette.get(color_index).copied().unwrap_or(0);
            // Converted palettes are stored byte-swapped.
            pixel.copy_from_slice(&color.to_le_bytes());
        }

        let to_col = x.saturating_add(bitmap.width as i32 - 1);
        let to_row = y.saturating_add(bitmap.height as i32 - 1);
        if (self.width as i32) > to_col
            && (self.height as i32) > to_row
            && self.set_window(x, y, to_col, to_row)?
        {
            self.bus.write_data(&buffer)?;
        }
        Ok(())
    }

    /// Draws text in a converted proportional font.
    ///
    /// Characters missing from the font are skipped. Glyphs that would
    /// cross the screen edge are not drawn but still advance the cursor.
    pub fn write(
        &mut self,
        font: &ProportionalFont,
        text: &str,
        x: i32,
        y: i32,
        fg: u16,
        bg: u16,
    ) -> Result<()> {
        let height = font.height as usize;
        let mut buffer = vec![0u8; height * font.max_width as usize * 2];
        let mut x = x;

        for ch in text.chars() {
            let Some(index) = font.index_of(ch) else {
                continue;
            };
            let start = font.glyph_offset(index);
            let char_width = font.glyph_width(index) as usize;
            let needed = char_width * height * 2;
            if buffer.len() < needed {
                buffer.resize(needed, 0);
            }
            let bits = (start..start + char_width * height).map(|bit| bit_set(&font.bitmaps, bit));
            render_bits(&mut buffer[..needed], bits, fg, bg);

            let to_col = x.saturating_add(char_width as i32 - 1);
            let to_row = y.saturating_add(height as i32 - 1);
            if (self.width as i32) > to_col
                && (self.height as i32) > to_row
                && self.set_window(x, y, to_col, to_row)?
            {
                self.bus.write_data(&buffer[..needed])?;
            }
            x = x.saturating_add(char_width as i32);
        }
        Ok(())
    }

    /// Returns the width in pixels of `text` written in `font`.
    pub fn write_width(&self, font: &ProportionalFont, text: &str) -> u32 {
        font.text_width(text)
    }
}

/// Expands a bit stream into big-endian pixels, one per bit, filling
/// `buffer`.
fn render_bits(buffer: &mut [u8], bits: impl Iterator<Item = bool>, fg: u16, bg: u16) {
    let (fg, bg) = (fg.to_be_bytes(), bg.to_be_bytes());
    for (pixel, set) in buffer.chunks_exact_mut(2).zip(bits) {
        pixel.copy_from_slice(if set { &fg } else { &bg });
    }
}
