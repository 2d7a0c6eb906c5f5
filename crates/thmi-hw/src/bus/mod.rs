//! Parallel bus abstraction.
//!
//! The controller listens on an 8-bit 8080-style bus: eight data lines, a
//! write strobe (WR) latching each byte on its rising edge, data/command
//! select (DC, low for commands) and chip select (CS, active low). The panel
//! also has a backlight enable and a power enable line.
//!
//! [`Display`](crate::Display) talks to the panel only through [`Bus`], so
//! the same driver runs on any HAL ([`ParallelBus`]), on raw ESP32-S3 GPIO
//! registers ([`Esp32s3Bus`]) or against the in-memory
//! [`SimPanel`](crate::SimPanel).

mod esp32s3;
mod parallel;

pub use esp32s3::{
    out1_set_masks, Esp32s3Bus, Registers, WriteStrobe, DATA_PINS, GPIO_OUT1_W1TC_REG,
    GPIO_OUT1_W1TS_REG, GPIO_OUT_W1TC_REG, GPIO_OUT_W1TS_REG, MASK_BACKLIGHT, MASK_CS, MASK_DC,
    MASK_POWER, OUT1_CLEAR_MASK, OUT1_SET_MASKS, PULSE,
};
pub use parallel::{ParallelBus, ParallelPins};

use crate::Result;

/// Pixels staged per bulk write.
pub const BUFFER_PIXELS: usize = 256;

/// Byte-level access to the panel.
pub trait Bus {
    /// Sends a command byte with DC low, in its own CS transaction.
    fn write_command(&mut self, command: u8) -> Result<()>;

    /// Sends data bytes with DC high, in their own CS transaction.
    fn write_data(&mut self, data: &[u8]) -> Result<()>;

    /// Sends a command followed by its parameters.
    ///
    /// Implementations that control CS should hold it low across both.
    fn write_command_data(&mut self, command: u8, data: &[u8]) -> Result<()> {
        self.write_command(command)?;
        if !data.is_empty() {
            self.write_data(data)?;
        }
        Ok(())
    }

    /// Sends the two-byte `pattern` `count` times as data.
    fn write_repeated(&mut self, pattern: [u8; 2], count: usize) -> Result<()> {
        let mut chunk = [0u8; BUFFER_PIXELS * 2];
        for pixel in chunk.chunks_exact_mut(2) {
            pixel.copy_from_slice(&pattern);
        }
        let mut remaining = count;
        while remaining > 0 {
            let n = remaining.min(BUFFER_PIXELS);
            self.write_data(&chunk[..n * 2])?;
            remaining -= n;
        }
        Ok(())
    }

    /// Strobes `count` copies of a single byte as data.
    ///
    /// Buses that can hold the data lines and pulse WR in hardware override
    /// this; it backs [`Display::clear`](crate::Display::clear).
    fn fill_bytes(&mut self, byte: u8, count: usize) -> Result<()> {
        let chunk = [byte; BUFFER_PIXELS * 2];
        let mut remaining = count;
        while remaining > 0 {
            let n = remaining.min(chunk.len());
            self.write_data(&chunk[..n])?;
            remaining -= n;
        }
        Ok(())
    }

    /// Switches the backlight.
    fn set_backlight(&mut self, on: bool) -> Result<()>;

    /// Switches panel power.
    fn set_power(&mut self, on: bool) -> Result<()>;

    /// Blocks for `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32);
}

impl<T: Bus + ?Sized> Bus for &mut T {
    fn write_command(&mut self, command: u8) -> Result<()> {
        (**self).write_command(command)
    }

    fn write_data(&mut self, data: &[u8]) -> Result<()> {
        (**self).write_data(data)
    }

    fn write_command_data(&mut self, command: u8, data: &[u8]) -> Result<()> {
        (**self).write_command_data(command, data)
    }

    fn write_repeated(&mut self, pattern: [u8; 2], count: usize) -> Result<()> {
        (**self).write_repeated(pattern, count)
    }

    fn fill_bytes(&mut self, byte: u8, count: usize) -> Result<()> {
        (**self).fill_bytes(byte, count)
    }

    fn set_backlight(&mut self, on: bool) -> Result<()> {
        (**self).set_backlight(on)
    }

    fn set_power(&mut self, on: bool) -> Result<()> {
        (**self).set_power(on)
    }

    fn delay_ms(&mut self, ms: u32) {
        (**self).delay_ms(ms)
    }
}
