//! Bit-banged 8080 bus over embedded-hal GPIO.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{OutputPin, PinState};
use tracing::debug;

use super::Bus;
use crate::error::bus_error;
use crate::Result;

/// GPIO lines of the parallel interface.
///
/// All lines share one pin type; HALs with per-pin types provide a
/// type-erased pin (e.g. `AnyOutputPin`) for this.
pub struct ParallelPins<P> {
    /// Data lines D0..D7.
    pub data: [P; 8],
    /// Write strobe, latched on the rising edge.
    pub wr: P,
    /// Data/command select, low for commands.
    pub dc: P,
    /// Chip select, active low.
    pub cs: P,
    /// Backlight enable, active high.
    pub backlight: P,
    /// Panel power enable, active high.
    pub power: P,
}

/// Parallel bus driving each line through [`OutputPin`].
pub struct ParallelBus<P, D> {
    pins: ParallelPins<P>,
    delay: D,
    /// Byte currently on the data lines.
    last: Option<u8>,
}

impl<P, D> ParallelBus<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    /// Creates the bus and parks it idle: CS and DC high, WR high.
    pub fn new(mut pins: ParallelPins<P>, delay: D) -> Result<Self> {
        pins.cs.set_high().map_err(bus_error)?;
        pins.dc.set_high().map_err(bus_error)?;
        pins.wr.set_high().map_err(bus_error)?;
        debug!("Parallel bus ready");
        Ok(Self {
            pins,
            delay,
            last: None,
        })
    }

    /// Releases the pins and delay.
    pub fn release(self) -> (ParallelPins<P>, D) {
        (self.pins, self.delay)
    }

    fn write_byte(&mut self, byte: u8) -> Result<()> {
        if self.last != Some(byte) {
            for (bit, pin) in self.pins.data.iter_mut().enumerate() {
                pin.set_state(PinState::from(byte & (1 << bit) != 0))
                    .map_err(bus_error)?;
            }
            self.last = Some(byte);
        }
        self.pins.wr.set_low().map_err(bus_error)?;
        self.pins.wr.set_high().map_err(bus_error)?;
        Ok(())
    }

    fn select(&mut self) -> Result<()> {
        self.pins.cs.set_low().map_err(bus_error)
    }

    fn deselect(&mut self) -> Result<()> {
        self.pins.cs.set_high().map_err(bus_error)
    }

    fn command_phase(&mut self, command: u8) -> Result<()> {
        self.pins.dc.set_low().map_err(bus_error)?;
        self.write_byte(command)
    }

    fn data_phase(&mut self, data: &[u8]) -> Result<()> {
        self.pins.dc.set_high().map_err(bus_error)?;
        for &byte in data {
            self.write_byte(byte)?;
        }
        Ok(())
    }
}

impl<P, D> Bus for ParallelBus<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    fn write_command(&mut self, command: u8) -> Result<()> {
        self.select()?;
        self.command_phase(command)?;
        self.deselect()
    }

    fn write_data(&mut self, data: &[u8]) -> Result<()> {
        self.select()?;
        self.data_phase(data)?;
        self.deselect()
    }

    fn write_command_data(&mut self, command: u8, data: &[u8]) -> Result<()> {
        self.select()?;
        self.command_phase(command)?;
        if !data.is_empty() {
            self.data_phase(data)?;
        }
        self.deselect()
    }

    fn fill_bytes(&mut self, byte: u8, count: usize) -> Result<()> {
        self.select()?;
        self.pins.dc.set_high().map_err(bus_error)?;
        for _ in 0..count {
            self.write_byte(byte)?;
        }
        self.deselect()
    }

    fn set_backlight(&mut self, on: bool) -> Result<()> {
        self.pins
            .backlight
            .set_state(PinState::from(on))
            .map_err(bus_error)
    }

    fn set_power(&mut self, on: bool) -> Result<()> {
        self.pins
            .power
            .set_state(PinState::from(on))
            .map_err(bus_error)
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}
