//! Register-level parallel bus for the ESP32-S3 on the T-HMI board.
//!
//! Data lines sit on GPIO 39..48 (the OUT1 bank), so a byte is put on the bus
//! with one write to `GPIO_OUT1_W1TS` and one to `GPIO_OUT1_W1TC` using a
//! precomputed mask per byte value. WR is driven by a pulse generator (the RMT
//! peripheral on the T-HMI) rather than toggled by the CPU.

use embedded_hal::delay::DelayNs;
use tracing::debug;

use super::Bus;
use crate::Result;

/// Set bits in GPIO 0..31.
pub const GPIO_OUT_W1TS_REG: u32 = 0x6000_4008;
/// Clear bits in GPIO 0..31.
pub const GPIO_OUT_W1TC_REG: u32 = 0x6000_400C;
/// Set bits in GPIO 32..53.
pub const GPIO_OUT1_W1TS_REG: u32 = 0x6000_4014;
/// Clear bits in GPIO 32..53.
pub const GPIO_OUT1_W1TC_REG: u32 = 0x6000_4018;

/// GPIO numbers of data bits D0..D7.
pub const DATA_PINS: [u8; 8] = [48, 47, 39, 40, 41, 42, 45, 46];

pub const MASK_DC: u32 = 1 << 7;
pub const MASK_CS: u32 = 1 << 6;
pub const MASK_POWER: u32 = 1 << 10;
/// GPIO38 in the OUT1 bank.
pub const MASK_BACKLIGHT: u32 = 1 << (38 - 32);

/// Default WR pulse width in pulse-generator ticks.
///
/// Increase on display glitches, decrease to speed up updates.
pub const PULSE: u16 = 16;

/// Builds the OUT1 set mask for every byte value from a data-pin map.
pub const fn out1_set_masks(pins: [u8; 8]) -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut byte = 0;
    while byte < 256 {
        let mut mask = 0u32;
        let mut bit = 0;
        while bit < 8 {
            if byte & (1 << bit) != 0 {
                mask |= 1 << (pins[bit] as u32 - 32);
            }
            bit += 1;
        }
        table[byte] = mask;
        byte += 1;
    }
    table
}

/// OUT1 set mask per byte value.
pub const OUT1_SET_MASKS: [u32; 256] = out1_set_masks(DATA_PINS);

/// Every data-line bit in OUT1.
pub const OUT1_CLEAR_MASK: u32 = OUT1_SET_MASKS[255];

/// 32-bit memory-mapped register writes.
pub trait Registers {
    fn write(&mut self, address: u32, value: u32);
}

/// Generator for WR strobe pulses.
pub trait WriteStrobe {
    /// Emits `count` low-high pulses of `width` ticks each and waits for
    /// them to finish.
    fn pulse(&mut self, width: u16, count: usize) -> Result<()>;
}

/// ESP32-S3 bus writing GPIO registers directly.
pub struct Esp32s3Bus<R, S, D> {
    registers: R,
    strobe: S,
    delay: D,
    pulse: u16,
    /// Byte currently on the data lines.
    last: Option<u8>,
}

impl<R, S, D> Esp32s3Bus<R, S, D>
where
    R: Registers,
    S: WriteStrobe,
    D: DelayNs,
{
    /// Creates the bus with CS and DC parked high.
    pub fn new(mut registers: R, strobe: S, delay: D, pulse: u16) -> Self {
        registers.write(GPIO_OUT_W1TS_REG, MASK_CS);
        registers.write(GPIO_OUT_W1TS_REG, MASK_DC);
        debug!("ESP32-S3 bus ready (pulse width {})", pulse);
        Self {
            registers,
            strobe,
            delay,
            pulse,
            last: None,
        }
    }

    /// Returns the configured WR pulse width.
    pub fn pulse_width(&self) -> u16 {
        self.pulse
    }

    /// Releases the register, strobe and delay handles.
    pub fn release(self) -> (R, S, D) {
        (self.registers, self.strobe, self.delay)
    }

    fn set_lines(&mut self, byte: u8) {
        if self.last != Some(byte) {
            let out1 = OUT1_SET_MASKS[byte as usize];
            self.registers.write(GPIO_OUT1_W1TS_REG, out1);
            self.registers
                .write(GPIO_OUT1_W1TC_REG, out1 ^ OUT1_CLEAR_MASK);
            self.last = Some(byte);
        }
    }

    fn write_byte(&mut self, byte: u8) -> Result<()> {
        self.set_lines(byte);
        self.strobe.pulse(self.pulse, 1)
    }

    fn transaction<F>(&mut self, body: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.registers.write(GPIO_OUT_W1TC_REG, MASK_CS);
        let result = body(self);
        self.registers.write(GPIO_OUT_W1TS_REG, MASK_CS);
        result
    }

    fn command_phase(&mut self, command: u8) -> Result<()> {
        self.registers.write(GPIO_OUT_W1TC_REG, MASK_DC);
        self.write_byte(command)
    }

    fn data_phase(&mut self, data: &[u8]) -> Result<()> {
        self.registers.write(GPIO_OUT_W1TS_REG, MASK_DC);
        data.iter().try_for_each(|&b| self.write_byte(b))
    }
}

impl<R, S, D> Bus for Esp32s3Bus<R, S, D>
where
    R: Registers,
    S: WriteStrobe,
    D: DelayNs,
{
    fn write_command(&mut self, command: u8) -> Result<()> {
        self.transaction(|bus| bus.command_phase(command))
    }

    fn write_data(&mut self, data: &[u8]) -> Result<()> {
        self.transaction(|bus| bus.data_phase(data))
    }

    fn write_command_data(&mut self, command: u8, data: &[u8]) -> Result<()> {
        self.transaction(|bus| {
            bus.command_phase(command)?;
            if data.is_empty() {
                Ok(())
            } else {
                bus.data_phase(data)
            }
        })
    }

    fn fill_bytes(&mut self, byte: u8, count: usize) -> Result<()> {
        // One byte held on the lines, WR pulsed in a single burst.
        self.set_lines(byte);
        let pulse = self.pulse;
        self.transaction(|bus| {
            bus.registers.write(GPIO_OUT_W1TS_REG, MASK_DC);
            bus.strobe.pulse(pulse, count)
        })
    }

    fn set_backlight(&mut self, on: bool) -> Result<()> {
        let reg = if on {
            GPIO_OUT1_W1TS_REG
        } else {
            GPIO_OUT1_W1TC_REG
        };
        self.registers.write(reg, MASK_BACKLIGHT);
        Ok(())
    }

    fn set_power(&mut self, on: bool) -> Result<()> {
        let reg = if on {
            GPIO_OUT_W1TS_REG
        } else {
            GPIO_OUT_W1TC_REG
        };
        self.registers.write(reg, MASK_POWER);
        Ok(())
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_mask_table_matches_wiring() {
        assert_eq!(OUT1_SET_MASKS[0x00], 0x0);
        assert_eq!(OUT1_SET_MASKS[0x01], 0x10000);
        assert_eq!(OUT1_SET_MASKS[0x02], 0x8000);
        assert_eq!(OUT1_SET_MASKS[0x04], 0x80);
        assert_eq!(OUT1_SET_MASKS[0x40], 0x2000);
        assert_eq!(OUT1_SET_MASKS[0x41], 0x12000);
        assert_eq!(OUT1_SET_MASKS[0x80], 0x4000);
        assert_eq!(OUT1_CLEAR_MASK, 0x0001_E780);
    }

    /// GPIO output state shared between the register and strobe mocks.
    #[derive(Default)]
    struct Gpio {
        out: u32,
        out1: u32,
        latched: Vec<(bool, u8)>,
        pulses: usize,
    }

    impl Gpio {
        fn data_byte(&self) -> u8 {
            DATA_PINS.iter().enumerate().fold(0u8, |acc, (bit, &pin)| {
                if self.out1 & (1 << (pin - 32)) != 0 {
                    acc | (1 << bit)
                } else {
                    acc
                }
            })
        }
    }

    struct MockRegisters(Rc<RefCell<Gpio>>);

    impl Registers for MockRegisters {
        fn write(&mut self, address: u32, value: u32) {
            let mut gpio = self.0.borrow_mut();
            match address {
                GPIO_OUT_W1TS_REG => gpio.out |= value,
                GPIO_OUT_W1TC_REG => gpio.out &= !value,
                GPIO_OUT1_W1TS_REG => gpio.out1 |= value,
                GPIO_OUT1_W1TC_REG => gpio.out1 &= !value,
                other => panic!("unexpected register {other:#x}"),
            }
        }
    }

    struct MockStrobe(Rc<RefCell<Gpio>>);

    impl WriteStrobe for MockStrobe {
        fn pulse(&mut self, width: u16, count: usize) -> Result<()> {
            assert_eq!(width, PULSE);
            let mut gpio = self.0.borrow_mut();
            assert_eq!(gpio.out & MASK_CS, 0, "CS must be low while strobing");
            let is_data = gpio.out & MASK_DC != 0;
            let byte = gpio.data_byte();
            for _ in 0..count {
                gpio.latched.push((is_data, byte));
            }
            gpio.pulses += 1;
            Ok(())
        }
    }

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    fn bus() -> (
        Esp32s3Bus<MockRegisters, MockStrobe, NoDelay>,
        Rc<RefCell<Gpio>>,
    ) {
        let gpio = Rc::new(RefCell::new(Gpio::default()));
        let bus = Esp32s3Bus::new(
            MockRegisters(gpio.clone()),
            MockStrobe(gpio.clone()),
            NoDelay,
            PULSE,
        );
        (bus, gpio)
    }

    #[test]
    fn test_command_and_data_bytes() {
        let (mut bus, gpio) = bus();
        bus.write_command_data(0x36, &[0x60]).unwrap();
        bus.write_data(&[0xA5, 0x5A]).unwrap();

        let gpio = gpio.borrow();
        assert_eq!(
            gpio.latched,
            vec![(false, 0x36), (true, 0x60), (true, 0xA5), (true, 0x5A)]
        );
        assert_ne!(gpio.out & MASK_CS, 0);
    }

    #[test]
    fn test_fill_bytes_single_burst() {
        let (mut bus, gpio) = bus();
        bus.fill_bytes(0x3C, 500).unwrap();

        let gpio = gpio.borrow();
        assert_eq!(gpio.pulses, 1);
        assert_eq!(gpio.latched.len(), 500);
        assert!(gpio.latched.iter().all(|&(d, b)| d && b == 0x3C));
    }

    #[test]
    fn test_backlight_and_power_bits() {
        let (mut bus, gpio) = bus();
        bus.set_backlight(true).unwrap();
        bus.set_power(true).unwrap();
        assert_ne!(gpio.borrow().out1 & MASK_BACKLIGHT, 0);
        assert_ne!(gpio.borrow().out & MASK_POWER, 0);
        bus.set_backlight(false).unwrap();
        assert_eq!(gpio.borrow().out1 & MASK_BACKLIGHT, 0);
    }
}
