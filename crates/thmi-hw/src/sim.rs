//! In-memory model of the panel controller.
//!
//! [`SimPanel`] implements [`Bus`] and interprets the command stream the way
//! the controller does: address windows with auto-increment, MADCTL address
//! transforms, vertical scrolling, inversion and power/sleep state. It backs
//! the test suite and the `thmictl` screenshots.

use tracing::{debug, trace};

use crate::bus::Bus;
use crate::lcd::protocol::{decode_u16, Command, MADCTL_MV, MADCTL_MX, MADCTL_MY};
use crate::lcd::Framebuffer;
use crate::{Result, PANEL_HEIGHT, PANEL_WIDTH};

/// One recorded bus event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transaction {
    /// Command byte and the parameter bytes that followed it. Pixel data
    /// after RAMWR is counted, not recorded.
    Command { code: u8, params: Vec<u8> },
    Backlight(bool),
    Power(bool),
    Delay(u32),
}

/// Vertical scroll registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollState {
    pub tfa: u16,
    pub vsa: u16,
    pub bfa: u16,
    pub vssa: u16,
}

impl Default for ScrollState {
    fn default() -> Self {
        Self {
            tfa: 0,
            vsa: PANEL_HEIGHT,
            bfa: 0,
            vssa: 0,
        }
    }
}

impl ScrollState {
    /// Maps a physical display row to the frame-memory row it shows.
    pub fn memory_row(&self, row: u16) -> u16 {
        let (tfa, vsa) = (self.tfa as i32, self.vsa as i32);
        let row = row as i32;
        if vsa == 0 || tfa + vsa > PANEL_HEIGHT as i32 || row < tfa || row >= tfa + vsa {
            return row as u16;
        }
        let offset = self.vssa as i32 - tfa;
        (tfa + (row - tfa + offset).rem_euclid(vsa)) as u16
    }
}

/// Active RAMWR window in logical addresses, inclusive.
#[derive(Debug, Clone, Copy)]
struct Window {
    x0: u16,
    x1: u16,
    y0: u16,
    y1: u16,
}

/// Simulated T-HMI panel.
pub struct SimPanel {
    memory: Framebuffer,
    madctl: u8,
    color_mode: u8,
    columns: (u16, u16),
    rows: (u16, u16),
    window: Option<Window>,
    cursor: (u16, u16),
    high_byte: Option<u8>,
    command: Option<Command>,
    scroll: ScrollState,
    inverted: bool,
    sleeping: bool,
    display_on: bool,
    backlight: bool,
    powered: bool,
    elapsed_ms: u64,
    pixels_written: usize,
    transactions: Vec<Transaction>,
}

impl Default for SimPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl SimPanel {
    /// Creates a powered-down panel with black frame memory.
    pub fn new() -> Self {
        Self {
            memory: Framebuffer::new(),
            madctl: 0,
            color_mode: 0x66,
            columns: (0, PANEL_WIDTH - 1),
            rows: (0, PANEL_HEIGHT - 1),
            window: None,
            cursor: (0, 0),
            high_byte: None,
            command: None,
            scroll: ScrollState::default(),
            inverted: false,
            sleeping: true,
            display_on: false,
            backlight: false,
            powered: false,
            elapsed_ms: 0,
            pixels_written: 0,
            transactions: Vec::new(),
        }
    }

    /// Raw frame memory, 240x320, unaffected by scrolling or inversion.
    pub fn memory(&self) -> &Framebuffer {
        &self.memory
    }

    pub fn madctl(&self) -> u8 {
        self.madctl
    }

    pub fn color_mode(&self) -> u8 {
        self.color_mode
    }

    pub fn scroll(&self) -> ScrollState {
        self.scroll
    }

    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    pub fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    pub fn is_display_on(&self) -> bool {
        self.display_on
    }

    pub fn is_backlight_on(&self) -> bool {
        self.backlight
    }

    pub fn is_powered(&self) -> bool {
        self.powered
    }

    /// Total delay requested through the bus.
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    /// Pixels streamed after RAMWR, including ones outside frame memory.
    pub fn pixels_written(&self) -> usize {
        self.pixels_written
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn clear_transactions(&mut self) {
        self.transactions.clear();
    }

    /// Recorded commands with their parameters.
    pub fn commands(&self) -> impl Iterator<Item = (u8, &[u8])> {
        self.transactions.iter().filter_map(|t| match t {
            Transaction::Command { code, params } => Some((*code, params.as_slice())),
            _ => None,
        })
    }

    /// Frame memory row-remapped by the scroll registers, with inversion and
    /// blanking applied, in physical (portrait) orientation.
    pub fn visible(&self) -> Framebuffer {
        let mut out = Framebuffer::new();
        if !(self.powered && self.display_on && self.backlight) || self.sleeping {
            return out;
        }
        let width = PANEL_WIDTH as usize;
        for y in 0..PANEL_HEIGHT {
            let src = self.memory.row(self.scroll.memory_row(y));
            let start = y as usize * width;
            let dst = &mut out.data_mut()[start..start + width];
            for (d, &s) in dst.iter_mut().zip(src) {
                *d = if self.inverted { !s } else { s };
            }
        }
        out
    }

    /// The visible image as the viewer sees it in the current rotation.
    pub fn logical_view(&self) -> Framebuffer {
        let visible = self.visible();
        let (width, height) = self.logical_dimensions();
        let mut out = Framebuffer::with_dimensions(width, height);
        for y in 0..height {
            for x in 0..width {
                if let Some((px, py)) = self.physical(x, y) {
                    if let Some(pixel) = visible.get_pixel(px, py) {
                        out.set_pixel(x, y, pixel);
                    }
                }
            }
        }
        out
    }

    /// Logical (column, row) extents under the current MADCTL.
    pub fn logical_dimensions(&self) -> (u16, u16) {
        if self.madctl & MADCTL_MV != 0 {
            (PANEL_HEIGHT, PANEL_WIDTH)
        } else {
            (PANEL_WIDTH, PANEL_HEIGHT)
        }
    }

    /// Maps a logical address to frame memory: exchange, then mirror.
    fn physical(&self, x: u16, y: u16) -> Option<(u16, u16)> {
        let (mut px, mut py) = if self.madctl & MADCTL_MV != 0 {
            (y, x)
        } else {
            (x, y)
        };
        if px >= PANEL_WIDTH || py >= PANEL_HEIGHT {
            return None;
        }
        if self.madctl & MADCTL_MX != 0 {
            px = PANEL_WIDTH - 1 - px;
        }
        if self.madctl & MADCTL_MY != 0 {
            py = PANEL_HEIGHT - 1 - py;
        }
        Some((px, py))
    }

    fn reset(&mut self) {
        self.madctl = 0;
        self.color_mode = 0x66;
        self.columns = (0, PANEL_WIDTH - 1);
        self.rows = (0, PANEL_HEIGHT - 1);
        self.window = None;
        self.scroll = ScrollState::default();
        self.inverted = false;
        self.sleeping = true;
        self.display_on = false;
    }

    /// Opens the RAMWR window, clamping the ends to the address range.
    fn begin_memory_write(&mut self) {
        let (width, height) = self.logical_dimensions();
        let x1 = self.columns.1.min(width - 1);
        let y1 = self.rows.1.min(height - 1);
        let (x0, y0) = (self.columns.0, self.rows.0);
        self.window = (x0 <= x1 && y0 <= y1).then_some(Window { x0, x1, y0, y1 });
        self.cursor = (x0, y0);
        self.high_byte = None;
    }

    fn write_pixel(&mut self, color: u16) {
        self.pixels_written += 1;
        let Some(window) = self.window else {
            return;
        };
        let (x, y) = self.cursor;
        if let Some((px, py)) = self.physical(x, y) {
            self.memory.set_pixel(px, py, color);
        }
        self.cursor = if x < window.x1 {
            (x + 1, y)
        } else if y < window.y1 {
            (window.x0, y + 1)
        } else {
            (window.x0, window.y0)
        };
    }

    fn apply_command(&mut self, command: Command) {
        match command {
            Command::SoftReset => self.reset(),
            Command::SleepIn => self.sleeping = true,
            Command::SleepOut => self.sleeping = false,
            Command::InversionOn => self.inverted = true,
            Command::InversionOff => self.inverted = false,
            Command::DisplayOn => self.display_on = true,
            Command::DisplayOff => self.display_on = false,
            Command::MemoryWrite => self.begin_memory_write(),
            _ => {}
        }
    }

    fn apply_params(&mut self, command: Command, params: &[u8]) {
        match command {
            Command::ColumnAddress => {
                self.columns = (decode_u16(params, 0), decode_u16(params, 2));
            }
            Command::RowAddress => {
                self.rows = (decode_u16(params, 0), decode_u16(params, 2));
            }
            Command::MemoryAccess => self.madctl = params[0],
            Command::ColorMode => self.color_mode = params[0],
            Command::ScrollDefinition => {
                self.scroll.tfa = decode_u16(params, 0);
                self.scroll.vsa = decode_u16(params, 2);
                self.scroll.bfa = decode_u16(params, 4);
            }
            Command::ScrollStart => self.scroll.vssa = decode_u16(params, 0),
            _ => {}
        }
    }
}

impl Bus for SimPanel {
    fn write_command(&mut self, command: u8) -> Result<()> {
        self.transactions.push(Transaction::Command {
            code: command,
            params: Vec::new(),
        });
        self.command = Command::from_byte(command);
        match self.command {
            Some(command) => {
                trace!("sim: command {:?}", command);
                self.apply_command(command);
            }
            None => debug!("sim: ignoring unknown command {:#04x}", command),
        }
        Ok(())
    }

    fn write_data(&mut self, data: &[u8]) -> Result<()> {
        let Some(command) = self.command else {
            return Ok(());
        };
        if command == Command::MemoryWrite {
            for &byte in data {
                match self.high_byte.take() {
                    Some(high) => self.write_pixel(u16::from_be_bytes([high, byte])),
                    None => self.high_byte = Some(byte),
                }
            }
            return Ok(());
        }

        let wanted = command.param_len();
        let params = match self.transactions.last_mut() {
            Some(Transaction::Command { params, .. }) => {
                let before = params.len();
                params.extend_from_slice(data);
                (before < wanted && params.len() >= wanted).then(|| params[..wanted].to_vec())
            }
            _ => None,
        };
        if let Some(params) = params {
            self.apply_params(command, &params);
        }
        Ok(())
    }

    fn set_backlight(&mut self, on: bool) -> Result<()> {
        self.transactions.push(Transaction::Backlight(on));
        self.backlight = on;
        Ok(())
    }

    fn set_power(&mut self, on: bool) -> Result<()> {
        self.transactions.push(Transaction::Power(on));
        self.powered = on;
        Ok(())
    }

    fn delay_ms(&mut self, ms: u32) {
        self.transactions.push(Transaction::Delay(ms));
        self.elapsed_ms += ms as u64;
    }
}
