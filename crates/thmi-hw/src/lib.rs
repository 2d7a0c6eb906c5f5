//! THMI Display Hardware Library
//!
//! Driver for the LilyGo T-HMI 240x320 TFT panel. The panel carries an
//! ST7796-family controller wired over an 8-bit 8080-style parallel bus.
//! On top of the basic drawing primitives the driver supports display
//! rotation, hardware vertical scrolling, text in fixed-width bitmap fonts
//! and converted proportional fonts, and converted palette bitmaps.

pub mod bitmap;
pub mod bus;
pub mod color;
pub mod config;
pub mod error;
pub mod font;
#[cfg(feature = "graphics")]
pub mod graphics;
pub mod lcd;
pub mod rotation;
pub mod sim;

pub use bitmap::Bitmap;
pub use bus::Bus;
pub use config::DisplayConfig;
pub use error::{Error, Result};
pub use font::{BitmapFont, ProportionalFont};
pub use lcd::{ClearValue, Display, Framebuffer};
pub use rotation::Rotation;
pub use sim::SimPanel;

/// Native (portrait) panel dimensions.
pub const PANEL_WIDTH: u16 = 240;
pub const PANEL_HEIGHT: u16 = 320;
