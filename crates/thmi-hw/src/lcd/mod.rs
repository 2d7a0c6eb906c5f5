//! LCD display module.
//!
//! Provides the ST7796 command set, the [`Display`] driver and the RGB565
//! framebuffer used by the simulated panel.

mod device;

pub mod framebuffer;
pub mod protocol;

pub use device::{ClearValue, Display};
pub use framebuffer::Framebuffer;
pub use protocol::Command;
