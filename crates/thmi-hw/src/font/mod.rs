//! Fonts for text rendering.
//!
//! [`BitmapFont`] is a fixed-width glyph table over a contiguous character
//! range, used by [`Display::text`](crate::Display::text). [`ProportionalFont`]
//! is the offline-converted TrueType format used by
//! [`Display::write`](crate::Display::write).

mod bitmap_font;
pub mod bundled;
mod proportional;

pub use bitmap_font::BitmapFont;
pub use bundled::by_name;
pub use proportional::ProportionalFont;
