//! Error types for the THMI display library.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when driving the display.
#[derive(Error, Debug)]
pub enum Error {
    /// GPIO, register or strobe failure on the parallel bus.
    #[error("Bus error: {0}")]
    Bus(String),

    /// Address window outside the current display area.
    #[error("Invalid window ({x0}, {y0})-({x1}, {y1}) for {width}x{height} display")]
    InvalidWindow {
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        width: u16,
        height: u16,
    },

    /// Invalid rotation value.
    #[error("Invalid rotation: {0}")]
    InvalidRotation(String),

    /// Pixel buffer does not match the window it is written to.
    #[error("Buffer size mismatch: expected {expected}, got {actual}")]
    BufferSize { expected: usize, actual: usize },

    /// Frame index past the end of a multi-frame bitmap.
    #[error("Bitmap index {index} out of range ({count} frames)")]
    BitmapIndex { index: usize, count: usize },

    /// Malformed font data.
    #[error("Invalid font: {0}")]
    FontFormat(String),

    /// Malformed bitmap data.
    #[error("Invalid bitmap: {0}")]
    BitmapFormat(String),

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Font or bitmap (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Screenshot encoding error.
    #[error("PNG error: {0}")]
    Png(#[from] png::EncodingError),
}

/// Maps a HAL pin or peripheral error into a bus error.
pub(crate) fn bus_error<E: std::fmt::Debug>(err: E) -> Error {
    Error::Bus(format!("{err:?}"))
}
