//! Palette bitmaps converted offline from images.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result};

/// Multi-frame palette bitmap.
///
/// `bitmap` is a packed stream of `bpp`-bit palette indices, most
/// significant bit first, one frame of `width * height` pixels after
/// another. Palette entries are RGB565 with the bytes swapped, ready to be
/// sent low byte first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bitmap {
    pub width: u16,
    pub height: u16,
    pub bpp: u8,
    #[serde(default = "default_count")]
    pub count: u16,
    pub palette: Vec<u16>,
    pub bitmap: Vec<u8>,
}

fn default_count() -> u16 {
    1
}

impl Bitmap {
    /// Loads and validates a bitmap from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let bitmap: Self = serde_json::from_str(&content)?;
        bitmap.validate()?;
        debug!(
            "Loaded bitmap {} ({}x{}, {} bpp, {} frames)",
            path.display(),
            bitmap.width,
            bitmap.height,
            bitmap.bpp,
            bitmap.count
        );
        Ok(bitmap)
    }

    /// Writes the bitmap as JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Bits used by one frame.
    pub fn frame_bits(&self) -> usize {
        self.bpp as usize * self.width as usize * self.height as usize
    }

    /// Checks that the palette and data cover every frame.
    pub fn validate(&self) -> Result<()> {
        if !(1..=8).contains(&self.bpp) {
            return Err(Error::BitmapFormat(format!(
                "bpp {} not in 1..=8",
                self.bpp
            )));
        }
        let needed = (self.frame_bits() * self.count as usize).div_ceil(8);
        if self.bitmap.len() < needed {
            return Err(Error::BitmapFormat(format!(
                "{} frames need {needed} bytes, got {}",
                self.count,
                self.bitmap.len()
            )));
        }
        if self.palette.len() < 1 << self.bpp {
            let bpp = self.bpp as usize;
            let pixels = self.width as usize * self.height as usize * self.count as usize;
            let used = (0..pixels)
                .map(|pixel| read_bits(&self.bitmap, pixel * bpp, bpp))
                .max();
            if let Some(max) = used.filter(|&max| max >= self.palette.len()) {
                return Err(Error::BitmapFormat(format!(
                    "index {max} outside palette of {}",
                    self.palette.len()
                )));
            }
        }
        Ok(())
    }
}

/// Reads `count` bits starting at bit `offset`, most significant first.
///
/// Bits past the end of `data` read as zero.
pub fn read_bits(data: &[u8], offset: usize, count: usize) -> usize {
    (offset..offset + count).fold(0, |acc, bit| acc << 1 | bit_set(data, bit) as usize)
}

/// Returns bit `offset` of `data`, most significant bit of each byte first.
pub fn bit_set(data: &[u8], offset: usize) -> bool {
    data.get(offset / 8)
        .is_some_and(|&byte| byte & (0x80u8 >> (offset % 8)) != 0)
}
