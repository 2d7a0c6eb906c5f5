use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result};

/// Proportional font converted offline from TrueType.
///
/// Glyph `i` is the character at position `i` of `map`. Its pixels are
/// `widths[i] * height` bits, row-major and most significant bit first,
/// starting at the bit offset stored big-endian in
/// `offsets[i * offset_width..][..offset_width]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProportionalFont {
    pub height: u16,
    pub max_width: u16,
    pub map: String,
    pub offset_width: u8,
    pub offsets: Vec<u8>,
    pub widths: Vec<u8>,
    pub bitmaps: Vec<u8>,
}

impl ProportionalFont {
    /// Loads and validates a font from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let font: Self = serde_json::from_str(&content)?;
        font.validate()?;
        debug!(
            "Loaded font {} ({} glyphs, height {})",
            path.display(),
            font.len(),
            font.height
        );
        Ok(font)
    }

    /// Writes the font as JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Number of glyphs.
    pub fn len(&self) -> usize {
        self.map.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Checks that the tables agree with each other.
    pub fn validate(&self) -> Result<()> {
        let glyphs = self.len();
        if !(1..=3).contains(&self.offset_width) {
            return Err(Error::FontFormat(format!(
                "offset width {} not in 1..=3",
                self.offset_width
            )));
        }
        if self.widths.len() != glyphs {
            return Err(Error::FontFormat(format!(
                "{} widths for {} glyphs",
                self.widths.len(),
                glyphs
            )));
        }
        if self.offsets.len() != glyphs * self.offset_width as usize {
            return Err(Error::FontFormat(format!(
                "{} offset bytes for {} glyphs of width {}",
                self.offsets.len(),
                glyphs,
                self.offset_width
            )));
        }
        let total_bits = self.bitmaps.len() * 8;
        for (index, ch) in self.map.chars().enumerate() {
            let width = self.glyph_width(index);
            if width > self.max_width {
                return Err(Error::FontFormat(format!(
                    "glyph {ch:?} is {width} wide, max width is {}",
                    self.max_width
                )));
            }
            let end = self.glyph_offset(index) + width as usize * self.height as usize;
            if end > total_bits {
                return Err(Error::FontFormat(format!(
                    "glyph {ch:?} ends at bit {end}, bitmap has {total_bits}"
                )));
            }
        }
        Ok(())
    }

    /// Position of `ch` in the map.
    pub fn index_of(&self, ch: char) -> Option<usize> {
        self.map.chars().position(|c| c == ch)
    }

    /// Width of glyph `index` in pixels.
    pub fn glyph_width(&self, index: usize) -> u16 {
        self.widths.get(index).copied().unwrap_or(0) as u16
    }

    /// Bit offset of glyph `index` into `bitmaps`.
    pub fn glyph_offset(&self, index: usize) -> usize {
        let width = self.offset_width as usize;
        let start = index * width;
        self.offsets
            .get(start..start + width)
            .map(|bytes| bytes.iter().fold(0usize, |acc, &b| acc << 8 | b as usize))
            .unwrap_or(0)
    }

    /// Total advance of `text` in pixels, skipping characters not in the map.
    pub fn text_width(&self, text: &str) -> u32 {
        text.chars()
            .filter_map(|ch| self.index_of(ch))
            .map(|index| self.glyph_width(index) as u32)
            .sum()
    }

    /// Smallest offset width in bytes able to hold `max_offset`.
    pub fn offset_width_for(max_offset: usize) -> u8 {
        match max_offset {
            0..=0xFF => 1,
            0x100..=0xFFFF => 2,
            _ => 3,
        }
    }
}
