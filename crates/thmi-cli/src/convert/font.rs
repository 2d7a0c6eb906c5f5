//! TrueType to proportional bitmap font conversion using fontdue.

use anyhow::{Context, Result};
use fontdue::{Font, FontSettings};
use thmi_hw::ProportionalFont;
use tracing::{debug, warn};

use super::BitWriter;

/// Characters converted when none are given: printable ASCII.
pub fn default_chars() -> String {
    (0x20u8..0x7F).map(char::from).collect()
}

/// Coverage at or above which a pixel is set.
const THRESHOLD: u8 = 128;

/// One rasterised character cell, `width * height` coverage values.
#[derive(Debug, Clone)]
pub struct GlyphCell {
    pub ch: char,
    pub width: usize,
    pub coverage: Vec<u8>,
}

/// Rasterises `chars` into cells `height` pixels tall sharing one baseline.
///
/// Characters the font has no glyph for are skipped.
pub fn rasterize(font: &Font, chars: &str, height: u16) -> Result<Vec<GlyphCell>> {
    let metrics = font
        .horizontal_line_metrics(height as f32)
        .context("Font has no horizontal metrics")?;
    // Scale so ascent to descent spans the cell
    let span = metrics.ascent - metrics.descent;
    let px = if span > 0.0 {
        height as f32 * height as f32 / span
    } else {
        height as f32
    };
    let baseline = (metrics.ascent * px / height as f32).round() as i32;
    let rows = height as usize;

    let mut cells = Vec::new();
    for ch in chars.chars() {
        if font.lookup_glyph_index(ch) == 0 && ch != ' ' {
            warn!("No glyph for {:?}, skipping", ch);
            continue;
        }
        let (glyph, bitmap) = font.rasterize(ch, px);
        let width = (glyph.advance_width.round() as i32)
            .max(glyph.xmin + glyph.width as i32)
            .max(1) as usize;

        let mut coverage = vec![0u8; width * rows];
        let top = baseline - (glyph.ymin + glyph.height as i32);
        for gy in 0..glyph.height {
            for gx in 0..glyph.width {
                let x = glyph.xmin + gx as i32;
                let y = top + gy as i32;
                if (0..width as i32).contains(&x) && (0..rows as i32).contains(&y) {
                    coverage[y as usize * width + x as usize] = bitmap[gy * glyph.width + gx];
                }
            }
        }
        cells.push(GlyphCell {
            ch,
            width,
            coverage,
        });
    }
    Ok(cells)
}

/// Largest bit offset the 3-byte offset table can hold.
const MAX_OFFSET: usize = 0xFF_FFFF;

/// Encodes glyph bit offsets big-endian in the narrowest width that fits.
fn encode_offsets(starts: &[usize]) -> Result<(u8, Vec<u8>)> {
    let max_offset = starts.iter().copied().max().unwrap_or(0);
    anyhow::ensure!(
        max_offset <= MAX_OFFSET,
        "Glyph offset {} does not fit in 3 bytes, use fewer or smaller glyphs",
        max_offset
    );
    let offset_width = ProportionalFont::offset_width_for(max_offset);
    let offsets = starts
        .iter()
        .flat_map(|&start| {
            let bytes = (start as u32).to_be_bytes();
            bytes[4 - offset_width as usize..].to_vec()
        })
        .collect();
    Ok((offset_width, offsets))
}

/// Packs cells into the proportional font format.
pub fn pack(height: u16, cells: &[GlyphCell]) -> Result<ProportionalFont> {
    let mut bits = BitWriter::default();
    let mut map = String::new();
    let mut widths = Vec::with_capacity(cells.len());
    let mut starts = Vec::with_capacity(cells.len());

    for cell in cells {
        let width = u8::try_from(cell.width)
            .with_context(|| format!("Glyph {:?} is wider than 255 pixels", cell.ch))?;
        anyhow::ensure!(
            cell.coverage.len() == cell.width * height as usize,
            "Glyph {:?} has {} coverage values, expected {}",
            cell.ch,
            cell.coverage.len(),
            cell.width * height as usize
        );
        map.push(cell.ch);
        widths.push(width);
        starts.push(bits.len());
        for &value in &cell.coverage {
            bits.push(value >= THRESHOLD);
        }
    }

    let (offset_width, offsets) = encode_offsets(&starts)?;

    let font = ProportionalFont {
        height,
        max_width: widths.iter().copied().max().unwrap_or(0) as u16,
        map,
        offset_width,
        offsets,
        widths,
        bitmaps: bits.into_bytes(),
    };
    font.validate().context("Converted font is inconsistent")?;
    debug!(
        "Packed {} glyphs, {} bitmap bytes, offset width {}",
        font.len(),
        font.bitmaps.len(),
        font.offset_width
    );
    Ok(font)
}

/// Converts TrueType font data.
pub fn convert(ttf: &[u8], height: u16, chars: &str) -> Result<ProportionalFont> {
    anyhow::ensure!(height > 0, "Font height must be at least 1");
    let font = Font::from_bytes(ttf, FontSettings::default())
        .map_err(|e| anyhow::anyhow!("Failed to parse font: {}", e))?;
    let cells = rasterize(&font, chars, height)?;
    pack(height, &cells)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(ch: char, width: usize, coverage: &[u8]) -> GlyphCell {
        GlyphCell {
            ch,
            width,
            coverage: coverage.to_vec(),
        }
    }

    #[test]
    fn test_pack_thresholds_and_offsets() {
        let cells = [
            cell('i', 1, &[255, 127]),
            cell('m', 3, &[128, 0, 200, 0, 0, 0]),
        ];
        let font = pack(2, &cells).unwrap();
        assert_eq!(font.map, "im");
        assert_eq!(font.widths, vec![1, 3]);
        assert_eq!(font.max_width, 3);
        assert_eq!(font.offset_width, 1);
        assert_eq!(font.offsets, vec![0, 2]);
        // 1 0 | 1 0 1 0 0 0
        assert_eq!(font.bitmaps, vec![0b1010_1000]);
    }

    #[test]
    fn test_pack_widens_offsets() {
        // 40 glyphs of 8x1 push the last offset past 255
        let cells: Vec<_> = (0..40)
            .map(|i| cell(char::from(b'0' + i as u8), 8, &[0; 8]))
            .collect();
        let font = pack(1, &cells).unwrap();
        assert_eq!(font.offset_width, 2);
        assert_eq!(font.glyph_offset(39), 312);
        assert_eq!(font.glyph_offset(1), 8);
    }

    #[test]
    fn test_offsets_use_three_bytes_at_most() {
        let (width, offsets) = encode_offsets(&[0, 0x1_0000, MAX_OFFSET]).unwrap();
        assert_eq!(width, 3);
        assert_eq!(offsets, vec![0, 0, 0, 1, 0, 0, 0xFF, 0xFF, 0xFF]);

        assert!(encode_offsets(&[0, MAX_OFFSET + 1]).is_err());
    }

    #[test]
    fn test_pack_rejects_bad_cells() {
        assert!(pack(2, &[cell('x', 2, &[0; 3])]).is_err());
        assert!(pack(1, &[cell('x', 300, &[0; 300])]).is_err());
    }

    fn mono() -> Font {
        let ttf = include_bytes!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/data/DejaVuSansMono.ttf"
        ));
        Font::from_bytes(&ttf[..], FontSettings::default()).unwrap()
    }

    /// Rows of `cell` holding at least one set pixel.
    fn ink_rows(cell: &GlyphCell) -> Vec<usize> {
        cell.coverage
            .chunks(cell.width)
            .enumerate()
            .filter(|(_, row)| row.iter().any(|&c| c >= THRESHOLD))
            .map(|(y, _)| y)
            .collect()
    }

    #[test]
    fn test_rasterize_shares_baseline() {
        let cells = rasterize(&mono(), "Hg ", 24).unwrap();
        assert_eq!(cells.len(), 3);
        for cell in &cells {
            assert_eq!(cell.coverage.len(), cell.width * 24);
        }
        // Monospaced: one advance for every glyph
        assert!(cells.iter().all(|c| c.width == cells[0].width));
        assert!(cells[0].width > 4 && cells[0].width < 24);

        let h = ink_rows(&cells[0]);
        let g = ink_rows(&cells[1]);
        assert!(!h.is_empty() && !g.is_empty());
        assert!(h[0] > 0, "cap height leaves room above");
        // The descender of 'g' reaches below the baseline 'H' sits on
        assert!(g.last() > h.last());
        assert!(ink_rows(&cells[2]).is_empty());
    }

    #[test]
    fn test_rasterize_skips_missing_glyphs() {
        let cells = rasterize(&mono(), "A\u{4E2D}B", 16).unwrap();
        let chars: String = cells.iter().map(|c| c.ch).collect();
        assert_eq!(chars, "AB");
    }

    #[test]
    fn test_convert_printable_ascii() {
        let ttf = include_bytes!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/data/DejaVuSansMono.ttf"
        ));
        let font = convert(ttf, 16, &default_chars()).unwrap();
        assert_eq!(font.len(), 95);
        assert_eq!(font.height, 16);
        assert_eq!(font.offset_width, 2);
        assert_eq!(font.glyph_width(0), font.glyph_width(94));
        assert_eq!(
            font.text_width("ab"),
            2 * font.glyph_width(font.index_of('a').unwrap()) as u32
        );
    }

    #[test]
    fn test_convert_rejects_garbage() {
        assert!(convert(b"not a font", 16, "abc").is_err());
        assert!(convert(b"", 0, "abc").is_err());
    }

    #[test]
    fn test_default_chars() {
        let chars = default_chars();
        assert_eq!(chars.len(), 95);
        assert!(chars.starts_with(' '));
        assert!(chars.ends_with('~'));
    }
}
