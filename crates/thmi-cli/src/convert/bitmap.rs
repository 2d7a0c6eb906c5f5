//! Image to palette bitmap conversion using the image crate.

use anyhow::{Context, Result};
use image::RgbaImage;
use std::collections::HashMap;
use std::path::Path;
use thmi_hw::color::{color565, rgb565_to_rgb888};
use thmi_hw::Bitmap;
use tracing::{debug, warn};

use super::BitWriter;

/// Pixels with less alpha than this count as black.
const OPAQUE: u8 = 128;

fn pixel_color(pixel: &image::Rgba<u8>) -> u16 {
    let [r, g, b, a] = pixel.0;
    if a < OPAQUE {
        0
    } else {
        color565(r, g, b)
    }
}

/// Up to `max` colors of `image`, most frequent first.
fn build_palette(image: &RgbaImage, max: usize) -> Vec<u16> {
    let mut counts: HashMap<u16, usize> = HashMap::new();
    for pixel in image.pixels() {
        *counts.entry(pixel_color(pixel)).or_default() += 1;
    }
    let mut colors: Vec<(u16, usize)> = counts.into_iter().collect();
    colors.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    if colors.len() > max {
        warn!(
            "Image has {} colors, keeping the {} most frequent",
            colors.len(),
            max
        );
    }
    colors.into_iter().take(max).map(|(color, _)| color).collect()
}

fn distance(a: u16, b: u16) -> u32 {
    let (ar, ag, ab) = rgb565_to_rgb888(a);
    let (br, bg, bb) = rgb565_to_rgb888(b);
    let d = |x: u8, y: u8| (x as i32 - y as i32).pow(2) as u32;
    d(ar, br) + d(ag, bg) + d(ab, bb)
}

/// Index of the palette entry closest to `color`.
fn nearest(palette: &[u16], color: u16) -> usize {
    palette
        .iter()
        .enumerate()
        .min_by_key(|&(_, &entry)| distance(entry, color))
        .map(|(index, _)| index)
        .unwrap_or(0)
}

/// Converts an image strip of `frames` equal-width frames.
pub fn convert(image: &RgbaImage, bpp: u8, frames: u32) -> Result<Bitmap> {
    anyhow::ensure!((1..=8).contains(&bpp), "Bits per pixel must be 1-8");
    anyhow::ensure!(frames > 0, "Frame count must be at least 1");
    let (width, height) = image.dimensions();
    anyhow::ensure!(
        width % frames == 0,
        "Image width {} does not split into {} frames",
        width,
        frames
    );
    let frame_width = width / frames;
    let frame_width_u16 = u16::try_from(frame_width).context("Frame too wide")?;
    let height_u16 = u16::try_from(height).context("Image too tall")?;
    let count = u16::try_from(frames).context("Too many frames")?;

    let palette = build_palette(image, 1 << bpp);
    let mut lookup: HashMap<u16, usize> = HashMap::new();
    let mut bits = BitWriter::default();
    for frame in 0..frames {
        for y in 0..height {
            for x in 0..frame_width {
                let color = pixel_color(image.get_pixel(frame * frame_width + x, y));
                let index = *lookup
                    .entry(color)
                    .or_insert_with(|| nearest(&palette, color));
                bits.push_bits(index, bpp as usize);
            }
        }
    }

    let bitmap = Bitmap {
        width: frame_width_u16,
        height: height_u16,
        bpp,
        count,
        // Stored byte-swapped for the low-byte-first blit
        palette: palette.iter().map(|c| c.swap_bytes()).collect(),
        bitmap: bits.into_bytes(),
    };
    bitmap.validate().context("Converted bitmap is inconsistent")?;
    debug!(
        "Converted {}x{} x{} frames, {} colors",
        bitmap.width,
        bitmap.height,
        bitmap.count,
        bitmap.palette.len()
    );
    Ok(bitmap)
}

/// Opens and converts an image file.
pub fn convert_file(path: &Path, bpp: u8, frames: u32) -> Result<Bitmap> {
    let image = image::open(path)
        .with_context(|| format!("Failed to open image {}", path.display()))?
        .to_rgba8();
    convert(&image, bpp, frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use thmi_hw::color::{BLUE, RED, WHITE};
    use thmi_hw::{Display, DisplayConfig, SimPanel};

    const R: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const B: Rgba<u8> = Rgba([0, 0, 255, 255]);
    const W: Rgba<u8> = Rgba([255, 255, 255, 255]);

    fn strip() -> RgbaImage {
        // Two 2x2 frames: [R B / R R] and [W R / B R]
        let rows = [[R, B, W, R], [R, R, B, R]];
        RgbaImage::from_fn(4, 2, |x, y| rows[y as usize][x as usize])
    }

    #[test]
    fn test_palette_by_frequency() {
        let bitmap = convert(&strip(), 2, 2).unwrap();
        assert_eq!(
            bitmap.palette,
            vec![RED.swap_bytes(), BLUE.swap_bytes(), WHITE.swap_bytes()]
        );
        assert_eq!((bitmap.width, bitmap.height, bitmap.count), (2, 2, 2));
        // R=0 B=1 W=2: 00 01 00 00 | 10 00 01 00
        assert_eq!(bitmap.bitmap, vec![0b0001_0000, 0b1000_0100]);
    }

    #[test]
    fn test_small_palette_maps_to_nearest() {
        let bitmap = convert(&strip(), 1, 2).unwrap();
        assert_eq!(bitmap.palette.len(), 2);
        // White is as far from red as from blue; the more frequent red wins
        assert_eq!(bitmap.bitmap, vec![0b0100_0010]);
    }

    #[test]
    fn test_rejects_uneven_frames() {
        assert!(convert(&strip(), 2, 3).is_err());
        assert!(convert(&strip(), 9, 1).is_err());
        assert!(convert(&strip(), 2, 0).is_err());
    }

    #[test]
    fn test_draws_back_source_colors() {
        let bitmap = convert(&strip(), 2, 2).unwrap();
        let mut display = Display::new(SimPanel::new(), &DisplayConfig::default()).unwrap();
        display.bitmap(&bitmap, 0, 0, 1).unwrap();
        let view = display.bus().logical_view();
        assert_eq!(view.get_pixel(0, 0), Some(WHITE));
        assert_eq!(view.get_pixel(1, 0), Some(RED));
        assert_eq!(view.get_pixel(0, 1), Some(BLUE));
    }

    #[test]
    fn test_convert_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("strip.png");
        strip().save(&path).unwrap();
        let bitmap = convert_file(&path, 2, 2).unwrap();
        assert_eq!(bitmap.count, 2);
    }
}
