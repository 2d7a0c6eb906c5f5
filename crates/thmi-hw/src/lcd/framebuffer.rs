//! RGB565 framebuffer backing the simulated panel's frame memory.

use crate::color::rgb565_to_rgb888;
use crate::{Result, PANEL_HEIGHT, PANEL_WIDTH};

/// RGB565 framebuffer, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Framebuffer {
    /// Pixel data in RGB565 format.
    data: Vec<u16>,
    /// Width of the framebuffer.
    width: u16,
    /// Height of the framebuffer.
    height: u16,
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Framebuffer {
    /// Creates a panel-sized (240x320) framebuffer initialized to black.
    pub fn new() -> Self {
        Self::with_dimensions(PANEL_WIDTH, PANEL_HEIGHT)
    }

    /// Creates a framebuffer with custom dimensions.
    pub fn with_dimensions(width: u16, height: u16) -> Self {
        let size = width as usize * height as usize;
        Self {
            data: vec![0; size],
            width,
            height,
        }
    }

    /// Returns the width of the framebuffer.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Returns the height of the framebuffer.
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Returns a mutable reference to the raw pixel data.
    pub fn data_mut(&mut self) -> &mut [u16] {
        &mut self.data
    }

    /// Sets a pixel at the given coordinates.
    pub fn set_pixel(&mut self, x: u16, y: u16, color: u16) {
        if x < self.width && y < self.height {
            let idx = y as usize * self.width as usize + x as usize;
            self.data[idx] = color;
        }
    }

    /// Gets a pixel at the given coordinates.
    pub fn get_pixel(&self, x: u16, y: u16) -> Option<u16> {
        if x < self.width && y < self.height {
            let idx = y as usize * self.width as usize + x as usize;
            Some(self.data[idx])
        } else {
            None
        }
    }

    /// Returns one row of pixels.
    pub fn row(&self, y: u16) -> &[u16] {
        let start = y as usize * self.width as usize;
        &self.data[start..start + self.width as usize]
    }

    /// Counts the pixels equal to `color`.
    pub fn count(&self, color: u16) -> usize {
        self.data.iter().filter(|&&p| p == color).count()
    }

    /// Converts the framebuffer to RGBA8 bytes for PNG encoding.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut rgba = Vec::with_capacity(self.data.len() * 4);
        for &pixel in &self.data {
            let (r, g, b) = rgb565_to_rgb888(pixel);
            rgba.push(r);
            rgba.push(g);
            rgba.push(b);
            rgba.push(255);
        }
        rgba
    }

    /// Encodes the framebuffer as a PNG image.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut png_data = Vec::new();
        {
            let mut encoder =
                png::Encoder::new(&mut png_data, self.width as u32, self.height as u32);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header()?;
            writer.write_image_data(&self.to_rgba8())?;
        }
        Ok(png_data)
    }
}
