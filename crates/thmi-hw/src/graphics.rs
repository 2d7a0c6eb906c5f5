//! `embedded-graphics` support.
//!
//! [`Display`] is a [`DrawTarget`] for [`Rgb565`], so the primitives, fonts
//! and image decoders of the embedded-graphics ecosystem draw straight to
//! the panel. Pixels outside the screen are dropped.

use embedded_graphics_core::{
    draw_target::DrawTarget,
    geometry::{Dimensions, OriginDimensions, Size},
    pixelcolor::{IntoStorage, Rgb565},
    primitives::{PointsIter, Rectangle},
    Pixel,
};

use crate::bus::{Bus, BUFFER_PIXELS};
use crate::{Display, Error};

impl<B: Bus> OriginDimensions for Display<B> {
    fn size(&self) -> Size {
        Size::new(self.width() as u32, self.height() as u32)
    }
}

impl<B: Bus> DrawTarget for Display<B> {
    type Color = Rgb565;
    type Error = Error;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let bounds = self.bounding_box();
        for Pixel(point, color) in pixels {
            if bounds.contains(point) {
                self.pixel(point.x, point.y, color.into_storage())?;
            }
        }
        Ok(())
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        let drawable = area.intersection(&self.bounding_box());
        if drawable.is_zero_sized() {
            return Ok(());
        }
        if drawable != *area {
            let pixels = area.points().zip(colors).map(|(p, c)| Pixel(p, c));
            return self.draw_iter(pixels);
        }

        let Rectangle { top_left, size } = *area;
        let (x1, y1) = (
            top_left.x + size.width as i32 - 1,
            top_left.y + size.height as i32 - 1,
        );
        if !self.set_window(top_left.x, top_left.y, x1, y1)? {
            return Ok(());
        }

        let total = size.width as usize * size.height as usize;
        let mut chunk = [0u8; BUFFER_PIXELS * 2];
        let mut filled = 0;
        for color in colors.into_iter().take(total) {
            chunk[filled..filled + 2].copy_from_slice(&color.into_storage().to_be_bytes());
            filled += 2;
            if filled == chunk.len() {
                self.bus_mut().write_data(&chunk)?;
                filled = 0;
            }
        }
        if filled > 0 {
            self.bus_mut().write_data(&chunk[..filled])?;
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let area = area.intersection(&self.bounding_box());
        if area.is_zero_sized() {
            return Ok(());
        }
        self.fill_rect(
            area.top_left.x,
            area.top_left.y,
            area.size.width as u16,
            area.size.height as u16,
            color.into_storage(),
        )
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill(color.into_storage())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{BLACK, BLUE, GREEN, RED};
    use crate::{DisplayConfig, SimPanel};
    use embedded_graphics_core::geometry::Point;
    use embedded_graphics_core::pixelcolor::RgbColor;

    fn display() -> Display<SimPanel> {
        Display::new(SimPanel::new(), &DisplayConfig::default()).unwrap()
    }

    #[test]
    fn test_size_follows_rotation() {
        let mut display = display();
        assert_eq!(display.size(), Size::new(240, 320));
        display.rotation(1).unwrap();
        assert_eq!(display.size(), Size::new(320, 240));
    }

    #[test]
    fn test_draw_iter_drops_out_of_bounds() {
        let mut display = display();
        let pixels = [
            Pixel(Point::new(1, 2), Rgb565::RED),
            Pixel(Point::new(-1, 2), Rgb565::RED),
            Pixel(Point::new(240, 0), Rgb565::RED),
        ];
        display.draw_iter(pixels).unwrap();
        let fb = display.bus().logical_view();
        assert_eq!(fb.get_pixel(1, 2), Some(RED));
        assert_eq!(fb.count(RED), 1);
    }

    #[test]
    fn test_fill_solid_clips() {
        let mut display = display();
        let area = Rectangle::new(Point::new(230, 310), Size::new(20, 20));
        display.fill_solid(&area, Rgb565::BLUE).unwrap();
        assert_eq!(display.bus().logical_view().count(BLUE), 10 * 10);
    }

    #[test]
    fn test_fill_contiguous_streams_colors() {
        let mut display = display();
        let area = Rectangle::new(Point::new(0, 0), Size::new(20, 20));
        let colors = (0..400).map(|i| if i % 2 == 0 { Rgb565::GREEN } else { Rgb565::BLACK });
        display.fill_contiguous(&area, colors).unwrap();
        let fb = display.bus().logical_view();
        assert_eq!(fb.count(GREEN), 200);
        assert_eq!(fb.get_pixel(0, 0), Some(GREEN));
        assert_eq!(fb.get_pixel(1, 0), Some(BLACK));
        assert_eq!(fb.get_pixel(18, 19), Some(GREEN));
    }

    #[test]
    fn test_fill_contiguous_partially_off_screen() {
        let mut display = display();
        let area = Rectangle::new(Point::new(-2, 0), Size::new(4, 1));
        display
            .fill_contiguous(&area, [Rgb565::RED; 4])
            .unwrap();
        let fb = display.bus().logical_view();
        assert_eq!(fb.count(RED), 2);
        assert_eq!(fb.get_pixel(1, 0), Some(RED));
    }

    #[test]
    fn test_clear_fills_screen() {
        let mut display = display();
        DrawTarget::clear(&mut display, Rgb565::RED).unwrap();
        assert_eq!(display.bus().memory().count(RED), 240 * 320);
    }
}
