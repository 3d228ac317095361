//! In-memory RGB888 frame buffer.

use std::convert::Infallible;

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;

use crate::layout::{BACKGROUND, SCREEN_HEIGHT, SCREEN_WIDTH};

/// Row-major frame the dashboard draws into and sinks read from.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    size: Size,
    pixels: Vec<Rgb888>,
}

impl Canvas {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            pixels: vec![BACKGROUND; (size.width * size.height) as usize],
        }
    }

    /// Canvas matching the dashboard layout.
    pub fn screen() -> Self {
        Self::new(Size::new(SCREEN_WIDTH, SCREEN_HEIGHT))
    }

    pub fn width(&self) -> u32 {
        self.size.width
    }

    pub fn height(&self) -> u32 {
        self.size.height
    }

    /// Colour at `point`, or `None` outside the canvas.
    pub fn pixel(&self, point: Point) -> Option<Rgb888> {
        self.index(point).and_then(|i| self.pixels.get(i).copied())
    }

    /// Every pixel in row-major order.
    pub fn colors(&self) -> &[Rgb888] {
        &self.pixels
    }

    /// Packed `R, G, B` bytes, row-major.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|c| [c.r(), c.g(), c.b()])
            .collect()
    }

    fn index(&self, point: Point) -> Option<usize> {
        let x = u32::try_from(point.x).ok()?;
        let y = u32::try_from(point.y).ok()?;
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        Some((y * self.size.width + x) as usize)
    }
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        self.size
    }
}

impl DrawTarget for Canvas {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let Some(i) = self.index(point) {
                self.pixels[i] = color;
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.pixels.fill(color);
        Ok(())
    }
}
