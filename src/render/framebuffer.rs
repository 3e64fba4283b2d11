//! RGBA pixel buffer the raster backend draws into.

use crate::color::Rgba;
use crate::error::{Error, Result};

/// Tightly packed RGBA pixel buffer, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    /// Each pixel is 4 bytes: [R, G, B, A].
    pixels: Vec<u8>,
}

impl Framebuffer {
    /// Create a transparent framebuffer.
    ///
    /// # Errors
    ///
    /// Returns an error if width or height is zero.
    ///
    /// # Example
    ///
    /// ```
    /// use rtplot::render::Framebuffer;
    ///
    /// let fb = Framebuffer::new(655, 450).unwrap();
    /// assert_eq!(fb.width(), 655);
    /// assert_eq!(fb.height(), 450);
    /// ```
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        let size = (width as usize) * (height as usize) * 4;
        Ok(Self {
            width,
            height,
            pixels: vec![0; size],
        })
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total number of pixels.
    #[must_use]
    pub const fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Raw RGBA bytes, ready for PNG encoding.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// One row of pixels.
    #[must_use]
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let start = self.pixel_index(0, y);
        Some(&self.pixels[start..start + (self.width as usize) * 4])
    }

    /// Fill the whole buffer with one color.
    pub fn clear(&mut self, color: Rgba) {
        let rgba = color.to_array();
        for chunk in self.pixels.chunks_exact_mut(4) {
            chunk.copy_from_slice(&rgba);
        }
    }

    /// Fill a rectangular region. Coordinates are clamped to the buffer.
    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: Rgba) {
        let x1 = x.min(self.width);
        let y1 = y.min(self.height);
        let x2 = x.saturating_add(w).min(self.width);
        let y2 = y.saturating_add(h).min(self.height);
        if x1 >= x2 || y1 >= y2 {
            return;
        }

        let rgba = color.to_array();
        for row_y in y1..y2 {
            let start = self.pixel_index(x1, row_y);
            let end = self.pixel_index(x2, row_y);
            for chunk in self.pixels[start..end].chunks_exact_mut(4) {
                chunk.copy_from_slice(&rgba);
            }
        }
    }

    /// Color at a pixel, `None` out of bounds.
    #[must_use]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = self.pixel_index(x, y);
        Some(Rgba::from_array([
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]))
    }

    /// Set a pixel. Out-of-bounds writes are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = self.pixel_index(x, y);
        self.pixels[idx..idx + 4].copy_from_slice(&color.to_array());
    }

    /// Copy `src` with its top-left corner at `(x, y)`, cropping at the edges.
    pub fn blit(&mut self, src: &Framebuffer, x: i32, y: i32) {
        for sy in 0..src.height {
            let dy = y + sy as i32;
            if dy < 0 || dy >= self.height as i32 {
                continue;
            }
            let first = (-x).max(0) as u32;
            let last = (self.width as i32 - x).clamp(0, src.width as i32) as u32;
            if first >= last {
                return;
            }
            let src_start = src.pixel_index(first, sy);
            let src_end = src.pixel_index(last, sy);
            let dst_start = self.pixel_index((x + first as i32) as u32, dy as u32);
            self.pixels[dst_start..dst_start + (src_end - src_start)]
                .copy_from_slice(&src.pixels[src_start..src_end]);
        }
    }

    #[inline]
    fn pixel_index(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + (x as usize)) * 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_framebuffer() {
        let fb = Framebuffer::new(100, 50).unwrap();
        assert_eq!(fb.pixel_count(), 5000);
        assert_eq!(fb.pixels().len(), 20_000);
        assert_eq!(fb.get_pixel(0, 0), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn test_zero_dimensions() {
        assert!(Framebuffer::new(0, 100).is_err());
        assert!(Framebuffer::new(100, 0).is_err());
    }

    #[test]
    fn test_clear_and_pixels() {
        let mut fb = Framebuffer::new(4, 4).unwrap();
        fb.clear(Rgba::WHITE);
        assert_eq!(fb.get_pixel(3, 3), Some(Rgba::WHITE));

        fb.set_pixel(1, 2, Rgba::BLACK);
        assert_eq!(fb.get_pixel(1, 2), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(4, 0), None);
        fb.set_pixel(10, 10, Rgba::BLACK);
    }

    #[test]
    fn test_fill_rect_clamped() {
        let mut fb = Framebuffer::new(10, 10).unwrap();
        fb.fill_rect(8, 8, 5, 5, Rgba::BLACK);
        assert_eq!(fb.get_pixel(9, 9), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(7, 7), Some(Rgba::TRANSPARENT));
        fb.fill_rect(20, 20, 5, 5, Rgba::BLACK);
    }

    #[test]
    fn test_row() {
        let mut fb = Framebuffer::new(3, 2).unwrap();
        fb.set_pixel(2, 1, Rgba::rgb(1, 2, 3));
        let row = fb.row(1).unwrap();
        assert_eq!(&row[8..12], &[1, 2, 3, 255]);
        assert!(fb.row(2).is_none());
    }

    #[test]
    fn test_blit_crops() {
        let mut dst = Framebuffer::new(10, 10).unwrap();
        let mut src = Framebuffer::new(4, 4).unwrap();
        src.clear(Rgba::BLACK);

        dst.blit(&src, 8, -2);
        assert_eq!(dst.get_pixel(8, 0), Some(Rgba::BLACK));
        assert_eq!(dst.get_pixel(9, 1), Some(Rgba::BLACK));
        assert_eq!(dst.get_pixel(9, 2), Some(Rgba::TRANSPARENT));
        assert_eq!(dst.get_pixel(7, 0), Some(Rgba::TRANSPARENT));

        dst.blit(&src, -20, 0);
        assert_eq!(dst.get_pixel(0, 5), Some(Rgba::TRANSPARENT));
    }
}
