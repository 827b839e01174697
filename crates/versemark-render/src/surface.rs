//! RGBA surfaces.

use image::{Rgba, RgbaImage};

/// A straight-alpha RGBA8 surface in device pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pixels: RgbaImage,
}

impl Surface {
    /// A fully transparent surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Reset every pixel to transparent.
    pub fn clear(&mut self) {
        for pixel in self.pixels.pixels_mut() {
            *pixel = Rgba([0, 0, 0, 0]);
        }
    }

    /// Copy the whole of `other` onto this surface.
    ///
    /// Surfaces of different sizes take on `other`'s size.
    pub fn copy_from(&mut self, other: &Surface) {
        self.pixels.clone_from(&other.pixels);
    }

    /// Pixel at `(x, y)`, `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.pixels.get_pixel_checked(x, y).map(|p| p.0)
    }

    pub(crate) fn pixel_mut(&mut self, x: u32, y: u32) -> Option<&mut Rgba<u8>> {
        self.pixels.get_pixel_mut_checked(x, y)
    }

    /// Whether every pixel is fully transparent.
    pub fn is_blank(&self) -> bool {
        self.pixels.pixels().all(|p| p.0[3] == 0)
    }

    /// Raw RGBA bytes, row-major.
    pub fn as_raw(&self) -> &[u8] {
        self.pixels.as_raw()
    }
}
