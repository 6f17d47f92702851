use egui::ColorImage;
use image::RgbaImage;

use crate::color::Color;

/// Read/write access to rectangular pixel data owned by the host.
///
/// A tool only ever sees a surface as a borrow for the duration of one
/// `apply` call. There is no way to create, resize or keep one.
///
/// Coordinates must satisfy `x < width()` and `y < height()`.
pub trait PixelSurface {
    fn width(&self) -> usize;

    fn height(&self) -> usize;

    fn get_pixel(&self, x: usize, y: usize) -> Color;

    fn set_pixel(&mut self, x: usize, y: usize, color: Color);
}

/// Host-side pixel storage: the edited image and every canvas widget.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    pixels: Vec<Color>,
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl PixelBuffer {
    pub fn new(width: usize, height: usize, fill: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![fill; width * height],
        }
    }

    pub fn from_rgba_image(image: &RgbaImage) -> Self {
        let pixels = image.pixels().map(|p| Color::from(*p)).collect();
        Self {
            width: image.width() as usize,
            height: image.height() as usize,
            pixels,
        }
    }

    pub fn to_rgba_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            self.pixels[self.index(x as usize, y as usize)].into()
        })
    }

    /// Upload-ready copy for an egui texture.
    pub fn to_color_image(&self) -> ColorImage {
        ColorImage {
            size: [self.width, self.height],
            pixels: self.pixels.iter().map(|&c| c.into()).collect(),
        }
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    /// Bounds-checked read
    pub fn get(&self, x: usize, y: usize) -> Option<Color> {
        self.contains(x, y).then(|| self.pixels[self.index(x, y)])
    }

    /// Bounds-checked write. Returns false when (x, y) is outside the buffer.
    pub fn put(&mut self, x: usize, y: usize, color: Color) -> bool {
        if !self.contains(x, y) {
            return false;
        }
        let index = self.index(x, y);
        self.pixels[index] = color;
        true
    }

    pub fn fill(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    /// Copy `src` with its top-left corner at (x, y), clipped to this buffer.
    pub fn blit(&mut self, x: usize, y: usize, src: &RgbaImage) {
        for (sx, sy, pixel) in src.enumerate_pixels() {
            let tx = x.saturating_add(sx as usize);
            let ty = y.saturating_add(sy as usize);
            self.put(tx, ty, Color::from(*pixel));
        }
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }
}

impl PixelSurface for PixelBuffer {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn get_pixel(&self, x: usize, y: usize) -> Color {
        debug_assert!(self.contains(x, y), "pixel ({x}, {y}) out of bounds");
        self.pixels[self.index(x, y)]
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: Color) {
        debug_assert!(self.contains(x, y), "pixel ({x}, {y}) out of bounds");
        let index = self.index(x, y);
        self.pixels[index] = color;
    }
}
