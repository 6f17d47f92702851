use egui::Color32;
use serde::{Deserialize, Serialize};

/// A 32-bit color as it crosses the plugin boundary, packed as `0xRRGGBBAA`.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub u32);

impl Color {
    pub const BLACK: Color = Color(0x0000_00FF);
    pub const WHITE: Color = Color(0xFFFF_FFFF);
    pub const TRANSPARENT: Color = Color(0x0000_0000);

    pub const fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | a as u32)
    }

    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::from_rgba(r, g, b, 0xFF)
    }

    /// Returns the channels as `[r, g, b, a]`.
    pub const fn to_rgba(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    pub const fn r(self) -> u8 {
        self.to_rgba()[0]
    }

    pub const fn g(self) -> u8 {
        self.to_rgba()[1]
    }

    pub const fn b(self) -> u8 {
        self.to_rgba()[2]
    }

    pub const fn a(self) -> u8 {
        self.to_rgba()[3]
    }

    /// Inverts the color channels, keeping alpha.
    pub const fn inverted(self) -> Self {
        Self(self.0 ^ 0xFFFF_FF00)
    }
}

impl From<u32> for Color {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<Color> for u32 {
    fn from(color: Color) -> Self {
        color.0
    }
}

impl From<Color> for Color32 {
    fn from(color: Color) -> Self {
        let [r, g, b, a] = color.to_rgba();
        Color32::from_rgba_unmultiplied(r, g, b, a)
    }
}

impl From<Color32> for Color {
    fn from(color: Color32) -> Self {
        let [r, g, b, a] = color.to_srgba_unmultiplied();
        Color::from_rgba(r, g, b, a)
    }
}

impl From<image::Rgba<u8>> for Color {
    fn from(pixel: image::Rgba<u8>) -> Self {
        let [r, g, b, a] = pixel.0;
        Color::from_rgba(r, g, b, a)
    }
}

impl From<Color> for image::Rgba<u8> {
    fn from(color: Color) -> Self {
        image::Rgba(color.to_rgba())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_packing() {
        let color = Color::from_rgba(0x12, 0x34, 0x56, 0x78);
        assert_eq!(color.0, 0x1234_5678);
        assert_eq!(color.r(), 0x12);
        assert_eq!(color.g(), 0x34);
        assert_eq!(color.b(), 0x56);
        assert_eq!(color.a(), 0x78);
    }

    #[test]
    fn test_inverted_keeps_alpha() {
        let color = Color::from_rgba(0x00, 0xFF, 0x10, 0x80);
        assert_eq!(color.inverted(), Color::from_rgba(0xFF, 0x00, 0xEF, 0x80));
    }

    #[test]
    fn test_opaque_colors_survive_egui() {
        let color = Color::from_rgb(10, 200, 30);
        let egui_color: Color32 = color.into();
        assert_eq!(Color::from(egui_color), color);
    }
}
