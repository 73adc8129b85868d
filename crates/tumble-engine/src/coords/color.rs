/// Linear RGBA color.
///
/// Components are in `[0, 1]`. No sRGB conversion is applied anywhere in the
/// engine: the surface is configured with a non-sRGB format by default so a
/// clear of `0.2` reads back as byte `51`.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ColorRgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl ColorRgba {
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Quantizes to 8-bit RGB the way a `*8Unorm` render target stores it.
    pub fn to_rgb8(self) -> [u8; 3] {
        [unorm8(self.r), unorm8(self.g), unorm8(self.b)]
    }

    pub fn to_wgpu(self) -> wgpu::Color {
        wgpu::Color {
            r: self.r as f64,
            g: self.g as f64,
            b: self.b as f64,
            a: self.a as f64,
        }
    }
}

#[inline]
fn unorm8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
