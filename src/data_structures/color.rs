//! Linear RGBA colours.

/// An RGBA colour with `f32` channels in `[0, 1]`.
///
/// Plain old data so colour buffers can be handed to byte-oriented consumers
/// with `bytemuck::cast_slice`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
    pub const RED: Color = Color::new(1.0, 0.0, 0.0, 1.0);
    pub const GREEN: Color = Color::new(0.0, 1.0, 0.0, 1.0);
    pub const BLUE: Color = Color::new(0.0, 0.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Quantize to 8 bit per channel, clamping out-of-range values.
    pub fn to_rgba8(&self) -> [u8; 4] {
        let f_to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [f_to_u8(self.r), f_to_u8(self.g), f_to_u8(self.b), f_to_u8(self.a)]
    }

    pub fn from_rgba8(rgba: [u8; 4]) -> Self {
        let u8_to_f = |v: u8| f32::from(v) / 255.0;
        Self::new(u8_to_f(rgba[0]), u8_to_f(rgba[1]), u8_to_f(rgba[2]), u8_to_f(rgba[3]))
    }

    /// Component-wise linear interpolation, `t = 0` yields `self`.
    pub fn lerp(&self, other: &Color, t: f32) -> Self {
        Self::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
            self.a + (other.a - self.a) * t,
        )
    }
}

impl From<[f32; 4]> for Color {
    fn from(c: [f32; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }
}

impl From<Color> for [f32; 4] {
    fn from(c: Color) -> Self {
        [c.r, c.g, c.b, c.a]
    }
}
