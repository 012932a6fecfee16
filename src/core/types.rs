use serde::{Deserialize, Serialize};

/// Common math type re-exported for convenience.
pub use glam::Vec2;

/// Packed RGBA color (`0xRRGGBBAA`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    pub const RED: Color = Color(0xFF00_00FF);
    pub const GREEN: Color = Color(0x00FF_00FF);
    pub const BLUE: Color = Color(0x0000_FFFF);
    pub const MAGENTA: Color = Color(0xFF00_FFFF);
    pub const CYAN: Color = Color(0x00FF_FFFF);
    pub const YELLOW: Color = Color(0xFFFF_00FF);

    /// Palette new balls are colored from.
    pub const PALETTE: [Color; 6] = [
        Color::RED,
        Color::GREEN,
        Color::BLUE,
        Color::MAGENTA,
        Color::CYAN,
        Color::YELLOW,
    ];

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | a as u32)
    }

    pub const fn r(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub const fn g(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn b(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn a(self) -> u8 {
        self.0 as u8
    }

    /// Normalized channels, as a shader would consume them.
    pub fn to_f32_array(self) -> [f32; 4] {
        [self.r(), self.g(), self.b(), self.a()].map(|c| c as f32 / 255.0)
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::RED
    }
}

/// Axis-aligned arena spanning `[0, width] x [0, height]`, y pointing down.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Whether a disc of `radius` at `position` lies fully inside, within `epsilon`.
    pub fn contains_disc(&self, position: Vec2, radius: f32, epsilon: f32) -> bool {
        position.x >= radius - epsilon
            && position.x <= self.width - radius + epsilon
            && position.y >= radius - epsilon
            && position.y <= self.height - radius + epsilon
    }
}
