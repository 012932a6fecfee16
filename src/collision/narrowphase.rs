use glam::Vec2;

use crate::core::ball::Ball;

/// Fallback normal used when two centers coincide exactly.
pub const DEGENERATE_NORMAL: Vec2 = Vec2::X;

/// Overlap between two discs, expressed from `a` towards `b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleContact {
    /// Unit vector from `a`'s center to `b`'s center.
    pub normal: Vec2,
    /// How far the discs interpenetrate (positive when overlapping).
    pub depth: f32,
    pub distance: f32,
}

impl CircleContact {
    /// Exact circle/circle test; `None` unless `dist² < (r1 + r2)²`.
    pub fn between(a: &Ball, b: &Ball) -> Option<Self> {
        let delta = b.position - a.position;
        let reach = a.radius() + b.radius();
        let distance_squared = delta.length_squared();
        // Written so that NaN distances count as "no contact".
        if !(distance_squared < reach * reach) {
            return None;
        }

        let distance = distance_squared.sqrt();
        let normal = if distance > 0.0 {
            delta / distance
        } else {
            DEGENERATE_NORMAL
        };

        Some(Self {
            normal,
            depth: reach - distance,
            distance,
        })
    }

    /// Velocity of `b` relative to `a`, projected on the normal. Positive when separating.
    pub fn velocity_along_normal(&self, a: &Ball, b: &Ball) -> f32 {
        (b.velocity - a.velocity).dot(self.normal)
    }
}
