use serde::Serialize;

use super::types::{Color, Vec2};
use crate::config::DEFAULT_DENSITY;

/// Stable ball identifier. Equal to the ball's slot index in its world and
/// used as the canonical lock order when two balls are mutated together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BallId(pub u32);

impl BallId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// A rigid disc. Radius and mass are fixed at construction; only position and
/// velocity evolve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Ball {
    id: BallId,
    radius: f32,
    mass: f32,
    inverse_mass: f32,
    pub position: Vec2,
    pub velocity: Vec2,
    color: Color,
}

impl Ball {
    /// Creates a ball whose mass is proportional to its squared radius.
    pub fn new(id: u32, radius: f32, position: Vec2, velocity: Vec2, color: Color) -> Self {
        Self::with_mass(id, radius, radius * radius * DEFAULT_DENSITY, position, velocity, color)
    }

    pub fn with_mass(
        id: u32,
        radius: f32,
        mass: f32,
        position: Vec2,
        velocity: Vec2,
        color: Color,
    ) -> Self {
        Self {
            id: BallId(id),
            radius,
            mass,
            inverse_mass: 1.0 / mass,
            position,
            velocity,
            color,
        }
    }

    pub fn id(&self) -> BallId {
        self.id
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn inverse_mass(&self) -> f32 {
        self.inverse_mass
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn kinetic_energy(&self) -> f32 {
        0.5 * self.mass * self.velocity.length_squared()
    }

    /// True when position and velocity are free of NaN/Inf.
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite()
    }

    /// Whether radius and mass are usable for simulation.
    pub fn has_valid_shape(&self) -> bool {
        self.radius.is_finite() && self.radius > 0.0 && self.mass.is_finite() && self.mass > 0.0
    }

    pub fn overlaps(&self, other: &Ball) -> bool {
        let reach = self.radius + other.radius;
        self.position.distance_squared(other.position) < reach * reach
    }

    pub(crate) fn reassign_id(&mut self, id: u32) {
        self.id = BallId(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mass_scales_with_squared_radius() {
        let small = Ball::new(0, 10.0, Vec2::ZERO, Vec2::ZERO, Color::RED);
        let large = Ball::new(1, 20.0, Vec2::ZERO, Vec2::ZERO, Color::RED);
        assert!((large.mass() / small.mass() - 4.0).abs() < 1e-5);
        assert!((small.inverse_mass() * small.mass() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn overlap_uses_sum_of_radii() {
        let a = Ball::new(0, 5.0, Vec2::new(0.0, 0.0), Vec2::ZERO, Color::RED);
        let b = Ball::new(1, 5.0, Vec2::new(9.9, 0.0), Vec2::ZERO, Color::RED);
        let c = Ball::new(2, 5.0, Vec2::new(10.0, 0.0), Vec2::ZERO, Color::RED);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn non_finite_state_is_detected() {
        let mut ball = Ball::new(0, 5.0, Vec2::ZERO, Vec2::ZERO, Color::RED);
        assert!(ball.is_finite());
        ball.velocity.y = f32::NAN;
        assert!(!ball.is_finite());
    }
}
