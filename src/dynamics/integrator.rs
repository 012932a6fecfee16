#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{
    config::SimConstants,
    core::{ball::Ball, types::Bounds},
    dynamics::solver::BallSlot,
};

/// Integrator responsible for stepping balls forward in time.
///
/// Order per ball: gravity, explicit Euler position update, then wall
/// reflection, so a ball never ends a step outside the arena.
#[derive(Debug, Clone, Default)]
pub struct BodyIntegrator {
    parallel: bool,
}

impl BodyIntegrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_parallel(&mut self, enabled: bool) {
        self.parallel = enabled;
    }

    pub fn parallel(&self) -> bool {
        self.parallel
    }

    pub fn apply_gravity(ball: &mut Ball, gravity: f32, dt: f32) {
        ball.velocity.y += gravity * dt;
    }

    pub fn integrate_position(ball: &mut Ball, dt: f32) {
        ball.position += ball.velocity * dt;
    }

    /// Clamps the ball inside `bounds` and reflects the velocity component of
    /// every wall it crossed, scaled by `restitution`. Returns true on contact.
    pub fn reflect_boundaries(ball: &mut Ball, bounds: &Bounds, restitution: f32) -> bool {
        let radius = ball.radius();
        let mut bounced = false;

        if ball.position.x - radius < 0.0 {
            ball.position.x = radius;
            ball.velocity.x = ball.velocity.x.abs() * restitution;
            bounced = true;
        } else if ball.position.x + radius > bounds.width {
            ball.position.x = bounds.width - radius;
            ball.velocity.x = -ball.velocity.x.abs() * restitution;
            bounced = true;
        }

        if ball.position.y - radius < 0.0 {
            ball.position.y = radius;
            ball.velocity.y = ball.velocity.y.abs() * restitution;
            bounced = true;
        } else if ball.position.y + radius > bounds.height {
            ball.position.y = bounds.height - radius;
            ball.velocity.y = -ball.velocity.y.abs() * restitution;
            bounced = true;
        }

        bounced
    }

    /// Position-only clamp; used after positional correction.
    pub fn confine(ball: &mut Ball, bounds: &Bounds) {
        let radius = ball.radius();
        ball.position.x = ball.position.x.clamp(radius, (bounds.width - radius).max(radius));
        ball.position.y = ball.position.y.clamp(radius, (bounds.height - radius).max(radius));
    }

    /// Full per-ball update for one tick. Returns true if a wall was hit.
    pub fn integrate(ball: &mut Ball, constants: &SimConstants) -> bool {
        Self::apply_gravity(ball, constants.gravity, constants.dt);
        Self::integrate_position(ball, constants.dt);
        Self::reflect_boundaries(ball, &constants.bounds, constants.restitution)
    }

    /// Integrates every ball; returns the number of wall contacts.
    pub fn step(&self, balls: &mut [BallSlot], constants: &SimConstants) -> usize {
        #[cfg(feature = "parallel")]
        if self.parallel {
            return balls
                .par_iter_mut()
                .map(|slot| Self::integrate(slot.get_mut(), constants))
                .filter(|bounced| *bounced)
                .count();
        }

        balls
            .iter_mut()
            .map(|slot| Self::integrate(slot.get_mut(), constants))
            .filter(|bounced| *bounced)
            .count()
    }

    pub fn confine_all(&self, balls: &mut [BallSlot], bounds: &Bounds) {
        for slot in balls.iter_mut() {
            Self::confine(slot.get_mut(), bounds);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Color, Vec2};

    fn constants(gravity: f32, restitution: f32) -> SimConstants {
        SimConstants {
            dt: 0.1,
            gravity,
            restitution,
            bounds: Bounds::new(100.0, 100.0),
        }
    }

    #[test]
    fn gravity_is_applied_before_position() {
        let mut ball = Ball::new(0, 5.0, Vec2::new(50.0, 50.0), Vec2::ZERO, Color::RED);
        BodyIntegrator::integrate(&mut ball, &constants(10.0, 1.0));
        assert!((ball.velocity.y - 1.0).abs() < 1e-6);
        assert!((ball.position.y - 50.1).abs() < 1e-5);
    }

    #[test]
    fn floor_contact_clamps_and_reflects() {
        let mut ball = Ball::new(0, 5.0, Vec2::new(50.0, 94.0), Vec2::new(0.0, 30.0), Color::RED);
        let bounced = BodyIntegrator::integrate(&mut ball, &constants(0.0, 0.5));
        assert!(bounced);
        assert_eq!(ball.position.y, 95.0);
        assert!((ball.velocity.y + 15.0).abs() < 1e-5);
    }

    #[test]
    fn left_wall_velocity_points_inward() {
        let mut ball = Ball::new(0, 5.0, Vec2::new(4.0, 50.0), Vec2::new(-20.0, 0.0), Color::RED);
        assert!(BodyIntegrator::reflect_boundaries(
            &mut ball,
            &Bounds::new(100.0, 100.0),
            0.8
        ));
        assert_eq!(ball.position.x, 5.0);
        assert!((ball.velocity.x - 16.0).abs() < 1e-5);
    }

    #[test]
    fn confine_leaves_velocity_untouched() {
        let mut ball = Ball::new(0, 5.0, Vec2::new(120.0, -3.0), Vec2::new(7.0, -2.0), Color::RED);
        BodyIntegrator::confine(&mut ball, &Bounds::new(100.0, 100.0));
        assert_eq!(ball.position, Vec2::new(95.0, 5.0));
        assert_eq!(ball.velocity, Vec2::new(7.0, -2.0));
    }
}
