//! Aggregate quantities over ball sets.

use glam::Vec2;

use crate::core::ball::Ball;

pub fn total_kinetic_energy<'a, I>(balls: I) -> f32
where
    I: IntoIterator<Item = &'a Ball>,
{
    balls.into_iter().map(Ball::kinetic_energy).sum()
}

pub fn total_momentum<'a, I>(balls: I) -> Vec2
where
    I: IntoIterator<Item = &'a Ball>,
{
    balls
        .into_iter()
        .map(|ball| ball.velocity * ball.mass())
        .fold(Vec2::ZERO, |acc, p| acc + p)
}

/// Smallest `distance - (r1 + r2)` over all pairs; negative means overlap.
pub fn min_separation(balls: &[Ball]) -> Option<f32> {
    let mut best: Option<f32> = None;
    for (i, a) in balls.iter().enumerate() {
        for b in &balls[i + 1..] {
            let gap = a.position.distance(b.position) - (a.radius() + b.radius());
            best = Some(best.map_or(gap, |current| current.min(gap)));
        }
    }
    best
}
