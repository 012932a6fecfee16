//! Randomized non-overlapping ball placement.

use log::{info, warn};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::{
    config::{
        validate_arena, validate_ball_count, DEFAULT_BALL_COUNT, MAX_BALL_RADIUS,
        MIN_BALL_RADIUS, MIN_DISTANCE_FACTOR, PLACEMENT_ATTEMPTS, VELOCITY_RANGE,
    },
    core::{
        ball::Ball,
        types::{Bounds, Color, Vec2},
    },
    error::{Result, SimError},
    utils::logging::ScopedTimer,
};

/// Parameters for populating a fresh world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub ball_count: usize,
    pub min_radius: f32,
    pub max_radius: f32,
    /// Initial velocity components are drawn from `-max_speed..max_speed`.
    pub max_speed: f32,
    pub max_attempts: usize,
    /// Required center distance as a multiple of the sum of radii.
    pub spacing_factor: f32,
    /// Fixed seed for reproducible layouts; random when `None`.
    pub seed: Option<u64>,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            ball_count: DEFAULT_BALL_COUNT,
            min_radius: MIN_BALL_RADIUS,
            max_radius: MAX_BALL_RADIUS,
            max_speed: VELOCITY_RANGE,
            max_attempts: PLACEMENT_ATTEMPTS,
            spacing_factor: MIN_DISTANCE_FACTOR,
            seed: None,
        }
    }
}

impl SpawnConfig {
    pub fn with_count(ball_count: usize) -> Self {
        Self {
            ball_count,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_ball_count(self.ball_count)?;
        if !self.min_radius.is_finite() || self.min_radius <= 0.0 {
            return Err(SimError::parameter(
                "min_radius",
                self.min_radius,
                "must be positive",
            ));
        }
        if !self.max_radius.is_finite() || self.max_radius < self.min_radius {
            return Err(SimError::parameter(
                "max_radius",
                self.max_radius,
                "must be at least min_radius",
            ));
        }
        if !self.max_speed.is_finite() || self.max_speed < 0.0 {
            return Err(SimError::parameter(
                "max_speed",
                self.max_speed,
                "must be finite and non-negative",
            ));
        }
        if self.max_attempts == 0 {
            return Err(SimError::parameter(
                "max_attempts",
                0.0,
                "must allow at least one attempt",
            ));
        }
        if !self.spacing_factor.is_finite() || self.spacing_factor < 1.0 {
            return Err(SimError::parameter(
                "spacing_factor",
                self.spacing_factor,
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Outcome of a placement run. Dropped balls are a diagnostic, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementReport {
    pub requested: usize,
    pub placed: usize,
    /// Request slots (0-based) that could not be placed.
    pub dropped: Vec<usize>,
    pub seed: u64,
}

impl PlacementReport {
    pub fn is_complete(&self) -> bool {
        self.dropped.is_empty()
    }
}

/// Places `spawn.ball_count` balls by rejection sampling. A ball that finds no
/// free spot within `max_attempts` is dropped and listed in the report.
pub fn place_balls(bounds: Bounds, spawn: &SpawnConfig) -> Result<(Vec<Ball>, PlacementReport)> {
    spawn.validate()?;
    validate_arena(bounds.width, bounds.height, spawn.max_radius)?;

    let _timer = ScopedTimer::new("world::spawn");
    let seed = spawn.seed.unwrap_or_else(rand::random);
    let mut rng = Pcg32::seed_from_u64(seed);

    let mut balls: Vec<Ball> = Vec::with_capacity(spawn.ball_count);
    let mut dropped = Vec::new();

    for slot in 0..spawn.ball_count {
        let radius = if spawn.max_radius > spawn.min_radius {
            rng.random_range(spawn.min_radius..=spawn.max_radius)
        } else {
            spawn.min_radius
        };

        let position = (0..spawn.max_attempts).find_map(|_| {
            let candidate = Vec2::new(
                rng.random_range(radius..=bounds.width - radius),
                rng.random_range(radius..=bounds.height - radius),
            );
            let free = balls.iter().all(|other| {
                let min_distance = (radius + other.radius()) * spawn.spacing_factor;
                candidate.distance_squared(other.position) >= min_distance * min_distance
            });
            free.then_some(candidate)
        });

        let Some(position) = position else {
            warn!(
                "dropping ball {slot}: no free spot after {} attempts",
                spawn.max_attempts
            );
            dropped.push(slot);
            continue;
        };

        let velocity = if spawn.max_speed > 0.0 {
            Vec2::new(
                rng.random_range(-spawn.max_speed..spawn.max_speed),
                rng.random_range(-spawn.max_speed..spawn.max_speed),
            )
        } else {
            Vec2::ZERO
        };
        let color = Color::PALETTE[rng.random_range(0..Color::PALETTE.len())];

        balls.push(Ball::new(balls.len() as u32, radius, position, velocity, color));
    }

    let report = PlacementReport {
        requested: spawn.ball_count,
        placed: balls.len(),
        dropped,
        seed,
    };

    if report.is_complete() {
        info!("placed {} balls (seed {seed})", report.placed);
    } else {
        warn!(
            "placed {} of {} balls (seed {seed}); {} dropped",
            report.placed,
            report.requested,
            report.dropped.len()
        );
    }

    Ok((balls, report))
}
