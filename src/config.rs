//! Global configuration constants and runtime physics settings.

use serde::{Deserialize, Serialize};

use crate::{
    core::types::Bounds,
    error::{Result, SimError},
};

/// Target physics tick rate (Hz).
pub const DEFAULT_PHYSICS_RATE: f32 = 240.0;

/// Default integration timestep (in seconds).
pub const DEFAULT_TIME_STEP: f32 = 1.0 / DEFAULT_PHYSICS_RATE;

/// Target display rate (frames per second).
pub const DEFAULT_DISPLAY_RATE: f64 = 60.0;

/// Default arena size in arena units.
pub const DEFAULT_ARENA_WIDTH: f32 = 1400.0;
pub const DEFAULT_ARENA_HEIGHT: f32 = 900.0;

/// Physics ticks between profiler reports at debug level.
pub const PROFILE_REPORT_TICKS: u64 = 240;

/// Default gravity along +y (y grows downward), in arena units per second squared.
pub const DEFAULT_GRAVITY: f32 = 400.0;

/// Default coefficient of restitution for ball/ball and ball/wall contacts.
pub const DEFAULT_RESTITUTION: f32 = 0.8;

/// Fraction of penetration removed by positional correction each tick.
pub const DEFAULT_CORRECTION_PERCENT: f32 = 0.8;

/// Penetration tolerated by positional correction.
pub const DEFAULT_SLOP: f32 = 0.01;

/// Largest accepted timestep.
pub const MAX_TIME_STEP: f32 = 0.1;

/// Largest accepted gravity magnitude.
pub const MAX_GRAVITY: f32 = 100_000.0;

pub const MIN_BALL_COUNT: usize = 3;
pub const MAX_BALL_COUNT: usize = 200;
pub const DEFAULT_BALL_COUNT: usize = 50;

pub const MIN_BALL_RADIUS: f32 = 15.0;
pub const MAX_BALL_RADIUS: f32 = 25.0;

/// Initial velocity components are drawn from `-VELOCITY_RANGE..VELOCITY_RANGE`.
pub const VELOCITY_RANGE: f32 = 100.0;

/// Ball mass per unit of squared radius.
pub const DEFAULT_DENSITY: f32 = 0.01;

/// Minimum spacing between freshly placed balls, relative to the sum of radii.
pub const MIN_DISTANCE_FACTOR: f32 = 1.1;

/// Placement attempts per ball before it is dropped.
pub const PLACEMENT_ATTEMPTS: usize = 100;

/// Number of display frame intervals averaged for the reported FPS.
pub const FPS_WINDOW: usize = 60;

/// Consecutive corrupted ticks tolerated before the simulation halts.
pub const MAX_CONSECUTIVE_CORRUPT_TICKS: u32 = 3;

/// Poll interval of the physics thread while paused (milliseconds).
pub const PAUSE_POLL_MS: u64 = 10;

/// A display frame counts as dropped when its interval exceeds this multiple of the target period.
pub const FRAME_DROP_FACTOR: f64 = 1.5;

/// Runtime physics settings. Hot-reloadable through `Simulation::set_config`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub gravity: f32,
    pub restitution: f32,
    pub time_step: f32,
    pub enable_gravity: bool,
    pub enable_collisions: bool,
    pub correction_percent: f32,
    pub slop: f32,
    /// Fan integration and collision resolution out over the rayon pool.
    pub parallel: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
            restitution: DEFAULT_RESTITUTION,
            time_step: DEFAULT_TIME_STEP,
            enable_gravity: true,
            enable_collisions: true,
            correction_percent: DEFAULT_CORRECTION_PERCENT,
            slop: DEFAULT_SLOP,
            parallel: false,
        }
    }
}

impl SimConfig {
    /// Parses a JSON document; missing fields fall back to defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.gravity.is_finite() || self.gravity.abs() > MAX_GRAVITY {
            return Err(SimError::parameter(
                "gravity",
                self.gravity,
                "must be finite with magnitude below the gravity limit",
            ));
        }
        if !(0.0..=1.0).contains(&self.restitution) {
            return Err(SimError::parameter(
                "restitution",
                self.restitution,
                "must lie in [0, 1]",
            ));
        }
        if !self.time_step.is_finite() || self.time_step <= 0.0 || self.time_step > MAX_TIME_STEP
        {
            return Err(SimError::parameter(
                "time_step",
                self.time_step,
                "must be positive and at most 0.1 s",
            ));
        }
        if !(0.0..=1.0).contains(&self.correction_percent) {
            return Err(SimError::parameter(
                "correction_percent",
                self.correction_percent,
                "must lie in [0, 1]",
            ));
        }
        if !self.slop.is_finite() || self.slop < 0.0 {
            return Err(SimError::parameter(
                "slop",
                self.slop,
                "must be finite and non-negative",
            ));
        }
        Ok(())
    }

    /// Effective gravity after the `enable_gravity` toggle.
    pub fn effective_gravity(&self) -> f32 {
        if self.enable_gravity {
            self.gravity
        } else {
            0.0
        }
    }
}

/// Rejects ball counts outside `[MIN_BALL_COUNT, MAX_BALL_COUNT]`.
pub fn validate_ball_count(count: usize) -> Result<()> {
    if !(MIN_BALL_COUNT..=MAX_BALL_COUNT).contains(&count) {
        return Err(SimError::InvalidBallCount {
            requested: count,
            min: MIN_BALL_COUNT,
            max: MAX_BALL_COUNT,
        });
    }
    Ok(())
}

/// Rejects arenas that are non-finite, non-positive, or narrower than one ball.
pub fn validate_arena(width: f32, height: f32, max_radius: f32) -> Result<Bounds> {
    let min_side = 2.0 * max_radius;
    let valid = |side: f32| side.is_finite() && side > 0.0 && side >= min_side;
    if !valid(width) || !valid(height) {
        return Err(SimError::InvalidArena { width, height });
    }
    Ok(Bounds::new(width, height))
}

/// Per-tick constants consumed by the integrator and resolver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimConstants {
    pub dt: f32,
    pub gravity: f32,
    pub restitution: f32,
    pub bounds: Bounds,
}

impl SimConstants {
    pub fn new(config: &SimConfig, bounds: Bounds) -> Self {
        Self {
            dt: config.time_step,
            gravity: config.effective_gravity(),
            restitution: config.restitution,
            bounds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let bad = [
            SimConfig {
                restitution: 1.5,
                ..SimConfig::default()
            },
            SimConfig {
                time_step: 0.0,
                ..SimConfig::default()
            },
            SimConfig {
                gravity: f32::NAN,
                ..SimConfig::default()
            },
            SimConfig {
                slop: -1.0,
                ..SimConfig::default()
            },
        ];
        for config in bad {
            let err = config.validate().expect_err("config should be rejected");
            assert!(err.is_configuration());
        }
    }

    #[test]
    fn json_fills_missing_fields_with_defaults() {
        let config = SimConfig::from_json_str(r#"{ "gravity": 0.0, "restitution": 1.0 }"#)
            .expect("valid json");
        assert_eq!(config.gravity, 0.0);
        assert_eq!(config.restitution, 1.0);
        assert_eq!(config.time_step, DEFAULT_TIME_STEP);
    }

    #[test]
    fn json_with_invalid_values_is_rejected() {
        assert!(SimConfig::from_json_str(r#"{ "time_step": -1.0 }"#).is_err());
        assert!(SimConfig::from_json_str("not json").is_err());
    }

    #[test]
    fn ball_count_and_arena_bounds() {
        assert!(validate_ball_count(MIN_BALL_COUNT).is_ok());
        assert!(validate_ball_count(MAX_BALL_COUNT).is_ok());
        assert!(validate_ball_count(MIN_BALL_COUNT - 1).is_err());
        assert!(validate_ball_count(MAX_BALL_COUNT + 1).is_err());

        assert!(validate_arena(100.0, 100.0, MAX_BALL_RADIUS).is_ok());
        assert!(validate_arena(0.0, 100.0, MAX_BALL_RADIUS).is_err());
        assert!(validate_arena(40.0, 100.0, MAX_BALL_RADIUS).is_err());
        assert!(validate_arena(f32::INFINITY, 100.0, MAX_BALL_RADIUS).is_err());
    }
}
