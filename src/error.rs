//! Error types for the simulation.
//!
//! This module provides a unified error type [`SimError`] and a convenient [`Result`] alias.

use std::fmt;

/// Broad category of a [`SimError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected input at construction or config-update time.
    Configuration,
    /// NaN/Inf state that kept reappearing across ticks.
    NumericCorruption,
    /// Failure of the host environment (threads, parsing).
    Runtime,
}

/// Main error type for the simulation.
#[derive(Debug)]
pub enum SimError {
    /// Requested ball count is outside the supported range.
    InvalidBallCount {
        requested: usize,
        min: usize,
        max: usize,
    },
    /// Arena dimensions are non-positive, non-finite, or too small for a ball.
    InvalidArena { width: f32, height: f32 },
    /// A physics parameter is out of range.
    InvalidParameter {
        name: &'static str,
        value: f32,
        reason: &'static str,
    },
    /// Too many consecutive ticks produced non-finite state.
    NumericCorruption {
        tick: u64,
        consecutive: u32,
        balls: usize,
    },
    /// The physics thread could not be spawned.
    ThreadSpawn(std::io::Error),
    /// A JSON configuration document could not be parsed.
    ConfigParse(serde_json::Error),
    /// The presentation collaborator failed to draw a frame.
    Presentation(String),
}

impl SimError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidBallCount { .. }
            | Self::InvalidArena { .. }
            | Self::InvalidParameter { .. }
            | Self::ConfigParse(_) => ErrorKind::Configuration,
            Self::NumericCorruption { .. } => ErrorKind::NumericCorruption,
            Self::ThreadSpawn(_) | Self::Presentation(_) => ErrorKind::Runtime,
        }
    }

    pub fn is_configuration(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }

    pub(crate) fn parameter(name: &'static str, value: f32, reason: &'static str) -> Self {
        Self::InvalidParameter {
            name,
            value,
            reason,
        }
    }
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidBallCount {
                requested,
                min,
                max,
            } => write!(
                f,
                "Invalid ball count: {requested} (expected {min}..={max})"
            ),
            Self::InvalidArena { width, height } => {
                write!(f, "Invalid arena dimensions: {width} x {height}")
            }
            Self::InvalidParameter {
                name,
                value,
                reason,
            } => write!(f, "Invalid {name} = {value}: {reason}"),
            Self::NumericCorruption {
                tick,
                consecutive,
                balls,
            } => write!(
                f,
                "Numeric corruption at tick {tick}: {balls} ball(s) non-finite for {consecutive} consecutive ticks"
            ),
            Self::ThreadSpawn(err) => write!(f, "Failed to spawn physics thread: {err}"),
            Self::ConfigParse(err) => write!(f, "Config parse error: {err}"),
            Self::Presentation(msg) => write!(f, "Presentation error: {msg}"),
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ThreadSpawn(err) => Some(err),
            Self::ConfigParse(err) => Some(err),
            _ => None,
        }
    }
}

/// Convenient Result type alias for simulation operations.
pub type Result<T> = std::result::Result<T, SimError>;

impl From<serde_json::Error> for SimError {
    fn from(err: serde_json::Error) -> Self {
        Self::ConfigParse(err)
    }
}
