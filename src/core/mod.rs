//! Core types describing balls, colors, and the arena.

pub mod ball;
pub mod types;

pub use ball::{Ball, BallId};
pub use types::{Bounds, Color, Vec2};
