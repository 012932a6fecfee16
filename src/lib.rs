//! Bouncing Balls – concurrent 2D ball physics for Rust.
//!
//! Circular bodies bounce inside a rectangular arena under gravity. A
//! background thread advances the world at a fixed physics rate (uniform grid
//! broad-phase, impulse response with positional correction, wall
//! reflection) and publishes complete frames that a display loop samples at
//! its own rate.
//!
//! ```no_run
//! use bouncing_balls::{DisplayLoop, GraphicsContext, NoopPresenter, Simulation};
//!
//! # fn main() -> bouncing_balls::Result<()> {
//! let simulation = Simulation::new(50, 1400.0, 900.0)?;
//! simulation.start()?;
//!
//! let context = GraphicsContext::new("balls", simulation.bounds());
//! let mut presenter = NoopPresenter::with_frame_limit(120);
//! DisplayLoop::default().run(&simulation, &context, &mut presenter)?;
//!
//! simulation.stop();
//! # Ok(())
//! # }
//! ```

pub mod collision;
pub mod config;
pub mod core;
pub mod dynamics;
pub mod error;
pub mod pipeline;
pub mod present;
pub mod utils;
pub mod world;

pub use glam::Vec2;

pub use collision::{broadphase::SpatialGrid, narrowphase::CircleContact};
pub use config::{SimConfig, SimConstants};
pub use crate::core::{
    ball::{Ball, BallId},
    types::{Bounds, Color},
};
pub use dynamics::{
    integrator::BodyIntegrator,
    solver::{CollisionResolver, ContactSettings, PairOutcome},
};
pub use error::{ErrorKind, Result, SimError};
pub use pipeline::{MetricsSnapshot, RunState, Simulation, SimulationBuilder, Snapshot};
pub use present::{DisplayLoop, DisplayStats, GraphicsContext, NoopPresenter, Presenter};
pub use world::{BallWorld, PlacementReport, SpawnConfig, TickReport};
