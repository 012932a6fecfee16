//! Simulation dynamics: per-ball integration and pairwise collision response.

pub mod integrator;
pub mod solver;

pub use integrator::BodyIntegrator;
pub use solver::{BallSlot, CollisionResolver, ContactSettings, PairOutcome, SolverStepMetrics};
