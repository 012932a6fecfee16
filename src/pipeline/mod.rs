//! Concurrent physics/display handoff.

pub mod frame;
pub mod metrics;
pub mod simulation;
pub mod timing;

pub use frame::{FrameExchange, Snapshot};
pub use metrics::{MetricsSnapshot, SimulationMetrics};
pub use simulation::{RunState, Simulation, SimulationBuilder};
pub use timing::{FixedRate, FrameTiming};
