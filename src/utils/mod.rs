//! Utility helpers: logging, tick profiling, and aggregate math.

pub mod logging;
pub mod math;
pub mod profiling;

pub use logging::ScopedTimer;
pub use math::{min_separation, total_kinetic_energy, total_momentum};
pub use profiling::{PhaseTimer, TickProfiler};
