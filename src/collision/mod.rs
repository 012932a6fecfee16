//! Collision detection: uniform-grid broad-phase and circle narrow-phase.

pub mod broadphase;
pub mod narrowphase;

pub use broadphase::SpatialGrid;
pub use narrowphase::CircleContact;
