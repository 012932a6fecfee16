//! The authoritative ball set and the single-tick physics pipeline.

pub mod guard;
pub mod spawn;

use std::time::Instant;

use log::warn;
use parking_lot::Mutex;

use crate::{
    collision::broadphase::SpatialGrid,
    config::{validate_arena, SimConfig, SimConstants},
    core::{
        ball::{Ball, BallId},
        types::Bounds,
    },
    dynamics::{
        integrator::BodyIntegrator,
        solver::{BallSlot, CollisionResolver, ContactSettings, SolverStepMetrics},
    },
    error::{Result, SimError},
    utils::profiling::{PhaseTimer, TickProfiler},
};

use guard::CorruptionGuard;
pub use spawn::{place_balls, PlacementReport, SpawnConfig};

/// Summary of one completed tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub tick: u64,
    pub wall_contacts: usize,
    pub solver: SolverStepMetrics,
    pub corrupted_balls: usize,
}

/// Owns the balls of one run in fixed slots (slot index == ball id) together
/// with the grid, integrator and resolver that advance them.
pub struct BallWorld {
    balls: Vec<BallSlot>,
    bounds: Bounds,
    config: SimConfig,
    grid: SpatialGrid,
    integrator: BodyIntegrator,
    resolver: CollisionResolver,
    guard: CorruptionGuard,
    tick: u64,
    sim_time: f64,
    profiler: TickProfiler,
}

impl BallWorld {
    /// Takes ownership of `balls`, renumbering their ids to match slot order.
    pub fn new(bounds: Bounds, config: SimConfig, mut balls: Vec<Ball>) -> Result<Self> {
        config.validate()?;

        let max_radius = balls.iter().map(Ball::radius).fold(0.0, f32::max);
        validate_arena(bounds.width, bounds.height, max_radius)?;

        for (index, ball) in balls.iter_mut().enumerate() {
            if !ball.has_valid_shape() {
                return Err(SimError::parameter(
                    "radius",
                    ball.radius(),
                    "ball radius and mass must be positive and finite",
                ));
            }
            if !ball.is_finite() {
                return Err(SimError::parameter(
                    "position",
                    f32::NAN,
                    "ball state must be finite",
                ));
            }
            if !bounds.contains_disc(ball.position, ball.radius(), 0.0) {
                warn!("ball {index} starts outside the arena; clamping");
                BodyIntegrator::confine(ball, &bounds);
            }
            ball.reassign_id(index as u32);
        }

        let guard = CorruptionGuard::new(&balls);
        let cell_size = (2.0 * max_radius).max(1.0);
        let mut integrator = BodyIntegrator::new();
        let mut resolver = CollisionResolver::new();
        integrator.set_parallel(config.parallel);
        resolver.set_parallel(config.parallel);

        Ok(Self {
            balls: balls.into_iter().map(Mutex::new).collect(),
            bounds,
            config,
            grid: SpatialGrid::new(bounds, cell_size),
            integrator,
            resolver,
            guard,
            tick: 0,
            sim_time: 0.0,
            profiler: TickProfiler::default(),
        })
    }

    /// Builds a world populated by randomized placement.
    pub fn spawn(
        bounds: Bounds,
        config: SimConfig,
        spawn: &SpawnConfig,
    ) -> Result<(Self, PlacementReport)> {
        config.validate()?;
        let (balls, report) = place_balls(bounds, spawn)?;
        Ok((Self::new(bounds, config, balls)?, report))
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Validates and applies new settings; on error the current settings stay.
    pub fn set_config(&mut self, config: SimConfig) -> Result<()> {
        config.validate()?;
        self.integrator.set_parallel(config.parallel);
        self.resolver.set_parallel(config.parallel);
        self.config = config;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.balls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balls.is_empty()
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    pub fn profiler(&self) -> &TickProfiler {
        &self.profiler
    }

    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    pub fn corrupted_ticks(&self) -> u64 {
        self.guard.corrupted_ticks()
    }

    pub fn ball(&self, id: BallId) -> Option<Ball> {
        self.balls.get(id.index()).map(|slot| *slot.lock())
    }

    pub fn ball_mut(&mut self, id: BallId) -> Option<&mut Ball> {
        self.balls.get_mut(id.index()).map(Mutex::get_mut)
    }

    /// Copies every ball, in id order.
    pub fn balls(&self) -> Vec<Ball> {
        let mut out = Vec::with_capacity(self.balls.len());
        self.copy_balls_into(&mut out);
        out
    }

    /// Replaces `out`'s contents with a copy of every ball, reusing its allocation.
    pub fn copy_balls_into(&self, out: &mut Vec<Ball>) {
        out.clear();
        out.extend(self.balls.iter().map(|slot| *slot.lock()));
    }

    /// Advances one fixed step: integrate all balls, rebuild the grid, resolve
    /// contacts, then roll back any ball whose state went non-finite.
    ///
    /// Fails only when corruption persisted for too many consecutive ticks;
    /// the world is still consistent (all balls finite) after an error.
    pub fn step(&mut self) -> Result<TickReport> {
        let constants = SimConstants::new(&self.config, self.bounds);
        let settings = ContactSettings::from(&self.config);
        let started = Instant::now();

        let mut profile = TickProfiler {
            ball_count: self.balls.len(),
            ..TickProfiler::default()
        };

        {
            let _timer = PhaseTimer::new(&mut profile.integrate_time);
            profile.wall_contacts = self.integrator.step(&mut self.balls, &constants);
        }

        let mut solver = SolverStepMetrics::default();
        if self.config.enable_collisions {
            {
                let _timer = PhaseTimer::new(&mut profile.grid_time);
                self.grid.rebuild(self.balls.iter_mut().map(|slot| {
                    let ball = slot.get_mut();
                    (ball.id(), ball.position)
                }));
            }
            {
                let _timer = PhaseTimer::new(&mut profile.resolve_time);
                solver = self.resolver.solve(&mut self.balls, &self.grid, &settings);
                self.integrator.confine_all(&mut self.balls, &self.bounds);
            }
        }
        profile.ball_contacts = solver.contacts;

        let corrupted = {
            let _timer = PhaseTimer::new(&mut profile.guard_time);
            let restored = self.guard.restore_corrupted(&mut self.balls);
            self.guard.commit(&mut self.balls);
            restored
        };

        self.tick += 1;
        self.sim_time += f64::from(constants.dt);
        profile.total_time = started.elapsed();
        self.profiler = profile;

        self.guard.record(self.tick, corrupted)?;

        Ok(TickReport {
            tick: self.tick,
            wall_contacts: profile.wall_contacts,
            solver,
            corrupted_balls: corrupted,
        })
    }
}
