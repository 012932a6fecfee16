use parking_lot::{Mutex, MutexGuard};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{
    collision::{broadphase::SpatialGrid, narrowphase::CircleContact},
    config::SimConfig,
    core::ball::{Ball, BallId},
};

/// Storage cell for one ball. The slot index always equals the ball's id.
pub type BallSlot = Mutex<Ball>;

/// Contact response coefficients for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactSettings {
    pub restitution: f32,
    pub correction_percent: f32,
    pub slop: f32,
}

impl From<&SimConfig> for ContactSettings {
    fn from(config: &SimConfig) -> Self {
        Self {
            restitution: config.restitution,
            correction_percent: config.correction_percent,
            slop: config.slop,
        }
    }
}

/// What happened to one candidate pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairOutcome {
    /// Discs do not overlap.
    Apart,
    /// Overlapping but already separating: positions corrected, velocities untouched.
    Corrected,
    /// Approaching overlap: impulse applied and positions corrected.
    Impulse,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SolverStepMetrics {
    pub pairs_tested: usize,
    pub contacts: usize,
    pub impulses: usize,
}

impl SolverStepMetrics {
    pub fn record(&mut self, outcome: PairOutcome) {
        self.pairs_tested += 1;
        match outcome {
            PairOutcome::Apart => {}
            PairOutcome::Corrected => self.contacts += 1,
            PairOutcome::Impulse => {
                self.contacts += 1;
                self.impulses += 1;
            }
        }
    }

    pub fn merge(&mut self, other: &Self) {
        self.pairs_tested += other.pairs_tested;
        self.contacts += other.contacts;
        self.impulses += other.impulses;
    }
}

/// Impulse-based circle collision resolver with positional correction.
///
/// Every ball tests the broad-phase candidates with a larger id, so each pair
/// is visited once per tick.
#[derive(Debug, Clone, Default)]
pub struct CollisionResolver {
    parallel: bool,
    candidates: Vec<BallId>,
}

impl CollisionResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_parallel(&mut self, enabled: bool) {
        self.parallel = enabled;
    }

    pub fn parallel(&self) -> bool {
        self.parallel
    }

    /// Narrow-phase test and response for a single pair.
    pub fn resolve_pair(a: &mut Ball, b: &mut Ball, settings: &ContactSettings) -> PairOutcome {
        let contact = match CircleContact::between(a, b) {
            Some(contact) => contact,
            None => return PairOutcome::Apart,
        };

        let inv_mass_sum = a.inverse_mass() + b.inverse_mass();
        let mut outcome = PairOutcome::Corrected;

        let velocity_along_normal = contact.velocity_along_normal(a, b);
        if velocity_along_normal < 0.0 {
            let j = -(1.0 + settings.restitution) * velocity_along_normal / inv_mass_sum;
            let impulse = contact.normal * j;
            a.velocity -= impulse * a.inverse_mass();
            b.velocity += impulse * b.inverse_mass();
            outcome = PairOutcome::Impulse;
        }

        Self::correct_position(a, b, &contact, settings, inv_mass_sum);
        outcome
    }

    /// Pushes the pair apart along the normal, split by inverse mass. Removes
    /// `correction_percent` of the depth but never leaves more than `slop`.
    fn correct_position(
        a: &mut Ball,
        b: &mut Ball,
        contact: &CircleContact,
        settings: &ContactSettings,
        inv_mass_sum: f32,
    ) {
        let correction = (contact.depth * settings.correction_percent)
            .max(contact.depth - settings.slop)
            .max(0.0);
        if correction <= 0.0 {
            return;
        }

        let push = contact.normal * (correction / inv_mass_sum);
        a.position -= push * a.inverse_mass();
        b.position += push * b.inverse_mass();
    }

    /// Resolves every overlapping pair found through `grid`.
    pub fn solve(
        &mut self,
        balls: &mut [BallSlot],
        grid: &SpatialGrid,
        settings: &ContactSettings,
    ) -> SolverStepMetrics {
        #[cfg(feature = "parallel")]
        if self.parallel {
            return Self::solve_parallel(balls, grid, settings);
        }

        self.solve_sequential(balls, grid, settings)
    }

    fn solve_sequential(
        &mut self,
        balls: &mut [BallSlot],
        grid: &SpatialGrid,
        settings: &ContactSettings,
    ) -> SolverStepMetrics {
        let mut metrics = SolverStepMetrics::default();

        for index in 0..balls.len() {
            let (id, position) = {
                let ball = balls[index].get_mut();
                (ball.id(), ball.position)
            };

            self.candidates.clear();
            grid.query_neighbors(id, position, &mut self.candidates);

            for other in self.candidates.iter().filter(|other| **other > id) {
                if let Some((a, b)) = pair_mut(balls, index, other.index()) {
                    metrics.record(Self::resolve_pair(a, b, settings));
                }
            }
        }

        metrics
    }

    #[cfg(feature = "parallel")]
    fn solve_parallel(
        balls: &[BallSlot],
        grid: &SpatialGrid,
        settings: &ContactSettings,
    ) -> SolverStepMetrics {
        (0..balls.len())
            .into_par_iter()
            .map_init(Vec::new, |candidates, index| {
                let (id, position) = {
                    let ball = balls[index].lock();
                    (ball.id(), ball.position)
                };

                candidates.clear();
                grid.query_neighbors(id, position, candidates);

                let mut metrics = SolverStepMetrics::default();
                for other in candidates.iter().filter(|other| **other > id) {
                    if other.index() >= balls.len() {
                        continue;
                    }
                    let (mut a, mut b) = lock_pair(balls, index, other.index());
                    metrics.record(Self::resolve_pair(&mut a, &mut b, settings));
                }
                metrics
            })
            .reduce(SolverStepMetrics::default, |mut acc, metrics| {
                acc.merge(&metrics);
                acc
            })
    }
}

/// Locks two distinct slots, always acquiring the lower id first so that
/// concurrent workers agree on a global order. Guards are returned in
/// `(a, b)` order.
#[cfg_attr(not(feature = "parallel"), allow(dead_code))]
fn lock_pair(
    slots: &[BallSlot],
    a: usize,
    b: usize,
) -> (MutexGuard<'_, Ball>, MutexGuard<'_, Ball>) {
    debug_assert_ne!(a, b, "a ball cannot collide with itself");
    if a < b {
        let first = slots[a].lock();
        let second = slots[b].lock();
        (first, second)
    } else {
        let first = slots[b].lock();
        let second = slots[a].lock();
        (second, first)
    }
}

/// Disjoint mutable access to two slots without locking.
fn pair_mut(slots: &mut [BallSlot], a: usize, b: usize) -> Option<(&mut Ball, &mut Ball)> {
    if a == b || a >= slots.len() || b >= slots.len() {
        return None;
    }

    let (low, high, flipped) = if a < b { (a, b, false) } else { (b, a, true) };
    let (left, right) = slots.split_at_mut(high);
    let first = left[low].get_mut();
    let second = right[0].get_mut();

    if flipped {
        Some((second, first))
    } else {
        Some((first, second))
    }
}
