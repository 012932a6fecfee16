//! Containment of NaN/Inf state produced by a tick.

use log::{error, warn};

use crate::{
    config::MAX_CONSECUTIVE_CORRUPT_TICKS,
    core::ball::Ball,
    dynamics::solver::BallSlot,
    error::{Result, SimError},
};

/// Remembers the last finite state of every ball and rolls corrupted balls
/// back to it after a tick.
#[derive(Debug, Clone)]
pub struct CorruptionGuard {
    last_good: Vec<Ball>,
    consecutive: u32,
    limit: u32,
    corrupted_ticks: u64,
}

impl CorruptionGuard {
    pub fn new(initial: &[Ball]) -> Self {
        Self {
            last_good: initial.to_vec(),
            consecutive: 0,
            limit: MAX_CONSECUTIVE_CORRUPT_TICKS,
            corrupted_ticks: 0,
        }
    }

    pub fn consecutive(&self) -> u32 {
        self.consecutive
    }

    pub fn corrupted_ticks(&self) -> u64 {
        self.corrupted_ticks
    }

    /// Records the state of every finite ball as the rollback target.
    pub fn commit(&mut self, balls: &mut [BallSlot]) {
        for (slot, good) in balls.iter_mut().zip(self.last_good.iter_mut()) {
            let ball = slot.get_mut();
            if ball.is_finite() {
                *good = *ball;
            }
        }
    }

    /// Restores every non-finite ball to its last finite state. Returns how many were restored.
    pub fn restore_corrupted(&self, balls: &mut [BallSlot]) -> usize {
        let mut restored = 0;
        for (slot, good) in balls.iter_mut().zip(self.last_good.iter()) {
            let ball = slot.get_mut();
            if !ball.is_finite() {
                *ball = *good;
                restored += 1;
            }
        }
        restored
    }

    /// Updates the consecutive-corruption streak; fails once it reaches the limit.
    pub fn record(&mut self, tick: u64, corrupted: usize) -> Result<()> {
        if corrupted == 0 {
            self.consecutive = 0;
            return Ok(());
        }

        self.consecutive += 1;
        self.corrupted_ticks += 1;
        warn!(
            "tick {tick}: rolled back {corrupted} non-finite ball(s) ({}/{} consecutive)",
            self.consecutive, self.limit
        );

        if self.consecutive >= self.limit {
            error!("tick {tick}: numeric corruption persisted, halting");
            return Err(SimError::NumericCorruption {
                tick,
                consecutive: self.consecutive,
                balls: corrupted,
            });
        }
        Ok(())
    }
}
