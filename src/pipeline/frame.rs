//! Double-buffered snapshot handoff between the physics thread and readers.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use serde::Serialize;

use crate::core::{ball::Ball, types::Bounds};

/// Complete ball state at one tick boundary. Never mutated once published.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    tick: u64,
    sim_time: f64,
    bounds: Bounds,
    balls: Vec<Ball>,
}

impl Snapshot {
    pub fn new(tick: u64, sim_time: f64, bounds: Bounds, balls: Vec<Ball>) -> Self {
        Self {
            tick,
            sim_time,
            bounds,
            balls,
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn len(&self) -> usize {
        self.balls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balls.is_empty()
    }

    fn into_balls(self) -> Vec<Ball> {
        self.balls
    }
}

/// Holds the current frame behind a pointer swap. The writer fills its next
/// buffer without any lock, then swaps it in; the lock only guards the `Arc`
/// exchange, so readers block for at most a pointer copy.
#[derive(Debug)]
pub struct FrameExchange {
    current: Mutex<Arc<Snapshot>>,
    published: Condvar,
}

impl FrameExchange {
    pub fn new(initial: Snapshot) -> Self {
        Self {
            current: Mutex::new(Arc::new(initial)),
            published: Condvar::new(),
        }
    }

    pub fn latest(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current.lock())
    }

    /// Publishes `snapshot` and wakes waiting readers. Returns the previous
    /// frame's ball buffer when no reader still holds it, for reuse as the
    /// next write buffer.
    pub fn publish(&self, snapshot: Snapshot) -> Option<Vec<Ball>> {
        let previous = {
            let mut current = self.current.lock();
            let previous = std::mem::replace(&mut *current, Arc::new(snapshot));
            self.published.notify_all();
            previous
        };
        Arc::try_unwrap(previous).ok().map(Snapshot::into_balls)
    }

    /// Waits up to `timeout` for a frame newer than `after_tick`.
    pub fn wait_newer(&self, after_tick: u64, timeout: Duration) -> Option<Arc<Snapshot>> {
        let deadline = Instant::now() + timeout;
        let mut current = self.current.lock();
        while current.tick() <= after_tick {
            if self
                .published
                .wait_until(&mut current, deadline)
                .timed_out()
            {
                break;
            }
        }
        (current.tick() > after_tick).then(|| Arc::clone(&current))
    }
}
