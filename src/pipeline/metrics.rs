//! Lock-free run counters shared between the physics thread and readers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;

use crate::world::TickReport;

#[derive(Debug, Default)]
pub struct SimulationMetrics {
    physics_steps: AtomicU64,
    pairs_tested: AtomicU64,
    contacts: AtomicU64,
    impulses: AtomicU64,
    wall_contacts: AtomicU64,
    corrupted_ticks: AtomicU64,
    tick_overruns: AtomicU64,
    frames_presented: AtomicU64,
    frames_dropped: AtomicU64,
    last_tick_nanos: AtomicU64,
}

/// Point-in-time copy of [`SimulationMetrics`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub physics_steps: u64,
    pub pairs_tested: u64,
    pub contacts: u64,
    pub impulses: u64,
    pub wall_contacts: u64,
    pub corrupted_ticks: u64,
    pub tick_overruns: u64,
    pub frames_presented: u64,
    pub frames_dropped: u64,
    pub last_tick: Duration,
    /// Achieved physics ticks per second over the recent window.
    pub physics_rate: f64,
}

impl SimulationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_tick(&self, report: &TickReport, duration: Duration) {
        self.physics_steps.fetch_add(1, Ordering::Relaxed);
        self.pairs_tested
            .fetch_add(report.solver.pairs_tested as u64, Ordering::Relaxed);
        self.contacts
            .fetch_add(report.solver.contacts as u64, Ordering::Relaxed);
        self.impulses
            .fetch_add(report.solver.impulses as u64, Ordering::Relaxed);
        self.wall_contacts
            .fetch_add(report.wall_contacts as u64, Ordering::Relaxed);
        if report.corrupted_balls > 0 {
            self.corrupted_ticks.fetch_add(1, Ordering::Relaxed);
        }
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.last_tick_nanos.store(nanos, Ordering::Relaxed);
    }

    pub fn record_overrun(&self) {
        self.tick_overruns.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_frame(&self) {
        self.frames_presented.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped_frame(&self) {
        self.frames_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, physics_rate: f64) -> MetricsSnapshot {
        MetricsSnapshot {
            physics_steps: self.physics_steps.load(Ordering::Relaxed),
            pairs_tested: self.pairs_tested.load(Ordering::Relaxed),
            contacts: self.contacts.load(Ordering::Relaxed),
            impulses: self.impulses.load(Ordering::Relaxed),
            wall_contacts: self.wall_contacts.load(Ordering::Relaxed),
            corrupted_ticks: self.corrupted_ticks.load(Ordering::Relaxed),
            tick_overruns: self.tick_overruns.load(Ordering::Relaxed),
            frames_presented: self.frames_presented.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
            last_tick: Duration::from_nanos(self.last_tick_nanos.load(Ordering::Relaxed)),
            physics_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::solver::SolverStepMetrics;

    #[test]
    fn tick_reports_accumulate() {
        let metrics = SimulationMetrics::new();
        let report = TickReport {
            tick: 1,
            wall_contacts: 2,
            solver: SolverStepMetrics {
                pairs_tested: 5,
                contacts: 3,
                impulses: 1,
            },
            corrupted_balls: 1,
        };
        metrics.record_tick(&report, Duration::from_micros(150));
        metrics.record_tick(&TickReport::default(), Duration::from_micros(90));
        metrics.record_frame();
        metrics.record_frame();
        metrics.record_dropped_frame();

        let snapshot = metrics.snapshot(240.0);
        assert_eq!(snapshot.physics_steps, 2);
        assert_eq!(snapshot.pairs_tested, 5);
        assert_eq!(snapshot.contacts, 3);
        assert_eq!(snapshot.wall_contacts, 2);
        assert_eq!(snapshot.corrupted_ticks, 1);
        assert_eq!(snapshot.frames_presented, 2);
        assert_eq!(snapshot.frames_dropped, 1);
        assert_eq!(snapshot.last_tick, Duration::from_micros(90));
    }
}
