use std::time::{Duration, Instant};

/// Phase timings of the most recent physics tick.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct TickProfiler {
    pub integrate_time: Duration,
    pub grid_time: Duration,
    pub resolve_time: Duration,
    pub guard_time: Duration,
    pub total_time: Duration,

    pub ball_count: usize,
    pub wall_contacts: usize,
    pub ball_contacts: usize,
}

impl TickProfiler {
    pub fn report(&self) {
        let total_us = self.total_time.as_micros() as f32;
        if total_us < 1.0 {
            return;
        }

        let share = |phase: Duration| (phase.as_micros() as f32 / total_us) * 100.0;
        log::debug!(
            "tick {:.3} ms | balls {} walls {} contacts {} | integrate {:.1}% grid {:.1}% resolve {:.1}% guard {:.1}%",
            self.total_time.as_secs_f32() * 1000.0,
            self.ball_count,
            self.wall_contacts,
            self.ball_contacts,
            share(self.integrate_time),
            share(self.grid_time),
            share(self.resolve_time),
            share(self.guard_time),
        );
    }
}

/// Adds the elapsed time of its scope to `output` when dropped.
pub struct PhaseTimer<'a> {
    start: Instant,
    output: &'a mut Duration,
}

impl<'a> PhaseTimer<'a> {
    pub fn new(output: &'a mut Duration) -> Self {
        Self {
            start: Instant::now(),
            output,
        }
    }
}

impl Drop for PhaseTimer<'_> {
    fn drop(&mut self) {
        *self.output += self.start.elapsed();
    }
}
