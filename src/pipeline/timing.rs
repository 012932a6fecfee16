//! Frame-rate bookkeeping and fixed-rate pacing.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Rolling window of frame intervals used to report an achieved rate.
#[derive(Debug, Clone)]
pub struct FrameTiming {
    intervals: VecDeque<Duration>,
    capacity: usize,
    total: Duration,
    last_frame: Option<Instant>,
}

impl FrameTiming {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            intervals: VecDeque::with_capacity(capacity),
            capacity,
            total: Duration::ZERO,
            last_frame: None,
        }
    }

    /// Marks a frame at `now`; returns the interval since the previous one.
    pub fn record_frame(&mut self, now: Instant) -> Option<Duration> {
        let interval = self
            .last_frame
            .map(|last| now.saturating_duration_since(last));
        self.last_frame = Some(now);
        if let Some(interval) = interval {
            self.record_interval(interval);
        }
        interval
    }

    pub fn record_interval(&mut self, interval: Duration) {
        if self.intervals.len() == self.capacity {
            if let Some(oldest) = self.intervals.pop_front() {
                self.total -= oldest;
            }
        }
        self.intervals.push_back(interval);
        self.total += interval;
    }

    pub fn average_interval(&self) -> Option<Duration> {
        if self.intervals.is_empty() {
            return None;
        }
        Some(self.total / self.intervals.len() as u32)
    }

    /// Frames per second over the window; 0 until two frames were seen.
    pub fn rate(&self) -> f64 {
        let secs = self.total.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        self.intervals.len() as f64 / secs
    }

    pub fn samples(&self) -> usize {
        self.intervals.len()
    }

    pub fn reset(&mut self) {
        self.intervals.clear();
        self.total = Duration::ZERO;
        self.last_frame = None;
    }
}

/// Sleep-until-next-deadline pacing for a fixed-rate loop.
#[derive(Debug, Clone)]
pub struct FixedRate {
    period: Duration,
    next: Instant,
}

impl FixedRate {
    pub fn new(period: Duration) -> Self {
        let period = period.max(Duration::from_micros(1));
        Self {
            period,
            next: Instant::now() + period,
        }
    }

    pub fn from_hz(hz: f64) -> Self {
        let hz = if hz.is_finite() && hz > 0.0 { hz } else { 1.0 };
        Self::new(Duration::from_secs_f64(1.0 / hz))
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn set_period(&mut self, period: Duration) {
        self.period = period.max(Duration::from_micros(1));
    }

    pub fn next_deadline(&self) -> Instant {
        self.next
    }

    /// Schedules the next deadline one period after `now`.
    pub fn reset(&mut self, now: Instant) {
        self.next = now + self.period;
    }

    /// Moves the deadline forward by one period. When the loop has fallen more
    /// than a full period behind, it resynchronises to `now` instead of trying
    /// to catch up, and returns true.
    pub fn advance(&mut self, now: Instant) -> bool {
        self.next += self.period;
        if self.next + self.period < now {
            self.next = now + self.period;
            return true;
        }
        false
    }

    /// Blocks until the current deadline, then advances. Returns true on overrun.
    pub fn wait(&mut self) -> bool {
        let now = Instant::now();
        if self.next > now {
            std::thread::sleep(self.next - now);
        }
        self.advance(Instant::now())
    }
}
