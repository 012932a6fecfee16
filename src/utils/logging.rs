use log::{log_enabled, trace, warn, Level};
use std::time::{Duration, Instant};

/// Scoped timer that traces how long a labelled section took.
pub struct ScopedTimer<'a> {
    label: &'a str,
    start: Instant,
}

impl<'a> ScopedTimer<'a> {
    pub fn new(label: &'a str) -> Self {
        if log_enabled!(Level::Trace) {
            trace!("start {label}");
        }
        Self {
            label,
            start: Instant::now(),
        }
    }
}

impl Drop for ScopedTimer<'_> {
    fn drop(&mut self) {
        if log_enabled!(Level::Trace) {
            trace!(
                "end {} ({} µs)",
                self.label,
                self.start.elapsed().as_micros()
            );
        }
    }
}

/// Warns when a tick or frame took longer than its budget. Returns true on overrun.
pub fn warn_if_budget_exceeded(what: &str, duration: Duration, budget: Duration) -> bool {
    if duration <= budget {
        return false;
    }
    warn!(
        "{what} exceeded budget: {:.2} ms > {:.2} ms",
        duration.as_secs_f64() * 1000.0,
        budget.as_secs_f64() * 1000.0
    );
    true
}
