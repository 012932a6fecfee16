use std::time::{Duration, Instant};

use log::{info, warn};

use super::{GraphicsContext, Presenter};
use crate::{
    config::{DEFAULT_DISPLAY_RATE, FRAME_DROP_FACTOR},
    error::Result,
    pipeline::{timing::FixedRate, RunState, Simulation},
};

/// Totals for one display loop run.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct DisplayStats {
    pub frames: u64,
    pub dropped: u64,
    /// Tick of the last frame handed to the presenter.
    pub last_tick: u64,
    pub elapsed: Duration,
}

/// Fixed-rate display loop that runs on the caller's thread. Each iteration
/// takes the latest complete frame, renders it and sleeps until the next
/// deadline. Frames slower than 1.5x the target period count as dropped.
#[derive(Debug, Clone)]
pub struct DisplayLoop {
    rate_hz: f64,
    frame_limit: Option<u64>,
    time_limit: Option<Duration>,
}

impl Default for DisplayLoop {
    fn default() -> Self {
        Self::new(DEFAULT_DISPLAY_RATE)
    }
}

impl DisplayLoop {
    pub fn new(rate_hz: f64) -> Self {
        let rate_hz = if rate_hz.is_finite() && rate_hz > 0.0 {
            rate_hz
        } else {
            DEFAULT_DISPLAY_RATE
        };
        Self {
            rate_hz,
            frame_limit: None,
            time_limit: None,
        }
    }

    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frame_limit = Some(frames);
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub fn rate_hz(&self) -> f64 {
        self.rate_hz
    }

    pub fn target_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.rate_hz)
    }

    /// Presents frames until the presenter asks to close, a limit is reached,
    /// or the physics thread halts on a fatal error.
    pub fn run<P: Presenter + ?Sized>(
        &self,
        simulation: &Simulation,
        context: &GraphicsContext,
        presenter: &mut P,
    ) -> Result<DisplayStats> {
        presenter.attach(context)?;
        info!(
            "display loop started: {} at {} fps",
            presenter.name(),
            self.rate_hz
        );

        let target = self.target_period();
        let drop_threshold = target.mul_f64(FRAME_DROP_FACTOR);
        let mut pacer = FixedRate::new(target);
        let started = Instant::now();
        let mut stats = DisplayStats::default();

        loop {
            if presenter.should_close() {
                break;
            }
            if self.frame_limit.is_some_and(|limit| stats.frames >= limit) {
                break;
            }
            if self.time_limit.is_some_and(|limit| started.elapsed() >= limit) {
                break;
            }
            if simulation.state() == RunState::Stopped {
                if let Some(err) = simulation.last_error() {
                    warn!("display loop stopping: physics halted ({err})");
                    break;
                }
            }

            let frame = simulation.snapshot();
            presenter.render(&frame, simulation.current_fps())?;
            stats.frames += 1;
            stats.last_tick = frame.tick();

            if let Some(interval) = simulation.record_frame(Instant::now()) {
                if interval > drop_threshold {
                    simulation.record_dropped_frame();
                    stats.dropped += 1;
                    warn!(
                        "dropped display frame: {:.2} ms (target {:.2} ms)",
                        interval.as_secs_f64() * 1000.0,
                        target.as_secs_f64() * 1000.0
                    );
                }
            }

            pacer.wait();
        }

        stats.elapsed = started.elapsed();
        info!(
            "display loop finished: {} frames, {} dropped",
            stats.frames, stats.dropped
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Bounds;
    use crate::present::NoopPresenter;

    #[test]
    fn invalid_rate_falls_back_to_default() {
        assert_eq!(DisplayLoop::new(0.0).rate_hz(), DEFAULT_DISPLAY_RATE);
        assert_eq!(DisplayLoop::new(f64::NAN).rate_hz(), DEFAULT_DISPLAY_RATE);
    }

    #[test]
    fn stops_when_presenter_closes() {
        let simulation = Simulation::builder()
            .arena(400.0, 400.0)
            .ball_count(5)
            .seed(3)
            .build()
            .expect("valid simulation");
        let context = GraphicsContext::new("test", Bounds::new(400.0, 400.0));
        let mut presenter = NoopPresenter::with_frame_limit(4);

        let stats = DisplayLoop::new(500.0)
            .run(&simulation, &context, &mut presenter)
            .expect("display loop");
        assert_eq!(stats.frames, 4);
        assert_eq!(presenter.frames(), 4);
        assert_eq!(simulation.metrics().frames_presented, 4);
    }
}
