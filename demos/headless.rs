//! Runs the simulation with a presenter that logs instead of drawing.
//!
//! `RUST_LOG=info cargo run --example headless -- 80`

use bouncing_balls::*;
use log::info;
use std::time::Duration;

/// Logs a one-line summary of every 60th frame.
struct LogPresenter {
    frames: u64,
}

impl Presenter for LogPresenter {
    fn name(&self) -> &str {
        "log"
    }

    fn attach(&mut self, context: &GraphicsContext) -> Result<()> {
        let viewport = context.viewport();
        info!(
            "presenting '{}' at {}x{}",
            context.title(),
            viewport.width,
            viewport.height
        );
        Ok(())
    }

    fn render(&mut self, frame: &Snapshot, fps: f64) -> Result<()> {
        self.frames += 1;
        if self.frames % 60 == 0 {
            let energy = utils::math::total_kinetic_energy(frame.balls());
            info!(
                "tick {:>6} | t {:>6.2}s | {} balls | KE {:>10.1} | {:.1} fps",
                frame.tick(),
                frame.sim_time(),
                frame.len(),
                energy,
                fps
            );
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let count = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(config::DEFAULT_BALL_COUNT);

    let simulation = Simulation::new(count, config::DEFAULT_ARENA_WIDTH, config::DEFAULT_ARENA_HEIGHT)?;
    simulation.start()?;

    let context = GraphicsContext::new("bouncing balls", simulation.bounds());
    let mut presenter = LogPresenter { frames: 0 };
    let stats = DisplayLoop::default()
        .with_time_limit(Duration::from_secs(5))
        .run(&simulation, &context, &mut presenter)?;

    simulation.stop();
    let metrics = simulation.metrics();
    info!(
        "{} frames ({} dropped), {} physics steps, {} contacts, {:.1} Hz physics",
        stats.frames, stats.dropped, metrics.physics_steps, metrics.contacts, metrics.physics_rate
    );
    Ok(())
}
