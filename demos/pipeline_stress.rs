//! Hammers the lifecycle and config paths while the physics thread runs.

use bouncing_balls::*;
use log::{info, warn};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let simulation = Arc::new(
        Simulation::builder()
            .ball_count(config::MAX_BALL_COUNT)
            .config(SimConfig {
                parallel: true,
                ..SimConfig::default()
            })
            .build()?,
    );
    simulation.start()?;

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let simulation = Arc::clone(&simulation);
            thread::spawn(move || {
                let mut frames = 0u64;
                let mut tick = 0;
                while let Some(frame) = simulation.wait_for_frame(tick, Duration::from_millis(250)) {
                    tick = frame.tick();
                    frames += 1;
                }
                frames
            })
        })
        .collect();

    let deadline = Instant::now() + Duration::from_secs(3);
    let mut toggles = 0u32;
    while Instant::now() < deadline {
        simulation.pause();
        simulation.resume();
        toggles += 1;

        let restitution = 0.5 + (toggles % 50) as f32 / 100.0;
        if let Err(err) = simulation.set_config(SimConfig {
            restitution,
            parallel: true,
            ..SimConfig::default()
        }) {
            warn!("config update rejected: {err}");
        }
        thread::sleep(Duration::from_millis(5));
    }

    simulation.stop();
    for (index, reader) in readers.into_iter().enumerate() {
        match reader.join() {
            Ok(frames) => info!("reader {index} saw {frames} frames"),
            Err(_) => warn!("reader {index} panicked"),
        }
    }

    let metrics = simulation.metrics();
    info!(
        "{toggles} pause/resume cycles, {} physics steps, {} overruns",
        metrics.physics_steps, metrics.tick_overruns
    );
    Ok(())
}
