//! Fixed-rate physics scheduler: owns the world, runs it on a background
//! thread and hands complete frames to the display side.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use log::{debug, error, info, warn};
use parking_lot::Mutex;

use super::{
    frame::{FrameExchange, Snapshot},
    metrics::{MetricsSnapshot, SimulationMetrics},
    timing::{FixedRate, FrameTiming},
};
use crate::{
    config::{
        SimConfig, DEFAULT_ARENA_HEIGHT, DEFAULT_ARENA_WIDTH, FPS_WINDOW, MAX_BALL_COUNT,
        PAUSE_POLL_MS, PROFILE_REPORT_TICKS,
    },
    core::{ball::Ball, types::Bounds},
    error::{Result, SimError},
    utils::logging::warn_if_budget_exceeded,
    world::{BallWorld, PlacementReport, SpawnConfig, TickReport},
};

/// Externally visible lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RunState {
    Stopped = 0,
    Running = 1,
    Paused = 2,
}

impl RunState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => RunState::Running,
            2 => RunState::Paused,
            _ => RunState::Stopped,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Pause,
    Resume,
    Shutdown,
}

/// State shared with the physics thread.
struct Shared {
    world: Mutex<BallWorld>,
    frames: FrameExchange,
    state: AtomicU8,
    display_timing: Mutex<FrameTiming>,
    physics_timing: Mutex<FrameTiming>,
    metrics: SimulationMetrics,
    fatal: Mutex<Option<Arc<SimError>>>,
}

impl Shared {
    fn state(&self) -> RunState {
        RunState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: RunState) {
        self.state.store(state as u8, Ordering::Release);
    }

    fn transition(&self, from: RunState, to: RunState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Runs one tick under the world lock and publishes the resulting frame.
    /// The frame is published even when the tick fails: the world has already
    /// rolled corrupted balls back, so its state is finite.
    fn tick(&self, buffer: &mut Vec<Ball>) -> (Result<TickReport>, Duration) {
        let started = Instant::now();
        let (outcome, snapshot, elapsed) = {
            let mut world = self.world.lock();
            let outcome = world.step();
            let mut balls = std::mem::take(buffer);
            world.copy_balls_into(&mut balls);
            if world.tick() % PROFILE_REPORT_TICKS == 0 {
                world.profiler().report();
            }
            let snapshot = Snapshot::new(world.tick(), world.sim_time(), world.bounds(), balls);
            (outcome, snapshot, started.elapsed())
        };

        if let Some(recycled) = self.frames.publish(snapshot) {
            *buffer = recycled;
        }
        if let Ok(report) = &outcome {
            self.metrics.record_tick(report, elapsed);
            self.physics_timing.lock().record_frame(started);
        }
        (outcome, elapsed)
    }

    fn tick_period(&self) -> Duration {
        tick_period(self.world.lock().config())
    }
}

fn tick_period(config: &SimConfig) -> Duration {
    Duration::from_secs_f32(config.time_step)
}

struct Worker {
    control: Sender<Control>,
    handle: JoinHandle<()>,
}

impl Worker {
    fn join(self) {
        if self.handle.join().is_err() {
            error!("physics thread panicked");
        }
    }
}

/// A bouncing-balls run: the authoritative world, its physics thread and the
/// frame handoff to readers.
///
/// All methods take `&self`; wrap it in an `Arc` to drive it from several
/// threads. Lifecycle calls are serialised, so `start` on a running
/// simulation and repeated or concurrent `stop` calls are harmless no-ops.
pub struct Simulation {
    shared: Arc<Shared>,
    worker: Mutex<Option<Worker>>,
    placement: Option<PlacementReport>,
}

impl Simulation {
    /// Places `ball_count` random balls in a `width` x `height` arena with
    /// default physics settings.
    pub fn new(ball_count: usize, width: f32, height: f32) -> Result<Self> {
        Self::builder()
            .arena(width, height)
            .ball_count(ball_count)
            .build()
    }

    pub fn builder() -> SimulationBuilder {
        SimulationBuilder::default()
    }

    fn from_world(world: BallWorld, placement: Option<PlacementReport>) -> Self {
        let bounds = world.bounds();
        info!(
            "simulation ready: {} balls in {}x{} arena",
            world.len(),
            bounds.width,
            bounds.height
        );
        let initial = Snapshot::new(world.tick(), world.sim_time(), bounds, world.balls());

        Self {
            shared: Arc::new(Shared {
                world: Mutex::new(world),
                frames: FrameExchange::new(initial),
                state: AtomicU8::new(RunState::Stopped as u8),
                display_timing: Mutex::new(FrameTiming::new(FPS_WINDOW)),
                physics_timing: Mutex::new(FrameTiming::new(FPS_WINDOW)),
                metrics: SimulationMetrics::new(),
                fatal: Mutex::new(None),
            }),
            worker: Mutex::new(None),
            placement,
        }
    }

    /// Spawns the physics thread. A no-op when it is already running.
    pub fn start(&self) -> Result<()> {
        let mut worker = self.worker.lock();
        if let Some(active) = worker.as_ref() {
            if !active.handle.is_finished() {
                warn!("start() ignored: simulation is already running");
                return Ok(());
            }
        }
        if let Some(finished) = worker.take() {
            finished.join();
        }

        *self.shared.fatal.lock() = None;
        self.shared.physics_timing.lock().reset();
        self.shared.set_state(RunState::Running);

        let (control, commands) = channel::unbounded();
        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name("physics".into())
            .spawn(move || run_physics(&shared, &commands));

        let handle = match spawned {
            Ok(handle) => handle,
            Err(err) => {
                self.shared.set_state(RunState::Stopped);
                error!("failed to spawn physics thread: {err}");
                return Err(SimError::ThreadSpawn(err));
            }
        };

        *worker = Some(Worker { control, handle });
        info!("simulation started");
        Ok(())
    }

    /// Stops and joins the physics thread. The current tick, if any, is
    /// finished first. Safe to call in any state and from several threads.
    pub fn stop(&self) {
        let mut worker = self.worker.lock();
        let Some(active) = worker.take() else {
            debug!("stop() ignored: simulation is not running");
            return;
        };

        // A send error only means the thread already exited on its own.
        let _ = active.control.send(Control::Shutdown);
        active.join();
        self.shared.set_state(RunState::Stopped);
        info!("simulation stopped");
    }

    /// Suspends ticking; the physics thread keeps polling for commands.
    pub fn pause(&self) {
        self.signal(RunState::Running, RunState::Paused, Control::Pause);
    }

    pub fn resume(&self) {
        self.signal(RunState::Paused, RunState::Running, Control::Resume);
    }

    fn signal(&self, from: RunState, to: RunState, command: Control) {
        let worker = self.worker.lock();
        let Some(active) = worker.as_ref() else {
            warn!("{command:?} ignored: simulation is not running");
            return;
        };
        if !self.shared.transition(from, to) {
            debug!("{command:?} ignored: simulation is {:?}", self.shared.state());
            return;
        }
        if active.control.send(command).is_err() {
            warn!("{command:?} not delivered: physics thread has exited");
            return;
        }
        info!("simulation {to:?}");
    }

    pub fn state(&self) -> RunState {
        self.shared.state()
    }

    pub fn is_running(&self) -> bool {
        self.state() == RunState::Running
    }

    pub fn is_paused(&self) -> bool {
        self.state() == RunState::Paused
    }

    /// The most recently completed frame. Never torn, never contains NaN.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.shared.frames.latest()
    }

    /// Blocks for at most `timeout` until a frame newer than `after_tick` is published.
    pub fn wait_for_frame(&self, after_tick: u64, timeout: Duration) -> Option<Arc<Snapshot>> {
        self.shared.frames.wait_newer(after_tick, timeout)
    }

    /// Display frames per second over the recent window.
    pub fn current_fps(&self) -> f64 {
        self.shared.display_timing.lock().rate()
    }

    /// Achieved physics ticks per second over the recent window.
    pub fn physics_rate(&self) -> f64 {
        self.shared.physics_timing.lock().rate()
    }

    /// Called by the display side once per presented frame. Returns the
    /// interval since the previous frame.
    pub fn record_frame(&self, now: Instant) -> Option<Duration> {
        self.shared.metrics.record_frame();
        self.shared.display_timing.lock().record_frame(now)
    }

    pub fn record_dropped_frame(&self) {
        self.shared.metrics.record_dropped_frame();
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.shared.metrics.snapshot(self.physics_rate())
    }

    pub fn config(&self) -> SimConfig {
        *self.shared.world.lock().config()
    }

    /// Validates `config` and applies it between ticks. Rejected settings
    /// leave the running state untouched.
    pub fn set_config(&self, config: SimConfig) -> Result<()> {
        if let Err(err) = config.validate() {
            warn!("rejected config update: {err}");
            return Err(err);
        }
        self.shared.world.lock().set_config(config)?;
        info!(
            "config updated: gravity {} restitution {} dt {}",
            config.effective_gravity(),
            config.restitution,
            config.time_step
        );
        Ok(())
    }

    pub fn bounds(&self) -> Bounds {
        self.shared.world.lock().bounds()
    }

    pub fn ball_count(&self) -> usize {
        self.shared.world.lock().len()
    }

    /// Outcome of random placement; `None` for simulations built from explicit balls.
    pub fn placement_report(&self) -> Option<&PlacementReport> {
        self.placement.as_ref()
    }

    /// The error that halted the physics thread, if any. Cleared by `start`.
    pub fn last_error(&self) -> Option<Arc<SimError>> {
        self.shared.fatal.lock().clone()
    }

    /// Advances exactly one tick on the calling thread and publishes the
    /// frame. Returns `Ok(None)` without stepping while the physics thread is alive.
    pub fn step_once(&self) -> Result<Option<TickReport>> {
        let worker = self.worker.lock();
        if worker
            .as_ref()
            .is_some_and(|active| !active.handle.is_finished())
        {
            warn!("step_once() ignored: physics thread is active");
            return Ok(None);
        }

        let mut buffer = Vec::new();
        let (outcome, _) = self.shared.tick(&mut buffer);
        outcome.map(Some)
    }
}

impl Drop for Simulation {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_physics(shared: &Shared, commands: &Receiver<Control>) {
    info!("physics thread started");
    let pause_poll = Duration::from_millis(PAUSE_POLL_MS);
    let mut pacer = FixedRate::new(shared.tick_period());
    let mut paused = false;
    let mut buffer = Vec::new();

    loop {
        let deadline = if paused {
            Instant::now() + pause_poll
        } else {
            pacer.next_deadline()
        };

        match commands.recv_deadline(deadline) {
            Ok(Control::Pause) => {
                paused = true;
                continue;
            }
            Ok(Control::Resume) => {
                paused = false;
                pacer.reset(Instant::now());
                continue;
            }
            Ok(Control::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }
        if paused {
            continue;
        }

        let (outcome, elapsed) = shared.tick(&mut buffer);
        if let Err(err) = outcome {
            error!("physics thread halted: {err}");
            *shared.fatal.lock() = Some(Arc::new(err));
            shared.set_state(RunState::Stopped);
            break;
        }

        let period = shared.tick_period();
        if pacer.period() != period {
            debug!("tick period changed to {period:?}");
            pacer.set_period(period);
        }
        if pacer.advance(Instant::now()) {
            shared.metrics.record_overrun();
            warn_if_budget_exceeded("physics tick", elapsed, period);
        }
    }

    info!("physics thread exiting");
}

/// Assembles a [`Simulation`] from an arena, physics settings and either a
/// random spawn request or an explicit ball list.
#[derive(Debug, Clone)]
pub struct SimulationBuilder {
    width: f32,
    height: f32,
    config: SimConfig,
    spawn: SpawnConfig,
    balls: Option<Vec<Ball>>,
}

impl Default for SimulationBuilder {
    fn default() -> Self {
        Self {
            width: DEFAULT_ARENA_WIDTH,
            height: DEFAULT_ARENA_HEIGHT,
            config: SimConfig::default(),
            spawn: SpawnConfig::default(),
            balls: None,
        }
    }
}

impl SimulationBuilder {
    pub fn arena(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn config(mut self, config: SimConfig) -> Self {
        self.config = config;
        self
    }

    pub fn spawn(mut self, spawn: SpawnConfig) -> Self {
        self.spawn = spawn;
        self
    }

    pub fn ball_count(mut self, count: usize) -> Self {
        self.spawn.ball_count = count;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.spawn.seed = Some(seed);
        self
    }

    /// Uses these balls instead of random placement. Ids are reassigned in
    /// list order; the minimum ball count does not apply.
    pub fn balls(mut self, balls: Vec<Ball>) -> Self {
        self.balls = Some(balls);
        self
    }

    /// Validates everything before creating any ball; nothing is returned on error.
    pub fn build(self) -> Result<Simulation> {
        self.config.validate()?;
        let bounds = Bounds::new(self.width, self.height);

        match self.balls {
            Some(balls) => {
                if balls.len() > MAX_BALL_COUNT {
                    return Err(SimError::InvalidBallCount {
                        requested: balls.len(),
                        min: 0,
                        max: MAX_BALL_COUNT,
                    });
                }
                let world = BallWorld::new(bounds, self.config, balls)?;
                Ok(Simulation::from_world(world, None))
            }
            None => {
                let (world, report) = BallWorld::spawn(bounds, self.config, &self.spawn)?;
                Ok(Simulation::from_world(world, Some(report)))
            }
        }
    }
}
