use bouncing_balls::*;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn simulation() -> Simulation {
    Simulation::builder()
        .arena(640.0, 480.0)
        .ball_count(25)
        .seed(1234)
        .build()
        .expect("valid simulation")
}

#[test]
fn stop_is_idempotent() {
    let sim = simulation();
    sim.stop();
    assert_eq!(sim.state(), RunState::Stopped);

    sim.start().expect("start");
    sim.stop();
    sim.stop();
    assert_eq!(sim.state(), RunState::Stopped);
}

#[test]
fn concurrent_stops_do_not_deadlock() {
    let sim = Arc::new(simulation());
    sim.start().expect("start");
    thread::sleep(Duration::from_millis(20));

    let stoppers: Vec<_> = (0..2)
        .map(|_| {
            let sim = Arc::clone(&sim);
            thread::spawn(move || sim.stop())
        })
        .collect();
    for stopper in stoppers {
        stopper.join().expect("stop thread");
    }
    assert_eq!(sim.state(), RunState::Stopped);
}

#[test]
fn start_while_running_is_a_no_op() {
    let sim = simulation();
    sim.start().expect("start");
    sim.start().expect("second start is harmless");
    assert!(sim.is_running());
    sim.stop();
    assert_eq!(sim.state(), RunState::Stopped);
}

#[test]
fn rapid_pause_resume_keeps_every_ball() {
    let sim = simulation();
    let ids: Vec<BallId> = sim.snapshot().balls().iter().map(Ball::id).collect();
    sim.start().expect("start");

    for _ in 0..50 {
        sim.pause();
        sim.resume();
    }
    sim.pause();
    sim.resume();
    assert!(sim.is_running());

    let frame = sim
        .wait_for_frame(sim.snapshot().tick(), Duration::from_secs(2))
        .expect("physics resumed");
    sim.stop();

    let after: Vec<BallId> = frame.balls().iter().map(Ball::id).collect();
    assert_eq!(ids, after);
    assert!(frame.balls().iter().all(Ball::is_finite));
}

#[test]
fn paused_simulation_does_not_tick() {
    let sim = simulation();
    sim.start().expect("start");
    sim.wait_for_frame(0, Duration::from_secs(2))
        .expect("first tick");

    sim.pause();
    assert!(sim.is_paused());
    // Let a tick that was already in flight land.
    thread::sleep(Duration::from_millis(30));
    let frozen = sim.snapshot().tick();
    thread::sleep(Duration::from_millis(60));
    assert_eq!(sim.snapshot().tick(), frozen);

    sim.resume();
    assert!(sim
        .wait_for_frame(frozen, Duration::from_secs(2))
        .is_some());
    sim.stop();
}

#[test]
fn restart_continues_from_the_last_tick() {
    let sim = simulation();
    sim.start().expect("start");
    sim.wait_for_frame(5, Duration::from_secs(2))
        .expect("ticks advanced");
    sim.stop();
    let stopped_at = sim.snapshot().tick();
    thread::sleep(Duration::from_millis(20));
    assert_eq!(sim.snapshot().tick(), stopped_at, "ticked after stop");

    sim.start().expect("restart");
    let next = sim
        .wait_for_frame(stopped_at, Duration::from_secs(2))
        .expect("ticks after restart");
    sim.stop();
    assert!(next.tick() > stopped_at);
}

#[test]
fn rejected_config_leaves_running_state_untouched() {
    let sim = simulation();
    sim.start().expect("start");
    let before = sim.config();

    let err = sim
        .set_config(SimConfig {
            restitution: 2.0,
            ..SimConfig::default()
        })
        .expect_err("restitution above 1");
    assert!(err.is_configuration());
    assert_eq!(sim.config(), before);
    assert!(sim.is_running());
    sim.stop();
}

#[test]
fn fatal_corruption_stops_the_physics_thread() {
    // Heavy balls meeting at near-f32::MAX speed overflow the impulse every
    // tick; the rollback restores the same state, so corruption persists.
    let balls = vec![
        Ball::with_mass(0, 5.0, 1000.0, Vec2::new(50.0, 50.0), Vec2::new(f32::MAX, 0.0), Color::RED),
        Ball::with_mass(1, 5.0, 1000.0, Vec2::new(90.0, 50.0), Vec2::ZERO, Color::GREEN),
        Ball::with_mass(2, 5.0, 1000.0, Vec2::new(20.0, 80.0), Vec2::ZERO, Color::BLUE),
    ];
    let sim = Simulation::builder()
        .arena(100.0, 100.0)
        .config(SimConfig {
            gravity: 0.0,
            ..SimConfig::default()
        })
        .balls(balls)
        .build()
        .expect("valid simulation");
    sim.start().expect("start");

    let deadline = Instant::now() + Duration::from_secs(2);
    while sim.last_error().is_none() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }

    let err = sim.last_error().expect("corruption escalated");
    assert_eq!(err.kind(), ErrorKind::NumericCorruption);
    assert_eq!(sim.state(), RunState::Stopped);
    assert!(sim.snapshot().balls().iter().all(Ball::is_finite));
    assert!(sim.metrics().corrupted_ticks >= 2);

    sim.stop();
    assert_eq!(sim.state(), RunState::Stopped);
}

#[test]
fn display_loop_presents_frames_and_reports_fps() {
    let sim = simulation();
    sim.start().expect("start");

    let context = GraphicsContext::new("lifecycle", sim.bounds());
    let mut presenter = NoopPresenter::with_frame_limit(30);
    let stats = DisplayLoop::new(120.0)
        .run(&sim, &context, &mut presenter)
        .expect("display loop");
    sim.stop();

    assert_eq!(stats.frames, 30);
    assert!(stats.last_tick > 0);
    assert!(sim.current_fps() > 0.0);
    assert_eq!(sim.metrics().frames_presented, 30);
}
