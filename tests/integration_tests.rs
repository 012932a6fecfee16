use approx::assert_relative_eq;
use bouncing_balls::*;

fn zero_gravity_elastic() -> SimConfig {
    SimConfig {
        gravity: 0.0,
        restitution: 1.0,
        ..SimConfig::default()
    }
}

#[test]
fn balls_stay_inside_the_arena_every_tick() {
    let spawn = SpawnConfig {
        seed: Some(11),
        ..SpawnConfig::with_count(80)
    };
    let bounds = Bounds::new(800.0, 600.0);
    let (mut world, report) =
        BallWorld::spawn(bounds, SimConfig::default(), &spawn).expect("valid world");
    assert_eq!(report.placed, world.len());

    for _ in 0..1_000 {
        world.step().expect("tick");
        for ball in world.balls() {
            assert!(ball.is_finite());
            assert!(
                bounds.contains_disc(ball.position, ball.radius(), 1e-3),
                "ball {:?} escaped: {:?}",
                ball.id(),
                ball.position
            );
        }
    }
}

#[test]
fn head_on_pair_exchanges_velocities() {
    // Radius 5, centers 11 apart: one unit between surfaces. At 240 units/s
    // each ball moves one unit per tick, so the first tick ends overlapping.
    let balls = vec![
        Ball::new(0, 5.0, Vec2::new(40.0, 50.0), Vec2::new(240.0, 0.0), Color::RED),
        Ball::new(1, 5.0, Vec2::new(51.0, 50.0), Vec2::new(-240.0, 0.0), Color::GREEN),
        Ball::new(2, 5.0, Vec2::new(80.0, 85.0), Vec2::ZERO, Color::BLUE),
    ];
    let simulation = Simulation::builder()
        .arena(100.0, 100.0)
        .config(zero_gravity_elastic())
        .balls(balls)
        .build()
        .expect("valid simulation");

    let report = simulation.step_once().expect("tick").expect("stepped");
    assert_eq!(report.solver.impulses, 1);

    let frame = simulation.snapshot();
    let (a, b, c) = (frame.balls()[0], frame.balls()[1], frame.balls()[2]);
    assert_relative_eq!(a.velocity.x, -240.0, epsilon = 1e-2);
    assert_relative_eq!(b.velocity.x, 240.0, epsilon = 1e-2);
    assert_relative_eq!(a.velocity.y, 0.0, epsilon = 1e-4);
    assert_eq!(c.velocity, Vec2::ZERO);
    assert!(a.position.distance(b.position) >= 10.0 - SimConfig::default().slop - 1e-4);
}

#[test]
fn dropped_ball_bounces_off_the_floor() {
    let balls = vec![Ball::new(0, 5.0, Vec2::new(50.0, 20.0), Vec2::ZERO, Color::RED)];
    let bounds = Bounds::new(100.0, 100.0);
    let mut world = BallWorld::new(bounds, SimConfig::default(), balls).expect("valid world");

    let mut was_falling = false;
    let mut bounced = false;
    for _ in 0..2_000 {
        world.step().expect("tick");
        let ball = world.ball(BallId(0)).expect("ball exists");
        assert!(ball.position.y + ball.radius() <= bounds.height + 1e-3);
        if ball.velocity.y > 0.0 {
            was_falling = true;
        } else if was_falling && ball.velocity.y < 0.0 {
            bounced = true;
        }
    }
    assert!(bounced, "ball never reflected off the floor");
}

#[test]
fn ball_count_outside_bounds_is_a_configuration_error() {
    for count in [0, config::MIN_BALL_COUNT - 1, config::MAX_BALL_COUNT + 1] {
        let err = Simulation::new(count, 800.0, 600.0)
            .err()
            .expect("count should be rejected");
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(matches!(err, SimError::InvalidBallCount { requested, .. } if requested == count));
    }
}

#[test]
fn invalid_arena_and_parameters_are_rejected() {
    assert!(matches!(
        Simulation::new(10, 0.0, 600.0),
        Err(SimError::InvalidArena { .. })
    ));
    assert!(matches!(
        Simulation::new(10, 800.0, f32::NAN),
        Err(SimError::InvalidArena { .. })
    ));

    let bad = SimConfig {
        time_step: -0.01,
        ..SimConfig::default()
    };
    let err = Simulation::builder()
        .config(bad)
        .build()
        .err()
        .expect("negative dt");
    assert!(err.is_configuration());
}

#[test]
fn masses_and_radii_never_change() {
    let spawn = SpawnConfig {
        seed: Some(5),
        ..SpawnConfig::with_count(60)
    };
    let (mut world, _) = BallWorld::spawn(Bounds::new(600.0, 600.0), SimConfig::default(), &spawn)
        .expect("valid world");
    let before: Vec<(f32, f32)> = world.balls().iter().map(|b| (b.mass(), b.radius())).collect();

    for _ in 0..500 {
        world.step().expect("tick");
    }

    let after: Vec<(f32, f32)> = world.balls().iter().map(|b| (b.mass(), b.radius())).collect();
    assert_eq!(before, after);
}

#[test]
fn crowded_arena_constructs_with_fewer_balls() {
    let spawn = SpawnConfig {
        seed: Some(9),
        max_attempts: 10,
        ..SpawnConfig::with_count(config::MAX_BALL_COUNT)
    };
    let simulation = Simulation::builder()
        .arena(200.0, 200.0)
        .spawn(spawn)
        .build()
        .expect("placement shortfall is not an error");

    let report = simulation.placement_report().expect("spawned simulation");
    assert!(!report.is_complete());
    assert_eq!(simulation.ball_count(), report.placed);
    assert_eq!(simulation.snapshot().len(), report.placed);
}

#[test]
fn persistent_corruption_is_fatal_but_leaves_finite_state() {
    let mut world = BallWorld::new(
        Bounds::new(100.0, 100.0),
        zero_gravity_elastic(),
        vec![Ball::new(0, 5.0, Vec2::new(50.0, 50.0), Vec2::new(1.0, 0.0), Color::RED)],
    )
    .expect("valid world");

    let mut result = Ok(TickReport::default());
    for _ in 0..config::MAX_CONSECUTIVE_CORRUPT_TICKS {
        if let Some(ball) = world.ball_mut(BallId(0)) {
            ball.position.x = f32::NAN;
        }
        result = world.step();
    }

    let err = result.expect_err("corruption persisted");
    assert_eq!(err.kind(), ErrorKind::NumericCorruption);
    assert!(world.balls().iter().all(Ball::is_finite));
}

#[test]
fn config_round_trips_through_json() {
    let config = SimConfig {
        gravity: 9.81,
        enable_collisions: false,
        ..SimConfig::default()
    };
    let json = config.to_json_string().expect("serializes");
    assert_eq!(SimConfig::from_json_str(&json).expect("parses"), config);
}
