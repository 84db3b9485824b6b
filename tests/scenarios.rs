use bevy::math::Vec2;
use desktop_buddy::character::Transition;
use desktop_buddy::environment::EnvironmentProvider;
use desktop_buddy::playground::{Layout, Playground};
use desktop_buddy::{
    BehaviorState, Cause, Character, Facing, ScreenRect, SimConfig, Simulation, Snapshot,
    TickInput, TickOutcome,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

const MONITOR: ScreenRect = ScreenRect::new(0.0, 0.0, 1920.0, 1040.0);
const TICK_MS: u64 = 33;

/// Random transitions never fire.
fn calm() -> SimConfig {
    SimConfig {
        idle_walk_threshold: 0,
        idle_sit_threshold: 0,
        idle_sleep_threshold: 0,
        stop_walking_chance: 0,
        stand_up_chance: 0,
        wake_up_chance: 0,
        jump_check_chance: 0,
        ..SimConfig::default()
    }
}

fn sim_with(config: SimConfig, monitors: Vec<ScreenRect>, character: Character) -> Simulation {
    Simulation::starting_at(config, monitors, StdRng::seed_from_u64(17), character)
}

fn step(sim: &mut Simulation, now_ms: u64, platforms: &[ScreenRect]) -> Snapshot {
    step_with(sim, now_ms, platforms, false)
}

fn step_with(
    sim: &mut Simulation,
    now_ms: u64,
    platforms: &[ScreenRect],
    movie_playing: bool,
) -> Snapshot {
    match sim.tick(TickInput {
        now_ms,
        exit_requested: false,
        movie_playing,
        platforms: platforms.to_vec(),
    }) {
        TickOutcome::Continue(snap) => snap,
        TickOutcome::Exit => panic!("exit was not requested"),
    }
}

#[test]
fn gravity_is_monotonic_and_capped() {
    let config = calm();
    let cap = config.max_fall_speed;
    let mut sim = sim_with(
        config,
        vec![],
        Character::new(Vec2::new(500.0, 0.0), BehaviorState::Falling),
    );
    let mut last_vy = sim.character().velocity.y;
    for t in 0..60 {
        step(&mut sim, t * TICK_MS, &[]);
        let vy = sim.character().velocity.y;
        assert!(vy <= cap);
        if last_vy < cap {
            assert!(vy > last_vy, "vy {vy} did not grow from {last_vy}");
        }
        last_vy = vy;
    }
    assert_eq!(last_vy, cap);
}

#[test]
fn elevator_catch() {
    let mut c = Character::new(Vec2::new(600.0, 500.0), BehaviorState::Falling);
    c.velocity.y = 10.0;
    let mut sim = sim_with(calm(), vec![MONITOR], c);

    let window = ScreenRect::new(400.0, 505.0, 900.0, 800.0);
    let snap = step(&mut sim, 1000, &[window]);
    assert_eq!(snap.foot.y, 505.0);
    assert_eq!(sim.character().velocity.y, 0.0);
    assert_eq!(snap.state, BehaviorState::Idle);
}

#[test]
fn grounded_character_rides_a_rising_window() {
    let mut sim = sim_with(
        calm(),
        vec![MONITOR],
        Character::new(Vec2::new(600.0, 505.0), BehaviorState::Idle),
    );
    for (i, top) in [505.0, 501.0, 497.0, 493.0].into_iter().enumerate() {
        let window = ScreenRect::new(400.0, top, 900.0, 800.0);
        let snap = step(&mut sim, i as u64 * TICK_MS, &[window]);
        assert_eq!(snap.foot.y, top);
        assert_eq!(snap.state, BehaviorState::Idle);
    }
}

#[test]
fn landing_snaps_exactly() {
    let mut c = Character::new(Vec2::new(600.0, 480.0), BehaviorState::Falling);
    c.velocity.y = 12.0;
    let mut sim = sim_with(calm(), vec![MONITOR], c);
    let window = ScreenRect::new(400.0, 487.5, 900.0, 800.0);
    let snap = step(&mut sim, 0, &[window]);
    assert_eq!(snap.foot.y, 487.5);
    assert_eq!(sim.character().velocity, Vec2::ZERO);
    assert_eq!(snap.state, BehaviorState::Idle);
    assert_eq!(snap.last_transition.map(|t| t.cause), Some(Cause::LandedWindow));
}

#[test]
fn nearer_window_at_head_knocks_off_ledge() {
    let ledge = ScreenRect::new(400.0, 500.0, 900.0, 800.0);
    let intruder = ScreenRect::new(550.0, 300.0, 800.0, 495.0);
    let mut sim = sim_with(
        calm(),
        vec![MONITOR],
        Character::new(Vec2::new(600.0, 500.0), BehaviorState::Idle),
    );
    let snap = step(&mut sim, 5000, &[intruder, ledge]);
    assert_eq!(snap.state, BehaviorState::Falling);
    assert_eq!(snap.last_transition.map(|t| t.cause), Some(Cause::NoSupport));

    // no bouncing back onto the covered ledge on the way down
    let mut snap = snap;
    for t in 1..80 {
        snap = step(&mut sim, 5000 + t * TICK_MS, &[intruder, ledge]);
        if snap.state != BehaviorState::Falling {
            break;
        }
        assert!(snap.foot.y >= ledge.top);
    }
    assert!(snap.foot.y > ledge.top);
    assert_eq!(snap.foot.y, MONITOR.bottom);
    assert_eq!(snap.last_transition.map(|t| t.cause), Some(Cause::LandedFloor));
}

#[test]
fn covered_viewer_is_startled_once_per_dwell() {
    // covers the head but not the feet of a character on the floor
    let cover = ScreenRect::new(300.0, 900.0, 1000.0, 1030.0);
    let mut sim = sim_with(
        calm(),
        vec![MONITOR],
        Character::new(Vec2::new(600.0, 1040.0), BehaviorState::WatchingMovie),
    );

    let snap = step_with(&mut sim, 0, &[cover], true);
    assert_eq!(snap.state, BehaviorState::Idle);
    assert_eq!(snap.last_transition.map(|t| t.cause), Some(Cause::WokeByOcclusion));
    let startled_at = snap.foot.x;

    let mut startles = 1;
    for t in 1..400 {
        let now = t * TICK_MS;
        let snap = step_with(&mut sim, now, &[cover], true);
        if now < 2000 {
            assert_eq!(snap.state, BehaviorState::Idle);
            assert_eq!(snap.foot.x, startled_at);
        }
        let last = snap.last_transition.map(|t| (t.cause, t.at_ms));
        if last == Some((Cause::WokeByOcclusion, now)) {
            startles += 1;
        }
        assert_eq!(snap.foot.y, MONITOR.bottom);
    }
    // one startle per dwell period, not one per tick
    assert!((2..=8).contains(&startles), "{startles} startles");
}

#[test]
fn farther_window_at_head_is_ignored() {
    let ledge = ScreenRect::new(400.0, 500.0, 900.0, 800.0);
    let behind = ScreenRect::new(550.0, 300.0, 800.0, 495.0);
    let mut sim = sim_with(
        calm(),
        vec![MONITOR],
        Character::new(Vec2::new(600.0, 500.0), BehaviorState::Sleeping),
    );
    for t in 0..30 {
        let snap = step(&mut sim, t * TICK_MS, &[ledge, behind]);
        assert_eq!(snap.state, BehaviorState::Sleeping);
        assert_eq!(snap.foot, Vec2::new(600.0, 500.0));
    }
}

#[test]
fn nearer_window_startles_a_sleeper() {
    let ledge = ScreenRect::new(400.0, 500.0, 900.0, 800.0);
    let intruder = ScreenRect::new(550.0, 300.0, 800.0, 495.0);
    let mut sim = sim_with(
        calm(),
        vec![MONITOR],
        Character::new(Vec2::new(600.0, 500.0), BehaviorState::Sleeping),
    );
    let snap = step(&mut sim, 5000, &[intruder, ledge]);
    assert_eq!(snap.state, BehaviorState::Idle);
    assert_eq!(snap.last_transition.map(|t| t.cause), Some(Cause::WokeByOcclusion));
    assert_eq!((snap.foot.x - 600.0).abs(), 10.0);
    assert_eq!(snap.foot.y, 500.0);
}

#[test]
fn floor_is_never_pulled_away() {
    let cover = ScreenRect::new(0.0, 0.0, 1920.0, 1035.0);
    for state in [
        BehaviorState::Idle,
        BehaviorState::Walking,
        BehaviorState::Sitting,
    ] {
        let mut sim = sim_with(
            calm(),
            vec![MONITOR],
            Character::new(Vec2::new(960.0, 1040.0), state),
        );
        for t in 0..50 {
            let snap = step(&mut sim, t * TICK_MS, &[cover]);
            assert_ne!(snap.state, BehaviorState::Falling);
            assert_eq!(snap.foot.y, 1040.0);
        }
    }
}

#[test]
fn leap_terminates_on_target() {
    let targets = [
        (Vec2::new(100.0, 900.0), Vec2::new(400.0, 600.0)),
        (Vec2::new(800.0, 300.0), Vec2::new(750.0, 700.0)),
        (Vec2::new(10.0, 10.0), Vec2::new(60.0, 10.0)),
        (Vec2::new(333.3, 444.4), Vec2::new(345.6, 430.1)),
        (Vec2::new(500.0, 500.0), Vec2::new(500.0, 500.0)),
    ];
    for (start, target) in targets {
        let config = calm();
        let speed = config.leap_speed;
        let mut c = Character::new(start, BehaviorState::Leaping);
        c.set_leap_target(target);
        let mut sim = sim_with(config, vec![MONITOR], c);

        let max_ticks = ((start.distance(target) / speed).ceil() as u64).max(1);
        let mut remaining = start.distance(target);
        let mut ticks = 0;
        loop {
            let snap = step(&mut sim, ticks * TICK_MS, &[]);
            ticks += 1;
            if snap.state == BehaviorState::Idle {
                assert_eq!(snap.foot, target);
                assert_eq!(snap.last_transition.map(|t| t.cause), Some(Cause::JumpArrived));
                break;
            }
            let now = snap.foot.distance(target);
            assert!(now < remaining);
            remaining = now;
            assert!(ticks < max_ticks, "{start} -> {target} overran {max_ticks} ticks");
        }
        assert!(ticks <= max_ticks);
    }
}

#[test]
fn random_transitions_respect_dwell_time() {
    // Everything fires as soon as it is allowed to.
    let config = SimConfig {
        idle_walk_threshold: 3000,
        idle_sit_threshold: 6000,
        idle_sleep_threshold: 9000,
        stop_walking_chance: 10_000,
        stand_up_chance: 10_000,
        wake_up_chance: 10_000,
        jump_check_chance: 10_000,
        ..SimConfig::default()
    };
    let min_state_ms = config.min_state_ms;
    let layout = Layout::demo();
    let mut provider = Playground::new(layout.clone());
    let mut sim = Simulation::new(config, layout.monitors, Some(5));

    let mut history: Vec<Transition> = Vec::new();
    for t in 0..3000u64 {
        let now_ms = t * TICK_MS;
        let platforms = provider.platforms(now_ms);
        let snap = step(&mut sim, now_ms, &platforms);
        if let Some(tr) = snap.last_transition {
            if history.last() != Some(&tr) {
                history.push(tr);
            }
        }
    }

    let gated = [
        Cause::AiWalk,
        Cause::AiSit,
        Cause::AiSleep,
        Cause::LedgeFound,
        Cause::StopWalk,
        Cause::StandUp,
        Cause::WakeUp,
    ];
    let mut checked = 0;
    for pair in history.windows(2) {
        let (prev, next) = (pair[0], pair[1]);
        assert_ne!(next.from, next.to);
        if gated.contains(&next.cause) {
            assert!(
                next.at_ms - prev.at_ms >= min_state_ms,
                "{next} fired {}ms after {prev}",
                next.at_ms - prev.at_ms
            );
            checked += 1;
        }
    }
    assert!(checked > 5, "only {checked} random transitions happened");
}

#[test]
fn walking_stops_at_screen_edge() {
    let mut c = Character::new(Vec2::new(1917.0, 1040.0), BehaviorState::Walking);
    c.facing = Facing::Right;
    let mut sim = sim_with(calm(), vec![MONITOR], c);
    let snap = step(&mut sim, 0, &[]);
    assert_eq!(snap.state, BehaviorState::Idle);
    assert_eq!(snap.last_transition.map(|t| t.cause), Some(Cause::ScreenEdge));
    assert_eq!(snap.foot, Vec2::new(1917.0, 1040.0));
}

#[test]
fn walking_crosses_between_monitors() {
    let right = ScreenRect::new(1920.0, 0.0, 3840.0, 1040.0);
    let mut c = Character::new(Vec2::new(1918.0, 1040.0), BehaviorState::Walking);
    c.facing = Facing::Right;
    let mut sim = sim_with(calm(), vec![MONITOR, right], c);
    let snap = step(&mut sim, 0, &[]);
    assert_eq!(snap.state, BehaviorState::Walking);
    assert_eq!(snap.foot.x, 1922.0);
}

#[test]
fn jump_target_selection() {
    let config = SimConfig {
        jump_check_chance: 10_000,
        jump_up_bias: 70,
        ..calm()
    };
    let shelf = ScreenRect::new(400.0, 940.0, 800.0, 1000.0);
    let mut sim = sim_with(
        config,
        vec![MONITOR],
        Character::new(Vec2::new(600.0, 1040.0), BehaviorState::Idle),
    );
    let snap = step(&mut sim, 2500, &[shelf]);
    assert_eq!(snap.state, BehaviorState::PrepareJump);
    assert_eq!(snap.leap_target, Some(Vec2::new(600.0, 940.0)));
}

#[test]
fn no_ledge_means_no_jump() {
    let config = SimConfig {
        jump_check_chance: 10_000,
        ..calm()
    };
    let mut sim = sim_with(
        config,
        vec![MONITOR],
        Character::new(Vec2::new(600.0, 1040.0), BehaviorState::Idle),
    );
    for t in 0..10 {
        let snap = step(&mut sim, 2500 + t * TICK_MS, &[]);
        assert_eq!(snap.state, BehaviorState::Idle);
    }
}

#[test]
fn full_jump_lands_on_the_shelf() {
    let config = SimConfig {
        jump_check_chance: 10_000,
        launch_chance_denominator: 1,
        ..calm()
    };
    let shelf = ScreenRect::new(400.0, 940.0, 800.0, 1000.0);
    let mut sim = sim_with(
        config,
        vec![MONITOR],
        Character::new(Vec2::new(600.0, 1040.0), BehaviorState::Idle),
    );
    let mut now = 2500;
    let mut seen = Vec::new();
    for _ in 0..20 {
        let snap = step(&mut sim, now, &[shelf]);
        if seen.last() != Some(&snap.state) {
            seen.push(snap.state);
        }
        now += TICK_MS;
    }
    assert_eq!(
        seen,
        vec![
            BehaviorState::PrepareJump,
            BehaviorState::Leaping,
            BehaviorState::Idle
        ]
    );
    assert_eq!(sim.character().position, Vec2::new(600.0, 940.0));
}

#[test]
fn movie_end_ignores_dwell() {
    let mut c = Character::new(Vec2::new(960.0, 1040.0), BehaviorState::Idle);
    c.change_state(BehaviorState::WatchingMovie, Cause::DetectMovie, 1000);
    let mut sim = sim_with(calm(), vec![MONITOR], c);

    let snap = step_with(&mut sim, 1100, &[], true);
    assert_eq!(snap.state, BehaviorState::WatchingMovie);

    let snap = step_with(&mut sim, 1200, &[], false);
    assert_eq!(snap.state, BehaviorState::Idle);
    assert_eq!(snap.last_transition.map(|t| t.cause), Some(Cause::MovieEnd));
}

#[test]
fn movie_starts_immediately_from_walking() {
    let mut c = Character::new(Vec2::new(960.0, 1040.0), BehaviorState::Idle);
    c.change_state(BehaviorState::Walking, Cause::AiWalk, 1000);
    let mut sim = sim_with(calm(), vec![MONITOR], c);
    let snap = step_with(&mut sim, 1033, &[], true);
    assert_eq!(snap.state, BehaviorState::WatchingMovie);
    assert_eq!(snap.frame.index, 0);
    assert_eq!(sim.character().state_since_ms(), 1033);
}

#[test]
fn demo_playground_never_tunnels_or_repeats_states() {
    let layout = Layout::demo();
    let mut provider = Playground::new(layout.clone());
    let mut sim = Simulation::new(SimConfig::default(), layout.monitors, Some(2024));
    for t in 0..20_000u64 {
        let now_ms = t * TICK_MS;
        let platforms = provider.platforms(now_ms);
        let snap = step(&mut sim, now_ms, &platforms);
        assert!(snap.foot.is_finite());
        assert!(snap.foot.y <= MONITOR.bottom, "fell through the floor at tick {t}");
        if let Some(tr) = snap.last_transition {
            assert_ne!(tr.from, tr.to);
        }
    }
}
