use bevy::log::debug;
use bevy::math::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::behavior::{self, BehaviorState, Situation};
use crate::character::{Character, Facing, FrameCursor, Transition};
use crate::config::SimConfig;
use crate::environment::{Environment, Platforms};
use crate::geometry::ScreenRect;
use crate::physics;
use crate::presentation::Clip;

const SNAPSHOT_LOG_EVERY: u64 = 60;

/// Everything the host hands over for one tick.
#[derive(Clone, Debug, Default)]
pub struct TickInput {
    pub now_ms: u64,
    pub exit_requested: bool,
    pub movie_playing: bool,
    /// Front-to-back, already filtered.
    pub platforms: Vec<ScreenRect>,
}

/// What the renderer gets after a tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Snapshot {
    pub tick: u64,
    pub state: BehaviorState,
    pub foot: Vec2,
    pub facing: Facing,
    pub leap_target: Option<Vec2>,
    pub frame: FrameCursor,
    pub last_transition: Option<Transition>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TickOutcome {
    Exit,
    Continue(Snapshot),
}

/// The single owner of all simulation state.
pub struct Simulation<R = StdRng> {
    config: SimConfig,
    env: Environment,
    character: Character,
    rng: R,
    ticks: u64,
}

impl Simulation<StdRng> {
    /// Seeded runs are reproducible; unseeded ones draw from the OS.
    pub fn new(config: SimConfig, monitors: Vec<ScreenRect>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::with_rng(config, monitors, rng)
    }
}

impl<R: Rng> Simulation<R> {
    /// Starts FALLING at the middle of the first monitor's floor.
    pub fn with_rng(config: SimConfig, monitors: Vec<ScreenRect>, rng: R) -> Self {
        let start = monitors
            .first()
            .map(|m| Vec2::new((m.left + m.right) / 2.0, m.bottom))
            .unwrap_or(Vec2::ZERO);
        Self::starting_at(config, monitors, rng, Character::new(start, BehaviorState::Falling))
    }

    pub fn starting_at(
        config: SimConfig,
        monitors: Vec<ScreenRect>,
        rng: R,
        character: Character,
    ) -> Self {
        Self {
            config,
            env: Environment::new(monitors),
            character,
            rng,
            ticks: 0,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn character(&self) -> &Character {
        &self.character
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// New display layout. Takes effect from the next tick.
    pub fn replace_monitors(&mut self, monitors: Vec<ScreenRect>) {
        self.env.replace_monitors(monitors);
    }

    /// Renderer hook: step the animation cursor for the current state.
    pub fn advance_animation(&mut self, now_ms: u64, clip: &Clip) {
        self.character.advance_frame(now_ms, clip);
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.ticks,
            state: self.character.state(),
            foot: self.character.position,
            facing: self.character.facing,
            leap_target: self.character.leap_target(),
            frame: self.character.frame(),
            last_transition: self.character.last_transition(),
        }
    }

    /// One indivisible pass: exit check, environment, physics, behavior.
    pub fn tick(&mut self, input: TickInput) -> TickOutcome {
        if input.exit_requested {
            return TickOutcome::Exit;
        }
        let now_ms = input.now_ms;

        self.env.replace_platforms(Platforms::new(input.platforms));

        physics::step(
            &mut self.character,
            &self.env,
            &self.config,
            &mut self.rng,
            now_ms,
        );

        let situation = Situation {
            character: &self.character,
            env: &self.env,
            config: &self.config,
            now_ms,
            movie_playing: input.movie_playing,
        };
        if let Some(decision) = behavior::decide(&situation, &mut self.rng) {
            decision.apply(&mut self.character, now_ms);
        }

        self.ticks += 1;
        if self.ticks % SNAPSHOT_LOG_EVERY == 0 {
            debug!(
                "state: {} | pos: {:.0},{:.0} | tgt: {:?}",
                self.character.state(),
                self.character.position.x,
                self.character.position.y,
                self.character.leap_target()
            );
        }
        TickOutcome::Continue(self.snapshot())
    }
}
