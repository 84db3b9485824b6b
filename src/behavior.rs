//! The buddy's mood. `decide` is a pure function of the character, the
//! environment and the random source; the simulation applies its result.

use std::fmt;

use bevy::math::Vec2;
use rand::Rng;

use crate::character::{Character, Facing};
use crate::config::SimConfig;
use crate::environment::Environment;
use crate::targeting;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum BehaviorState {
    Idle,
    Walking,
    Sitting,
    Sleeping,
    Falling,
    PrepareJump,
    Leaping,
    WatchingMovie,
}

impl BehaviorState {
    pub const ALL: [BehaviorState; 8] = [
        BehaviorState::Idle,
        BehaviorState::Walking,
        BehaviorState::Sitting,
        BehaviorState::Sleeping,
        BehaviorState::Falling,
        BehaviorState::PrepareJump,
        BehaviorState::Leaping,
        BehaviorState::WatchingMovie,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BehaviorState::Idle => "IDLE",
            BehaviorState::Walking => "WALKING",
            BehaviorState::Sitting => "SITTING",
            BehaviorState::Sleeping => "SLEEPING",
            BehaviorState::Falling => "FALLING",
            BehaviorState::PrepareJump => "PREPARE_JUMP",
            BehaviorState::Leaping => "LEAPING",
            BehaviorState::WatchingMovie => "WATCHING_MOVIE",
        }
    }

    /// Airborne or mid-jump; motion belongs to physics alone.
    pub fn is_airborne(self) -> bool {
        matches!(self, BehaviorState::Falling | BehaviorState::Leaping)
    }

    /// States a movie may interrupt.
    pub fn can_watch_movie(self) -> bool {
        matches!(
            self,
            BehaviorState::Idle
                | BehaviorState::Walking
                | BehaviorState::Sitting
                | BehaviorState::Sleeping
        )
    }
}

impl fmt::Display for BehaviorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a state change happened.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Cause {
    LandedWindow,
    LandedFloor,
    JumpArrived,
    NoSupport,
    ScreenEdge,
    WokeByOcclusion,
    AiWalk,
    AiSit,
    AiSleep,
    LedgeFound,
    Launch,
    StopWalk,
    StandUp,
    WakeUp,
    DetectMovie,
    MovieEnd,
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Cause::LandedWindow => "Landed Window",
            Cause::LandedFloor => "Landed Floor",
            Cause::JumpArrived => "Jump Arrived",
            Cause::NoSupport => "No Support",
            Cause::ScreenEdge => "Screen Edge",
            Cause::WokeByOcclusion => "Woke by Occlusion",
            Cause::AiWalk => "AI Walk",
            Cause::AiSit => "AI Sit",
            Cause::AiSleep => "AI Sleep",
            Cause::LedgeFound => "Ledge Found",
            Cause::Launch => "Launch",
            Cause::StopWalk => "Stop Walk",
            Cause::StandUp => "Stand Up",
            Cause::WakeUp => "Wake Up",
            Cause::DetectMovie => "Detect Movie",
            Cause::MovieEnd => "Movie End",
        })
    }
}

/// A transition plus the side effects that go with it.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Decision {
    pub to: BehaviorState,
    pub cause: Cause,
    pub facing: Option<Facing>,
    pub leap_target: Option<Vec2>,
}

impl Decision {
    fn to(to: BehaviorState, cause: Cause) -> Self {
        Self {
            to,
            cause,
            facing: None,
            leap_target: None,
        }
    }

    fn facing(mut self, facing: Facing) -> Self {
        self.facing = Some(facing);
        self
    }

    fn leap_target(mut self, target: Vec2) -> Self {
        self.leap_target = Some(target);
        self
    }

    /// Apply to the character. Facing and target are set before the state
    /// changes so the transition sees them.
    pub fn apply(self, character: &mut Character, now_ms: u64) -> bool {
        if let Some(facing) = self.facing {
            character.facing = facing;
        }
        if let Some(target) = self.leap_target {
            character.set_leap_target(target);
        }
        character.change_state(self.to, self.cause, now_ms)
    }
}

/// Inputs the behavior step reads.
pub struct Situation<'a> {
    pub character: &'a Character,
    pub env: &'a Environment,
    pub config: &'a SimConfig,
    pub now_ms: u64,
    pub movie_playing: bool,
}

/// Decide this tick's behavioral transition, if any.
pub fn decide<R: Rng + ?Sized>(s: &Situation<'_>, rng: &mut R) -> Option<Decision> {
    let c = s.character;
    let config = s.config;
    let state = c.state();

    if state.is_airborne() {
        return None;
    }

    // Launch timing ignores the dwell clock.
    if state == BehaviorState::PrepareJump {
        if !rng.random_ratio(1, config.launch_chance_denominator) {
            return None;
        }
        let target = c.leap_target().unwrap_or(c.position);
        let facing = Facing::toward(c.position.x, target.x);
        return Some(Decision::to(BehaviorState::Leaping, Cause::Launch).facing(facing));
    }

    // Movies bypass the dwell clock in both directions, except that a
    // character just startled awake stays up for a full dwell.
    let startled = c
        .last_transition()
        .is_some_and(|t| t.cause == Cause::WokeByOcclusion)
        && c.time_in_state(s.now_ms) < config.min_state_ms;
    if s.movie_playing && state.can_watch_movie() && !startled {
        return Some(Decision::to(BehaviorState::WatchingMovie, Cause::DetectMovie));
    }
    if !s.movie_playing && state == BehaviorState::WatchingMovie {
        return Some(Decision::to(BehaviorState::Idle, Cause::MovieEnd));
    }

    if c.time_in_state(s.now_ms) < config.min_state_ms {
        return None;
    }

    let r = rng.random_range(0..config.probability_scale);
    match state {
        BehaviorState::Idle => {
            if r < config.idle_walk_threshold {
                let facing = if rng.random_bool(0.5) {
                    Facing::Right
                } else {
                    Facing::Left
                };
                Some(Decision::to(BehaviorState::Walking, Cause::AiWalk).facing(facing))
            } else if r < config.idle_sit_threshold {
                Some(Decision::to(BehaviorState::Sitting, Cause::AiSit))
            } else if r < config.idle_sleep_threshold {
                Some(Decision::to(BehaviorState::Sleeping, Cause::AiSleep))
            } else {
                consider_jump(s, rng)
            }
        }
        BehaviorState::Walking if r < config.stop_walking_chance => {
            Some(Decision::to(BehaviorState::Idle, Cause::StopWalk))
        }
        BehaviorState::Sitting if r < config.stand_up_chance => {
            Some(Decision::to(BehaviorState::Idle, Cause::StandUp))
        }
        BehaviorState::Sleeping if r < config.wake_up_chance => {
            Some(Decision::to(BehaviorState::Idle, Cause::WakeUp))
        }
        _ => None,
    }
}

fn consider_jump<R: Rng + ?Sized>(s: &Situation<'_>, rng: &mut R) -> Option<Decision> {
    if rng.random_range(0..s.config.probability_scale) >= s.config.jump_check_chance {
        return None;
    }
    let target = targeting::find_target(s.character.position, s.env, s.config, rng)?;
    Some(Decision::to(BehaviorState::PrepareJump, Cause::LedgeFound).leap_target(target))
}
