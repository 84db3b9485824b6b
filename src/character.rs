use std::fmt;

use bevy::log::info;
use bevy::math::Vec2;

use crate::behavior::{BehaviorState, Cause};
use crate::presentation::Clip;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    /// Face from `from_x` toward `to_x`; anything not strictly to the right
    /// counts as left.
    pub fn toward(from_x: f32, to_x: f32) -> Self {
        if to_x > from_x {
            Facing::Right
        } else {
            Facing::Left
        }
    }
}

/// Renderer's position within the current state's animation.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct FrameCursor {
    pub index: usize,
    pub last_advance_ms: u64,
}

impl FrameCursor {
    fn reset(&mut self, now_ms: u64) {
        self.index = 0;
        self.last_advance_ms = now_ms;
    }

    /// Step to the next frame once the clip's frame time has passed.
    pub fn advance(&mut self, now_ms: u64, clip: &Clip) {
        if clip.frames == 0 {
            self.index = 0;
            return;
        }
        if self.index >= clip.frames {
            self.index = 0;
        }
        if now_ms.saturating_sub(self.last_advance_ms) > clip.ms_per_frame {
            self.index = (self.index + 1) % clip.frames;
            self.last_advance_ms = now_ms;
        }
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Transition {
    pub from: BehaviorState,
    pub to: BehaviorState,
    pub cause: Cause,
    pub at_ms: u64,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} ({})", self.from, self.to, self.cause)
    }
}

/// The buddy. `position` is the foot point: x is the horizontal center,
/// y is the bottom of the sprite.
#[derive(Clone, Debug)]
pub struct Character {
    pub position: Vec2,
    /// Units per tick.
    pub velocity: Vec2,
    pub facing: Facing,
    state: BehaviorState,
    state_since_ms: u64,
    frame: FrameCursor,
    leap_target: Option<Vec2>,
    last_transition: Option<Transition>,
}

impl Character {
    pub fn new(position: Vec2, state: BehaviorState) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            facing: Facing::Right,
            state,
            state_since_ms: 0,
            frame: FrameCursor::default(),
            leap_target: None,
            last_transition: None,
        }
    }

    pub fn state(&self) -> BehaviorState {
        self.state
    }

    pub fn state_since_ms(&self) -> u64 {
        self.state_since_ms
    }

    pub fn time_in_state(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.state_since_ms)
    }

    pub fn frame(&self) -> FrameCursor {
        self.frame
    }

    pub fn advance_frame(&mut self, now_ms: u64, clip: &Clip) {
        self.frame.advance(now_ms, clip);
    }

    /// Only meaningful while preparing or performing a leap.
    pub fn leap_target(&self) -> Option<Vec2> {
        self.leap_target
    }

    pub fn set_leap_target(&mut self, target: Vec2) {
        self.leap_target = Some(target);
    }

    pub fn last_transition(&self) -> Option<Transition> {
        self.last_transition
    }

    /// Enter `to`, resetting the state clock and the animation cursor.
    /// Returns false (and does nothing) if already in `to`.
    pub fn change_state(&mut self, to: BehaviorState, cause: Cause, now_ms: u64) -> bool {
        if self.state == to {
            return false;
        }
        let transition = Transition {
            from: self.state,
            to,
            cause,
            at_ms: now_ms,
        };
        info!("[STATE] {transition}");

        self.state = to;
        self.state_since_ms = now_ms;
        self.frame.reset(now_ms);
        if !matches!(to, BehaviorState::PrepareJump | BehaviorState::Leaping) {
            self.leap_target = None;
        }
        self.last_transition = Some(transition);
        true
    }
}
