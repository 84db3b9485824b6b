use bevy::math::Vec2;
use rand::Rng;

use crate::behavior::{BehaviorState, Cause};
use crate::character::Character;
use crate::config::SimConfig;
use crate::environment::{Environment, ZCutoff};
use crate::support;

/// Advance the character's motion by one tick.
pub fn step<R: Rng + ?Sized>(
    character: &mut Character,
    env: &Environment,
    config: &SimConfig,
    rng: &mut R,
    now_ms: u64,
) {
    match character.state() {
        BehaviorState::Falling => fall(character, env, config, now_ms),
        BehaviorState::Leaping => leap(character, config, now_ms),
        // wind-up; the behavior machine decides when to launch
        BehaviorState::PrepareJump => {}
        _ => grounded(character, env, config, rng, now_ms),
    }
}

fn fall(character: &mut Character, env: &Environment, config: &SimConfig, now_ms: u64) {
    character.position.y += character.velocity.y;
    character.velocity.y = (character.velocity.y + config.gravity).min(config.max_fall_speed);

    if character.velocity.y <= 0.0 {
        return;
    }

    let Vec2 { x, y } = character.position;
    let vy = character.velocity.y;

    // A window top anywhere between here and one tick back (plus margin)
    // was crossed this tick. The spot must be one the character could
    // stand on: foot and head both clear of nearer windows.
    let landing = env.platforms().ranked().find(|(rank, r)| {
        let cutoff = ZCutoff::Above(*rank);
        x >= r.left + config.landing_edge_inset
            && x <= r.right - config.landing_edge_inset
            && y >= r.top
            && y <= r.top + vy + config.landing_margin
            && !env.is_obscured(Vec2::new(x, r.top), cutoff)
            && !env.is_obscured(Vec2::new(x, r.top - config.head_probe_offset), cutoff)
    });
    if let Some((_, r)) = landing {
        land(character, r.top, Cause::LandedWindow, now_ms);
        return;
    }

    if let Some(m) = env.monitors().iter().find(|m| m.spans_x(x) && y >= m.bottom) {
        land(character, m.bottom, Cause::LandedFloor, now_ms);
    }
}

fn land(character: &mut Character, y: f32, cause: Cause, now_ms: u64) {
    character.position.y = y;
    character.velocity = Vec2::ZERO;
    character.change_state(BehaviorState::Idle, cause, now_ms);
}

/// Straight-line travel toward the leap target at constant speed.
fn leap(character: &mut Character, config: &SimConfig, now_ms: u64) {
    let target = character.leap_target().unwrap_or(character.position);
    let to_target = target - character.position;
    let remaining = to_target.length();

    if remaining <= config.leap_speed {
        character.position = target;
        character.velocity = Vec2::ZERO;
        character.change_state(BehaviorState::Idle, Cause::JumpArrived, now_ms);
    } else {
        let step = to_target / remaining * config.leap_speed;
        character.velocity = step;
        character.position += step;
    }
}

fn grounded<R: Rng + ?Sized>(
    character: &mut Character,
    env: &Environment,
    config: &SimConfig,
    rng: &mut R,
    now_ms: u64,
) {
    if support::resolve(character, env, config, rng, now_ms).is_none() {
        character.change_state(BehaviorState::Falling, Cause::NoSupport, now_ms);
        return;
    }
    if character.state() != BehaviorState::Walking {
        return;
    }

    // Windows never stop a walk; only running out of monitor does.
    let next_x = character.position.x + config.walk_speed * character.facing.sign();
    let probe = Vec2::new(next_x, character.position.y - config.walk_probe_offset);
    if env.in_any_monitor(probe) {
        character.position.x = next_x;
    } else {
        character.change_state(BehaviorState::Idle, Cause::ScreenEdge, now_ms);
    }
}
