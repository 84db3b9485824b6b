//! Standing, landing and being knocked off.
//!
//! Nothing here remembers last tick's platforms. Support is re-derived
//! from the current snapshot every time, which is what lets a window that
//! moves up under the character carry it like an elevator.

use bevy::math::Vec2;
use rand::Rng;

use crate::behavior::{BehaviorState, Cause};
use crate::character::Character;
use crate::config::SimConfig;
use crate::environment::{Environment, ZCutoff};

/// What the character is standing on this tick.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Support {
    /// A platform, by z-rank in this tick's list.
    Window { rank: usize },
    /// The bottom edge of a monitor work area.
    Floor { monitor: usize },
}

impl Support {
    /// Platforms that may cover the character's head. Windows at or behind
    /// the supporting one never count.
    pub fn head_cutoff(self) -> ZCutoff {
        match self {
            Support::Window { rank } => ZCutoff::Above(rank),
            Support::Floor { .. } => ZCutoff::All,
        }
    }

    pub fn is_floor(self) -> bool {
        matches!(self, Support::Floor { .. })
    }
}

/// Find support for a foot at `foot`, and the y it should snap to.
/// Topmost qualifying window wins; floors are only considered if no
/// window qualifies.
pub fn find_support(foot: Vec2, env: &Environment, config: &SimConfig) -> Option<(Support, f32)> {
    let window = env.platforms().ranked().find(|(rank, r)| {
        r.spans_x(foot.x)
            && foot.y >= r.top - config.elevator_rise_tolerance
            && foot.y <= r.top + config.elevator_fall_tolerance
            && !env.is_obscured(Vec2::new(foot.x, r.top), ZCutoff::Above(*rank))
    });
    if let Some((rank, r)) = window {
        return Some((Support::Window { rank }, r.top));
    }

    env.monitors()
        .iter()
        .enumerate()
        .find(|(_, m)| m.spans_x(foot.x) && (foot.y - m.bottom).abs() < config.floor_tolerance)
        .map(|(monitor, m)| (Support::Floor { monitor }, m.bottom))
}

/// Resolve support for a grounded character: snap to it, then check the
/// head. A covered head startles a dozing character awake and pushes
/// anyone else off a window ledge. Floors are never withdrawn.
///
/// Returns `None` when the character has nothing to stand on.
pub fn resolve<R: Rng + ?Sized>(
    character: &mut Character,
    env: &Environment,
    config: &SimConfig,
    rng: &mut R,
    now_ms: u64,
) -> Option<Support> {
    let (support, snap_y) = find_support(character.position, env, config)?;
    character.position.y = snap_y;

    let head = character.position - Vec2::new(0.0, config.head_probe_offset);
    if !env.is_obscured(head, support.head_cutoff()) {
        return Some(support);
    }

    match character.state() {
        BehaviorState::Sleeping | BehaviorState::WatchingMovie => {
            character.change_state(BehaviorState::Idle, Cause::WokeByOcclusion, now_ms);
            let nudge = if rng.random_bool(0.5) {
                config.startle_nudge
            } else {
                -config.startle_nudge
            };
            character.position.x += nudge;
            Some(support)
        }
        _ if support.is_floor() => Some(support),
        _ => None,
    }
}
