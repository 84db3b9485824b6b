//! Renderer-side helpers. Nothing here feeds back into the simulation.

use bevy::math::Vec2;

use crate::behavior::BehaviorState;
use crate::config::PresentationConfig;

// ===== Sprite sheet layout (buddy.png) =====
pub const SHEET_COLS: usize = 4;
pub const SHEET_ROWS: usize = 7;

pub const ROW_IDLE: usize = 0;
pub const ROW_WALK: usize = 1;
pub const ROW_SIT: usize = 2; // also the jump wind-up
pub const ROW_SLEEP: usize = 3;
pub const ROW_FALL: usize = 4;
pub const ROW_JUMP: usize = 5;
pub const ROW_MOVIE: usize = 6; // popcorn

pub const ROW_FRAMES: [usize; SHEET_ROWS] = [2, 4, 2, 3, 2, 4, 2];

/// One row of the sheet played at a fixed rate.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Clip {
    pub row: usize,
    pub frames: usize,
    pub ms_per_frame: u64,
}

pub fn clip_for(state: BehaviorState, p: &PresentationConfig) -> Clip {
    let (row, ms_per_frame) = match state {
        BehaviorState::Idle => (ROW_IDLE, p.ms_idle),
        BehaviorState::Walking => (ROW_WALK, p.ms_walk),
        BehaviorState::Sitting => (ROW_SIT, p.ms_sit),
        BehaviorState::Sleeping => (ROW_SLEEP, p.ms_sleep),
        BehaviorState::Falling => (ROW_FALL, p.ms_air),
        BehaviorState::PrepareJump => (ROW_SIT, p.ms_jump_prep),
        BehaviorState::Leaping => (ROW_JUMP, p.ms_air),
        BehaviorState::WatchingMovie => (ROW_MOVIE, p.ms_movie),
    };
    Clip {
        row,
        frames: ROW_FRAMES[row],
        ms_per_frame,
    }
}

pub fn row_col_to_index(row: usize, col: usize) -> usize {
    row * SHEET_COLS + col
}

/// Slow bob while dozing or watching. Always in `[0, 2 * depth]`.
pub fn breathing_offset(state: BehaviorState, now_ms: u64, p: &PresentationConfig) -> f32 {
    match state {
        BehaviorState::Sleeping | BehaviorState::WatchingMovie => {
            let phase = now_ms as f32 / p.breath_period_ms;
            (phase.sin() * p.breath_depth + p.breath_depth).trunc()
        }
        _ => 0.0,
    }
}

/// On-screen sprite size: an eighth of the screen height, shrinking big
/// frames smoothly and growing small ones by whole multiples.
pub fn sprite_size(frame: Vec2, screen_height: Option<f32>, p: &PresentationConfig) -> Vec2 {
    let screen_h = screen_height.unwrap_or(1080.0);
    let target_h = (screen_h / p.sprite_height_divisor as f32).floor();
    if frame.y <= 0.0 {
        return Vec2::splat(target_h.max(1.0));
    }
    if frame.y > target_h {
        let ratio = target_h / frame.y;
        Vec2::new((frame.x * ratio).floor(), target_h)
    } else {
        let scale = ((target_h / frame.y).floor() as u32).clamp(1, p.max_upscale) as f32;
        frame * scale
    }
}

/// Top-left corner of the sprite for a foot point.
pub fn draw_origin(foot: Vec2, size: Vec2, breathing: f32) -> Vec2 {
    Vec2::new(
        foot.x - (size.x / 2.0).floor(),
        foot.y - size.y + breathing,
    )
}
