use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Tuning knobs for the simulation. Distances are screen units, times are
/// milliseconds, velocities are units per tick. Probabilities are integers
/// drawn against `probability_scale`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // ===== Physics =====
    pub tick_ms: u64,
    pub gravity: f32,
    pub max_fall_speed: f32,
    pub walk_speed: f32,
    pub leap_speed: f32,

    // ===== AI (cumulative thresholds out of probability_scale) =====
    pub probability_scale: u32,
    pub idle_walk_threshold: u32,
    pub idle_sit_threshold: u32,
    pub idle_sleep_threshold: u32,
    pub stop_walking_chance: u32,
    pub stand_up_chance: u32,
    pub wake_up_chance: u32,

    // ===== Jumping =====
    pub jump_check_chance: u32,
    /// Percent chance of preferring a ledge above the character.
    pub jump_up_bias: u32,
    /// Search radius as a fraction of the smallest monitor dimension.
    pub jump_range_fraction: f32,
    /// PREPARE_JUMP launches on a 1-in-N draw each tick.
    pub launch_chance_denominator: u32,
    pub min_jump_height: f32,
    pub ceiling_margin: f32,
    /// Smallest-dimension stand-in when there are no monitors.
    pub fallback_min_dimension: f32,

    // ===== Timing =====
    pub min_state_ms: u64,

    // ===== Contact tolerances =====
    pub landing_margin: f32,
    pub landing_edge_inset: f32,
    pub elevator_rise_tolerance: f32,
    pub elevator_fall_tolerance: f32,
    pub floor_tolerance: f32,
    pub head_probe_offset: f32,
    pub walk_probe_offset: f32,
    pub startle_nudge: f32,

    pub movie_markers: Vec<String>,
    pub presentation: PresentationConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_ms: 33,
            gravity: 3.0,
            max_fall_speed: 25.0,
            walk_speed: 4.0,
            leap_speed: 25.0,

            probability_scale: 10_000,
            idle_walk_threshold: 150,
            idle_sit_threshold: 300,
            idle_sleep_threshold: 350,
            stop_walking_chance: 100,
            stand_up_chance: 50,
            wake_up_chance: 5,

            jump_check_chance: 500,
            jump_up_bias: 70,
            jump_range_fraction: 0.20,
            launch_chance_denominator: 15,
            min_jump_height: 30.0,
            ceiling_margin: 50.0,
            fallback_min_dimension: 10_000.0,

            min_state_ms: 2000,

            landing_margin: 15.0,
            landing_edge_inset: 10.0,
            elevator_rise_tolerance: 5.0,
            elevator_fall_tolerance: 15.0,
            floor_tolerance: 10.0,
            head_probe_offset: 20.0,
            walk_probe_offset: 10.0,
            startle_nudge: 10.0,

            movie_markers: vec!["youtube".into(), "netflix".into()],
            presentation: PresentationConfig::default(),
        }
    }
}

/// Cosmetic parameters consumed by the renderer only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationConfig {
    pub breath_depth: f32,
    pub breath_period_ms: f32,
    /// Sprite height as a divisor of the monitor height.
    pub sprite_height_divisor: u32,
    pub max_upscale: u32,

    pub ms_walk: u64,
    pub ms_idle: u64,
    pub ms_sit: u64,
    pub ms_sleep: u64,
    pub ms_movie: u64,
    pub ms_jump_prep: u64,
    pub ms_air: u64,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            breath_depth: 3.0,
            breath_period_ms: 400.0,
            sprite_height_divisor: 8,
            max_upscale: 6,

            ms_walk: 150,
            ms_idle: 800,
            ms_sit: 1000,
            ms_sleep: 2000,
            ms_movie: 1500,
            ms_jump_prep: 500,
            ms_air: 50,
        }
    }
}

impl SimConfig {
    /// Read a JSON file. Missing fields keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: SimConfig =
            serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid =
            |msg: &str| -> Result<(), ConfigError> { Err(ConfigError::Invalid(msg.to_string())) };

        if self.tick_ms == 0 {
            return invalid("tick_ms must be positive");
        }
        if self.gravity <= 0.0 || self.max_fall_speed <= 0.0 {
            return invalid("gravity and max_fall_speed must be positive");
        }
        if self.walk_speed <= 0.0 || self.leap_speed <= 0.0 {
            return invalid("walk_speed and leap_speed must be positive");
        }
        if self.probability_scale == 0 {
            return invalid("probability_scale must be positive");
        }
        if !(self.idle_walk_threshold <= self.idle_sit_threshold
            && self.idle_sit_threshold <= self.idle_sleep_threshold
            && self.idle_sleep_threshold <= self.probability_scale)
        {
            return invalid("idle thresholds must be ordered walk <= sit <= sleep <= scale");
        }
        let chances = [
            self.stop_walking_chance,
            self.stand_up_chance,
            self.wake_up_chance,
            self.jump_check_chance,
        ];
        if chances.iter().any(|&c| c > self.probability_scale) {
            return invalid("chances must not exceed probability_scale");
        }
        if self.jump_up_bias > 100 {
            return invalid("jump_up_bias is a percentage");
        }
        if !(self.jump_range_fraction > 0.0 && self.jump_range_fraction <= 1.0) {
            return invalid("jump_range_fraction must be in (0, 1]");
        }
        if self.launch_chance_denominator == 0 {
            return invalid("launch_chance_denominator must be at least 1");
        }
        let p = &self.presentation;
        if p.breath_period_ms <= 0.0 || p.sprite_height_divisor == 0 || p.max_upscale == 0 {
            return invalid("presentation periods and scales must be positive");
        }
        Ok(())
    }
}
