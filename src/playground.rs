//! Scripted stand-in for the host's window enumeration: a fixed list of
//! virtual windows, optionally bobbing around, rebuilt every tick.

use std::f32::consts::TAU;
use std::path::Path;

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::environment::{EnvironmentProvider, WindowCandidate, WindowFilter};
use crate::geometry::ScreenRect;

/// Sinusoidal drift around a window's home position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Motion {
    pub amplitude_x: f32,
    pub amplitude_y: f32,
    pub period_ms: u64,
}

impl Motion {
    pub fn offset(&self, now_ms: u64) -> Vec2 {
        if self.period_ms == 0 {
            return Vec2::ZERO;
        }
        let phase = (now_ms % self.period_ms) as f32 / self.period_ms as f32 * TAU;
        Vec2::new(self.amplitude_x, self.amplitude_y) * phase.sin()
    }
}

fn default_visible() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScriptedWindow {
    pub rect: ScreenRect,
    #[serde(default)]
    pub motion: Motion,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub minimized: bool,
}

impl ScriptedWindow {
    pub fn fixed(rect: ScreenRect) -> Self {
        Self {
            rect,
            motion: Motion::default(),
            visible: true,
            minimized: false,
        }
    }

    fn at(&self, now_ms: u64) -> WindowCandidate {
        WindowCandidate {
            rect: self.rect.translated(self.motion.offset(now_ms)),
            visible: self.visible,
            minimized: self.minimized,
            is_self: false,
        }
    }
}

/// On-disk layout: monitors plus windows listed front to back.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    pub monitors: Vec<ScreenRect>,
    pub windows: Vec<ScriptedWindow>,
}

impl Layout {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// A single 1920x1040 work area with a couple of shelves and one
    /// window that rides up and down.
    pub fn demo() -> Self {
        let monitor = ScreenRect::new(0.0, 0.0, 1920.0, 1040.0);
        Self {
            monitors: vec![monitor],
            windows: vec![
                ScriptedWindow::fixed(ScreenRect::new(1100.0, 640.0, 1500.0, 900.0)),
                ScriptedWindow {
                    rect: ScreenRect::new(700.0, 780.0, 1050.0, 1000.0),
                    motion: Motion {
                        amplitude_x: 0.0,
                        amplitude_y: 120.0,
                        period_ms: 12_000,
                    },
                    visible: true,
                    minimized: false,
                },
                ScriptedWindow::fixed(ScreenRect::new(300.0, 860.0, 900.0, 1040.0)),
            ],
        }
    }
}

pub struct Playground {
    layout: Layout,
    filter: WindowFilter,
}

impl Playground {
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            filter: WindowFilter::default(),
        }
    }
}

impl EnvironmentProvider for Playground {
    fn monitors(&mut self) -> Vec<ScreenRect> {
        self.layout.monitors.clone()
    }

    fn platforms(&mut self, now_ms: u64) -> Vec<ScreenRect> {
        self.filter
            .collect(self.layout.windows.iter().map(|w| w.at(now_ms)))
    }
}
