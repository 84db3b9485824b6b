use bevy::log::debug;
use bevy::math::Vec2;

use crate::geometry::ScreenRect;

/// How much of the z-ordered platform list an occlusion query looks at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZCutoff {
    /// Every platform counts.
    All,
    /// Only platforms with a rank strictly less than this one.
    Above(usize),
}

/// Window rectangles for a single tick, front to back. Index is z-rank
/// (0 = topmost). Rebuilt from scratch every tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Platforms(Vec<ScreenRect>);

impl Platforms {
    pub fn new(front_to_back: Vec<ScreenRect>) -> Self {
        Self(front_to_back)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, rank: usize) -> Option<&ScreenRect> {
        self.0.get(rank)
    }

    /// `(rank, rect)` pairs, topmost first.
    pub fn ranked(&self) -> impl Iterator<Item = (usize, &ScreenRect)> {
        self.0.iter().enumerate()
    }

    /// True if a platform in front of `cutoff` covers `p`.
    pub fn is_obscured(&self, p: Vec2, cutoff: ZCutoff) -> bool {
        let limit = match cutoff {
            ZCutoff::All => self.0.len(),
            ZCutoff::Above(rank) => rank.min(self.0.len()),
        };
        self.0[..limit].iter().any(|r| r.contains(p))
    }
}

/// Everything the simulation can see: monitor work areas and this tick's
/// platforms.
#[derive(Clone, Debug, Default)]
pub struct Environment {
    monitors: Vec<ScreenRect>,
    platforms: Platforms,
}

impl Environment {
    pub fn new(monitors: Vec<ScreenRect>) -> Self {
        Self {
            monitors,
            platforms: Platforms::default(),
        }
    }

    pub fn monitors(&self) -> &[ScreenRect] {
        &self.monitors
    }

    pub fn platforms(&self) -> &Platforms {
        &self.platforms
    }

    /// Swap in a whole new monitor layout.
    pub fn replace_monitors(&mut self, monitors: Vec<ScreenRect>) {
        self.monitors = monitors;
    }

    pub fn replace_platforms(&mut self, platforms: Platforms) {
        self.platforms = platforms;
    }

    pub fn is_obscured(&self, p: Vec2, cutoff: ZCutoff) -> bool {
        self.platforms.is_obscured(p, cutoff)
    }

    pub fn in_any_monitor(&self, p: Vec2) -> bool {
        self.monitors.iter().any(|m| m.contains(p))
    }

    /// Smallest width or height over all monitors.
    pub fn smallest_monitor_dimension(&self) -> Option<f32> {
        self.monitors
            .iter()
            .flat_map(|m| [m.width(), m.height()])
            .reduce(f32::min)
    }
}

/// Source of monitors and platforms. Implemented by the host.
pub trait EnvironmentProvider {
    fn monitors(&mut self) -> Vec<ScreenRect>;

    /// This tick's platforms in strict front-to-back order, already filtered.
    fn platforms(&mut self, now_ms: u64) -> Vec<ScreenRect>;
}

/// A top-level window as reported by the host, before filtering.
#[derive(Clone, Debug, PartialEq)]
pub struct WindowCandidate {
    pub rect: ScreenRect,
    pub visible: bool,
    pub minimized: bool,
    /// The character's own window.
    pub is_self: bool,
}

impl WindowCandidate {
    pub fn visible(rect: ScreenRect) -> Self {
        Self {
            rect,
            visible: true,
            minimized: false,
            is_self: false,
        }
    }
}

/// Drops windows that should never act as terrain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindowFilter {
    pub min_width: f32,
    pub min_height: f32,
    /// Parked-offscreen windows report coordinates below this.
    pub offscreen_sentinel: f32,
}

impl Default for WindowFilter {
    fn default() -> Self {
        Self {
            min_width: 200.0,
            min_height: 100.0,
            offscreen_sentinel: -30_000.0,
        }
    }
}

impl WindowFilter {
    pub fn accepts(&self, w: &WindowCandidate) -> bool {
        if w.is_self || !w.visible || w.minimized {
            return false;
        }
        let r = &w.rect;
        if r.width() < self.min_width || r.height() < self.min_height {
            return false;
        }
        !(r.bottom < self.offscreen_sentinel || r.right < self.offscreen_sentinel)
    }

    /// Filter a front-to-back window list, keeping its order.
    pub fn collect<I>(&self, windows: I) -> Vec<ScreenRect>
    where
        I: IntoIterator<Item = WindowCandidate>,
    {
        windows
            .into_iter()
            .filter(|w| {
                let keep = self.accepts(w);
                if !keep {
                    debug!("skipping window {:?}", w.rect);
                }
                keep
            })
            .map(|w| w.rect)
            .collect()
    }
}
