//! A desktop buddy that treats monitor edges as floors and other windows
//! as platforms: it falls, lands, walks, naps and leaps between ledges.
//!
//! The crate is the simulation core plus renderer-side helpers. Window
//! enumeration, compositing and the tick timer belong to the host.

pub mod behavior;
pub mod character;
pub mod config;
pub mod environment;
pub mod geometry;
pub mod movie;
pub mod physics;
pub mod playground;
pub mod presentation;
pub mod simulation;
pub mod support;
pub mod targeting;

pub use behavior::{BehaviorState, Cause};
pub use character::{Character, Facing};
pub use config::{ConfigError, SimConfig};
pub use environment::{Environment, EnvironmentProvider, Platforms, ZCutoff};
pub use geometry::ScreenRect;
pub use simulation::{Simulation, Snapshot, TickInput, TickOutcome};
