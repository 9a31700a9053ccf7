//! Evolution - a top-down cell survival arcade game
//!
//! Core modules:
//! - `sim`: Simulation (vector maths, stat algebra, AABB physics, contact combat,
//!   body-part assembly, the arena entity layer)
//! - `settings`: Explicit simulation configuration
//! - `error`: Error types for configuration and assembly failures
//!
//! Rendering, camera, menus and keyboard mapping live outside this crate. They
//! build entities, call [`sim::Arena::tick`] once per frame and read back the
//! render snapshot.

pub mod error;
pub mod settings;
pub mod sim;

pub use error::{AssemblyError, ConfigError, StatError};
pub use settings::{PhysicsPreset, SimulationConfig};

/// Default tuning constants (world units and milliseconds)
pub mod consts {
    /// Target frame rate of the game loop
    pub const FPS: u32 = 40;
    /// Frame length at the target frame rate (ms)
    pub const FRAME_MS: f64 = 1000.0 / FPS as f64;
    /// Longest frame the simulation will integrate in one step (ms)
    pub const MAX_FRAME_MS: f64 = 100.0;

    /// Velocity magnitude ceiling (units/ms), prevents tunneling
    pub const MAX_SPEED: f64 = 0.2;
    /// Speed at which still-overlapping bodies are pushed apart
    pub const SEPARATION_SPEED: f64 = MAX_SPEED * 0.1;
    /// Global friction applied to every moving body each tick
    pub const FRICTION_COEFFICIENT: f64 = 0.02;
    /// Velocities at or below this magnitude are treated as rest
    pub const VELOCITY_EPSILON: f64 = 0.001;
    /// Share of velocity lost when bouncing off a static body
    pub const ENERGY_ABSORPTION: f64 = 0.2;
    /// Numerator of the repulsion magnitude
    pub const REPULSION_FORCE: f64 = 1.0;
    /// Distance floor of the repulsion magnitude
    pub const MIN_REPULSION_DISTANCE: f64 = 1.0;
    /// Lower bound on the repulsion magnitude before it is scaled by separation speed
    pub const MIN_REPULSION: f64 = 0.1;

    /// Immunity window after taking damage (ms)
    pub const INVULNERABILITY_MS: f64 = 500.0;

    /// Mass of a body that does not say otherwise
    pub const DEFAULT_MASS: f64 = 10.0;
    /// Movement speed of a body that does not say otherwise
    pub const DEFAULT_SPEED: f64 = MAX_SPEED * 0.5;
}

/// Normalized angle to [0, 2π)
#[inline]
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(std::f64::consts::TAU);
    // rem_euclid can round up to TAU for tiny negative inputs
    if wrapped >= std::f64::consts::TAU {
        0.0
    } else {
        wrapped
    }
}
