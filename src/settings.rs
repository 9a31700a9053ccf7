//! Simulation settings
//!
//! One [`SimulationConfig`] is built up front and passed by reference into the
//! physics and combat steps. Nothing in the simulation reads global state, so
//! several arenas with different tunings can run side by side.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Physics tuning presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PhysicsPreset {
    /// Snappy movement, bouncy walls
    #[default]
    Arcade,
    /// Heavy friction, soft walls
    Sluggish,
}

impl PhysicsPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhysicsPreset::Arcade => "Arcade",
            PhysicsPreset::Sluggish => "Sluggish",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "arcade" => Some(PhysicsPreset::Arcade),
            "sluggish" | "slow" => Some(PhysicsPreset::Sluggish),
            _ => None,
        }
    }

    /// Global friction for this preset
    pub fn friction_coefficient(&self) -> f64 {
        match self {
            PhysicsPreset::Arcade => FRICTION_COEFFICIENT,
            PhysicsPreset::Sluggish => FRICTION_COEFFICIENT * 4.0,
        }
    }

    /// Share of velocity lost on wall bounces
    pub fn energy_absorption(&self) -> f64 {
        match self {
            PhysicsPreset::Arcade => ENERGY_ABSORPTION,
            PhysicsPreset::Sluggish => 0.8,
        }
    }
}

/// Physics and combat tuning for one simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub preset: PhysicsPreset,

    // === Movement ===
    /// Velocity magnitude ceiling (units/ms)
    pub max_speed: f64,
    /// Global friction, summed with each body's own friction then clamped to [0, 1]
    pub friction_coefficient: f64,
    /// Velocities at or below this magnitude are dropped to zero
    pub velocity_epsilon: f64,
    /// Longest frame integrated in one tick (ms)
    pub max_frame_ms: f64,

    // === Collision ===
    /// Share of velocity lost when reflecting off a static body (0 - 1)
    pub energy_absorption: f64,
    /// Numerator of the repulsion magnitude
    pub repulsion_force: f64,
    /// Distance floor used by repulsion
    pub min_repulsion_distance: f64,
    /// Push-apart speed for bodies that still overlap after resolution (units/ms)
    pub separation_speed: f64,

    // === Combat ===
    /// Immunity window after taking a hit (ms)
    pub invulnerability_ms: f64,

    // === Defaults for bodies built without stats ===
    pub default_mass: f64,
    pub default_speed: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            preset: PhysicsPreset::Arcade,

            max_speed: MAX_SPEED,
            friction_coefficient: FRICTION_COEFFICIENT,
            velocity_epsilon: VELOCITY_EPSILON,
            max_frame_ms: MAX_FRAME_MS,

            energy_absorption: ENERGY_ABSORPTION,
            repulsion_force: REPULSION_FORCE,
            min_repulsion_distance: MIN_REPULSION_DISTANCE,
            separation_speed: SEPARATION_SPEED,

            invulnerability_ms: INVULNERABILITY_MS,

            default_mass: DEFAULT_MASS,
            default_speed: DEFAULT_SPEED,
        }
    }
}

impl SimulationConfig {
    /// Create a config from a preset (applies preset defaults)
    pub fn from_preset(preset: PhysicsPreset) -> Self {
        let mut config = Self::default();
        config.apply_preset(preset);
        config
    }

    /// Apply a preset (updates preset-dependent values)
    pub fn apply_preset(&mut self, preset: PhysicsPreset) {
        self.preset = preset;
        self.friction_coefficient = preset.friction_coefficient();
        self.energy_absorption = preset.energy_absorption();
    }

    /// Parse a config from JSON; missing keys keep their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a config from JSON, falling back to defaults on any error
    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Using default simulation config: {}", err);
                Self::default()
            }
        }
    }

    /// Check every value is inside the range the physics step can handle
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("max_speed", self.max_speed),
            ("max_frame_ms", self.max_frame_ms),
            ("min_repulsion_distance", self.min_repulsion_distance),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::OutOfRange { name, value });
            }
        }

        let non_negative = [
            ("friction_coefficient", self.friction_coefficient),
            ("velocity_epsilon", self.velocity_epsilon),
            ("repulsion_force", self.repulsion_force),
            ("separation_speed", self.separation_speed),
            ("invulnerability_ms", self.invulnerability_ms),
            ("default_mass", self.default_mass),
            ("default_speed", self.default_speed),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::OutOfRange { name, value });
            }
        }

        if !(0.0..=1.0).contains(&self.energy_absorption) {
            return Err(ConfigError::OutOfRange {
                name: "energy_absorption",
                value: self.energy_absorption,
            });
        }

        Ok(())
    }

    /// Clamp a wall-clock frame length to what one tick may integrate
    pub fn clamp_frame(&self, dt: f64) -> f64 {
        if dt.is_finite() {
            dt.clamp(0.0, self.max_frame_ms)
        } else {
            0.0
        }
    }
}
