//! Error types
//!
//! Only configuration and data errors live here. Numerical edge cases in the
//! physics step (resting bodies, coincident centers, zero vectors) are handled
//! with fallback values and never surface as errors.

use thiserror::Error;

use crate::sim::assembly::BodySlot;

/// A stat block that cannot take part in the stat algebra
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatError {
    #[error("stat `{field}` is not finite")]
    NonFinite { field: &'static str },

    #[error("stat `{field}` has non-positive scale {scale}")]
    NonPositiveScale { field: &'static str, scale: f64 },
}

/// Character construction or loadout mutation failed
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssemblyError {
    #[error("unknown archetype `{0}`")]
    UnknownArchetype(String),

    #[error("{slot} variant {index} out of range ({available} available)")]
    VariantOutOfRange {
        slot: BodySlot,
        index: usize,
        available: usize,
    },

    #[error("archetype has no {0} variants")]
    MissingSlot(BodySlot),

    #[error("invalid body part stats: {0}")]
    InvalidStats(#[from] StatError),

    #[error("entity {0} has no body parts")]
    NotACharacter(u32),

    #[error("entity id {0} is already in use")]
    DuplicateId(u32),
}

/// Simulation config could not be loaded
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("config value `{name}` = {value} is out of range")]
    OutOfRange { name: &'static str, value: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = AssemblyError::VariantOutOfRange {
            slot: BodySlot::Shell,
            index: 3,
            available: 3,
        };
        assert_eq!(err.to_string(), "shell variant 3 out of range (3 available)");

        let err: AssemblyError = StatError::NonFinite { field: "mass" }.into();
        assert_eq!(err.to_string(), "invalid body part stats: stat `mass` is not finite");
    }
}
