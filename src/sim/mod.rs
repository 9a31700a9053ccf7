//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied frame length only (clamped by the config)
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod actions;
pub mod arena;
pub mod assembly;
pub mod body;
pub mod combat;
pub mod entity;
pub mod physics;
pub mod stats;
pub mod vector;

pub use actions::{Action, ActionTimers};
pub use arena::{Arena, RenderItem, TickReport};
pub use assembly::{
    Archetype, BodyPart, BodySlot, Catalog, CharacterAssembly, Loadout, SpriteLayer,
    cycle_variant,
};
pub use body::{Aabb, Body};
pub use entity::{Entity, EntityId, EntityKind, Hit};
pub use physics::{CollisionOutcome, Resolution};
pub use stats::{CharacterStats, PhysicalStats, ScaledStat, StatOp};
pub use vector::{Vector2, VectorExt};
