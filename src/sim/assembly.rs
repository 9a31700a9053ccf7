//! Body-part catalog and character assembly
//!
//! An [`Archetype`] lists the body-part variants available per slot for one
//! species. A [`Loadout`] picks one variant per slot. A [`CharacterAssembly`]
//! pairs the two and composes the character's stats and sprite layers from
//! the selected parts, always from scratch.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::stats::CharacterStats;
use super::vector::Vector2;
use crate::error::AssemblyError;

/// Where sprite files for body parts live, relative to the asset root
pub const PART_SPRITE_DIR: &str = "images/character_parts/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BodySlot {
    Core,
    Shell,
    Legs,
    Body,
}

impl BodySlot {
    /// Composition order
    pub const ALL: [BodySlot; 4] = [BodySlot::Core, BodySlot::Shell, BodySlot::Legs, BodySlot::Body];

    pub fn as_str(&self) -> &'static str {
        match self {
            BodySlot::Core => "core",
            BodySlot::Shell => "shell",
            BodySlot::Legs => "legs",
            BodySlot::Body => "body",
        }
    }

    /// The base body draws first, everything else on top of it
    pub fn draw_order(&self) -> u8 {
        match self {
            BodySlot::Body => 1,
            _ => 2,
        }
    }
}

impl fmt::Display for BodySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One body-part variant; immutable once in a catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyPart {
    pub slot: BodySlot,
    /// Opaque sprite reference resolved by the asset layer
    pub sprite: String,
    /// Sprite offset from the character center
    pub offset: Vector2,
    pub stats: CharacterStats,
    pub draw_order: u8,
}

impl BodyPart {
    pub fn new(slot: BodySlot, sprite: &str, offset: Vector2, stats: CharacterStats) -> Self {
        Self {
            slot,
            sprite: format!("{PART_SPRITE_DIR}{sprite}"),
            offset,
            stats,
            draw_order: slot.draw_order(),
        }
    }
}

/// Sprite layer for rendering a character
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpriteLayer {
    pub slot: BodySlot,
    pub sprite: String,
    pub offset: Vector2,
    pub draw_order: u8,
}

/// A named catalog of body-part variants per slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Archetype {
    pub name: String,
    /// Collision box of characters of this species
    pub hitbox: Vector2,
    parts: BTreeMap<BodySlot, Vec<BodyPart>>,
}

impl Archetype {
    pub fn new(name: &str, hitbox: Vector2) -> Self {
        Self {
            name: name.to_string(),
            hitbox,
            parts: BTreeMap::new(),
        }
    }

    /// Append a variant to its slot; its stats must be usable by the stat algebra
    pub fn add_part(&mut self, part: BodyPart) -> Result<(), AssemblyError> {
        part.stats.validate()?;
        self.parts.entry(part.slot).or_default().push(part);
        Ok(())
    }

    pub fn with_part(mut self, part: BodyPart) -> Result<Self, AssemblyError> {
        self.add_part(part)?;
        Ok(self)
    }

    pub fn variants(&self, slot: BodySlot) -> &[BodyPart] {
        self.parts.get(&slot).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn variant_count(&self, slot: BodySlot) -> usize {
        self.variants(slot).len()
    }

    /// Look up one variant, or say why it does not exist
    pub fn part(&self, slot: BodySlot, index: usize) -> Result<&BodyPart, AssemblyError> {
        let variants = self.variants(slot);
        if variants.is_empty() {
            return Err(AssemblyError::MissingSlot(slot));
        }
        variants.get(index).ok_or(AssemblyError::VariantOutOfRange {
            slot,
            index,
            available: variants.len(),
        })
    }

    /// Shared base core: no stats of its own, neutral scales
    fn base_core() -> BodyPart {
        BodyPart::new(
            BodySlot::Core,
            "core1.png",
            Vector2::ZERO,
            CharacterStats::default(),
        )
    }

    pub fn green_bacteria() -> Result<Self, AssemblyError> {
        let hp = |raw| CharacterStats::default().with_max_hp(raw);
        Archetype::new("GreenBacteria", Vector2::new(16.0, 16.0))
            .with_part(Self::base_core())?
            .with_part(BodyPart::new(
                BodySlot::Body,
                "GB_body1.png",
                Vector2::ZERO,
                hp(100.0).with_mass(10.0),
            ))?
            .with_part(BodyPart::new(
                BodySlot::Body,
                "GB_body2.png",
                Vector2::ZERO,
                hp(140.0).with_mass(16.0).with_hp_regen(0.001),
            ))?
            .with_part(BodyPart::new(
                BodySlot::Legs,
                "GB_legs1.png",
                Vector2::new(0.0, 4.0),
                CharacterStats::default().with_speed(0.1),
            ))?
            .with_part(BodyPart::new(
                BodySlot::Shell,
                "GB_shell1.png",
                Vector2::ZERO,
                hp(50.0),
            ))?
            .with_part(BodyPart::new(
                BodySlot::Shell,
                "GB_shell2.png",
                Vector2::ZERO,
                hp(30.0).with_damage(1.0),
            ))?
            .with_part(BodyPart::new(
                BodySlot::Shell,
                "GB_shell3.png",
                Vector2::ZERO,
                hp(10.0).with_damage(2.0).with_friction(0.01),
            ))
    }

    pub fn red_bacteria() -> Result<Self, AssemblyError> {
        let hp = |raw| CharacterStats::default().with_max_hp(raw);
        Archetype::new("RedBacteria", Vector2::new(12.0, 12.0))
            .with_part(Self::base_core())?
            .with_part(BodyPart::new(
                BodySlot::Core,
                "core2.png",
                Vector2::ZERO,
                CharacterStats::default()
                    .with_hp_scale(0.8)
                    .with_speed_scale(1.25),
            ))?
            .with_part(BodyPart::new(
                BodySlot::Body,
                "RB_body1.png",
                Vector2::ZERO,
                hp(50.0).with_mass(6.0),
            ))?
            .with_part(BodyPart::new(
                BodySlot::Legs,
                "RB_legs1.png",
                Vector2::new(0.0, 3.0),
                CharacterStats::default().with_speed(0.2),
            ))?
            .with_part(BodyPart::new(
                BodySlot::Shell,
                "RB_shell1.png",
                Vector2::ZERO,
                hp(10.0).with_damage(1.0),
            ))
    }
}

/// All built-in archetypes, built once and shared read-only
#[derive(Debug, Clone)]
pub struct Catalog {
    archetypes: BTreeMap<String, Arc<Archetype>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            archetypes: BTreeMap::new(),
        }
    }

    pub fn builtin() -> Result<Self, AssemblyError> {
        let mut catalog = Self::new();
        catalog.insert(Archetype::green_bacteria()?);
        catalog.insert(Archetype::red_bacteria()?);
        Ok(catalog)
    }

    pub fn insert(&mut self, archetype: Archetype) {
        self.archetypes
            .insert(archetype.name.clone(), Arc::new(archetype));
    }

    pub fn get(&self, name: &str) -> Result<Arc<Archetype>, AssemblyError> {
        self.archetypes
            .get(name)
            .cloned()
            .ok_or_else(|| AssemblyError::UnknownArchetype(name.to_string()))
    }

    /// Archetype names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.archetypes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.archetypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archetypes.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

/// Selected variant index per slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loadout {
    selected: BTreeMap<BodySlot, usize>,
}

impl Default for Loadout {
    /// First variant in every slot
    fn default() -> Self {
        Self {
            selected: BodySlot::ALL.iter().map(|slot| (*slot, 0)).collect(),
        }
    }
}

impl Loadout {
    pub fn with(mut self, slot: BodySlot, index: usize) -> Self {
        self.selected.insert(slot, index);
        self
    }

    pub fn get(&self, slot: BodySlot) -> usize {
        self.selected.get(&slot).copied().unwrap_or(0)
    }

    /// Every selected index must exist in the archetype
    pub fn validate(&self, archetype: &Archetype) -> Result<(), AssemblyError> {
        for slot in BodySlot::ALL {
            archetype.part(slot, self.get(slot))?;
        }
        Ok(())
    }
}

/// Wraparound step through `count` variants, for menus cycling a slot
///
/// The core never wraps; menus apply this before calling
/// [`CharacterAssembly::change_part`].
pub fn cycle_variant(current: usize, count: usize, step: isize) -> usize {
    if count == 0 {
        return 0;
    }
    let count = count as isize;
    (current as isize + step).rem_euclid(count) as usize
}

/// An archetype plus the loadout chosen from it
#[derive(Debug, Clone)]
pub struct CharacterAssembly {
    archetype: Arc<Archetype>,
    loadout: Loadout,
}

impl CharacterAssembly {
    pub fn new(archetype: Arc<Archetype>, loadout: Loadout) -> Result<Self, AssemblyError> {
        loadout.validate(&archetype)?;
        Ok(Self { archetype, loadout })
    }

    pub fn archetype(&self) -> &Archetype {
        &self.archetype
    }

    pub fn loadout(&self) -> &Loadout {
        &self.loadout
    }

    fn selected(&self) -> impl Iterator<Item = &BodyPart> {
        BodySlot::ALL.into_iter().filter_map(move |slot| {
            self.archetype.variants(slot).get(self.loadout.get(slot))
        })
    }

    /// Identity stats plus every selected part, in slot order
    pub fn composed_stats(&self) -> CharacterStats {
        self.selected()
            .fold(CharacterStats::default(), |acc, part| acc + part.stats)
    }

    /// Select another variant for a slot; out-of-range indices are rejected
    pub fn change_part(&mut self, slot: BodySlot, index: usize) -> Result<(), AssemblyError> {
        self.archetype.part(slot, index)?;
        self.loadout.selected.insert(slot, index);
        Ok(())
    }

    /// Sprite layers of the selected parts, lowest draw order first
    pub fn sprites(&self) -> Vec<SpriteLayer> {
        let mut layers: Vec<SpriteLayer> = self
            .selected()
            .map(|part| SpriteLayer {
                slot: part.slot,
                sprite: part.sprite.clone(),
                offset: part.offset,
                draw_order: part.draw_order,
            })
            .collect();
        // stable: equal draw orders keep slot order
        layers.sort_by_key(|layer| layer.draw_order);
        layers
    }
}
