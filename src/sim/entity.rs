//! Entities and the per-entity processing step
//!
//! An entity is a [`Body`] plus a kind tag. The kind decides the collision
//! reaction pipeline:
//! - `Obstacle`: static, never processed, only collided with
//! - `Prop`: `[Physical]`
//! - `Character`: `[Physical, Attack]`
//!
//! Physical separation always runs before damage.

use std::sync::Arc;

use super::actions::{Action, ActionTimers};
use super::assembly::{Archetype, BodySlot, CharacterAssembly, Loadout, SpriteLayer};
use super::body::Body;
use super::combat::{self, Combatant};
use super::physics;
use super::stats::{CharacterStats, PhysicalStats};
use super::vector::Vector2;
use crate::error::AssemblyError;
use crate::settings::SimulationConfig;

pub type EntityId = u32;

/// One step of a collision reaction pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    /// Separate bodies and exchange momentum
    Physical,
    /// Mutual contact damage between characters
    Attack,
}

const BODY_PIPELINE: &[Reaction] = &[Reaction::Physical];
const CHARACTER_PIPELINE: &[Reaction] = &[Reaction::Physical, Reaction::Attack];

/// Character-only state
#[derive(Debug, Clone)]
pub struct Character {
    assembly: CharacterAssembly,
    pub timers: ActionTimers,
}

impl Character {
    pub fn assembly(&self) -> &CharacterAssembly {
        &self.assembly
    }
}

#[derive(Debug, Clone)]
pub enum EntityKind {
    Obstacle,
    Prop,
    Character(Box<Character>),
}

impl EntityKind {
    /// Ordered reactions run for every overlap found while processing
    pub fn pipeline(&self) -> &'static [Reaction] {
        match self {
            EntityKind::Character(_) => CHARACTER_PIPELINE,
            EntityKind::Obstacle | EntityKind::Prop => BODY_PIPELINE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub body: Body,
    pub kind: EntityKind,
}

/// A damage event from one contact
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub attacker: EntityId,
    pub target: EntityId,
    pub damage: f64,
}

/// What happened while processing one entity
#[derive(Debug, Clone, Default)]
pub struct ProcessReport {
    /// Entities overlapping the processed one after it moved
    pub collisions: Vec<EntityId>,
    pub hits: Vec<Hit>,
}

impl Entity {
    /// Static obstacle
    pub fn obstacle(id: EntityId, name: &str, position: Vector2, size: Vector2) -> Self {
        Self {
            id,
            name: name.to_string(),
            body: Body::new(position, size, false, CharacterStats::default()),
            kind: EntityKind::Obstacle,
        }
    }

    /// Movable physics body with no health
    pub fn prop(id: EntityId, name: &str, position: Vector2, size: Vector2, mass: f64) -> Self {
        let stats = CharacterStats {
            physical: PhysicalStats::new(0.0, mass, 0.0),
            ..CharacterStats::default()
        };
        Self {
            id,
            name: name.to_string(),
            body: Body::new(position, size, true, stats),
            kind: EntityKind::Prop,
        }
    }

    /// Character assembled from an archetype; fails if the loadout selects a
    /// variant the archetype does not have
    pub fn new_character(
        id: EntityId,
        archetype: Arc<Archetype>,
        loadout: Loadout,
        position: Vector2,
        name: &str,
    ) -> Result<Self, AssemblyError> {
        let hitbox = archetype.hitbox;
        let assembly = CharacterAssembly::new(archetype, loadout)?;
        let stats = assembly.composed_stats();
        Ok(Self {
            id,
            name: name.to_string(),
            body: Body::new(position, hitbox, true, stats),
            kind: EntityKind::Character(Box::new(Character {
                assembly,
                timers: ActionTimers::new(),
            })),
        })
    }

    pub fn position(&self) -> Vector2 {
        self.body.position
    }

    pub fn size(&self) -> Vector2 {
        self.body.size
    }

    pub fn velocity(&self) -> Vector2 {
        self.body.velocity
    }

    pub fn is_movable(&self) -> bool {
        self.body.movable
    }

    /// Characters exist while their HP is positive; everything else always exists
    pub fn is_exist(&self) -> bool {
        match self.kind {
            EntityKind::Character(_) => combat::is_alive(&self.body.stats),
            EntityKind::Obstacle | EntityKind::Prop => true,
        }
    }

    pub fn as_character(&self) -> Option<&Character> {
        match &self.kind {
            EntityKind::Character(character) => Some(&**character),
            _ => None,
        }
    }

    pub fn as_character_mut(&mut self) -> Option<&mut Character> {
        match &mut self.kind {
            EntityKind::Character(character) => Some(&mut **character),
            _ => None,
        }
    }

    pub fn hp(&self) -> Option<f64> {
        self.as_character().map(|_| self.body.stats.hp())
    }

    pub fn max_hp(&self) -> Option<f64> {
        self.as_character().map(|_| self.body.stats.max_hp())
    }

    /// HP as a fraction of max HP in [0, 1], for health bars
    pub fn health_fraction(&self) -> Option<f64> {
        self.as_character().map(|_| {
            let max = self.body.stats.max_hp();
            if max > 0.0 {
                (self.body.stats.hp() / max).clamp(0.0, 1.0)
            } else {
                0.0
            }
        })
    }

    /// Sprite layers to draw; empty for non-characters
    pub fn body_part_sprites(&self) -> Vec<SpriteLayer> {
        self.as_character()
            .map(|character| character.assembly.sprites())
            .unwrap_or_default()
    }

    /// Swap one body part and recompose stats from scratch
    ///
    /// Current HP carries over, capped at the new max HP.
    pub fn change_body_part(&mut self, slot: BodySlot, index: usize) -> Result<(), AssemblyError> {
        let id = self.id;
        let character = match &mut self.kind {
            EntityKind::Character(character) => character,
            _ => return Err(AssemblyError::NotACharacter(id)),
        };
        character.assembly.change_part(slot, index)?;

        let previous_hp = self.body.stats.hp();
        let mut stats = character.assembly.composed_stats();
        stats.set_hp(previous_hp.min(stats.max_hp()));
        self.body.stats = stats;

        log::info!(
            "{} switched {} to variant {} (hp {:.1}/{:.1})",
            self.name,
            slot,
            index,
            stats.hp(),
            stats.max_hp()
        );
        Ok(())
    }

    /// Start holding a movement action; no-op for non-characters
    pub fn press(&mut self, action: Action) {
        if let Some(character) = self.as_character_mut() {
            character.timers.press(action);
        }
    }

    pub fn release(&mut self, action: Action) {
        if let Some(character) = self.as_character_mut() {
            character.timers.release(action);
        }
    }

    /// Count action and invulnerability timers down by `dt` and regenerate HP
    ///
    /// Runs once per tick for every living character, static ones included,
    /// before any entity is processed.
    pub fn advance_timers(&mut self, dt: f64) {
        if !self.is_exist() {
            return;
        }
        if let EntityKind::Character(character) = &mut self.kind {
            character.timers.advance(dt);
            combat::regenerate(&mut self.body.stats, dt);
        }
    }

    /// Accelerate along the held movement direction
    fn steer(&mut self) {
        if let EntityKind::Character(character) = &self.kind {
            let direction = character.timers.held_direction();
            if direction != Vector2::ZERO {
                self.body.velocity += direction * self.body.stats.physical.speed();
            }
        }
    }
}

/// Indices of entities whose boxes overlap entity `index`, in list order
pub fn find_collisions(entities: &[Entity], index: usize) -> Vec<usize> {
    let Some(entity) = entities.get(index) else {
        return Vec::new();
    };
    let aabb = entity.body.aabb();
    entities
        .iter()
        .enumerate()
        .filter(|(other, candidate)| *other != index && aabb.overlaps(&candidate.body.aabb()))
        .map(|(other, _)| other)
        .collect()
}

/// Two distinct elements of a slice, mutably
fn pair_mut(entities: &mut [Entity], i: usize, j: usize) -> Option<(&mut Entity, &mut Entity)> {
    if i == j || i >= entities.len() || j >= entities.len() {
        return None;
    }
    if i < j {
        let (left, right) = entities.split_at_mut(j);
        Some((&mut left[i], &mut right[0]))
    } else {
        let (left, right) = entities.split_at_mut(i);
        Some((&mut right[0], &mut left[j]))
    }
}

/// Run `pipeline` for one overlapping pair
fn react(
    a: &mut Entity,
    b: &mut Entity,
    pipeline: &[Reaction],
    config: &SimulationConfig,
    dt: f64,
    report: &mut ProcessReport,
) {
    for reaction in pipeline {
        match reaction {
            Reaction::Physical => {
                physics::resolve_collision(&mut a.body, &mut b.body, config, dt);
            }
            Reaction::Attack => {
                let (EntityKind::Character(ca), EntityKind::Character(cb)) =
                    (&mut a.kind, &mut b.kind)
                else {
                    continue;
                };
                let outcome = combat::resolve_attack(
                    &mut Combatant {
                        stats: &mut a.body.stats,
                        timers: &mut ca.timers,
                    },
                    &mut Combatant {
                        stats: &mut b.body.stats,
                        timers: &mut cb.timers,
                    },
                    config,
                );
                if let Some(damage) = outcome.damage_to_b {
                    log::debug!("{} hit {} for {}", a.name, b.name, damage);
                    report.hits.push(Hit {
                        attacker: a.id,
                        target: b.id,
                        damage,
                    });
                }
                if let Some(damage) = outcome.damage_to_a {
                    log::debug!("{} hit {} for {}", b.name, a.name, damage);
                    report.hits.push(Hit {
                        attacker: b.id,
                        target: a.id,
                        damage,
                    });
                }
            }
        }
    }
}

/// Advance entity `index` by `dt` milliseconds against the whole list
///
/// Static and dead entities are skipped. The overlap set is computed once,
/// after movement, and stays fixed while the pipeline runs. Timers are not
/// touched here (see [`Entity::advance_timers`]). Nothing is ever removed
/// here; the list owner drops entities that stopped existing.
pub fn process(
    entities: &mut [Entity],
    index: usize,
    config: &SimulationConfig,
    dt: f64,
) -> ProcessReport {
    let mut report = ProcessReport::default();
    let pipeline = match entities.get_mut(index) {
        Some(entity) if entity.body.movable && entity.is_exist() => {
            entity.steer();
            physics::step_body(&mut entity.body, config, dt);
            entity.kind.pipeline()
        }
        _ => return report,
    };

    for other in find_collisions(entities, index) {
        if let Some((a, b)) = pair_mut(entities, index, other) {
            report.collisions.push(b.id);
            react(a, b, pipeline, config, dt, &mut report);
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::assembly::BodyPart;

    const DT: f64 = 25.0;

    fn green() -> Arc<Archetype> {
        Arc::new(Archetype::green_bacteria().unwrap())
    }

    fn fighter(id: EntityId, x: f64, damage: f64) -> Entity {
        let mut archetype = Archetype::new("Test", Vector2::splat(6.0));
        let body = CharacterStats::default()
            .with_max_hp(10.0)
            .with_mass(10.0)
            .with_damage(damage);
        for (slot, stats) in [
            (BodySlot::Core, CharacterStats::default()),
            (BodySlot::Shell, CharacterStats::default()),
            (BodySlot::Legs, CharacterStats::default()),
            (BodySlot::Body, body),
        ] {
            archetype
                .add_part(BodyPart::new(slot, "part.png", Vector2::ZERO, stats))
                .unwrap();
        }
        Entity::new_character(
            id,
            Arc::new(archetype),
            Loadout::default(),
            Vector2::new(x, 0.0),
            &format!("fighter{id}"),
        )
        .unwrap()
    }

    #[test]
    fn test_pipelines() {
        assert_eq!(EntityKind::Prop.pipeline(), &[Reaction::Physical]);
        assert_eq!(EntityKind::Obstacle.pipeline(), &[Reaction::Physical]);
        let character = fighter(1, 0.0, 1.0);
        assert_eq!(
            character.kind.pipeline(),
            &[Reaction::Physical, Reaction::Attack]
        );
    }

    #[test]
    fn test_new_character() {
        let entity =
            Entity::new_character(7, green(), Loadout::default(), Vector2::new(1.0, 2.0), "hero")
                .unwrap();
        assert_eq!(entity.position(), Vector2::new(1.0, 2.0));
        assert_eq!(entity.size(), Vector2::new(16.0, 16.0));
        assert_eq!(entity.hp(), entity.max_hp());
        assert_eq!(entity.health_fraction(), Some(1.0));
        assert!(entity.is_exist());
        assert_eq!(entity.body_part_sprites().len(), 4);

        let bad = Loadout::default().with(BodySlot::Body, 2);
        assert!(Entity::new_character(8, green(), bad, Vector2::ZERO, "ghost").is_err());
    }

    #[test]
    fn test_non_characters() {
        let wall = Entity::obstacle(1, "wall", Vector2::ZERO, Vector2::ONE);
        assert!(wall.is_exist());
        assert_eq!(wall.hp(), None);
        assert!(wall.body_part_sprites().is_empty());

        let mut crate_entity = Entity::prop(2, "crate", Vector2::ZERO, Vector2::ONE, 5.0);
        assert_eq!(
            crate_entity.change_body_part(BodySlot::Core, 0),
            Err(AssemblyError::NotACharacter(2))
        );
    }

    #[test]
    fn test_change_body_part_keeps_damage_taken() {
        let mut entity =
            Entity::new_character(1, green(), Loadout::default(), Vector2::ZERO, "hero").unwrap();
        entity.body.stats.set_hp(120.0);

        // shell3 drops max HP from 150 to 110
        entity.change_body_part(BodySlot::Shell, 2).unwrap();
        assert_eq!(entity.max_hp(), Some(110.0));
        assert_eq!(entity.hp(), Some(110.0));

        // shell1 raises max HP back; HP does not grow with it
        entity.change_body_part(BodySlot::Shell, 0).unwrap();
        assert_eq!(entity.max_hp(), Some(150.0));
        assert_eq!(entity.hp(), Some(110.0));

        assert!(entity.change_body_part(BodySlot::Shell, 3).is_err());
        assert_eq!(entity.max_hp(), Some(150.0));
    }

    #[test]
    fn test_held_direction_moves_character() {
        let config = SimulationConfig::default();
        let mut entities =
            vec![Entity::new_character(1, green(), Loadout::default(), Vector2::ZERO, "hero").unwrap()];
        entities[0].press(Action::MoveRight);
        process(&mut entities, 0, &config, DT);
        assert!(entities[0].position().x > 0.0);
        assert_eq!(entities[0].position().y, 0.0);

        entities[0].release(Action::MoveRight);
        let speed_before = entities[0].velocity().length();
        process(&mut entities, 0, &config, DT);
        assert!(entities[0].velocity().length() < speed_before);
    }

    #[test]
    fn test_static_entities_are_not_processed() {
        let config = SimulationConfig::default();
        let mut entities = vec![
            Entity::obstacle(1, "wall", Vector2::ZERO, Vector2::splat(4.0)),
            Entity::prop(2, "crate", Vector2::new(1.0, 0.0), Vector2::splat(4.0), 5.0),
        ];
        let report = process(&mut entities, 0, &config, DT);
        assert!(report.collisions.is_empty());
        assert_eq!(entities[1].position(), Vector2::new(1.0, 0.0));
    }

    #[test]
    fn test_find_collisions_excludes_self() {
        let entities = vec![
            Entity::prop(1, "a", Vector2::ZERO, Vector2::splat(2.0), 1.0),
            Entity::prop(2, "b", Vector2::new(1.0, 0.0), Vector2::splat(2.0), 1.0),
            Entity::prop(3, "c", Vector2::new(10.0, 0.0), Vector2::splat(2.0), 1.0),
            Entity::obstacle(4, "d", Vector2::new(-1.0, 0.5), Vector2::splat(2.0)),
        ];
        assert_eq!(find_collisions(&entities, 0), vec![1, 3]);
        assert_eq!(find_collisions(&entities, 2), Vec::<usize>::new());
        assert!(find_collisions(&entities, 9).is_empty());
    }

    #[test]
    fn test_contact_damage_once_and_separation() {
        let config = SimulationConfig::default();
        // half-widths 3 + 3 = 6 > 5 apart: overlapping
        let mut entities = vec![fighter(1, 0.0, 3.0), fighter(2, 5.0, 2.0)];

        let first = process(&mut entities, 0, &config, DT);
        assert_eq!(first.collisions, vec![2]);
        assert_eq!(first.hits.len(), 2);
        let second = process(&mut entities, 1, &config, DT);
        assert!(second.hits.is_empty());

        assert_eq!(entities[0].hp(), Some(8.0));
        assert_eq!(entities[1].hp(), Some(7.0));
        let distance = (entities[1].position() - entities[0].position()).length();
        assert!(distance > 5.0);
    }

    #[test]
    fn test_prop_pushes_no_damage() {
        let config = SimulationConfig::default();
        let mut entities = vec![
            fighter(1, 0.0, 3.0),
            Entity::prop(2, "crate", Vector2::new(4.0, 0.0), Vector2::splat(4.0), 5.0),
        ];
        let report = process(&mut entities, 0, &config, DT);
        assert_eq!(report.collisions, vec![2]);
        assert!(report.hits.is_empty());
        assert_eq!(entities[0].hp(), Some(10.0));
        assert!(entities[1].position().x > 4.0);
    }

    #[test]
    fn test_dead_character_stops_existing() {
        let config = SimulationConfig::default();
        let mut entities = vec![fighter(1, 0.0, 20.0), fighter(2, 5.0, 20.0)];
        process(&mut entities, 0, &config, DT);
        assert!(!entities[0].is_exist());
        assert!(!entities[1].is_exist());

        // dead entities are skipped but stay in the list
        let report = process(&mut entities, 1, &config, DT);
        assert!(report.collisions.is_empty());
        assert_eq!(entities.len(), 2);
    }
}
