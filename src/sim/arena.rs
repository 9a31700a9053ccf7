//! The arena: one map layer's active entities and its per-frame tick
//!
//! The arena owns every entity exclusively. A tick first counts down every
//! living character's timers, then processes each entity in id order against
//! the whole list, then drops entities that stopped existing. Removal is
//! deferred to after the full pass so the overlap set seen by each entity
//! stays stable while it is processed.

use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use super::assembly::{Archetype, BodySlot, Catalog, Loadout, SpriteLayer};
use super::entity::{self, Entity, EntityId, Hit};
use super::vector::Vector2;
use crate::error::AssemblyError;
use crate::settings::SimulationConfig;

/// Everything one tick did
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    /// Length of the integrated step after clamping (ms)
    pub dt: f64,
    /// Overlapping pairs handled, counted once per processing entity
    pub collisions: usize,
    pub hits: Vec<Hit>,
    /// Entities removed after the pass because they stopped existing
    pub removed: Vec<EntityId>,
}

/// What the renderer needs to draw one entity
#[derive(Debug, Clone, Serialize)]
pub struct RenderItem {
    pub id: EntityId,
    pub name: String,
    pub position: Vector2,
    pub size: Vector2,
    pub indent: Vector2,
    pub hp: Option<f64>,
    pub max_hp: Option<f64>,
    pub sprites: Vec<SpriteLayer>,
}

#[derive(Debug, Clone)]
pub struct Arena {
    config: SimulationConfig,
    /// Active entities (sorted by id)
    entities: Vec<Entity>,
    /// Simulated time (ms)
    pub time_ms: f64,
    /// Ticks run so far
    pub frame: u64,
    next_id: EntityId,
}

impl Arena {
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            entities: Vec::new(),
            time_ms: 0.0,
            frame: 0,
            next_id: 1,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    /// Add an entity, keeping the list sorted by id; ids must be unique
    pub fn spawn(&mut self, entity: Entity) -> Result<EntityId, AssemblyError> {
        let id = entity.id;
        let slot = match self.entities.binary_search_by_key(&id, |e| e.id) {
            Ok(_) => return Err(AssemblyError::DuplicateId(id)),
            Err(slot) => slot,
        };
        self.next_id = self.next_id.max(id.saturating_add(1));
        self.entities.insert(slot, entity);
        Ok(id)
    }

    pub fn spawn_obstacle(
        &mut self,
        name: &str,
        position: Vector2,
        size: Vector2,
    ) -> Result<EntityId, AssemblyError> {
        let id = self.next_entity_id();
        self.spawn(Entity::obstacle(id, name, position, size))
    }

    pub fn spawn_prop(
        &mut self,
        name: &str,
        position: Vector2,
        size: Vector2,
    ) -> Result<EntityId, AssemblyError> {
        let id = self.next_entity_id();
        let mass = self.config.default_mass;
        self.spawn(Entity::prop(id, name, position, size, mass))
    }

    pub fn spawn_character(
        &mut self,
        archetype: Arc<Archetype>,
        loadout: Loadout,
        position: Vector2,
        name: &str,
    ) -> Result<EntityId, AssemblyError> {
        let entity = Entity::new_character(self.next_id, archetype, loadout, position, name)?;
        self.spawn(entity)
    }

    /// Four static walls enclosing `[-half, half]`
    pub fn spawn_walls(&mut self, half: Vector2, thickness: f64) -> Result<(), AssemblyError> {
        let t = thickness;
        let span_x = 2.0 * (half.x + t);
        let span_y = 2.0 * (half.y + t);
        self.spawn_obstacle(
            "wall_top",
            Vector2::new(0.0, -half.y - t / 2.0),
            Vector2::new(span_x, t),
        )?;
        self.spawn_obstacle(
            "wall_bottom",
            Vector2::new(0.0, half.y + t / 2.0),
            Vector2::new(span_x, t),
        )?;
        self.spawn_obstacle(
            "wall_left",
            Vector2::new(-half.x - t / 2.0, 0.0),
            Vector2::new(t, span_y),
        )?;
        self.spawn_obstacle(
            "wall_right",
            Vector2::new(half.x + t / 2.0, 0.0),
            Vector2::new(t, span_y),
        )?;
        Ok(())
    }

    /// Spawn `count` characters with seeded random archetypes, loadouts and
    /// positions inside `[-half, half]`
    pub fn populate(
        &mut self,
        catalog: &Catalog,
        seed: u64,
        count: usize,
        half: Vector2,
    ) -> Result<Vec<EntityId>, AssemblyError> {
        let names: Vec<&str> = catalog.names().collect();
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut spawned = Vec::with_capacity(count);

        for i in 0..count {
            let archetype = catalog.get(names[rng.random_range(0..names.len())])?;
            let mut loadout = Loadout::default();
            for slot in BodySlot::ALL {
                let variants = archetype.variant_count(slot);
                if variants > 0 {
                    loadout = loadout.with(slot, rng.random_range(0..variants));
                }
            }
            let position = Vector2::new(
                rng.random_range(-half.x..=half.x),
                rng.random_range(-half.y..=half.y),
            );
            let name = format!("{}{}", archetype.name, i);
            spawned.push(self.spawn_character(archetype, loadout, position, &name)?);
        }

        log::info!(
            "Populated arena (seed {}): {} characters, {} entities total",
            seed,
            spawned.len(),
            self.entities.len()
        );
        Ok(spawned)
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities
            .binary_search_by_key(&id, |e| e.id)
            .ok()
            .map(|index| &self.entities[index])
    }

    /// Mutable access for input and menu layers (loadout changes, held actions)
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        match self.entities.binary_search_by_key(&id, |e| e.id) {
            Ok(index) => self.entities.get_mut(index),
            Err(_) => None,
        }
    }

    pub fn characters(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| e.as_character().is_some())
    }

    /// Advance the simulation by `dt` milliseconds of wall-clock time
    pub fn tick(&mut self, dt: f64) -> TickReport {
        let dt = self.config.clamp_frame(dt);
        let mut report = TickReport {
            dt,
            ..Default::default()
        };

        for e in &mut self.entities {
            e.advance_timers(dt);
        }

        for index in 0..self.entities.len() {
            let processed = entity::process(&mut self.entities, index, &self.config, dt);
            report.collisions += processed.collisions.len();
            report.hits.extend(processed.hits);

            let e = &self.entities[index];
            log::trace!("{}: v = {:?}", e.name, e.body.velocity);
        }

        // Deferred removal
        self.entities.retain(|e| {
            if e.is_exist() {
                true
            } else {
                log::info!("{} (id {}) died", e.name, e.id);
                report.removed.push(e.id);
                false
            }
        });

        self.time_ms += dt;
        self.frame += 1;
        report
    }

    /// Render view of every entity, in id order
    pub fn snapshot(&self) -> Vec<RenderItem> {
        self.entities
            .iter()
            .map(|e| RenderItem {
                id: e.id,
                name: e.name.clone(),
                position: e.position(),
                size: e.size(),
                indent: e.body.indent,
                hp: e.hp(),
                max_hp: e.max_hp(),
                sprites: e.body_part_sprites(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FRAME_MS;
    use crate::sim::actions::Action;

    fn arena() -> (Arena, Catalog) {
        (
            Arena::new(SimulationConfig::default()),
            Catalog::builtin().unwrap(),
        )
    }

    #[test]
    fn test_ids_are_sequential_and_sorted() {
        let (mut arena, catalog) = arena();
        let wall = arena
            .spawn_obstacle("wall", Vector2::ZERO, Vector2::ONE)
            .unwrap();
        let hero = arena
            .spawn_character(
                catalog.get("GreenBacteria").unwrap(),
                Loadout::default(),
                Vector2::new(50.0, 0.0),
                "hero",
            )
            .unwrap();
        assert_eq!((wall, hero), (1, 2));
        assert_eq!(arena.get(hero).unwrap().name, "hero");
        assert!(arena.get(99).is_none());
        assert_eq!(arena.characters().count(), 1);
    }

    #[test]
    fn test_failed_spawn_does_not_burn_id() {
        let (mut arena, catalog) = arena();
        let bad = Loadout::default().with(BodySlot::Shell, 9);
        let result = arena.spawn_character(
            catalog.get("GreenBacteria").unwrap(),
            bad,
            Vector2::ZERO,
            "broken",
        );
        assert!(result.is_err());
        assert!(arena.is_empty());
        assert_eq!(arena.next_entity_id(), 1);
    }

    #[test]
    fn test_spawn_rejects_duplicate_ids() {
        let (mut arena, _) = arena();
        let wall = Entity::obstacle(5, "wall", Vector2::ZERO, Vector2::ONE);
        assert_eq!(arena.spawn(wall.clone()), Ok(5));
        assert_eq!(arena.spawn(wall), Err(AssemblyError::DuplicateId(5)));
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.next_entity_id(), 6);
    }

    #[test]
    fn test_spawn_at_max_id_saturates() {
        let (mut arena, _) = arena();
        let last = Entity::obstacle(u32::MAX, "last", Vector2::ZERO, Vector2::ONE);
        assert_eq!(arena.spawn(last), Ok(u32::MAX));
        assert_eq!(
            arena.spawn_obstacle("extra", Vector2::ZERO, Vector2::ONE),
            Err(AssemblyError::DuplicateId(u32::MAX))
        );
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn test_both_sides_get_full_invulnerability() {
        let (mut arena, catalog) = arena();
        let red = catalog.get("RedBacteria").unwrap();
        let a = arena
            .spawn_character(red.clone(), Loadout::default(), Vector2::ZERO, "a")
            .unwrap();
        let b = arena
            .spawn_character(red, Loadout::default(), Vector2::new(4.0, 0.0), "b")
            .unwrap();

        let report = arena.tick(FRAME_MS);
        assert_eq!(report.hits.len(), 2);
        let window = arena.config().invulnerability_ms;
        for id in [a, b] {
            let character = arena.get(id).unwrap().as_character().unwrap();
            assert_eq!(character.timers.invulnerability(), window);
        }
    }

    #[test]
    fn test_tick_removes_dead_after_pass() {
        let (mut arena, catalog) = arena();
        let red = catalog.get("RedBacteria").unwrap();
        let a = arena
            .spawn_character(red.clone(), Loadout::default(), Vector2::ZERO, "a")
            .unwrap();
        let b = arena
            .spawn_character(red, Loadout::default(), Vector2::new(4.0, 0.0), "b")
            .unwrap();
        arena.get_mut(a).unwrap().body.stats.set_hp(0.5);
        arena.get_mut(b).unwrap().body.stats.set_hp(0.5);

        let report = arena.tick(FRAME_MS);
        assert_eq!(report.hits.len(), 2);
        assert_eq!(report.removed, vec![a, b]);
        assert!(arena.is_empty());
        assert_eq!(arena.frame, 1);
        assert_eq!(arena.time_ms, FRAME_MS);
    }

    #[test]
    fn test_tick_clamps_long_frames() {
        let (mut arena, _) = arena();
        let report = arena.tick(10_000.0);
        assert_eq!(report.dt, arena.config().max_frame_ms);
    }

    #[test]
    fn test_walls_contain_character() {
        let (mut arena, catalog) = arena();
        let half = Vector2::new(40.0, 40.0);
        arena.spawn_walls(half, 10.0).unwrap();
        let hero = arena
            .spawn_character(
                catalog.get("RedBacteria").unwrap(),
                Loadout::default(),
                Vector2::ZERO,
                "hero",
            )
            .unwrap();
        arena.get_mut(hero).unwrap().press(Action::MoveRight);

        for _ in 0..400 {
            arena.tick(FRAME_MS);
        }
        let entity = arena.get(hero).unwrap();
        let right_edge = entity.position().x + entity.size().x / 2.0;
        assert!(right_edge <= half.x + 1.0, "escaped: {}", right_edge);
        assert!(entity.position().x > 0.0);
    }

    #[test]
    fn test_populate_is_deterministic() {
        let (mut first, catalog) = arena();
        let (mut second, _) = arena();
        let half = Vector2::new(100.0, 100.0);
        first.populate(&catalog, 42, 6, half).unwrap();
        second.populate(&catalog, 42, 6, half).unwrap();
        for _ in 0..50 {
            first.tick(FRAME_MS);
            second.tick(FRAME_MS);
        }
        let a = first.snapshot();
        let b = second.snapshot();
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.id, y.id);
            assert_eq!(x.position, y.position);
            assert_eq!(x.hp, y.hp);
        }
    }

    #[test]
    fn test_snapshot() {
        let (mut arena, catalog) = arena();
        arena
            .spawn_prop("crate", Vector2::new(30.0, 0.0), Vector2::splat(4.0))
            .unwrap();
        arena.populate(&catalog, 7, 1, Vector2::splat(5.0)).unwrap();
        let snapshot = arena.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].name, "crate");
        assert_eq!(snapshot[0].hp, None);
        assert!(snapshot[0].sprites.is_empty());
        assert_eq!(snapshot[1].sprites.len(), 4);
        assert!(serde_json::to_string(&snapshot).is_ok());
    }
}
