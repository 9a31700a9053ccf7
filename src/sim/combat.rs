//! Contact damage, invulnerability windows and HP regeneration
//!
//! Two characters in contact hit each other at the same time. A hit lands
//! only if the target is not invulnerable, and opens a fresh invulnerability
//! window on the target. Death is just `hp <= 0`; the arena removes dead
//! characters after the tick.

use super::actions::ActionTimers;
use super::stats::CharacterStats;
use crate::settings::SimulationConfig;

/// One side of a contact: its stats and its timers
pub struct Combatant<'a> {
    pub stats: &'a mut CharacterStats,
    pub timers: &'a mut ActionTimers,
}

/// Damage dealt in each direction by one [`resolve_attack`] call
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AttackOutcome {
    /// Damage `a` took from `b`
    pub damage_to_a: Option<f64>,
    /// Damage `b` took from `a`
    pub damage_to_b: Option<f64>,
}

impl AttackOutcome {
    pub fn any_hit(&self) -> bool {
        self.damage_to_a.is_some() || self.damage_to_b.is_some()
    }
}

/// Apply `damage` unless the target is invulnerable; returns whether it landed
///
/// Non-positive damage is not a hit and does not open a window.
pub fn take_hit(target: &mut Combatant<'_>, damage: f64, config: &SimulationConfig) -> bool {
    if damage <= 0.0 || target.timers.is_invulnerable() {
        return false;
    }
    let hp = target.stats.hp() - damage;
    target.stats.set_hp(hp);
    target.timers.start_invulnerability(config.invulnerability_ms);
    true
}

/// Mutual contact damage; both directions use damage values read before either lands
pub fn resolve_attack(
    a: &mut Combatant<'_>,
    b: &mut Combatant<'_>,
    config: &SimulationConfig,
) -> AttackOutcome {
    let damage_from_a = a.stats.damage();
    let damage_from_b = b.stats.damage();

    let hit_b = take_hit(b, damage_from_a, config);
    let hit_a = take_hit(a, damage_from_b, config);

    AttackOutcome {
        damage_to_a: hit_a.then_some(damage_from_b),
        damage_to_b: hit_b.then_some(damage_from_a),
    }
}

/// Regenerate HP over `dt` milliseconds, never past max HP
///
/// Dead characters stay dead.
pub fn regenerate(stats: &mut CharacterStats, dt: f64) {
    let regen = stats.hp_regen();
    if regen <= 0.0 || stats.hp() <= 0.0 {
        return;
    }
    let max = stats.max_hp();
    if stats.hp() < max {
        stats.set_hp((stats.hp() + regen * dt).min(max));
    }
}

#[inline]
pub fn is_alive(stats: &CharacterStats) -> bool {
    stats.hp() > 0.0
}
