//! Additive/scaling stat algebra
//!
//! Every stat is a [`ScaledStat`]: a stored value that already has its scale
//! factor folded in, plus that scale. Combining two stats unscales both back to
//! raw contributions, adds (or subtracts) the raw values and composes the
//! scales around a baseline of 1, so two +20% bonuses stack to +40%:
//!
//! ```text
//! add: scale = sa + sb - 1        value = scale * (raw_a + raw_b)
//! sub: scale = sa - (sb - 1)      value = scale * (raw_a - raw_b)
//! ```
//!
//! Stat blocks always carry their complete field set, so combining never drops
//! a field. A zeroed block with unit scales is the identity.

use std::ops::{Add, AddAssign, Sub, SubAssign};

use serde::{Deserialize, Serialize};

use crate::error::StatError;

/// Direction of a stat combination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatOp {
    Add,
    Sub,
}

/// A single stat with its scale factor folded in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaledStat {
    value: f64,
    scale: f64,
}

impl Default for ScaledStat {
    fn default() -> Self {
        Self::ZERO
    }
}

impl ScaledStat {
    /// Zero contribution at baseline scale (the identity)
    pub const ZERO: Self = Self {
        value: 0.0,
        scale: 1.0,
    };

    /// Build from a raw value and scale; stores `raw * scale`
    pub fn new(raw: f64, scale: f64) -> Self {
        Self {
            value: raw * scale,
            scale,
        }
    }

    /// Raw value at baseline scale
    pub fn flat(raw: f64) -> Self {
        Self::new(raw, 1.0)
    }

    /// Effective value
    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }

    #[inline]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Contribution before scaling; a zero scale has nothing to unscale
    #[inline]
    pub fn raw(&self) -> f64 {
        if self.scale == 0.0 {
            0.0
        } else {
            self.value / self.scale
        }
    }

    /// Same scale, new effective value
    pub fn with_value(self, value: f64) -> Self {
        Self {
            value,
            scale: self.scale,
        }
    }

    /// Same raw contribution, new scale
    pub fn rescaled(self, scale: f64) -> Self {
        Self::new(self.raw(), scale)
    }

    pub fn combine(self, other: Self, op: StatOp) -> Self {
        match op {
            StatOp::Add => Self::new(self.raw() + other.raw(), self.scale + other.scale - 1.0),
            StatOp::Sub => Self::new(self.raw() - other.raw(), self.scale - (other.scale - 1.0)),
        }
    }

    fn check(&self, field: &'static str) -> Result<(), StatError> {
        if !(self.value.is_finite() && self.scale.is_finite()) {
            return Err(StatError::NonFinite { field });
        }
        if self.scale <= 0.0 {
            return Err(StatError::NonPositiveScale {
                field,
                scale: self.scale,
            });
        }
        Ok(())
    }
}

/// Stats the physics step reads
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PhysicalStats {
    /// Acceleration applied by a held movement direction (units/ms per tick)
    pub speed: ScaledStat,
    pub mass: ScaledStat,
    /// Added to the global friction coefficient
    pub friction_coeff: ScaledStat,
}

impl PhysicalStats {
    pub fn new(speed: f64, mass: f64, friction_coeff: f64) -> Self {
        Self {
            speed: ScaledStat::flat(speed),
            mass: ScaledStat::flat(mass),
            friction_coeff: ScaledStat::flat(friction_coeff),
        }
    }

    pub fn combine(&self, other: &Self, op: StatOp) -> Self {
        Self {
            speed: self.speed.combine(other.speed, op),
            mass: self.mass.combine(other.mass, op),
            friction_coeff: self.friction_coeff.combine(other.friction_coeff, op),
        }
    }

    pub fn speed(&self) -> f64 {
        self.speed.value()
    }

    pub fn mass(&self) -> f64 {
        self.mass.value()
    }

    pub fn friction(&self) -> f64 {
        self.friction_coeff.value()
    }

    pub fn validate(&self) -> Result<(), StatError> {
        self.speed.check("speed")?;
        self.mass.check("mass")?;
        self.friction_coeff.check("friction_coeff")
    }
}

impl Add for PhysicalStats {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.combine(&rhs, StatOp::Add)
    }
}

impl Sub for PhysicalStats {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self.combine(&rhs, StatOp::Sub)
    }
}

impl AddAssign for PhysicalStats {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for PhysicalStats {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

/// Physical stats plus health and combat
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CharacterStats {
    pub physical: PhysicalStats,
    pub hp: ScaledStat,
    pub max_hp: ScaledStat,
    /// HP restored per millisecond
    pub hp_regen: ScaledStat,
    /// Damage dealt to a character on contact
    pub damage: ScaledStat,
}

impl CharacterStats {
    /// Stats of a fresh character; HP starts at max HP
    pub fn new(physical: PhysicalStats, max_hp: f64, hp_regen: f64, damage: f64) -> Self {
        let max_hp = ScaledStat::flat(max_hp);
        Self {
            physical,
            hp: max_hp,
            max_hp,
            hp_regen: ScaledStat::flat(hp_regen),
            damage: ScaledStat::flat(damage),
        }
    }

    /// Combine field by field. Subtraction clamps HP so it never exceeds the
    /// new max HP and never rises above its value before the combination.
    pub fn combine(&self, other: &Self, op: StatOp) -> Self {
        let mut combined = Self {
            physical: self.physical.combine(&other.physical, op),
            hp: self.hp.combine(other.hp, op),
            max_hp: self.max_hp.combine(other.max_hp, op),
            hp_regen: self.hp_regen.combine(other.hp_regen, op),
            damage: self.damage.combine(other.damage, op),
        };
        if op == StatOp::Sub {
            let ceiling = self.hp.value().min(combined.max_hp.value());
            if combined.hp.value() > ceiling {
                combined.hp = combined.hp.with_value(ceiling);
            }
        }
        combined
    }

    // Builder helpers. Each takes a raw value and keeps the field's current scale.

    pub fn with_speed(mut self, raw: f64) -> Self {
        self.physical.speed = ScaledStat::new(raw, self.physical.speed.scale());
        self
    }

    pub fn with_mass(mut self, raw: f64) -> Self {
        self.physical.mass = ScaledStat::new(raw, self.physical.mass.scale());
        self
    }

    pub fn with_friction(mut self, raw: f64) -> Self {
        self.physical.friction_coeff = ScaledStat::new(raw, self.physical.friction_coeff.scale());
        self
    }

    /// Sets max HP and current HP together
    pub fn with_max_hp(mut self, raw: f64) -> Self {
        self.max_hp = ScaledStat::new(raw, self.max_hp.scale());
        self.hp = ScaledStat::new(raw, self.hp.scale());
        self
    }

    pub fn with_hp_regen(mut self, raw: f64) -> Self {
        self.hp_regen = ScaledStat::new(raw, self.hp_regen.scale());
        self
    }

    pub fn with_damage(mut self, raw: f64) -> Self {
        self.damage = ScaledStat::new(raw, self.damage.scale());
        self
    }

    /// Scale factor for current and max HP
    pub fn with_hp_scale(mut self, scale: f64) -> Self {
        self.max_hp = self.max_hp.rescaled(scale);
        self.hp = self.hp.rescaled(scale);
        self
    }

    pub fn with_speed_scale(mut self, scale: f64) -> Self {
        self.physical.speed = self.physical.speed.rescaled(scale);
        self
    }

    pub fn with_damage_scale(mut self, scale: f64) -> Self {
        self.damage = self.damage.rescaled(scale);
        self
    }

    pub fn hp(&self) -> f64 {
        self.hp.value()
    }

    pub fn max_hp(&self) -> f64 {
        self.max_hp.value()
    }

    pub fn hp_regen(&self) -> f64 {
        self.hp_regen.value()
    }

    pub fn damage(&self) -> f64 {
        self.damage.value()
    }

    /// Overwrite current HP, keeping its scale
    pub fn set_hp(&mut self, hp: f64) {
        self.hp = self.hp.with_value(hp);
    }

    pub fn validate(&self) -> Result<(), StatError> {
        self.physical.validate()?;
        self.hp.check("hp")?;
        self.max_hp.check("max_hp")?;
        self.hp_regen.check("hp_regen")?;
        self.damage.check("damage")
    }
}

impl Add for CharacterStats {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.combine(&rhs, StatOp::Add)
    }
}

impl Sub for CharacterStats {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self.combine(&rhs, StatOp::Sub)
    }
}

impl AddAssign for CharacterStats {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for CharacterStats {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}
