//! Per-character action timers
//!
//! Held movement actions count up the milliseconds they have been held.
//! The invulnerability timer counts down to zero.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::vector::{Vector2, VectorExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Action {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Invulnerability,
}

impl Action {
    pub const MOVES: [Action; 4] = [
        Action::MoveUp,
        Action::MoveDown,
        Action::MoveLeft,
        Action::MoveRight,
    ];

    /// Unit direction of a movement action (screen coordinates, +Y down)
    pub fn direction(&self) -> Vector2 {
        match self {
            Action::MoveUp => Vector2::new(0.0, -1.0),
            Action::MoveDown => Vector2::new(0.0, 1.0),
            Action::MoveLeft => Vector2::new(-1.0, 0.0),
            Action::MoveRight => Vector2::new(1.0, 0.0),
            Action::Invulnerability => Vector2::ZERO,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionTimers {
    timers: BTreeMap<Action, f64>,
}

impl ActionTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start holding a movement action; re-pressing keeps the elapsed time
    pub fn press(&mut self, action: Action) {
        if action != Action::Invulnerability {
            self.timers.entry(action).or_insert(0.0);
        }
    }

    pub fn release(&mut self, action: Action) {
        if action != Action::Invulnerability {
            self.timers.remove(&action);
        }
    }

    pub fn is_held(&self, action: Action) -> bool {
        action != Action::Invulnerability && self.timers.contains_key(&action)
    }

    /// Milliseconds the action has been held, or remaining invulnerability
    pub fn elapsed(&self, action: Action) -> f64 {
        self.timers.get(&action).copied().unwrap_or(0.0)
    }

    /// Combined held direction: sign of the summed directions, normalized
    pub fn held_direction(&self) -> Vector2 {
        Action::MOVES
            .iter()
            .filter(|action| self.is_held(**action))
            .map(|action| action.direction())
            .sum::<Vector2>()
            .sign()
            .normalized()
    }

    pub fn invulnerability(&self) -> f64 {
        self.elapsed(Action::Invulnerability)
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerability() > 0.0
    }

    pub fn start_invulnerability(&mut self, duration_ms: f64) {
        self.timers.insert(Action::Invulnerability, duration_ms.max(0.0));
    }

    /// Advance all timers by `dt` milliseconds
    pub fn advance(&mut self, dt: f64) {
        for (action, elapsed) in self.timers.iter_mut() {
            *elapsed = match action {
                Action::Invulnerability => (*elapsed - dt).max(0.0),
                _ => *elapsed + dt,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_held_direction() {
        let mut timers = ActionTimers::new();
        assert_eq!(timers.held_direction(), Vector2::ZERO);

        timers.press(Action::MoveRight);
        assert_eq!(timers.held_direction(), Vector2::new(1.0, 0.0));

        timers.press(Action::MoveDown);
        let diagonal = timers.held_direction();
        assert!((diagonal.length() - 1.0).abs() < 1e-12);
        assert!(diagonal.x > 0.0 && diagonal.y > 0.0);

        // opposite keys cancel
        timers.press(Action::MoveLeft);
        assert_eq!(timers.held_direction(), Vector2::new(0.0, 1.0));

        timers.release(Action::MoveDown);
        timers.release(Action::MoveLeft);
        assert_eq!(timers.held_direction(), Vector2::new(1.0, 0.0));
    }

    #[test]
    fn test_hold_time_accumulates() {
        let mut timers = ActionTimers::new();
        timers.press(Action::MoveUp);
        timers.advance(25.0);
        timers.press(Action::MoveUp);
        timers.advance(25.0);
        assert_eq!(timers.elapsed(Action::MoveUp), 50.0);
        timers.release(Action::MoveUp);
        assert_eq!(timers.elapsed(Action::MoveUp), 0.0);
    }

    #[test]
    fn test_invulnerability_counts_down_to_zero() {
        let mut timers = ActionTimers::new();
        assert!(!timers.is_invulnerable());
        timers.start_invulnerability(60.0);
        timers.advance(25.0);
        assert!(timers.is_invulnerable());
        timers.advance(25.0);
        timers.advance(25.0);
        assert_eq!(timers.invulnerability(), 0.0);
        assert!(!timers.is_invulnerable());
    }

    #[test]
    fn test_invulnerability_is_not_a_held_action() {
        let mut timers = ActionTimers::new();
        timers.press(Action::Invulnerability);
        assert!(!timers.is_held(Action::Invulnerability));
        assert!(!timers.is_invulnerable());
    }
}
