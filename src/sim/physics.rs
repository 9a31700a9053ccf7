//! Movement, friction and collision response for AABB bodies
//!
//! This is an arcade model, not a rigid-body solver:
//! - friction scales velocity down each tick
//! - movement is explicit Euler with a speed floor and ceiling
//! - movable pairs swap momentum per axis as a 1-D elastic collision
//! - a movable body hitting a static one is pushed back along a single axis
//!   and bounces with some energy lost
//! - bodies that still overlap afterwards are repelled apart

use super::body::Body;
use super::vector::{Vector2, VectorExt};
use crate::consts::MIN_REPULSION;
use crate::settings::SimulationConfig;

/// How a collision between two bodies was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Both bodies static, nothing to do
    None,
    /// Momentum exchange between two movable bodies
    Elastic,
    /// A movable body pushed out of a static one
    Static,
}

/// Outcome of [`resolve_collision`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionOutcome {
    pub resolution: Resolution,
    /// Whether the repulsion step had to push the bodies apart
    pub repelled: bool,
}

/// Scale velocity down by global plus per-body friction, clamped to [0, 1]
pub fn apply_friction(body: &mut Body, config: &SimulationConfig) {
    if body.velocity.length() > 0.0 {
        let friction = (config.friction_coefficient + body.friction()).clamp(0.0, 1.0);
        body.velocity *= 1.0 - friction;
    }
}

/// Velocity after the anti-jitter floor and anti-tunneling ceiling
pub fn limit_velocity(velocity: Vector2, config: &SimulationConfig) -> Vector2 {
    let speed = velocity.length();
    if speed <= config.velocity_epsilon {
        Vector2::ZERO
    } else if speed > config.max_speed {
        velocity.normalized() * config.max_speed
    } else {
        velocity
    }
}

/// Integrate position from velocity over `dt` milliseconds
pub fn integrate(body: &mut Body, config: &SimulationConfig, dt: f64) {
    if !body.movable {
        return;
    }
    body.velocity = limit_velocity(body.velocity, config);
    body.position += body.velocity * dt;
}

/// Friction then movement, the per-tick motion of one body
pub fn step_body(body: &mut Body, config: &SimulationConfig, dt: f64) {
    apply_friction(body, config);
    integrate(body, config, dt);
}

/// Post-collision velocity of the first body in a 1-D elastic collision
#[inline]
pub fn elastic_velocity(m1: f64, v1: f64, m2: f64, v2: f64) -> f64 {
    ((m1 - m2) * v1 + 2.0 * m2 * v2) / (m1 + m2)
}

/// Exchange momentum between two movable bodies, each axis independently
pub fn resolve_elastic(a: &mut Body, b: &mut Body) {
    let (m1, m2) = (a.mass(), b.mass());
    if !(m1 + m2).is_normal() {
        // massless pair: nothing meaningful to exchange
        return;
    }
    let (v1, v2) = (a.velocity, b.velocity);
    a.velocity = Vector2::new(
        elastic_velocity(m1, v1.x, m2, v2.x),
        elastic_velocity(m1, v1.y, m2, v2.y),
    );
    b.velocity = Vector2::new(
        elastic_velocity(m2, v2.x, m1, v1.x),
        elastic_velocity(m2, v2.y, m1, v1.y),
    );
}

/// Penetration of `body` into `wall`, measured against the direction of travel
///
/// On each axis the delta is the shift that puts the leading edge back at the
/// wall face it was moving toward, or zero if the body is not moving on that
/// axis. Only the larger-magnitude axis is kept.
// TODO: corner hits pick the deeper axis; replace with a contact normal
// from the previous-frame position once a regression suite covers corners.
pub fn travel_penetration(body: &Body, wall: &Body) -> Vector2 {
    let m = body.aabb();
    let s = wall.aabb();
    let v = body.velocity;

    let axis_delta = |vel: f64, m_min: f64, m_max: f64, s_min: f64, s_max: f64| {
        if vel > 0.0 {
            s_min - m_max
        } else if vel < 0.0 {
            s_max - m_min
        } else {
            0.0
        }
    };
    let dx = axis_delta(v.x, m.min.x, m.max.x, s.min.x, s.max.x);
    let dy = axis_delta(v.y, m.min.y, m.max.y, s.min.y, s.max.y);

    if dx.abs() < dy.abs() {
        Vector2::new(0.0, dy)
    } else {
        Vector2::new(dx, 0.0)
    }
}

/// Push a movable body out of a static one and bounce it off the hit face
pub fn resolve_static(body: &mut Body, wall: &Body, config: &SimulationConfig) {
    let delta = travel_penetration(body, wall);
    let keep = 1.0 - config.energy_absorption;
    if delta.x != 0.0 {
        body.velocity.x = -body.velocity.x * keep;
    } else if delta.y != 0.0 {
        body.velocity.y = -body.velocity.y * keep;
    }
    body.translate(delta);
}

/// Push two overlapping bodies apart along the line between their centers
///
/// The push is inversely proportional to distance (floored), never below
/// [`MIN_REPULSION`], scaled by the separation speed and the tick length.
/// Coincident centers separate along +X. Static bodies stay put.
pub fn repel(a: &mut Body, b: &mut Body, config: &SimulationConfig, dt: f64) {
    let offset = a.position - b.position;
    let distance = offset.length();
    let direction = if distance > 0.0 {
        offset.normalized()
    } else {
        Vector2::X
    };
    let magnitude = (config.repulsion_force / distance.max(config.min_repulsion_distance))
        .max(MIN_REPULSION)
        * config.separation_speed;
    let push = direction * magnitude * dt;
    a.translate(push);
    b.translate(-push);
}

/// Resolve one overlapping pair by mobility, then repel if still overlapping
pub fn resolve_collision(
    a: &mut Body,
    b: &mut Body,
    config: &SimulationConfig,
    dt: f64,
) -> CollisionOutcome {
    let resolution = match (a.movable, b.movable) {
        (false, false) => {
            return CollisionOutcome {
                resolution: Resolution::None,
                repelled: false,
            };
        }
        (true, true) => {
            resolve_elastic(a, b);
            Resolution::Elastic
        }
        (true, false) => {
            resolve_static(a, b, config);
            Resolution::Static
        }
        (false, true) => {
            resolve_static(b, a, config);
            Resolution::Static
        }
    };

    let repelled = a.overlaps(b);
    if repelled {
        repel(a, b, config, dt);
    }
    CollisionOutcome {
        resolution,
        repelled,
    }
}
