//! Wall and ball-to-ball collision response.

use knotwork_core::{KnotworkError, Result};
use knotwork_math::Vector3;
use serde::{Deserialize, Serialize};

use crate::Ball;

/// Contact distance between two balls, in multiples of their radius.
///
/// Slightly under 2 so touching balls visibly overlap before they react.
pub const CONTACT_FACTOR: f64 = 1.9;

/// Axis-aligned walls enclosing the XZ play area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_z: f64,
    pub max_z: f64,
}

impl Bounds {
    pub fn new(min_x: f64, max_x: f64, min_z: f64, max_z: f64) -> Result<Self> {
        if !(min_x < max_x && min_z < max_z) {
            return Err(KnotworkError::Physics(format!(
                "empty bounds: x [{}, {}], z [{}, {}]",
                min_x, max_x, min_z, max_z
            )));
        }
        Ok(Self {
            min_x,
            max_x,
            min_z,
            max_z,
        })
    }

    /// Whether a ball of `radius` centred at `(x, z)` fits between the walls.
    pub fn contains(&self, x: f64, z: f64, radius: f64) -> bool {
        x >= self.min_x + radius
            && x <= self.max_x - radius
            && z >= self.min_z + radius
            && z <= self.max_z - radius
    }
}

impl Default for Bounds {
    /// The play area over the demo surface, which spans `[0, 3] x [-2, 0]` in XZ.
    fn default() -> Self {
        Self {
            min_x: 0.05,
            max_x: 2.95,
            min_z: -1.95,
            max_z: -0.05,
        }
    }
}

/// Reflect a ball that crosses a wall and pull it back inside.
///
/// Each axis is handled on its own: the velocity component is negated and the
/// centre clamped to `[min + radius, max - radius]`. Returns whether any wall
/// was hit.
pub fn bounce_off_walls(ball: &mut Ball, bounds: &Bounds) -> bool {
    let r = ball.radius;
    let mut hit = false;

    if ball.position.x + r > bounds.max_x || ball.position.x - r < bounds.min_x {
        ball.velocity.x = -ball.velocity.x;
        ball.position.x = clamp_inside(ball.position.x, bounds.min_x + r, bounds.max_x - r);
        hit = true;
    }
    if ball.position.z + r > bounds.max_z || ball.position.z - r < bounds.min_z {
        ball.velocity.z = -ball.velocity.z;
        ball.position.z = clamp_inside(ball.position.z, bounds.min_z + r, bounds.max_z - r);
        hit = true;
    }

    hit
}

/// Whether two balls are within contact distance.
///
/// The contact distance is [`CONTACT_FACTOR`] times the mean radius.
pub fn balls_collide(a: &Ball, b: &Ball) -> bool {
    a.position.distance(b.position) <= contact_distance(a, b)
}

/// Separate two touching balls and send them back the way they came.
///
/// Both move half the overlap along the line between their centres, then both
/// velocities are reversed. Returns whether the balls were in contact.
pub fn resolve_ball_collision(a: &mut Ball, b: &mut Ball) -> bool {
    if !balls_collide(a, b) {
        return false;
    }

    let offset = a.position - b.position;
    let direction = offset.try_normalize().unwrap_or(Vector3::X);
    let overlap = contact_distance(a, b) - offset.length();

    a.position += direction * (overlap / 2.0);
    b.position -= direction * (overlap / 2.0);

    a.velocity = -a.velocity;
    b.velocity = -b.velocity;
    true
}

fn contact_distance(a: &Ball, b: &Ball) -> f64 {
    CONTACT_FACTOR * (a.radius + b.radius) * 0.5
}

fn clamp_inside(x: f64, lo: f64, hi: f64) -> f64 {
    if lo > hi {
        (lo + hi) * 0.5
    } else {
        x.clamp(lo, hi)
    }
}
