//! Fixed-step simulation of balls in a walled play area.

use knotwork_core::{KnotworkError, Result};
use knotwork_geometry::BSplineSurface;
use knotwork_math::{dvec3, Vector3};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{bounce_off_walls, resolve_ball_collision, Ball, Bounds, SurfaceHeightField};

/// What happened during one [`World::step`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    pub wall_bounces: usize,
    pub ball_contacts: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct World {
    pub balls: Vec<Ball>,
    pub bounds: Bounds,
    /// Multiplier applied to every ball's velocity when integrating.
    pub speed_factor: f64,
}

impl World {
    pub fn new(bounds: Bounds) -> Self {
        Self {
            balls: Vec::new(),
            bounds,
            speed_factor: 1.0,
        }
    }

    pub fn with_speed_factor(mut self, speed_factor: f64) -> Self {
        self.speed_factor = speed_factor;
        self
    }

    /// Drop a ball resting on the ground plane at `(x, z)`.
    ///
    /// The ball must fit between the walls. Returns its index.
    pub fn spawn(&mut self, x: f64, z: f64, radius: f64, velocity: Vector3) -> Result<usize> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(KnotworkError::Physics(format!(
                "ball radius must be positive, got {}",
                radius
            )));
        }
        if !self.bounds.contains(x, z, radius) {
            return Err(KnotworkError::Physics(format!(
                "ball at ({}, {}) with radius {} is outside the walls",
                x, z, radius
            )));
        }
        self.balls
            .push(Ball::new(dvec3(x, radius, z), velocity, radius));
        Ok(self.balls.len() - 1)
    }

    /// Advance every ball by `dt`.
    ///
    /// Balls move first, then each pair in contact is separated in index
    /// order, then balls crossing a wall bounce back inside.
    pub fn step(&mut self, dt: f64) -> StepReport {
        let mut report = StepReport::default();
        let scale = dt * self.speed_factor;

        for ball in &mut self.balls {
            ball.position += ball.velocity * scale;
        }

        for i in 0..self.balls.len() {
            let (head, tail) = self.balls.split_at_mut(i + 1);
            let a = &mut head[i];
            for b in tail.iter_mut() {
                if resolve_ball_collision(a, b) {
                    report.ball_contacts += 1;
                }
            }
        }

        for ball in &mut self.balls {
            if bounce_off_walls(ball, &self.bounds) {
                report.wall_bounces += 1;
            }
        }

        if report.wall_bounces > 0 || report.ball_contacts > 0 {
            debug!(
                "Step: {} wall bounces, {} ball contacts",
                report.wall_bounces, report.ball_contacts
            );
        }
        report
    }

    /// Lift every ball over the surface so it rests on top of it.
    ///
    /// Balls outside the surface footprint are left alone. Returns how many
    /// balls were placed.
    pub fn rest_on_surface(&mut self, surface: &BSplineSurface) -> usize {
        let field = SurfaceHeightField::new(surface);
        let mut placed = 0;
        for ball in &mut self.balls {
            if let Some(height) = field.height_at(ball.position.x, ball.position.z) {
                ball.position.y = height + ball.radius;
                placed += 1;
            }
        }
        placed
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(Bounds::default())
    }
}
