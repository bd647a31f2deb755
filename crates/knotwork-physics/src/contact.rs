//! Ball contact with a B-spline surface.
//!
//! The surface is modelled in its own frame with height along `+z`. The world
//! is y-up, so the surface is laid out rotated a quarter turn about `x`:
//! surface `(x, y, z)` sits at world `(x, z, -y)`.

use knotwork_core::Tolerance;
use knotwork_geometry::BSplineSurface;
use knotwork_math::{dvec3, lerp, Point3};

const COARSE_DIVISIONS: usize = 16;
const MAX_ITERATIONS: usize = 32;
const CONVERGENCE: f64 = 1e-10;

/// Map a point from the surface frame into the y-up world frame.
pub fn surface_to_world(p: Point3) -> Point3 {
    dvec3(p.x, p.z, -p.y)
}

/// Height lookup over a surface laid out in the world frame.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceHeightField<'a> {
    surface: &'a BSplineSurface,
    tolerance: Tolerance,
}

impl<'a> SurfaceHeightField<'a> {
    pub fn new(surface: &'a BSplineSurface) -> Self {
        Self {
            surface,
            tolerance: Tolerance::default(),
        }
    }

    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn surface(&self) -> &BSplineSurface {
        self.surface
    }

    /// Find the parameters whose world footprint is `(x, z)`.
    ///
    /// Starts from the nearest sample of a coarse parameter grid and refines
    /// with Newton steps on the planar footprint, clamping into the domain
    /// after each step. Returns `None` when the iteration does not land on
    /// `(x, z)`, which happens for points outside the surface footprint.
    pub fn locate(&self, x: f64, z: f64) -> Option<(f64, f64)> {
        if !(x.is_finite() && z.is_finite()) {
            return None;
        }
        // Footprint target in the surface frame.
        let (tx, ty) = (x, -z);
        let (mut u, mut v) = self.initial_guess(tx, ty);

        for _ in 0..MAX_ITERATIONS {
            let p = self.surface.evaluate(u, v);
            let (rx, ry) = (p.x - tx, p.y - ty);
            if rx.hypot(ry) < CONVERGENCE {
                return Some((u, v));
            }

            let du = self.surface.partial_derivative_u(u, v);
            let dv = self.surface.partial_derivative_v(u, v);
            let det = du.x * dv.y - dv.x * du.y;
            if det.abs() <= f64::EPSILON {
                break;
            }
            let step_u = (rx * dv.y - ry * dv.x) / det;
            let step_v = (du.x * ry - du.y * rx) / det;
            (u, v) = self
                .surface
                .clamp_parameter(u - step_u, v - step_v, &self.tolerance);
        }

        let p = self.surface.evaluate(u, v);
        ((p.x - tx).hypot(p.y - ty) < CONVERGENCE).then_some((u, v))
    }

    /// World height of the surface above `(x, z)`.
    pub fn height_at(&self, x: f64, z: f64) -> Option<f64> {
        self.locate(x, z)
            .map(|(u, v)| surface_to_world(self.surface.evaluate(u, v)).y)
    }

    fn initial_guess(&self, tx: f64, ty: f64) -> (f64, f64) {
        let (u_min, u_max) = self.surface.basis_u().domain();
        let (v_min, v_max) = self.surface.basis_v().domain();
        let mut best = (u_min, v_min);
        let mut best_dist = f64::INFINITY;

        for j in 0..=COARSE_DIVISIONS {
            for i in 0..=COARSE_DIVISIONS {
                let (u, v) = self.surface.clamp_parameter(
                    lerp(u_min, u_max, i as f64 / COARSE_DIVISIONS as f64),
                    lerp(v_min, v_max, j as f64 / COARSE_DIVISIONS as f64),
                    &self.tolerance,
                );
                let p = self.surface.evaluate(u, v);
                let d = (p.x - tx).powi(2) + (p.y - ty).powi(2);
                if d < best_dist {
                    best_dist = d;
                    best = (u, v);
                }
            }
        }
        best
    }
}
