//! Parametric surface trait and the tensor-product B-spline surface.

mod bspline;
mod config;

use knotwork_core::Tolerance;
use knotwork_math::{DVec3, Point3, Vector3};
use serde::{Deserialize, Serialize};

pub use bspline::BSplineSurface;
pub use config::SurfaceConfig;

/// Normal substituted where `du x dv` has (near) zero length.
pub const FALLBACK_NORMAL: Vector3 = DVec3::Y;

/// A surface point with its shading normal and parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSample {
    pub position: Point3,
    /// Unit normal, or [`FALLBACK_NORMAL`] when `fallback` is set.
    pub normal: Vector3,
    pub u: f64,
    pub v: f64,
    /// The partial derivatives were parallel or vanishing at `(u, v)`.
    pub fallback: bool,
}

/// Trait for parametric surfaces in 3D space.
pub trait Surface: Send + Sync {
    /// Evaluate the surface at parameters `(u, v)`.
    fn point_at(&self, u: f64, v: f64) -> Point3;

    /// Partial derivatives `(dS/du, dS/dv)` at `(u, v)`.
    fn derivatives_at(&self, u: f64, v: f64) -> (Vector3, Vector3);

    /// Return the u-parameter domain `(u_min, u_max)`.
    fn domain_u(&self) -> (f64, f64);

    /// Return the v-parameter domain `(v_min, v_max)`.
    fn domain_v(&self) -> (f64, f64);

    /// Unit normal `du x dv` at `(u, v)`, falling back to [`FALLBACK_NORMAL`].
    fn normal_at(&self, u: f64, v: f64) -> Vector3 {
        self.sample(u, v, &Tolerance::default()).normal
    }

    /// Position and guarded normal at `(u, v)`.
    fn sample(&self, u: f64, v: f64, tolerance: &Tolerance) -> SurfaceSample {
        let (du, dv) = self.derivatives_at(u, v);
        let n = du.cross(dv);
        let len = n.length();
        let fallback = tolerance.is_degenerate_normal(len);
        SurfaceSample {
            position: self.point_at(u, v),
            normal: if fallback { FALLBACK_NORMAL } else { n / len },
            u,
            v,
            fallback,
        }
    }
}
