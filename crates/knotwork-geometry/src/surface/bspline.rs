//! Tensor-product B-spline surface.

use knotwork_core::traits::Validate;
use knotwork_core::{KnotworkError, Result, Tolerance};
use knotwork_math::{DVec3, Point3, Vector3};
use serde::{Deserialize, Serialize};

use super::{Surface, SurfaceConfig, SurfaceSample};
use crate::basis::BSplineBasis;
use crate::knot::KnotVector;

/// A B-spline surface defined by one basis per direction and a control grid.
///
/// The grid is `u_count x v_count` points stored flat, with the point for
/// `(i, j)` at `j * u_count + i`. The parameter domain is
/// `[u_front, u_back) x [v_front, v_back)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SurfaceConfig", into = "SurfaceConfig")]
pub struct BSplineSurface {
    basis_u: BSplineBasis,
    basis_v: BSplineBasis,
    u_count: usize,
    v_count: usize,
    control_points: Vec<Point3>,
}

impl BSplineSurface {
    pub fn new(
        degree_u: usize,
        degree_v: usize,
        knots_u: KnotVector,
        knots_v: KnotVector,
        u_count: usize,
        v_count: usize,
        control_points: Vec<Point3>,
    ) -> Result<Self> {
        let surface = Self {
            basis_u: BSplineBasis::new(degree_u, knots_u)?,
            basis_v: BSplineBasis::new(degree_v, knots_v)?,
            u_count,
            v_count,
            control_points,
        };
        surface.validate()?;
        Ok(surface)
    }

    pub fn from_config(config: SurfaceConfig) -> Result<Self> {
        Self::new(
            config.degree_u,
            config.degree_v,
            KnotVector::new(config.knots_u)?,
            KnotVector::new(config.knots_v)?,
            config.u_count,
            config.v_count,
            config.control_points,
        )
    }

    /// The 4x3 bi-quadratic demo surface, see [`SurfaceConfig::reference`].
    pub fn reference() -> Result<Self> {
        Self::from_config(SurfaceConfig::reference())
    }

    pub fn basis_u(&self) -> &BSplineBasis {
        &self.basis_u
    }

    pub fn basis_v(&self) -> &BSplineBasis {
        &self.basis_v
    }

    pub fn u_count(&self) -> usize {
        self.u_count
    }

    pub fn v_count(&self) -> usize {
        self.v_count
    }

    pub fn control_points(&self) -> &[Point3] {
        &self.control_points
    }

    /// Control point `(i, j)`, or `None` outside the grid.
    pub fn control_point(&self, i: usize, j: usize) -> Option<Point3> {
        if i < self.u_count && j < self.v_count {
            Some(self.control_points[j * self.u_count + i])
        } else {
            None
        }
    }

    /// Surface point: the sum of `N_i(u) * N_j(v) * P[i, j]` over the grid.
    pub fn evaluate(&self, u: f64, v: f64) -> Point3 {
        self.combine(&self.basis_u.values(u), &self.basis_v.values(v))
    }

    /// `dS/du`: the sum of `N_i'(u) * N_j(v) * P[i, j]`.
    pub fn partial_derivative_u(&self, u: f64, v: f64) -> Vector3 {
        self.combine(&self.basis_u.derivatives(u), &self.basis_v.values(v))
    }

    /// `dS/dv`: the sum of `N_i(u) * N_j'(v) * P[i, j]`.
    pub fn partial_derivative_v(&self, u: f64, v: f64) -> Vector3 {
        self.combine(&self.basis_u.values(u), &self.basis_v.derivatives(v))
    }

    /// Normalized `dS/du x dS/dv`.
    ///
    /// Where the cross product is degenerate under the default [`Tolerance`]
    /// the result is the zero vector; substituting a normal is up to the
    /// caller (see [`Surface::sample`]).
    pub fn compute_normal(&self, u: f64, v: f64) -> Vector3 {
        let (du, dv) = self.derivatives_at(u, v);
        let n = du.cross(dv);
        let len = n.length();
        if Tolerance::default().is_degenerate_normal(len) {
            Vector3::ZERO
        } else {
            n / len
        }
    }

    /// Clamp `(u, v)` into the sampled domain, keeping clear of the open upper ends.
    pub fn clamp_parameter(&self, u: f64, v: f64, tolerance: &Tolerance) -> (f64, f64) {
        let (u_min, u_max) = self.basis_u.domain();
        let (v_min, v_max) = self.basis_v.domain();
        (
            tolerance.clamp_parameter(u, u_min, u_max),
            tolerance.clamp_parameter(v, v_min, v_max),
        )
    }

    /// Position and guarded normal, using the default tolerance.
    pub fn sample_at(&self, u: f64, v: f64) -> SurfaceSample {
        self.sample(u, v, &Tolerance::default())
    }

    fn combine(&self, weights_u: &[f64], weights_v: &[f64]) -> DVec3 {
        let mut sum = DVec3::ZERO;
        for (i, &bu) in weights_u.iter().enumerate().take(self.u_count) {
            for (j, &bv) in weights_v.iter().enumerate().take(self.v_count) {
                sum += bu * bv * self.control_points[j * self.u_count + i];
            }
        }
        sum
    }
}

impl Validate for BSplineSurface {
    fn validate(&self) -> Result<()> {
        if self.u_count == 0 || self.v_count == 0 {
            return Err(KnotworkError::ControlGrid(format!(
                "control grid must be non-empty, got {}x{}",
                self.u_count, self.v_count
            )));
        }
        for (dir, basis, count) in [
            ("u", &self.basis_u, self.u_count),
            ("v", &self.basis_v, self.v_count),
        ] {
            if basis.count() != count {
                return Err(KnotworkError::ControlGrid(format!(
                    "{} knots ({}) with degree {} imply {} control points, grid has {}",
                    dir,
                    basis.knots().len(),
                    basis.degree(),
                    basis.count(),
                    count
                )));
            }
        }
        if self.control_points.len() != self.u_count * self.v_count {
            return Err(KnotworkError::ControlGrid(format!(
                "expected {}x{} = {} control points, got {}",
                self.u_count,
                self.v_count,
                self.u_count * self.v_count,
                self.control_points.len()
            )));
        }
        if let Some(pos) = self.control_points.iter().position(|p| !p.is_finite()) {
            return Err(KnotworkError::ControlGrid(format!(
                "control point {} is not finite: {:?}",
                pos, self.control_points[pos]
            )));
        }
        Ok(())
    }
}

impl Surface for BSplineSurface {
    fn point_at(&self, u: f64, v: f64) -> Point3 {
        self.evaluate(u, v)
    }

    fn derivatives_at(&self, u: f64, v: f64) -> (Vector3, Vector3) {
        let bu = self.basis_u.values(u);
        let bv = self.basis_v.values(v);
        let du = self.combine(&self.basis_u.derivatives(u), &bv);
        let dv = self.combine(&bu, &self.basis_v.derivatives(v));
        (du, dv)
    }

    fn domain_u(&self) -> (f64, f64) {
        self.basis_u.domain()
    }

    fn domain_v(&self) -> (f64, f64) {
        self.basis_v.domain()
    }
}

impl TryFrom<SurfaceConfig> for BSplineSurface {
    type Error = KnotworkError;

    fn try_from(config: SurfaceConfig) -> Result<Self> {
        Self::from_config(config)
    }
}

impl From<BSplineSurface> for SurfaceConfig {
    fn from(surface: BSplineSurface) -> Self {
        Self {
            degree_u: surface.basis_u.degree(),
            degree_v: surface.basis_v.degree(),
            knots_u: surface.basis_u.knots().as_slice().to_vec(),
            knots_v: surface.basis_v.knots().as_slice().to_vec(),
            u_count: surface.u_count,
            v_count: surface.v_count,
            control_points: surface.control_points,
        }
    }
}
