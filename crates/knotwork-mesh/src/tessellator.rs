//! Uniform tessellation of parametric surfaces.
//!
//! The surface is sampled on a `(u_res + 1) x (v_res + 1)` grid spanning its
//! whole parameter domain. Vertex `j * (u_res + 1) + i` holds sample `(i, j)`
//! and every grid cell becomes two triangles with the same winding.

use knotwork_core::{KnotworkError, Result, Tolerance};
use knotwork_geometry::{Surface, SurfaceSample};
use knotwork_math::{lerp, Point2};
use log::debug;
use rayon::prelude::*;

use crate::TriangleMesh;

/// Grid sampler for a [`Surface`].
#[derive(Debug, Clone, Copy)]
pub struct SurfaceTessellator {
    u_res: usize,
    v_res: usize,
    tolerance: Tolerance,
    parallel: bool,
}

impl SurfaceTessellator {
    /// Tessellator with `u_res x v_res` cells; both must be at least 1.
    pub fn new(u_res: usize, v_res: usize) -> Result<Self> {
        if u_res == 0 || v_res == 0 {
            return Err(KnotworkError::InvalidResolution(format!(
                "resolution must be at least 1x1, got {}x{}",
                u_res, v_res
            )));
        }
        let vertices = (u_res + 1).checked_mul(v_res + 1);
        if vertices.map_or(true, |n| n > u32::MAX as usize) {
            return Err(KnotworkError::InvalidResolution(format!(
                "{}x{} grid exceeds the u32 index range",
                u_res, v_res
            )));
        }
        Ok(Self {
            u_res,
            v_res,
            tolerance: Tolerance::default(),
            parallel: false,
        })
    }

    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sample rows on the rayon thread pool. The output is identical either way.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn resolution(&self) -> (usize, usize) {
        (self.u_res, self.v_res)
    }

    /// Evaluate every grid sample, in vertex order.
    pub fn samples(&self, surface: &dyn Surface) -> Vec<SurfaceSample> {
        let (u_min, u_max) = surface.domain_u();
        let (v_min, v_max) = surface.domain_v();
        let row = self.u_res + 1;
        let total = row * (self.v_res + 1);

        let sample_at = |idx: usize| {
            let (i, j) = (idx % row, idx / row);
            let u = self.tolerance.clamp_parameter(
                lerp(u_min, u_max, i as f64 / self.u_res as f64),
                u_min,
                u_max,
            );
            let v = self.tolerance.clamp_parameter(
                lerp(v_min, v_max, j as f64 / self.v_res as f64),
                v_min,
                v_max,
            );
            surface.sample(u, v, &self.tolerance)
        };

        if self.parallel {
            (0..total).into_par_iter().map(sample_at).collect()
        } else {
            (0..total).map(sample_at).collect()
        }
    }

    /// Build the mesh for grid samples produced by [`samples`](Self::samples).
    pub fn mesh_from_samples(&self, samples: &[SurfaceSample]) -> TriangleMesh {
        let row = self.u_res + 1;
        let uvs = (0..samples.len())
            .map(|idx| {
                Point2::new(
                    (idx % row) as f64 / self.u_res as f64,
                    (idx / row) as f64 / self.v_res as f64,
                )
            })
            .collect();

        TriangleMesh {
            positions: samples.iter().map(|s| s.position).collect(),
            normals: samples.iter().map(|s| s.normal).collect(),
            indices: grid_indices(self.u_res, self.v_res),
            uvs,
        }
    }

    /// Sample `surface` and connect the samples into a fresh mesh.
    pub fn tessellate(&self, surface: &dyn Surface) -> TriangleMesh {
        let samples = self.samples(surface);
        let fallbacks = samples.iter().filter(|s| s.fallback).count();
        if fallbacks > 0 {
            debug!(
                "{} of {} samples used the fallback normal",
                fallbacks,
                samples.len()
            );
        }
        let mesh = self.mesh_from_samples(&samples);
        debug!(
            "Tessellated {}x{} grid: {} vertices, {} triangles",
            self.u_res,
            self.v_res,
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        mesh
    }
}

/// Triangle indices for a `u_res x v_res` cell grid of row length `u_res + 1`.
///
/// Each cell with corners `tl = j * (u_res + 1) + i`, `tr = tl + 1`,
/// `bl = tl + u_res + 1`, `br = bl + 1` yields `(tl, bl, br)` and `(tl, br, tr)`.
/// The grid must fit the u32 range, which [`SurfaceTessellator::new`] checks.
pub(crate) fn grid_indices(u_res: usize, v_res: usize) -> Vec<u32> {
    let row = u_res + 1;
    let mut indices = Vec::with_capacity(u_res * v_res * 6);
    for j in 0..v_res {
        for i in 0..u_res {
            let top_left = (j * row + i) as u32;
            let top_right = top_left + 1;
            let bottom_left = ((j + 1) * row + i) as u32;
            let bottom_right = bottom_left + 1;

            indices.extend_from_slice(&[top_left, bottom_left, bottom_right]);
            indices.extend_from_slice(&[top_left, bottom_right, top_right]);
        }
    }
    indices
}

/// Tessellate a surface by uniform subdivision of its parameter domain.
pub fn tessellate_surface(surface: &dyn Surface, u_res: usize, v_res: usize) -> Result<TriangleMesh> {
    Ok(SurfaceTessellator::new(u_res, v_res)?.tessellate(surface))
}

/// [`tessellate_surface`] with samples evaluated in parallel.
pub fn tessellate_surface_par(
    surface: &dyn Surface,
    u_res: usize,
    v_res: usize,
) -> Result<TriangleMesh> {
    Ok(SurfaceTessellator::new(u_res, v_res)?
        .parallel(true)
        .tessellate(surface))
}

#[cfg(test)]
mod tests {
    use super::*;
    use knotwork_geometry::BSplineSurface;

    #[test]
    fn test_grid_indices_single_cell() {
        assert_eq!(grid_indices(1, 1), vec![0, 2, 3, 0, 3, 1]);
    }

    #[test]
    fn test_grid_indices_row_stride() {
        let indices = grid_indices(2, 1);
        // second cell starts at i = 1
        assert_eq!(&indices[6..], &[1, 4, 5, 1, 5, 2]);
    }

    #[test]
    fn test_zero_resolution_rejected() {
        assert!(matches!(
            SurfaceTessellator::new(0, 4),
            Err(KnotworkError::InvalidResolution(_))
        ));
        assert!(SurfaceTessellator::new(4, 0).is_err());
    }

    #[test]
    fn test_samples_are_row_major() {
        let surface = BSplineSurface::reference().unwrap();
        let tess = SurfaceTessellator::new(4, 2).unwrap();
        let samples = tess.samples(&surface);
        assert_eq!(samples.len(), 5 * 3);
        // Along a row only u changes.
        assert_eq!(samples[0].u, 0.0);
        assert_eq!(samples[1].u, 0.5);
        assert_eq!(samples[1].v, 0.0);
        // Next row starts back at u = 0 with the next v.
        assert_eq!(samples[5].u, 0.0);
        assert_eq!(samples[5].v, 0.5);
        // The upper ends are biased inside the open domain.
        assert_eq!(samples[4].u, 2.0 - 1e-4);
        assert_eq!(samples[14].v, 1.0 - 1e-4);
    }

    #[test]
    fn test_custom_bias_moves_last_row() {
        let surface = BSplineSurface::reference().unwrap();
        let tolerance = Tolerance::new(0.25, Tolerance::DEFAULT_DEGENERATE_NORMAL);
        let tess = SurfaceTessellator::new(4, 2).unwrap().with_tolerance(tolerance);
        let samples = tess.samples(&surface);
        assert_eq!(samples[4].u, 1.75);
        assert_eq!(samples[14].v, 0.75);
        // Interior samples are untouched.
        assert_eq!(samples[1].u, 0.5);
        assert_eq!(samples[5].v, 0.5);
    }

    #[test]
    fn test_uvs_normalized() {
        let surface = BSplineSurface::reference().unwrap();
        let mesh = tessellate_surface(&surface, 4, 2).unwrap();
        assert_eq!(mesh.uvs[0], Point2::new(0.0, 0.0));
        assert_eq!(mesh.uvs[4], Point2::new(1.0, 0.0));
        assert_eq!(mesh.uvs[14], Point2::new(1.0, 1.0));
    }
}
