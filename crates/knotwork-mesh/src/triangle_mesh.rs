use knotwork_core::traits::Validate;
use knotwork_core::{KnotworkError, Result};
use knotwork_math::aabb::Aabb3;
use knotwork_math::{Point2, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Render-ready triangle mesh: per-vertex attributes plus a flat index list.
///
/// `indices` holds three entries per triangle. `uvs` is empty for meshes
/// without a parametrization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriangleMesh {
    pub positions: Vec<Point3>,
    pub normals: Vec<Vector3>,
    pub indices: Vec<u32>,
    pub uvs: Vec<Point2>,
}

impl TriangleMesh {
    /// Number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Merge another mesh into this one, offsetting indices appropriately.
    pub fn merge(&mut self, other: &TriangleMesh) {
        let offset = self.positions.len() as u32;
        self.positions.extend_from_slice(&other.positions);
        self.normals.extend_from_slice(&other.normals);
        self.uvs.extend_from_slice(&other.uvs);
        self.indices
            .extend(other.indices.iter().map(|&i| i + offset));
    }

    /// Smooth vertex normals from the triangle list.
    ///
    /// Each vertex gets the sum of the unit normals of its adjacent faces,
    /// normalized, so every face counts equally regardless of its area.
    /// Degenerate faces contribute nothing. Vertices not used by any triangle
    /// keep a zero normal.
    pub fn compute_normals(&mut self) {
        let n = self.positions.len();
        self.normals.clear();
        self.normals.resize(n, Vector3::ZERO);

        for tri in self.indices.chunks_exact(3) {
            let (i0, i1, i2) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            let p0 = self.positions[i0];
            let p1 = self.positions[i1];
            let p2 = self.positions[i2];
            let normal = (p1 - p0).cross(p2 - p0).normalize_or_zero();
            self.normals[i0] += normal;
            self.normals[i1] += normal;
            self.normals[i2] += normal;
        }

        for n in &mut self.normals {
            *n = n.normalize_or_zero();
        }
    }

    /// Compute the axis-aligned bounding box of all positions.
    pub fn bounding_box(&self) -> Aabb3 {
        Aabb3::from_points(&self.positions).unwrap_or(Aabb3::new(Point3::ZERO, Point3::ZERO))
    }
}

impl Validate for TriangleMesh {
    fn validate(&self) -> Result<()> {
        if self.indices.len() % 3 != 0 {
            return Err(KnotworkError::Mesh(format!(
                "index count {} is not a multiple of 3",
                self.indices.len()
            )));
        }
        let n = self.positions.len();
        if let Some(&bad) = self.indices.iter().find(|&&i| i as usize >= n) {
            return Err(KnotworkError::Mesh(format!(
                "index {} out of bounds for {} vertices",
                bad, n
            )));
        }
        if !self.normals.is_empty() && self.normals.len() != n {
            return Err(KnotworkError::Mesh(format!(
                "{} normals for {} vertices",
                self.normals.len(),
                n
            )));
        }
        if !self.uvs.is_empty() && self.uvs.len() != n {
            return Err(KnotworkError::Mesh(format!(
                "{} uvs for {} vertices",
                self.uvs.len(),
                n
            )));
        }
        Ok(())
    }
}
