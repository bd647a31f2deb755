use std::f64::consts::PI;

use knotwork_core::{KnotworkError, Result};
use knotwork_math::{Point2, Point3, Vector3};
use knotwork_mesh::TriangleMesh;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub position: Point3,
    pub velocity: Vector3,
    pub radius: f64,
}

impl Ball {
    pub fn new(position: Point3, velocity: Vector3, radius: f64) -> Self {
        Self {
            position,
            velocity,
            radius,
        }
    }

    /// UV sphere around the ball's current position.
    ///
    /// `stacks` latitude bands run from the +Z pole to the -Z pole and each band
    /// is split into `sectors` slices. The pole bands emit one triangle per
    /// slice, the others two, all wound counter-clockwise seen from outside.
    pub fn mesh(&self, sectors: usize, stacks: usize) -> Result<TriangleMesh> {
        if sectors < 3 || stacks < 2 {
            return Err(KnotworkError::InvalidResolution(format!(
                "sphere needs at least 3 sectors and 2 stacks, got {} and {}",
                sectors, stacks
            )));
        }

        let sector_step = 2.0 * PI / sectors as f64;
        let stack_step = PI / stacks as f64;
        let vertex_count = (stacks + 1) * (sectors + 1);

        let mut positions = Vec::with_capacity(vertex_count);
        let mut normals = Vec::with_capacity(vertex_count);
        let mut uvs = Vec::with_capacity(vertex_count);

        for i in 0..=stacks {
            let stack_angle = PI / 2.0 - i as f64 * stack_step;
            let ring = stack_angle.cos();
            let z = stack_angle.sin();

            for j in 0..=sectors {
                let sector_angle = j as f64 * sector_step;
                let dir = Vector3::new(ring * sector_angle.cos(), ring * sector_angle.sin(), z);
                positions.push(self.position + dir * self.radius);
                normals.push(dir);
                uvs.push(Point2::new(
                    j as f64 / sectors as f64,
                    i as f64 / stacks as f64,
                ));
            }
        }

        let mut indices = Vec::with_capacity(sectors * (stacks - 1) * 6);
        for i in 0..stacks {
            let mut k1 = (i * (sectors + 1)) as u32;
            let mut k2 = k1 + sectors as u32 + 1;

            for _ in 0..sectors {
                if i != 0 {
                    indices.extend_from_slice(&[k1, k2, k1 + 1]);
                }
                if i != stacks - 1 {
                    indices.extend_from_slice(&[k1 + 1, k2, k2 + 1]);
                }
                k1 += 1;
                k2 += 1;
            }
        }

        Ok(TriangleMesh {
            positions,
            normals,
            indices,
            uvs,
        })
    }
}
