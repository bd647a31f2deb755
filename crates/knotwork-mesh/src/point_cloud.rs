//! Point clouds read from whitespace-delimited text and their grid triangulation.
//!
//! The file format is a count header line followed by one point per line as
//! `x z y`: the second column is the horizontal depth axis and the third is
//! height. Points are stored y-up as `(x, y, z)`.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use knotwork_core::traits::BoundingBox;
use knotwork_core::{KnotworkError, Result};
use knotwork_math::{Aabb3, Point3, Vector3};
use log::{info, warn};

use crate::TriangleMesh;

/// Upper limit on the number of cells in a triangulation grid.
pub const MAX_GRID_CELLS: usize = 1 << 26;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    pub points: Vec<Point3>,
}

impl PointCloud {
    pub fn new(points: Vec<Point3>) -> Self {
        Self { points }
    }

    /// Open and parse a point cloud file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let cloud = Self::parse(BufReader::new(file))?;
        info!("Loaded {} points from {}", cloud.len(), path.display());
        Ok(cloud)
    }

    /// Parse the text format. Lines that do not hold three numbers are skipped.
    pub fn parse<R: BufRead>(reader: R) -> Result<Self> {
        let mut lines = reader.split(b'\n');

        let declared = match lines.next() {
            Some(header) => {
                let header = header?;
                let header = String::from_utf8_lossy(&header);
                info!("Point count header: {}", header.trim());
                header.trim().parse::<usize>().ok()
            }
            None => return Ok(Self::default()),
        };

        let mut points = Vec::with_capacity(declared.unwrap_or(0).min(1 << 20));
        for (idx, line) in lines.enumerate() {
            let line = line?;
            let line_number = idx + 2;
            let Ok(line) = std::str::from_utf8(&line) else {
                warn!("Line {} is not valid UTF-8, skipping", line_number);
                continue;
            };
            if line.trim().is_empty() {
                continue;
            }
            match parse_point(line) {
                Some(p) => points.push(p),
                None => warn!(
                    "Failed to read coordinates on line {}: {}",
                    line_number, line
                ),
            }
        }

        if let Some(declared) = declared {
            if declared != points.len() {
                warn!(
                    "Header declares {} points but {} were read",
                    declared,
                    points.len()
                );
            }
        }

        Ok(Self { points })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn aabb(&self) -> Option<Aabb3> {
        Aabb3::from_points(&self.points)
    }

    /// Move the cloud so its bounding-box centre sits at the origin.
    ///
    /// Returns the offset that was subtracted from every point.
    pub fn center(&mut self) -> Vector3 {
        let Some(aabb) = self.aabb() else {
            return Vector3::ZERO;
        };
        let offset = aabb.center();
        for p in &mut self.points {
            *p -= offset;
        }
        info!(
            "Centered {} points around {:.3}, {:.3}, {:.3}",
            self.points.len(),
            offset.x,
            offset.y,
            offset.z
        );
        offset
    }

    /// Triangulate the cloud over a regular grid in the XZ plane.
    ///
    /// Each point is binned into the cell `floor((p - min) / spacing)`; when
    /// several points share a cell the last one wins. Every grid quad whose four
    /// corners are occupied becomes two triangles. Vertex normals are the
    /// normalized sums of the adjacent unit face normals.
    pub fn triangulate(&self, spacing: f64) -> Result<TriangleMesh> {
        if !(spacing.is_finite() && spacing > 0.0) {
            return Err(KnotworkError::InvalidResolution(format!(
                "grid spacing must be positive, got {}",
                spacing
            )));
        }
        let Some(aabb) = self.aabb() else {
            return Ok(TriangleMesh::default());
        };
        if self.points.len() > u32::MAX as usize {
            return Err(KnotworkError::Mesh(format!(
                "{} points exceed the u32 index range",
                self.points.len()
            )));
        }

        let extents = aabb.extents();
        let too_fine = || {
            KnotworkError::InvalidResolution(format!(
                "grid spacing {} is too fine for extents {:.3} x {:.3}",
                spacing, extents.x, extents.z
            ))
        };
        let width = grid_cells(extents.x, spacing).ok_or_else(too_fine)?;
        let height = grid_cells(extents.z, spacing).ok_or_else(too_fine)?;
        let cells = width
            .checked_mul(height)
            .filter(|&n| n <= MAX_GRID_CELLS)
            .ok_or_else(too_fine)?;

        let mut grid: Vec<Option<u32>> = vec![None; cells];
        for (idx, p) in self.points.iter().enumerate() {
            let col = ((p.x - aabb.min.x) / spacing) as usize;
            let row = ((p.z - aabb.min.z) / spacing) as usize;
            if col < width && row < height {
                grid[row * width + col] = Some(idx as u32);
            }
        }

        let mut indices = Vec::new();
        for row in 0..height.saturating_sub(1) {
            for col in 0..width.saturating_sub(1) {
                let corners = (
                    grid[row * width + col],
                    grid[row * width + col + 1],
                    grid[(row + 1) * width + col],
                    grid[(row + 1) * width + col + 1],
                );
                if let (Some(tl), Some(tr), Some(bl), Some(br)) = corners {
                    indices.extend_from_slice(&[tl, bl, tr]);
                    indices.extend_from_slice(&[tr, bl, br]);
                }
            }
        }

        let mut mesh = TriangleMesh {
            positions: self.points.clone(),
            normals: vec![],
            indices,
            uvs: vec![],
        };
        mesh.compute_normals();
        Ok(mesh)
    }
}

impl BoundingBox for PointCloud {
    type Point = Point3;

    fn bounding_box(&self) -> (Point3, Point3) {
        self.aabb()
            .map_or((Point3::ZERO, Point3::ZERO), |aabb| (aabb.min, aabb.max))
    }
}

/// Number of grid columns needed to cover `extent`, if it stays within
/// [`MAX_GRID_CELLS`].
fn grid_cells(extent: f64, spacing: f64) -> Option<usize> {
    let steps = (extent / spacing).floor();
    if !steps.is_finite() || steps >= MAX_GRID_CELLS as f64 {
        return None;
    }
    (steps as usize).checked_add(1)
}

/// Read `x z y` from the front of a line.
fn parse_point(line: &str) -> Option<Point3> {
    let mut fields = line.split_whitespace().map(str::parse::<f64>);
    let x = fields.next()?.ok()?;
    let z = fields.next()?.ok()?;
    let y = fields.next()?.ok()?;
    let p = Point3::new(x, y, z);
    p.is_finite().then_some(p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use knotwork_math::dvec3;
    use std::io::Cursor;

    fn grid_cloud(n: usize, spacing: f64) -> PointCloud {
        let mut points = Vec::new();
        for row in 0..n {
            for col in 0..n {
                points.push(dvec3(col as f64 * spacing, 0.0, row as f64 * spacing));
            }
        }
        PointCloud::new(points)
    }

    #[test]
    fn test_parse_swaps_height_axis() {
        let text = "2\n1.0 2.0 3.0\n4.0 5.0 6.0\n";
        let cloud = PointCloud::parse(Cursor::new(text)).unwrap();
        assert_eq!(cloud.points, vec![dvec3(1.0, 3.0, 2.0), dvec3(4.0, 6.0, 5.0)]);
    }

    #[test]
    fn test_parse_skips_bad_lines() {
        let text = "3\n1 2 3\nnot a point\n\n4 5\n7 8 9 extra\n";
        let cloud = PointCloud::parse(Cursor::new(text)).unwrap();
        assert_eq!(cloud.points, vec![dvec3(1.0, 3.0, 2.0), dvec3(7.0, 9.0, 8.0)]);
    }

    #[test]
    fn test_parse_skips_invalid_utf8_line() {
        let text: &[u8] = b"3\n1 2 3\n\xff\xfe\n4 5 6\n";
        let cloud = PointCloud::parse(Cursor::new(text)).unwrap();
        assert_eq!(cloud.points, vec![dvec3(1.0, 3.0, 2.0), dvec3(4.0, 6.0, 5.0)]);
    }

    #[test]
    fn test_parse_crlf_lines() {
        let cloud = PointCloud::parse(Cursor::new("1\r\n1 2 3\r\n")).unwrap();
        assert_eq!(cloud.points, vec![dvec3(1.0, 3.0, 2.0)]);
    }

    #[test]
    fn test_parse_empty_input() {
        let cloud = PointCloud::parse(Cursor::new("")).unwrap();
        assert!(cloud.is_empty());
        let cloud = PointCloud::parse(Cursor::new("0\n")).unwrap();
        assert!(cloud.is_empty());
    }

    #[test]
    fn test_center() {
        let mut cloud = PointCloud::new(vec![dvec3(10.0, 0.0, 20.0), dvec3(20.0, 4.0, 40.0)]);
        let offset = cloud.center();
        assert_eq!(offset, dvec3(15.0, 2.0, 30.0));
        assert_eq!(cloud.points[0], dvec3(-5.0, -2.0, -10.0));
        assert_eq!(cloud.bounding_box(), (dvec3(-5.0, -2.0, -10.0), dvec3(5.0, 2.0, 10.0)));
    }

    #[test]
    fn test_center_empty() {
        let mut cloud = PointCloud::default();
        assert_eq!(cloud.center(), Vector3::ZERO);
    }

    #[test]
    fn test_triangulate_full_grid() {
        let cloud = grid_cloud(4, 10.0);
        let mesh = cloud.triangulate(10.0).unwrap();
        assert_eq!(mesh.vertex_count(), 16);
        assert_eq!(mesh.triangle_count(), 3 * 3 * 2);
        // Flat cloud in XZ: all normals point straight up or down, consistently.
        let up = mesh.normals[0].y;
        assert_relative_eq!(up.abs(), 1.0, epsilon = 1e-12);
        for n in &mesh.normals {
            assert_relative_eq!(n.y, up, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_triangulate_first_cell_order() {
        let cloud = grid_cloud(2, 1.0);
        let mesh = cloud.triangulate(1.0).unwrap();
        // tl = 0, tr = 1, bl = 2, br = 3
        assert_eq!(mesh.indices, vec![0, 2, 1, 1, 2, 3]);
    }

    #[test]
    fn test_triangulate_skips_holes() {
        let mut cloud = grid_cloud(3, 1.0);
        // Drop the centre point: every cell loses a corner.
        cloud.points.remove(4);
        let mesh = cloud.triangulate(1.0).unwrap();
        assert_eq!(mesh.triangle_count(), 0);
        assert!(mesh.normals.iter().all(|n| *n == Vector3::ZERO));
    }

    #[test]
    fn test_triangulate_rejects_bad_spacing() {
        let cloud = grid_cloud(2, 1.0);
        assert!(cloud.triangulate(0.0).is_err());
        assert!(cloud.triangulate(-1.0).is_err());
        assert!(cloud.triangulate(f64::NAN).is_err());
    }

    #[test]
    fn test_triangulate_rejects_too_fine_spacing() {
        let cloud = PointCloud::new(vec![dvec3(0.0, 0.0, 0.0), dvec3(1.0, 0.0, 1.0)]);
        assert!(matches!(
            cloud.triangulate(1e-300),
            Err(KnotworkError::InvalidResolution(_))
        ));

        let wide = PointCloud::new(vec![dvec3(0.0, 0.0, 0.0), dvec3(1000.0, 0.0, 1000.0)]);
        assert!(matches!(
            wide.triangulate(1e-6),
            Err(KnotworkError::InvalidResolution(_))
        ));
    }

    #[test]
    fn test_triangulate_single_point() {
        let cloud = PointCloud::new(vec![dvec3(5.0, 1.0, 5.0)]);
        let mesh = cloud.triangulate(1e-300).unwrap();
        assert_eq!(mesh.vertex_count(), 1);
        assert_eq!(mesh.triangle_count(), 0);
    }

    #[test]
    fn test_triangulate_empty() {
        let mesh = PointCloud::default().triangulate(10.0).unwrap();
        assert_eq!(mesh.vertex_count(), 0);
    }
}
