use std::path::Path;

use knotwork_core::{KnotworkError, Result};
use knotwork_math::{dvec3, Point3};
use serde::{Deserialize, Serialize};

/// Serializable description of a B-spline surface.
///
/// `control_points` is laid out row by row along u: the point for `(i, j)` is
/// at `j * u_count + i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceConfig {
    pub degree_u: usize,
    pub degree_v: usize,
    pub knots_u: Vec<f64>,
    pub knots_v: Vec<f64>,
    pub u_count: usize,
    pub v_count: usize,
    pub control_points: Vec<Point3>,
}

impl SurfaceConfig {
    /// The bi-quadratic 4x3 demo surface: a flat 3x2 sheet with the two
    /// middle points of the centre row raised to height 2.
    pub fn reference() -> Self {
        Self {
            degree_u: 2,
            degree_v: 2,
            knots_u: vec![0.0, 0.0, 0.0, 1.0, 2.0, 2.0, 2.0],
            knots_v: vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
            u_count: 4,
            v_count: 3,
            control_points: vec![
                dvec3(0.0, 0.0, 0.0),
                dvec3(1.0, 0.0, 0.0),
                dvec3(2.0, 0.0, 0.0),
                dvec3(3.0, 0.0, 0.0),
                dvec3(0.0, 1.0, 0.0),
                dvec3(1.0, 1.0, 2.0),
                dvec3(2.0, 1.0, 2.0),
                dvec3(3.0, 1.0, 0.0),
                dvec3(0.0, 2.0, 0.0),
                dvec3(1.0, 2.0, 0.0),
                dvec3(2.0, 2.0, 0.0),
                dvec3(3.0, 2.0, 0.0),
            ],
        }
    }
}

impl SurfaceConfig {
    /// Parse a config from JSON.
    ///
    /// Malformed JSON is a [`KnotworkError::Parse`]; well-formed JSON that does
    /// not describe a config is a [`KnotworkError::Config`]. The grid itself is
    /// only checked when the surface is built.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            if e.is_syntax() || e.is_eof() {
                KnotworkError::Parse(e.to_string())
            } else {
                KnotworkError::Config(e.to_string())
            }
        })
    }

    /// Read and parse a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| KnotworkError::Config(e.to_string()))
    }
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self::reference()
    }
}
