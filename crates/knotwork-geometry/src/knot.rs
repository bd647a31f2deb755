//! Knot vectors for B-spline bases.

use knotwork_core::{KnotworkError, Result};
use serde::{Deserialize, Serialize};

/// A non-decreasing sequence of finite parameter breakpoints.
///
/// The parameter domain is the right-open interval `[front, back)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct KnotVector(Vec<f64>);

impl KnotVector {
    /// Build a knot vector, rejecting empty, non-finite or decreasing input.
    pub fn new(knots: Vec<f64>) -> Result<Self> {
        if knots.is_empty() {
            return Err(KnotworkError::InvalidKnots("knot vector is empty".into()));
        }
        if let Some(pos) = knots.iter().position(|k| !k.is_finite()) {
            return Err(KnotworkError::InvalidKnots(format!(
                "knot {} is not finite: {}",
                pos, knots[pos]
            )));
        }
        if let Some(pos) = knots.windows(2).position(|w| w[1] < w[0]) {
            return Err(KnotworkError::InvalidKnots(format!(
                "knots must be non-decreasing: knots[{}] = {} > knots[{}] = {}",
                pos,
                knots[pos],
                pos + 1,
                knots[pos + 1]
            )));
        }
        Ok(Self(knots))
    }

    /// Open uniform knot vector for `count` basis functions of the given degree.
    ///
    /// The first and last `degree + 1` knots are repeated so the curve or surface
    /// interpolates its end control points. Interior knots are spaced one unit
    /// apart, giving the domain `[0, count - degree]`.
    pub fn clamped_uniform(degree: usize, count: usize) -> Result<Self> {
        if count <= degree {
            return Err(KnotworkError::InvalidKnots(format!(
                "need at least {} control points for degree {}, got {}",
                degree + 1,
                degree,
                count
            )));
        }
        let last = (count - degree) as f64;
        let knots = (0..count + degree + 1)
            .map(|i| {
                if i <= degree {
                    0.0
                } else if i >= count {
                    last
                } else {
                    (i - degree) as f64
                }
            })
            .collect();
        Self::new(knots)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn front(&self) -> f64 {
        self.0[0]
    }

    pub fn back(&self) -> f64 {
        self.0[self.0.len() - 1]
    }

    /// The parameter domain `(front, back)`; the upper end is excluded.
    pub fn domain(&self) -> (f64, f64) {
        (self.front(), self.back())
    }

    /// Index `k` of the half-open span with `knots[k] <= t < knots[k + 1]`.
    ///
    /// Returns `None` when `t` lies outside `[front, back)`.
    pub fn span(&self, t: f64) -> Option<usize> {
        let upper = self.0.partition_point(|&k| k <= t);
        if upper == 0 || upper == self.0.len() {
            None
        } else {
            Some(upper - 1)
        }
    }
}

impl AsRef<[f64]> for KnotVector {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

impl TryFrom<Vec<f64>> for KnotVector {
    type Error = KnotworkError;

    fn try_from(knots: Vec<f64>) -> Result<Self> {
        Self::new(knots)
    }
}

impl From<KnotVector> for Vec<f64> {
    fn from(knots: KnotVector) -> Self {
        knots.0
    }
}
