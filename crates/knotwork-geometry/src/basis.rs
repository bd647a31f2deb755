//! Cox–de Boor B-spline basis functions and their first derivatives.
//!
//! The free functions [`basis`] and [`basis_derivative`] are the direct
//! recursive definitions. They are total: out-of-range indices and
//! zero-length knot intervals contribute 0 instead of failing.
//!
//! [`BSplineBasis`] binds a degree to a [`KnotVector`] for one parametric
//! direction and adds table-based evaluation of every basis function at once.

use knotwork_core::{KnotworkError, Result};

use crate::knot::KnotVector;

/// Evaluate `N[i, degree](t)` by the Cox–de Boor recursion.
///
/// Degree-0 functions are indicators of the half-open interval
/// `[knots[i], knots[i + 1])`. Returns 0 when `i + degree + 1` is not a valid
/// knot index.
pub fn basis(i: usize, degree: usize, t: f64, knots: &[f64]) -> f64 {
    if i + degree + 1 >= knots.len() {
        return 0.0;
    }

    if degree == 0 {
        return if t >= knots[i] && t < knots[i + 1] {
            1.0
        } else {
            0.0
        };
    }

    let mut left = 0.0;
    let mut right = 0.0;

    let left_den = knots[i + degree] - knots[i];
    if left_den != 0.0 {
        left = (t - knots[i]) / left_den * basis(i, degree - 1, t, knots);
    }

    let right_den = knots[i + degree + 1] - knots[i + 1];
    if right_den != 0.0 {
        right = (knots[i + degree + 1] - t) / right_den * basis(i + 1, degree - 1, t, knots);
    }

    left + right
}

/// First derivative of `N[i, degree](t)` with respect to `t`.
///
/// Degree-0 functions have derivative 0 everywhere.
pub fn basis_derivative(i: usize, degree: usize, t: f64, knots: &[f64]) -> f64 {
    if degree == 0 || i + degree + 1 >= knots.len() {
        return 0.0;
    }

    let p = degree as f64;
    let mut left = 0.0;
    let mut right = 0.0;

    let left_den = knots[i + degree] - knots[i];
    if left_den != 0.0 {
        left = p / left_den * basis(i, degree - 1, t, knots);
    }

    let right_den = knots[i + degree + 1] - knots[i + 1];
    if right_den != 0.0 {
        right = p / right_den * basis(i + 1, degree - 1, t, knots);
    }

    left - right
}

/// Basis functions of one degree over one knot vector.
#[derive(Debug, Clone, PartialEq)]
pub struct BSplineBasis {
    degree: usize,
    knots: KnotVector,
}

impl BSplineBasis {
    /// Bind `degree` to `knots`; the knot vector needs at least `degree + 2` entries.
    pub fn new(degree: usize, knots: KnotVector) -> Result<Self> {
        if knots.len() < degree + 2 {
            return Err(KnotworkError::InvalidKnots(format!(
                "degree {} needs at least {} knots, got {}",
                degree,
                degree + 2,
                knots.len()
            )));
        }
        Ok(Self { degree, knots })
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn knots(&self) -> &KnotVector {
        &self.knots
    }

    /// Number of basis functions, i.e. control points this basis can weight.
    pub fn count(&self) -> usize {
        self.knots.len() - self.degree - 1
    }

    pub fn domain(&self) -> (f64, f64) {
        self.knots.domain()
    }

    pub fn value(&self, i: usize, t: f64) -> f64 {
        basis(i, self.degree, t, self.knots.as_slice())
    }

    pub fn derivative(&self, i: usize, t: f64) -> f64 {
        basis_derivative(i, self.degree, t, self.knots.as_slice())
    }

    /// All `count()` basis values at `t`.
    ///
    /// Builds the Cox–de Boor triangle bottom-up so each `N[i, d](t)` is
    /// computed once. Every entry uses the same arithmetic as [`basis`], so the
    /// results are bit-identical to calling [`value`](Self::value) per index.
    pub fn values(&self, t: f64) -> Vec<f64> {
        self.table(t, self.degree)
    }

    /// All `count()` basis derivatives at `t`, bit-identical to [`derivative`](Self::derivative).
    pub fn derivatives(&self, t: f64) -> Vec<f64> {
        let count = self.count();
        if self.degree == 0 {
            return vec![0.0; count];
        }

        let knots = self.knots.as_slice();
        let p = self.degree;
        let pf = p as f64;
        let lower = self.table(t, p - 1);

        (0..count)
            .map(|i| {
                let mut left = 0.0;
                let mut right = 0.0;

                let left_den = knots[i + p] - knots[i];
                if left_den != 0.0 {
                    left = pf / left_den * lower[i];
                }

                let right_den = knots[i + p + 1] - knots[i + 1];
                if right_den != 0.0 {
                    right = pf / right_den * lower[i + 1];
                }

                left - right
            })
            .collect()
    }

    /// Row `degree` of the basis triangle: `knots.len() - degree - 1` values.
    fn table(&self, t: f64, degree: usize) -> Vec<f64> {
        let knots = self.knots.as_slice();

        let mut row = vec![0.0; knots.len() - 1];
        if let Some(span) = self.knots.span(t) {
            row[span] = 1.0;
        }

        for d in 1..=degree {
            let next: Vec<f64> = (0..knots.len() - d - 1)
                .map(|i| {
                    let mut left = 0.0;
                    let mut right = 0.0;

                    let left_den = knots[i + d] - knots[i];
                    if left_den != 0.0 {
                        left = (t - knots[i]) / left_den * row[i];
                    }

                    let right_den = knots[i + d + 1] - knots[i + 1];
                    if right_den != 0.0 {
                        right = (knots[i + d + 1] - t) / right_den * row[i + 1];
                    }

                    left + right
                })
                .collect();
            row = next;
        }

        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const DEMO_U: [f64; 7] = [0.0, 0.0, 0.0, 1.0, 2.0, 2.0, 2.0];

    fn demo_basis() -> BSplineBasis {
        BSplineBasis::new(2, KnotVector::new(DEMO_U.to_vec()).unwrap()).unwrap()
    }

    #[test]
    fn test_degree_zero_half_open() {
        let knots = [0.0, 1.0, 2.0];
        assert_eq!(basis(0, 0, 0.0, &knots), 1.0);
        assert_eq!(basis(0, 0, 0.999, &knots), 1.0);
        assert_eq!(basis(0, 0, 1.0, &knots), 0.0);
        assert_eq!(basis(1, 0, 1.0, &knots), 1.0);
        assert_eq!(basis(1, 0, 2.0, &knots), 0.0);
    }

    #[test]
    fn test_out_of_range_index_is_zero() {
        assert_eq!(basis(4, 2, 1.0, &DEMO_U), 0.0);
        assert_eq!(basis(10, 0, 1.0, &DEMO_U), 0.0);
        assert_eq!(basis_derivative(4, 2, 1.0, &DEMO_U), 0.0);
        assert_eq!(basis(0, 0, 0.0, &[]), 0.0);
    }

    #[test]
    fn test_repeated_knots_do_not_divide_by_zero() {
        let knots = [0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        for i in 0..3 {
            let v = basis(i, 2, 0.5, &knots);
            assert!(v.is_finite());
            assert!(basis_derivative(i, 2, 0.5, &knots).is_finite());
        }
        // Bernstein polynomials at t = 0.5
        assert_relative_eq!(basis(0, 2, 0.5, &knots), 0.25);
        assert_relative_eq!(basis(1, 2, 0.5, &knots), 0.5);
        assert_relative_eq!(basis(2, 2, 0.5, &knots), 0.25);
    }

    #[test]
    fn test_quadratic_values_at_interior_knot() {
        // At t = 1 the middle function peaks at 1/2 on each side.
        assert_relative_eq!(basis(1, 2, 1.0, &DEMO_U), 0.5);
        assert_relative_eq!(basis(2, 2, 1.0, &DEMO_U), 0.5);
        assert_eq!(basis(0, 2, 1.0, &DEMO_U), 0.0);
        assert_eq!(basis(3, 2, 1.0, &DEMO_U), 0.0);
    }

    #[test]
    fn test_derivative_degree_zero() {
        assert_eq!(basis_derivative(0, 0, 0.5, &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn test_derivative_of_bernstein() {
        // B0 = (1-t)^2, B0' = -2(1-t)
        let knots = [0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        assert_relative_eq!(basis_derivative(0, 2, 0.25, &knots), -1.5);
        assert_relative_eq!(basis_derivative(2, 2, 0.25, &knots), 0.5);
    }

    #[test]
    fn test_basis_requires_enough_knots() {
        let short = KnotVector::new(vec![0.0, 0.0, 1.0]).unwrap();
        assert!(BSplineBasis::new(2, short).is_err());
        assert_eq!(demo_basis().count(), 4);
    }

    #[test]
    fn test_table_matches_recursion_bitwise() {
        let basis = demo_basis();
        for step in 0..=40 {
            let t = step as f64 * 0.05 - 0.01;
            let table = basis.values(t);
            let dtable = basis.derivatives(t);
            assert_eq!(table.len(), basis.count());
            assert_eq!(dtable.len(), basis.count());
            for i in 0..basis.count() {
                assert_eq!(table[i].to_bits(), basis.value(i, t).to_bits(), "N[{}]({})", i, t);
                assert_eq!(
                    dtable[i].to_bits(),
                    basis.derivative(i, t).to_bits(),
                    "dN[{}]({})",
                    i,
                    t
                );
            }
        }
    }

    #[test]
    fn test_table_degree_zero() {
        let basis = BSplineBasis::new(0, KnotVector::new(vec![0.0, 1.0, 2.0]).unwrap()).unwrap();
        assert_eq!(basis.values(1.5), vec![0.0, 1.0]);
        assert_eq!(basis.derivatives(1.5), vec![0.0, 0.0]);
        assert_eq!(basis.values(2.0), vec![0.0, 0.0]);
    }
}
