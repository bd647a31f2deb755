//! Knotwork geometry: knot vectors, B-spline bases, and tensor-product surfaces.

pub mod basis;
pub mod knot;
pub mod surface;

pub use basis::{basis, basis_derivative, BSplineBasis};
pub use knot::KnotVector;
pub use surface::{BSplineSurface, Surface, SurfaceConfig, SurfaceSample, FALLBACK_NORMAL};
