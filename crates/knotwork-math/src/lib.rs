pub mod aabb;
pub mod interp;

pub use aabb::Aabb3;
pub use glam::{dvec3, DVec2, DVec3};
pub use interp::lerp;

pub type Point2 = DVec2;
pub type Point3 = DVec3;
pub type Vector3 = DVec3;
