//! Ball simulation on top of the surface evaluator.
//!
//! Balls move in the world XZ plane, bounce off axis-aligned walls and push
//! each other apart on contact. Heights can be taken from a B-spline surface
//! laid out y-up in the world (see [`contact::surface_to_world`]).

pub mod ball;
pub mod collision;
pub mod contact;
pub mod world;

pub use ball::Ball;
pub use collision::{balls_collide, bounce_off_walls, resolve_ball_collision, Bounds, CONTACT_FACTOR};
pub use contact::{surface_to_world, SurfaceHeightField};
pub use world::{StepReport, World};
