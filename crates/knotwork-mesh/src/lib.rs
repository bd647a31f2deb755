pub mod point_cloud;
pub mod tessellator;
pub mod triangle_mesh;

pub use point_cloud::PointCloud;
pub use tessellator::{tessellate_surface, tessellate_surface_par, SurfaceTessellator};
pub use triangle_mesh::TriangleMesh;
