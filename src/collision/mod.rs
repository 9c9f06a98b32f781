//! Collision detection
//!
//! - [`intersect`]: ray vs AABB and ray vs triangle list kernels
//! - [`frustum`]: plane extraction and AABB culling
//! - [`mesh`]: per-object raycasts against simplified geometry
//! - [`terrain`]: ground-following and wall probes built on the above

pub mod bounds;
pub mod frustum;
pub mod intersect;
pub mod mesh;
pub mod terrain;

pub use bounds::BoundingBox;
pub use frustum::Frustum;
pub use intersect::{AabbHit, Faces, TriangleHit, Winding, intersect_ray_aabb, intersect_ray_triangles};
pub use mesh::{CollisionMesh, RaycastHit, SubMesh};
pub use terrain::{GroundContact, WallContact, ground_height, probe_wall};
