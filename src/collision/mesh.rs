//! Collision Mesh
//!
//! Position-only snapshot of a model's meshes used for ray queries against
//! level geometry. Built once at load time and never mutated afterwards.

use glam::{Mat4, Vec3};

use crate::assets::{ModelAsset, Subset, find_subset};

use super::bounds::BoundingBox;
use super::intersect::{Faces, Winding, intersect_ray_aabb, intersect_ray_triangles};

/// Geometry of one source mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct SubMesh {
    pub name: String,
    pub positions: Vec<Vec3>,
    pub indices: Vec<u32>,
    pub subsets: Vec<Subset>,
    pub bounds: BoundingBox,
    pub geometric_transform: Mat4,
    pub default_global_transform: Mat4,
}

impl SubMesh {
    /// Sub-mesh with identity transforms and bounds fitted to `positions`.
    #[must_use]
    pub fn new(name: impl Into<String>, positions: Vec<Vec3>, indices: Vec<u32>, subsets: Vec<Subset>) -> Self {
        let bounds = BoundingBox::from_points(positions.iter().copied()).unwrap_or_default();
        Self {
            name: name.into(),
            positions,
            indices,
            subsets,
            bounds,
            geometric_transform: Mat4::IDENTITY,
            default_global_transform: Mat4::IDENTITY,
        }
    }

    /// Subset owning the index-list position `index`.
    #[must_use]
    pub fn find_subset(&self, index: usize) -> Option<&Subset> {
        find_subset(&self.subsets, index)
    }

    /// Local-to-world matrix for an owner placed at `world`.
    #[inline]
    #[must_use]
    pub fn to_world(&self, world: &Mat4) -> Mat4 {
        *world * self.default_global_transform * self.geometric_transform
    }
}

/// Closest surface point found by [`CollisionMesh::raycast_faces`].
#[derive(Debug, Clone, PartialEq)]
pub struct RaycastHit {
    /// World-space hit point.
    pub point: Vec3,
    /// World-space distance from the ray origin.
    pub distance: f32,
    pub mesh_name: String,
    /// Material of the subset that was hit, when the index range is covered.
    pub material_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionMesh {
    pub name: String,
    pub meshes: Vec<SubMesh>,
    pub winding: Winding,
}

impl CollisionMesh {
    #[must_use]
    pub fn new(name: impl Into<String>, meshes: Vec<SubMesh>) -> Self {
        Self {
            name: name.into(),
            meshes,
            winding: Winding::default(),
        }
    }

    /// Snapshots positions, indices, subsets, bounds and transforms of every mesh.
    #[must_use]
    pub fn from_model(model: &ModelAsset) -> Self {
        let meshes = model
            .meshes
            .iter()
            .map(|m| SubMesh {
                name: m.name.clone(),
                positions: m.positions.clone(),
                indices: m.indices.clone(),
                subsets: m.subsets.clone(),
                bounds: m.bounds,
                geometric_transform: m.geometric_transform,
                default_global_transform: m.default_global_transform,
            })
            .collect();
        log::debug!("Collision mesh '{}' derived from model", model.name);
        Self::new(model.name.clone(), meshes)
    }

    #[must_use]
    pub fn with_winding(mut self, winding: Winding) -> Self {
        self.winding = winding;
        self
    }

    /// World-space bounds of all sub-meshes for an owner placed at `world`.
    #[must_use]
    pub fn world_bounds(&self, world: &Mat4) -> Option<BoundingBox> {
        self.meshes
            .iter()
            .map(|m| m.bounds.transform(&m.to_world(world)))
            .reduce(|a, b| a.union(&b))
    }

    /// Casts a world-space ray against both sides of every sub-mesh.
    #[must_use]
    pub fn raycast(
        &self,
        position: Vec3,
        direction: Vec3,
        world: &Mat4,
        skip_on_first_hit: bool,
    ) -> Option<RaycastHit> {
        self.raycast_faces(position, direction, world, skip_on_first_hit, Faces::Both)
    }

    /// Casts a world-space ray against the `faces` sides of every sub-mesh.
    ///
    /// Each sub-mesh is tested in its own local space behind an AABB early
    /// out. Candidates are compared by world-space distance. With
    /// `skip_on_first_hit` the scan stops at the first sub-mesh (in storage
    /// order) that registers any hit, which is not necessarily the closest.
    #[must_use]
    pub fn raycast_faces(
        &self,
        position: Vec3,
        direction: Vec3,
        world: &Mat4,
        skip_on_first_hit: bool,
        faces: Faces,
    ) -> Option<RaycastHit> {
        let mut closest: Option<RaycastHit> = None;

        for mesh in &self.meshes {
            let to_world = mesh.to_world(world);
            if to_world.determinant().abs() <= f32::MIN_POSITIVE {
                continue;
            }
            let to_local = to_world.inverse();
            let origin = to_local.transform_point3(position);
            let dir = to_local.transform_vector3(direction);

            if intersect_ray_aabb(origin, dir, mesh.bounds.min, mesh.bounds.max).is_none() {
                continue;
            }

            let Some(hit) = intersect_ray_triangles(
                bytemuck::cast_slice(&mesh.positions),
                3,
                &mesh.indices,
                origin,
                dir,
                f32::MAX,
                self.winding,
                faces,
            ) else {
                continue;
            };

            let point = to_world.transform_point3(hit.point);
            let distance = point.distance(position);
            if closest.as_ref().is_some_and(|c| distance >= c.distance) {
                continue;
            }

            closest = Some(RaycastHit {
                point,
                distance,
                mesh_name: mesh.name.clone(),
                material_name: mesh.find_subset(hit.first_index()).map(|s| s.material.clone()),
            });

            if skip_on_first_hit {
                break;
            }
        }

        closest
    }
}
