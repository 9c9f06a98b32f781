//! Terrain following
//!
//! Ray probes that keep actors on the ground and out of walls.

use glam::{Mat4, Vec3};

use super::intersect::Faces;
use super::mesh::CollisionMesh;

/// Ground under a probed position.
#[derive(Debug, Clone, PartialEq)]
pub struct GroundContact {
    pub point: Vec3,
    pub mesh_name: String,
    pub material_name: Option<String>,
}

/// Wall in front of a probed position.
#[derive(Debug, Clone, PartialEq)]
pub struct WallContact {
    pub point: Vec3,
    /// How far the probed position reaches into the collision radius.
    pub penetration: f32,
    /// Horizontal correction that moves the position back to the radius.
    pub push_back: Vec3,
    pub material_name: Option<String>,
}

/// Finds the ground below `position` with a straight-down ray starting
/// `lift_up` above it. Only upward-facing surfaces count; stops at the first
/// sub-mesh that is hit.
#[must_use]
pub fn ground_height(mesh: &CollisionMesh, transform: &Mat4, position: Vec3, lift_up: f32) -> Option<GroundContact> {
    let origin = position + Vec3::Y * lift_up;
    mesh.raycast_faces(origin, Vec3::NEG_Y, transform, true, Faces::Front)
        .map(|hit| GroundContact {
            point: hit.point,
            mesh_name: hit.mesh_name,
            material_name: hit.material_name,
        })
}

/// Probes for a wall along the horizontal part of `forward`.
///
/// The ray starts `step_back` behind and `step_up` above `position`, so a
/// wall the position already crossed is still found. Walls seen from behind
/// are ignored, so moving away from a wall never pushes back. A contact is reported
/// when the closest hit is horizontally closer than `radius` to `position`.
#[must_use]
pub fn probe_wall(
    mesh: &CollisionMesh,
    transform: &Mat4,
    position: Vec3,
    forward: Vec3,
    step_back: f32,
    step_up: f32,
    radius: f32,
) -> Option<WallContact> {
    let heading = Vec3::new(forward.x, 0.0, forward.z).normalize_or_zero();
    if heading == Vec3::ZERO {
        return None;
    }

    let origin = position - heading * step_back + Vec3::Y * step_up;
    let hit = mesh.raycast_faces(origin, heading, transform, false, Faces::Front)?;

    let offset = hit.point - position;
    let distance = offset.x.hypot(offset.z);
    if distance >= radius {
        return None;
    }

    let penetration = radius - distance;
    Some(WallContact {
        point: hit.point,
        penetration,
        push_back: -heading * penetration,
        material_name: hit.material_name,
    })
}
