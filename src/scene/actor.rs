//! Actors
//!
//! Every object living in the world is an [`Actor`]: a name, a
//! [`Transform`], motion state and an [`ActorKind`] carrying the per-kind
//! data. Behavior that differs between kinds is dispatched with a `match`.

use glam::{Mat4, Vec3};

use crate::collision::mesh::CollisionMesh;
use crate::collision::terrain::{ground_height, probe_wall};
use crate::settings::TransformSettings;

use super::camera::CameraRig;
use super::transform::Transform;

/// Avatar wall probe: ray start behind the avatar.
pub const AVATAR_STEP_BACK: f32 = 1.0;
/// Avatar wall probe: ray start above the feet.
pub const AVATAR_STEP_UP: f32 = 1.5;
/// Avatar wall probe: horizontal collision radius.
pub const AVATAR_COLLISION_RADIUS: f32 = 0.5;
/// Avatar ground probe: ray start above the feet.
pub const AVATAR_LIFT_UP: f32 = 1.75;
/// Boss and camera ground probe: ray start above the position.
pub const TALL_LIFT_UP: f32 = 10.0;

/// Kind discriminant used for type-checked lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorTag {
    Avatar,
    Boss,
    Camera,
    Prop,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarState {
    pub heart_points: i32,
    pub max_heart_points: i32,
    /// Material of the ground under the avatar.
    pub current_location: Option<String>,
}

impl Default for AvatarState {
    fn default() -> Self {
        Self {
            heart_points: 10,
            max_heart_points: 10,
            current_location: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BossState {
    pub health_points: f32,
    pub max_health_points: f32,
}

impl BossState {
    #[must_use]
    pub fn health_percentage(&self) -> f32 {
        self.health_points / self.max_health_points
    }
}

impl Default for BossState {
    fn default() -> Self {
        Self {
            health_points: 18.0,
            max_health_points: 18.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActorKind {
    Avatar(AvatarState),
    Boss(BossState),
    Camera(CameraRig),
    Prop,
}

impl ActorKind {
    #[must_use]
    pub fn tag(&self) -> ActorTag {
        match self {
            Self::Avatar(_) => ActorTag::Avatar,
            Self::Boss(_) => ActorTag::Boss,
            Self::Camera(_) => ActorTag::Camera,
            Self::Prop => ActorTag::Prop,
        }
    }
}

/// What [`Actor::collide_with`] changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionResponse {
    /// The actor was lifted onto the ground.
    pub grounded: bool,
    /// The actor was pushed out of a wall.
    pub blocked: bool,
}

#[derive(Debug, Clone)]
pub struct Actor {
    pub name: String,
    pub transform: Transform,
    pub velocity: Vec3,
    /// Facing direction, world space.
    pub forward: Vec3,
    pub kind: ActorKind,
}

impl Actor {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ActorKind) -> Self {
        Self {
            name: name.into(),
            transform: Transform::new(),
            velocity: Vec3::ZERO,
            forward: Vec3::Z,
            kind,
        }
    }

    #[must_use]
    pub fn avatar(name: impl Into<String>) -> Self {
        Self::new(name, ActorKind::Avatar(AvatarState::default()))
    }

    #[must_use]
    pub fn boss(name: impl Into<String>) -> Self {
        Self::new(name, ActorKind::Boss(BossState::default()))
    }

    #[must_use]
    pub fn camera(name: impl Into<String>, rig: CameraRig) -> Self {
        Self::new(name, ActorKind::Camera(rig))
    }

    #[must_use]
    pub fn prop(name: impl Into<String>) -> Self {
        Self::new(name, ActorKind::Prop)
    }

    #[must_use]
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    #[must_use]
    pub fn tag(&self) -> ActorTag {
        self.kind.tag()
    }

    #[inline]
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    /// Recomposes the transform with the world's unit and axis conventions.
    pub fn compose_transform(&mut self, settings: &TransformSettings) -> Mat4 {
        self.transform
            .compose(settings.to_meters_scale, settings.coordinate_system)
    }

    #[must_use]
    pub fn camera_rig(&self) -> Option<&CameraRig> {
        match &self.kind {
            ActorKind::Camera(rig) => Some(rig),
            _ => None,
        }
    }

    pub fn camera_rig_mut(&mut self) -> Option<&mut CameraRig> {
        match &mut self.kind {
            ActorKind::Camera(rig) => Some(rig),
            _ => None,
        }
    }

    // ========================================================================
    // Combat
    // ========================================================================

    /// Removes health. Avatars lose whole hearts, rounded up; cameras and
    /// props ignore damage.
    pub fn apply_damage(&mut self, amount: f32) {
        if amount <= 0.0 {
            return;
        }
        match &mut self.kind {
            ActorKind::Avatar(state) => {
                state.heart_points = (state.heart_points - amount.ceil() as i32).max(0);
            }
            ActorKind::Boss(state) => {
                state.health_points = (state.health_points - amount).max(0.0);
            }
            ActorKind::Camera(_) | ActorKind::Prop => {}
        }
    }

    #[must_use]
    pub fn is_defeated(&self) -> bool {
        match &self.kind {
            ActorKind::Avatar(state) => state.heart_points <= 0,
            ActorKind::Boss(state) => state.health_points <= 0.0,
            ActorKind::Camera(_) | ActorKind::Prop => false,
        }
    }

    // ========================================================================
    // Collision
    // ========================================================================

    /// Resolves contact with level geometry placed at `mesh_transform`.
    pub fn collide_with(&mut self, mesh: &CollisionMesh, mesh_transform: &Mat4) -> CollisionResponse {
        let mut response = CollisionResponse::default();
        let position = self.transform.position;

        match &mut self.kind {
            ActorKind::Avatar(state) => {
                let moving = self.velocity.x * self.velocity.x + self.velocity.z * self.velocity.z > 0.0;
                if moving
                    && let Some(wall) = probe_wall(
                        mesh,
                        mesh_transform,
                        position,
                        self.forward,
                        AVATAR_STEP_BACK,
                        AVATAR_STEP_UP,
                        AVATAR_COLLISION_RADIUS,
                    )
                {
                    self.transform.position += wall.push_back;
                    self.velocity.x = 0.0;
                    self.velocity.z = 0.0;
                    response.blocked = true;
                }

                let position = self.transform.position;
                if let Some(ground) = ground_height(mesh, mesh_transform, position, AVATAR_LIFT_UP) {
                    state.current_location = ground.material_name;
                    if ground.point.y > position.y {
                        self.transform.position = ground.point;
                        if self.velocity.y < 0.0 {
                            self.velocity.y = 0.0;
                        }
                        response.grounded = true;
                    }
                }
            }
            ActorKind::Boss(_) => {
                if let Some(ground) = ground_height(mesh, mesh_transform, position, TALL_LIFT_UP)
                    && position.y < ground.point.y
                {
                    self.transform.position = ground.point;
                    self.velocity.y = 0.0;
                    response.grounded = true;
                }
            }
            ActorKind::Camera(_) => {
                if let Some(ground) = ground_height(mesh, mesh_transform, position, TALL_LIFT_UP)
                    && position.y < ground.point.y
                {
                    self.transform.position = ground.point;
                    response.grounded = true;
                }
            }
            ActorKind::Prop => {}
        }

        response
    }
}
