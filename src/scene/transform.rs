use glam::{EulerRot, Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Axis convention of authored assets.
///
/// Each preset maps asset space into engine space (left-handed, Y-up) and is
/// applied before scale, rotation and translation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoordinateSystem {
    /// 0: right-handed, Y up
    #[default]
    RhYUp,
    /// 1: left-handed, Y up
    LhYUp,
    /// 2: right-handed, Z up
    RhZUp,
    /// 3: left-handed, Z up
    LhZUp,
}

impl CoordinateSystem {
    /// All presets in index order.
    pub const ALL: [Self; 4] = [Self::RhYUp, Self::LhYUp, Self::RhZUp, Self::LhZUp];

    /// Looks up a preset by its index.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Correction matrix for this preset.
    #[must_use]
    pub fn correction_matrix(self) -> Mat4 {
        match self {
            Self::RhYUp => Mat4::from_cols_array(&[
                -1.0, 0.0, 0.0, 0.0, //
                0.0, 1.0, 0.0, 0.0, //
                0.0, 0.0, 1.0, 0.0, //
                0.0, 0.0, 0.0, 1.0,
            ]),
            Self::LhYUp => Mat4::IDENTITY,
            Self::RhZUp => Mat4::from_cols_array(&[
                1.0, 0.0, 0.0, 0.0, //
                0.0, 0.0, 1.0, 0.0, //
                0.0, 1.0, 0.0, 0.0, //
                0.0, 0.0, 0.0, 1.0,
            ]),
            Self::LhZUp => Mat4::from_cols_array(&[
                -1.0, 0.0, 0.0, 0.0, //
                0.0, 0.0, 1.0, 0.0, //
                0.0, 1.0, 0.0, 0.0, //
                0.0, 0.0, 0.0, 1.0,
            ]),
        }
    }
}

/// Transform component
///
/// Pose of an actor: position, Euler rotation (radians, pitch/yaw/roll on
/// x/y/z) and scale, plus the composed matrix cached by [`Transform::compose`].
/// The cached matrix is only ever written by `compose`; shadow copies of the
/// base fields detect whether it is stale.
#[derive(Debug, Clone)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,

    composed: Mat4,

    last_position: Vec3,
    last_rotation: Vec3,
    last_scale: Vec3,
    force_update: bool,
}

impl Transform {
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,

            composed: Mat4::IDENTITY,

            last_position: Vec3::ZERO,
            last_rotation: Vec3::ZERO,
            last_scale: Vec3::ONE,
            force_update: true,
        }
    }

    #[must_use]
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::new()
        }
    }

    /// Sets the same scale on all three axes.
    pub fn uniform_scale(&mut self, scale: f32) {
        self.scale = Vec3::splat(scale);
    }

    /// Rotation part alone: roll (z), then pitch (x), then yaw (y).
    #[must_use]
    pub fn rotation_matrix(&self) -> Mat4 {
        Mat4::from_euler(EulerRot::YXZ, self.rotation.y, self.rotation.x, self.rotation.z)
    }

    /// Recomputes the composed matrix from scale, rotation and position.
    ///
    /// A point is first mapped through the coordinate-system correction, then
    /// scaled by `scale * to_meters_scale`, rotated and translated.
    pub fn compose(&mut self, to_meters_scale: f32, system: CoordinateSystem) -> Mat4 {
        let c = system.correction_matrix();
        let s = Mat4::from_scale(self.scale * to_meters_scale);
        let r = self.rotation_matrix();
        let t = Mat4::from_translation(self.position);

        self.composed = t * r * s * c;

        self.last_position = self.position;
        self.last_rotation = self.rotation;
        self.last_scale = self.scale;
        self.force_update = false;

        self.composed
    }

    /// Matrix produced by the last [`compose`](Self::compose) call.
    #[inline]
    #[must_use]
    pub fn matrix(&self) -> &Mat4 {
        &self.composed
    }

    /// `true` when a base field changed since the last compose.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.force_update
            || self.position != self.last_position
            || self.rotation != self.last_rotation
            || self.scale != self.last_scale
    }

    /// Forces the next staleness check to report a change.
    pub fn mark_dirty(&mut self) {
        self.force_update = true;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}
