use glam::{Mat3, Mat4, Vec3};

use crate::collision::frustum::Frustum;

/// Event carrying `(zoom_in, zoom_out)` trigger values.
pub const ZOOM_EVENT: &str = "@trigger_state";
/// Event carrying `(panorama, elevation)` stick values.
pub const ORBIT_EVENT: &str = "@thumb_state_r";

const PANORAMA_SENSITIVITY: f32 = 2.0;
const ELEVATION_SENSITIVITY: f32 = 1.0;
const ZOOM_SENSITIVITY: f32 = 5.0;
const MIN_FOCAL_LENGTH: f32 = 1.5;
/// Closest the orbit gets to straight above the focus, in degrees from +Y.
const ELEVATION_UPPER_LIMIT_DEG: f32 = 30.0;
/// Closest the orbit gets to straight below the focus, in degrees from +Y.
const ELEVATION_LOWER_LIMIT_DEG: f32 = 95.0;

/// Third-person orbit camera following a subject actor.
///
/// The camera position itself lives in the owning actor's transform; the rig
/// holds the focus point, lens parameters and pending input intents.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraRig {
    /// Actor the camera follows.
    pub subject: Option<String>,
    pub focus: Vec3,
    pub focal_length: f32,
    pub focus_offset_y: f32,
    pub field_of_view_deg: f32,
    pub near_z: f32,
    pub far_z: f32,

    zoom: f32,
    panorama: f32,
    elevation: f32,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            subject: None,
            focus: Vec3::ZERO,
            focal_length: 5.0,
            focus_offset_y: 1.2,
            field_of_view_deg: 60.0,
            near_z: 1.0,
            far_z: 1000.0,
            zoom: 0.0,
            panorama: 0.0,
            elevation: 0.0,
        }
    }
}

impl CameraRig {
    #[must_use]
    pub fn following(subject: impl Into<String>) -> Self {
        Self {
            subject: Some(subject.into()),
            ..Self::default()
        }
    }

    /// Places the camera `focal_length` behind `focus` along `direction`,
    /// raised by `focus_offset_y`. Returns the new camera position.
    pub fn respawn(&mut self, focus: Vec3, direction: Vec3, focal_length: f32, focus_offset_y: f32) -> Vec3 {
        self.focus_offset_y = focus_offset_y;
        self.focus = focus + Vec3::Y * focus_offset_y;
        self.focal_length = focal_length;
        focus - direction * focal_length + Vec3::Y * focus_offset_y
    }

    /// Sets the zoom intent, positive to move away from the focus.
    pub fn zoom(&mut self, delta: f32) {
        self.zoom = delta;
    }

    /// Sets the orbit intents around the vertical axis and the camera's right axis.
    pub fn orbit(&mut self, panorama: f32, elevation: f32) {
        self.panorama = panorama;
        self.elevation = elevation;
    }

    /// Re-centers on `subject_position` and applies the pending intents.
    ///
    /// Returns the new camera position.
    #[must_use]
    pub fn follow(&mut self, position: Vec3, subject_position: Vec3, delta_time: f32) -> Vec3 {
        self.focus = subject_position + Vec3::Y * self.focus_offset_y;

        let to_camera = position - self.focus;
        let forward = (-to_camera).normalize_or_zero();
        let right = Vec3::Y.cross(forward).normalize_or_zero();

        let mut position = position;
        if right != Vec3::ZERO {
            let ry = Mat3::from_axis_angle(Vec3::Y, self.panorama * PANORAMA_SENSITIVITY * delta_time);
            let rx = Mat3::from_axis_angle(right, self.elevation * ELEVATION_SENSITIVITY * delta_time);
            position = self.focus + (ry * rx * to_camera).normalize_or_zero() * self.focal_length;

            let elevation_cosine = Vec3::Y.dot((position - self.focus).normalize_or_zero());
            let clamp_to = |deg: f32| {
                self.focus + Mat3::from_axis_angle(right, -deg.to_radians()) * Vec3::Y * self.focal_length
            };
            if elevation_cosine > ELEVATION_UPPER_LIMIT_DEG.to_radians().cos() {
                position = clamp_to(ELEVATION_UPPER_LIMIT_DEG);
            } else if elevation_cosine < ELEVATION_LOWER_LIMIT_DEG.to_radians().cos() {
                position = clamp_to(ELEVATION_LOWER_LIMIT_DEG);
            }
        }

        self.focal_length = (self.focal_length + self.zoom * ZOOM_SENSITIVITY * delta_time).max(MIN_FOCAL_LENGTH);
        position
    }

    /// Left-handed look-at from `position` to the focus, +Y up.
    #[must_use]
    pub fn view_matrix(&self, position: Vec3) -> Mat4 {
        Mat4::look_at_lh(position, self.focus, Vec3::Y)
    }

    /// Left-handed perspective with a `[0, 1]` depth range.
    #[must_use]
    pub fn projection_matrix(&self, aspect_ratio: f32) -> Mat4 {
        Mat4::perspective_lh(self.field_of_view_deg.to_radians(), aspect_ratio, self.near_z, self.far_z)
    }

    #[must_use]
    pub fn frustum(&self, position: Vec3, aspect_ratio: f32) -> Frustum {
        Frustum::from_matrix(self.projection_matrix(aspect_ratio) * self.view_matrix(position))
    }
}
