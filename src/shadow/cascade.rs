//! Cascaded Shadow Map
//!
//! Splits the camera frustum into [`CASCADE_COUNT`] depth slices, fits a
//! light-space orthographic volume around each slice and renders shadow
//! casters once, instanced per cascade, into a layered depth array.
//!
//! # Provided Functions
//!
//! - Near/far extraction from a perspective projection
//! - Split distances (practical split scheme)
//! - Frustum corner extraction in world space
//! - Orthographic VP construction for one cascade
//!
//! All matrices follow the engine convention: left-handed, `[0, 1]` depth.

use glam::{Mat4, Vec3};

use crate::render::commands::{
    CASCADE_CONSTANTS_SLOT, CASCADE_COUNT, CascadeConstants, CommandSink, DepthTarget, Viewport,
    bind_constant_block,
};
use crate::settings::ShadowSettings;

/// Expansion applied to the light-space depth extent of every cascade.
const Z_MULTIPLIER: f32 = 50.0;

// ============================================================================
// Pure helpers
// ============================================================================

/// Near and far plane distances encoded in a perspective projection.
///
/// `near = -w_axis.z / z_axis.z`, `far = z_axis.z * near / (z_axis.z - 1)`.
#[must_use]
pub fn near_far_from_projection(projection: &Mat4) -> (f32, f32) {
    let m33 = projection.z_axis.z;
    let m43 = projection.w_axis.z;
    let zn = -m43 / m33;
    let zf = (m33 * zn) / (m33 - 1.0);
    (zn, zf)
}

/// `cascade_count + 1` view-space split distances.
///
/// `weight` blends the uniform (`0.0`) and logarithmic (`1.0`) schemes. The
/// first and last entries are exactly `near` and `far`. A count of zero is
/// treated as one cascade. The logarithmic scheme needs `near > 0`; for any
/// other near plane the splits are uniform whatever the weight.
#[must_use]
pub fn compute_split_distances(cascade_count: usize, near: f32, far: f32, weight: f32) -> Vec<f32> {
    let count = cascade_count.max(1);
    let mut distances = Vec::with_capacity(count + 1);
    distances.push(near);
    for i in 1..count {
        let idc = i as f32 / count as f32;
        let uniform = near + (far - near) * idc;
        let logarithmic = if near > 0.0 { near * (far / near).powf(idc) } else { uniform };
        distances.push(logarithmic * weight + uniform * (1.0 - weight));
    }
    distances.push(far);
    distances
}

/// Copy of `projection` with its depth mapping replaced by `[near, far]`.
#[must_use]
pub fn with_depth_range(projection: &Mat4, near: f32, far: f32) -> Mat4 {
    let mut p = *projection;
    p.z_axis.z = far / (far - near);
    p.w_axis.z = -near * far / (far - near);
    p
}

/// World-space corners of the volume covered by `projection * view`.
///
/// Unprojects the NDC box `x, y in [-1, 1]`, `z in [0, 1]`; index bit 2 is
/// x, bit 1 is y, bit 0 is z.
#[must_use]
pub fn frustum_corners_world(view: &Mat4, projection: &Mat4) -> [Vec3; 8] {
    let inverse = (*projection * *view).inverse();
    let mut corners = [Vec3::ZERO; 8];
    for (index, corner) in corners.iter_mut().enumerate() {
        let x = if index & 4 == 0 { -1.0 } else { 1.0 };
        let y = if index & 2 == 0 { -1.0 } else { 1.0 };
        let z = if index & 1 == 0 { 0.0 } else { 1.0 };
        *corner = inverse.project_point3(Vec3::new(x, y, z));
    }
    corners
}

/// Light view-projection enclosing `corners`.
///
/// The light looks at the corner centroid from `centroid - light_direction`.
/// The light-space depth extent is pushed outwards by a factor of 50 so
/// casters outside the slice still land in the map.
#[must_use]
pub fn build_cascade_view_projection(light_direction: Vec3, corners: &[Vec3; 8]) -> Mat4 {
    let center = corners.iter().copied().sum::<Vec3>() / corners.len() as f32;

    let up = if light_direction.normalize_or_zero().y.abs() > 0.99 {
        Vec3::X
    } else {
        Vec3::Y
    };
    let view = Mat4::look_at_lh(center - light_direction, center, up);

    let mut ls_min = Vec3::splat(f32::MAX);
    let mut ls_max = Vec3::splat(f32::MIN);
    for corner in corners {
        let ls = view.transform_point3(*corner);
        ls_min = ls_min.min(ls);
        ls_max = ls_max.max(ls);
    }

    if ls_min.z < 0.0 {
        ls_min.z *= Z_MULTIPLIER;
    } else {
        ls_min.z /= Z_MULTIPLIER;
    }
    if ls_max.z < 0.0 {
        ls_max.z /= Z_MULTIPLIER;
    } else {
        ls_max.z *= Z_MULTIPLIER;
    }

    let projection = Mat4::orthographic_lh(ls_min.x, ls_max.x, ls_min.y, ls_max.y, ls_min.z, ls_max.z);
    projection * view
}

// ============================================================================
// CascadedShadowMap
// ============================================================================

#[derive(Debug, Clone)]
pub struct CascadedShadowMap {
    map_size: u32,
    pub split_scheme_weight: f32,
    /// Far cap used when [`make`](Self::make) is given none.
    pub critical_depth: f32,
    viewport: Viewport,
    view_projection: [Mat4; CASCADE_COUNT],
    distances: [f32; CASCADE_COUNT + 1],
}

impl CascadedShadowMap {
    #[must_use]
    pub fn new(settings: &ShadowSettings) -> Self {
        Self {
            map_size: settings.map_size,
            split_scheme_weight: settings.split_scheme_weight,
            critical_depth: settings.critical_depth,
            viewport: Viewport::square(settings.map_size),
            view_projection: [Mat4::IDENTITY; CASCADE_COUNT],
            distances: [0.0; CASCADE_COUNT + 1],
        }
    }

    #[must_use]
    pub fn map_size(&self) -> u32 {
        self.map_size
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Light view-projection of every cascade from the last [`make`](Self::make).
    #[must_use]
    pub fn view_projections(&self) -> &[Mat4; CASCADE_COUNT] {
        &self.view_projection
    }

    /// Split distances from the last [`make`](Self::make), near plane first.
    #[must_use]
    pub fn distances(&self) -> &[f32; CASCADE_COUNT + 1] {
        &self.distances
    }

    /// Constant block as bound at slot 13.
    #[must_use]
    pub fn constants(&self) -> CascadeConstants {
        let mut planes = [0.0; CASCADE_COUNT];
        planes.copy_from_slice(&self.distances[1..]);
        CascadeConstants {
            view_projection: self.view_projection,
            cascade_plane_distances: planes,
        }
    }

    /// Rebuilds every cascade for this frame and renders the casters.
    ///
    /// `critical_depth > 0` caps the shadowed range below the camera far
    /// plane; `0.0` falls back to the configured cap, if any. `draw` is invoked exactly once with the cascade array bound; it
    /// is expected to draw each caster with one instance per cascade.
    pub fn make<F>(
        &mut self,
        sink: &mut dyn CommandSink,
        view: &Mat4,
        projection: &Mat4,
        light_direction: Vec3,
        critical_depth: f32,
        draw: F,
    ) where
        F: FnOnce(&mut dyn CommandSink),
    {
        let (zn, mut zf) = near_far_from_projection(projection);
        let cap = if critical_depth > 0.0 { critical_depth } else { self.critical_depth };
        if cap > 0.0 {
            zf = zf.min(cap);
        }

        let splits = compute_split_distances(CASCADE_COUNT, zn, zf, self.split_scheme_weight);
        self.distances.copy_from_slice(&splits);

        for (index, vp) in self.view_projection.iter_mut().enumerate() {
            let slice = with_depth_range(projection, self.distances[index], self.distances[index + 1]);
            let corners = frustum_corners_world(view, &slice);
            *vp = build_cascade_view_projection(light_direction, &corners);
        }

        log::trace!("Cascades rebuilt: splits {:?}", self.distances);

        bind_constant_block(sink, CASCADE_CONSTANTS_SLOT, &self.constants());

        sink.save_targets();
        sink.set_depth_target(DepthTarget::CascadeArray {
            size: self.map_size,
            layers: CASCADE_COUNT as u32,
        });
        sink.clear_depth(1.0);
        sink.set_viewport(self.viewport);

        draw(&mut *sink);

        sink.restore_targets();
    }
}
