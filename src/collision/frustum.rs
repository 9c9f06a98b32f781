use glam::{Mat4, Vec3, Vec4};

use super::bounds::BoundingBox;

/// View frustum as six normalized planes.
///
/// Each plane is `(normal, d)` with the normal pointing into the frustum, so a
/// point `p` is on the inner side when `normal.dot(p) + d >= 0`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Frustum {
    planes: [Vec4; 6], // Left, Right, Bottom, Top, Near, Far
}

impl Frustum {
    pub const LEFT: usize = 0;
    pub const RIGHT: usize = 1;
    pub const BOTTOM: usize = 2;
    pub const TOP: usize = 3;
    pub const NEAR: usize = 4;
    pub const FAR: usize = 5;

    /// Gribb-Hartmann extraction from a view-projection matrix with a
    /// `[0, 1]` clip depth range.
    #[must_use]
    pub fn from_matrix(m: Mat4) -> Self {
        let rows = [m.row(0), m.row(1), m.row(2), m.row(3)];

        let mut planes = [
            rows[3] + rows[0],
            rows[3] - rows[0],
            rows[3] + rows[1],
            rows[3] - rows[1],
            rows[2],
            rows[3] - rows[2],
        ];

        for plane in &mut planes {
            let length = plane.truncate().length();
            if length > f32::EPSILON {
                *plane /= length;
            }
        }

        Self { planes }
    }

    #[must_use]
    pub fn planes(&self) -> &[Vec4; 6] {
        &self.planes
    }

    /// Signed distance from `point` to plane `index`; positive on the inner side.
    #[inline]
    #[must_use]
    pub fn signed_distance(&self, index: usize, point: Vec3) -> f32 {
        let plane = self.planes[index];
        plane.truncate().dot(point) + plane.w
    }

    #[must_use]
    pub fn contains_point(&self, point: Vec3) -> bool {
        (0..6).all(|i| self.signed_distance(i, point) >= 0.0)
    }

    /// `true` when the box lies entirely outside at least one plane.
    ///
    /// Tests the corner furthest along each plane normal. Conservative: boxes
    /// near frustum corners may be kept even though they are not visible.
    #[must_use]
    pub fn cull_aabb(&self, min: Vec3, max: Vec3) -> bool {
        self.planes.iter().any(|plane| {
            let normal = plane.truncate();
            let p = Vec3::select(normal.cmplt(Vec3::ZERO), min, max);
            normal.dot(p) + plane.w < 0.0
        })
    }

    #[inline]
    #[must_use]
    pub fn intersects_box(&self, bounds: &BoundingBox) -> bool {
        !self.cull_aabb(bounds.min, bounds.max)
    }
}
