//! Ray Intersection Kernel
//!
//! Pure geometric queries shared by the collision mesh, terrain following
//! and culling code. Every query runs in a single coordinate space; callers
//! bring the ray and the geometry into the same space first.
//!
//! Degenerate input (parallel rays, zero-length directions, collapsed
//! triangles) is never an error: it simply does not intersect.

use glam::Vec3;
use smallvec::SmallVec;

/// Two hits closer than this along the ray count as the same surface crossing.
const CROSSING_TOLERANCE: f32 = 1e-4;

// ============================================================================
// Ray vs AABB
// ============================================================================

/// Entry point of a ray into a box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AabbHit {
    /// `origin + direction * distance`
    pub point: Vec3,
    /// Parametric distance of the entry point, never negative.
    pub distance: f32,
}

/// Slab test of a ray against the box `[min, max]`.
///
/// The interval starts at `[0, f32::MAX]`, so boxes behind the origin are
/// missed and a ray starting inside the box hits at distance 0. An axis whose
/// direction component is below `f32::EPSILON` rejects unless the origin lies
/// within that slab.
#[must_use]
pub fn intersect_ray_aabb(origin: Vec3, direction: Vec3, min: Vec3, max: Vec3) -> Option<AabbHit> {
    let mut tmin = 0.0_f32;
    let mut tmax = f32::MAX;

    for axis in 0..3 {
        let o = origin[axis];
        let d = direction[axis];

        if d.abs() < f32::EPSILON {
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }

        let ood = 1.0 / d;
        let mut t1 = (min[axis] - o) * ood;
        let mut t2 = (max[axis] - o) * ood;
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }

        tmin = tmin.max(t1);
        tmax = tmax.min(t2);
        if tmin > tmax {
            return None;
        }
    }

    Some(AabbHit {
        point: origin + direction * tmin,
        distance: tmin,
    })
}

// ============================================================================
// Ray vs Triangle List
// ============================================================================

/// Vertex order of the triangles passed to [`intersect_ray_triangles`].
///
/// The face normal is `(b - a) x (c - a)` over the triangle's vertices in
/// stored order for `CounterClockwise` data. `Clockwise` swaps the second and
/// third vertex first, which flips the normal and therefore the front side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Winding {
    #[default]
    CounterClockwise,
    Clockwise,
}

/// Which triangle sides a ray may hit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Faces {
    /// Only triangles whose normal points against the ray direction.
    #[default]
    Front,
    /// Both sides. Needed when counting crossings through closed volumes.
    Both,
}

/// Nearest triangle hit by a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleHit {
    /// Ordinal of the triangle in the index list.
    pub triangle: usize,
    pub point: Vec3,
    /// Distance along the normalized ray direction.
    pub distance: f32,
    /// The ray arrived on the side the normal points to.
    pub front_facing: bool,
    /// Number of distinct surface crossings along the ray within range.
    pub crossings: usize,
}

impl TriangleHit {
    /// Position of the triangle's first index in the index list.
    #[must_use]
    pub fn first_index(&self) -> usize {
        self.triangle * 3
    }
}

/// Intersects a ray with an indexed triangle list.
///
/// `positions` is a flat float array where vertex `i` starts at
/// `positions[i * stride]`. With [`Faces::Front`] a triangle is only hit when
/// its normal faces the ray, and back faces count neither as the nearest hit
/// nor as crossings. A hit must lie strictly in front of the origin and
/// strictly closer than `max_distance`; hits that land on a shared edge are
/// counted once in [`TriangleHit::crossings`]. Triangles referencing vertices
/// outside `positions` are skipped.
#[must_use]
pub fn intersect_ray_triangles(
    positions: &[f32],
    stride: usize,
    indices: &[u32],
    origin: Vec3,
    direction: Vec3,
    max_distance: f32,
    winding: Winding,
    faces: Faces,
) -> Option<TriangleHit> {
    let dir = direction.normalize_or_zero();
    if dir == Vec3::ZERO || stride < 3 {
        return None;
    }

    let vertex = |index: u32| -> Option<Vec3> {
        let start = index as usize * stride;
        positions.get(start..start + 3).map(Vec3::from_slice)
    };

    let mut nearest: Option<TriangleHit> = None;
    let mut crossings: SmallVec<[f32; 8]> = SmallVec::new();

    for (triangle, tri) in indices.chunks_exact(3).enumerate() {
        let (i0, i1, i2) = match winding {
            Winding::CounterClockwise => (tri[0], tri[1], tri[2]),
            Winding::Clockwise => (tri[0], tri[2], tri[1]),
        };
        let (Some(a), Some(b), Some(c)) = (vertex(i0), vertex(i1), vertex(i2)) else {
            continue;
        };

        let normal = (b - a).cross(c - a);
        let length = normal.length();
        if length < f32::EPSILON {
            continue;
        }
        let n = normal / length;

        let denom = n.dot(dir);
        if denom.abs() < f32::EPSILON {
            continue;
        }
        let front_facing = denom < 0.0;
        if faces == Faces::Front && !front_facing {
            continue;
        }

        let t = n.dot(a - origin) / denom;
        if t <= 0.0 || t >= max_distance {
            continue;
        }

        let q = origin + dir * t;

        // Q is inside when the three sub-triangle normals agree.
        let qa = a - q;
        let qb = b - q;
        let qc = c - q;
        let u = qb.cross(qc);
        let v = qc.cross(qa);
        let w = qa.cross(qb);
        if u.dot(v) < 0.0 || u.dot(w) < 0.0 || v.dot(w) < 0.0 {
            continue;
        }

        if !crossings.iter().any(|d| (d - t).abs() <= CROSSING_TOLERANCE) {
            crossings.push(t);
        }

        if nearest.is_none_or(|best| t < best.distance) {
            nearest = Some(TriangleHit {
                triangle,
                point: q,
                distance: t,
                front_facing,
                crossings: 0,
            });
        }
    }

    nearest.map(|hit| TriangleHit {
        crossings: crossings.len(),
        ..hit
    })
}
