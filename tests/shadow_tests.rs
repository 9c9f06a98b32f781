//! Cascaded Shadow Map Tests
//!
//! Tests for:
//! - Near/far recovery from a perspective projection
//! - Split distances (uniform, logarithmic, blended, degenerate input)
//! - Frustum corner extraction
//! - Per-cascade light view-projection fitting
//! - Command order of a shadow pass

use glam::{Mat4, Vec3};

use tundra::render::commands::{CASCADE_CONSTANTS_SLOT, CASCADE_COUNT};
use tundra::render::{CascadeConstants, Command, CommandSink, DepthTarget, RecordingSink, Viewport};
use tundra::settings::{EngineSettings, ShadowSettings};
use tundra::shadow::cascade::with_depth_range;
use tundra::shadow::{
    CascadedShadowMap, build_cascade_view_projection, compute_split_distances, frustum_corners_world,
    near_far_from_projection,
};

const EPSILON: f32 = 1e-3;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

/// Relative comparison for values that span orders of magnitude.
fn approx_rel(a: f32, b: f32) -> bool {
    (a - b).abs() <= EPSILON * b.abs().max(1.0)
}

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    approx_rel(a.x, b.x) && approx_rel(a.y, b.y) && approx_rel(a.z, b.z)
}

fn camera() -> (Mat4, Mat4) {
    let view = Mat4::look_at_lh(Vec3::new(0.0, 5.0, -10.0), Vec3::ZERO, Vec3::Y);
    let projection = Mat4::perspective_lh(60f32.to_radians(), 16.0 / 9.0, 1.0, 1000.0);
    (view, projection)
}

fn assert_inside_ndc(vp: &Mat4, corners: &[Vec3; 8]) {
    for corner in corners {
        let ndc = vp.project_point3(*corner);
        assert!(
            ndc.x >= -1.0 - EPSILON && ndc.x <= 1.0 + EPSILON,
            "x out of range: {ndc}"
        );
        assert!(
            ndc.y >= -1.0 - EPSILON && ndc.y <= 1.0 + EPSILON,
            "y out of range: {ndc}"
        );
        assert!(ndc.z >= -EPSILON && ndc.z <= 1.0 + EPSILON, "z out of range: {ndc}");
    }
}

// ============================================================================
// Projection Helpers
// ============================================================================

#[test]
fn near_far_recovered_from_projection() {
    let projection = Mat4::perspective_lh(1.0, 1.5, 0.5, 200.0);
    let (zn, zf) = near_far_from_projection(&projection);
    assert!(approx_rel(zn, 0.5), "near = {zn}");
    assert!(approx_rel(zf, 200.0), "far = {zf}");
}

#[test]
fn depth_range_replacement() {
    let (_, projection) = camera();
    let slice = with_depth_range(&projection, 5.0, 50.0);
    let (zn, zf) = near_far_from_projection(&slice);
    assert!(approx_rel(zn, 5.0), "near = {zn}");
    assert!(approx_rel(zf, 50.0), "far = {zf}");

    // Only the depth mapping changes.
    assert_eq!(slice.x_axis, projection.x_axis);
    assert_eq!(slice.y_axis, projection.y_axis);
}

// ============================================================================
// Split Distances
// ============================================================================

#[test]
fn uniform_splits() {
    let d = compute_split_distances(4, 1.0, 100.0, 0.0);
    let expected = [1.0, 25.75, 50.5, 75.25, 100.0];
    for (got, want) in d.iter().zip(expected) {
        assert!(approx(*got, want), "splits = {d:?}");
    }
}

#[test]
fn logarithmic_splits() {
    let d = compute_split_distances(4, 1.0, 10_000.0, 1.0);
    let expected = [1.0, 10.0, 100.0, 1000.0, 10_000.0];
    for (got, want) in d.iter().zip(expected) {
        assert!(approx_rel(*got, want), "splits = {d:?}");
    }
}

#[test]
fn splits_hit_near_and_far_exactly_and_increase() {
    for weight in [0.0, 0.25, 0.5, 0.82, 1.0] {
        for (near, far) in [(0.1, 1000.0), (1.0, 100.0), (3.0, 7.0)] {
            let d = compute_split_distances(CASCADE_COUNT, near, far, weight);
            assert_eq!(d.len(), CASCADE_COUNT + 1);
            assert_eq!(d[0], near, "weight {weight}");
            assert_eq!(d[CASCADE_COUNT], far, "weight {weight}");
            for pair in d.windows(2) {
                assert!(pair[0] < pair[1], "not increasing for weight {weight}: {d:?}");
            }
        }
    }
}

#[test]
fn zero_cascades_cover_the_whole_range() {
    let d = compute_split_distances(0, 1.0, 100.0, 0.82);
    assert_eq!(d, vec![1.0, 100.0]);
}

#[test]
fn non_positive_near_falls_back_to_uniform() {
    for near in [0.0, -2.0] {
        let blended = compute_split_distances(4, near, 100.0, 0.82);
        let uniform = compute_split_distances(4, near, 100.0, 0.0);
        assert!(blended.iter().all(|d| d.is_finite()), "near {near}: {blended:?}");
        for (got, want) in blended.iter().zip(&uniform) {
            assert!(approx(*got, *want), "near {near}: {blended:?} vs {uniform:?}");
        }
        assert_eq!(blended[0], near);
        assert_eq!(blended[4], 100.0);
    }
}

// ============================================================================
// Frustum Corners
// ============================================================================

#[test]
fn corners_of_unit_perspective() {
    let projection = Mat4::perspective_lh(std::f32::consts::FRAC_PI_2, 1.0, 1.0, 10.0);
    let corners = frustum_corners_world(&Mat4::IDENTITY, &projection);

    assert!(vec3_approx(corners[0], Vec3::new(-1.0, -1.0, 1.0)), "got {}", corners[0]);
    assert!(vec3_approx(corners[1], Vec3::new(-10.0, -10.0, 10.0)), "got {}", corners[1]);
    assert!(vec3_approx(corners[6], Vec3::new(1.0, 1.0, 1.0)), "got {}", corners[6]);
    assert!(vec3_approx(corners[7], Vec3::new(10.0, 10.0, 10.0)), "got {}", corners[7]);
}

#[test]
fn corners_follow_camera_view() {
    let projection = Mat4::perspective_lh(std::f32::consts::FRAC_PI_2, 1.0, 1.0, 10.0);
    let view = Mat4::look_at_lh(Vec3::new(0.0, 0.0, -5.0), Vec3::ZERO, Vec3::Y);
    let corners = frustum_corners_world(&view, &projection);

    assert!(vec3_approx(corners[0], Vec3::new(-1.0, -1.0, -4.0)), "got {}", corners[0]);
    assert!(vec3_approx(corners[7], Vec3::new(10.0, 10.0, 5.0)), "got {}", corners[7]);
}

// ============================================================================
// Cascade Fitting
// ============================================================================

#[test]
fn cascade_encloses_slice_corners() {
    let (view, projection) = camera();
    let slice = with_depth_range(&projection, 1.0, 30.0);
    let corners = frustum_corners_world(&view, &slice);

    let vp = build_cascade_view_projection(Vec3::new(0.3, -1.0, 0.2), &corners);
    assert_inside_ndc(&vp, &corners);
}

#[test]
fn vertical_light_produces_finite_matrix() {
    let (view, projection) = camera();
    let slice = with_depth_range(&projection, 1.0, 30.0);
    let corners = frustum_corners_world(&view, &slice);

    let vp = build_cascade_view_projection(Vec3::NEG_Y, &corners);
    assert!(vp.is_finite(), "vp = {vp}");
    assert_inside_ndc(&vp, &corners);
}

// ============================================================================
// Shadow Pass
// ============================================================================

#[test]
fn make_records_pass_in_order() {
    let (view, projection) = camera();
    let mut csm = CascadedShadowMap::new(&ShadowSettings::default());
    let mut sink = RecordingSink::new();
    let mut calls = 0;

    csm.make(&mut sink, &view, &projection, Vec3::new(0.3, -1.0, 0.2), 0.0, |s: &mut dyn CommandSink| {
        calls += 1;
        s.draw_indexed(36, 0, CASCADE_COUNT as u32);
    });

    assert_eq!(calls, 1, "draw callback runs once");

    let commands = &sink.commands;
    assert_eq!(commands.len(), 7, "commands = {commands:?}");
    assert!(matches!(commands[0], Command::BindConstants { slot: CASCADE_CONSTANTS_SLOT, .. }));
    assert_eq!(commands[1], Command::SaveTargets);
    assert_eq!(
        commands[2],
        Command::SetDepthTarget(DepthTarget::CascadeArray {
            size: 2048,
            layers: 4
        })
    );
    assert_eq!(commands[3], Command::ClearDepth(1.0));
    assert_eq!(commands[4], Command::SetViewport(Viewport::square(2048)));
    assert_eq!(sink.draws(), vec![(36, 0, 4)]);
    assert_eq!(commands[6], Command::RestoreTargets);
}

#[test]
fn make_uploads_far_split_distances() {
    let (view, projection) = camera();
    let mut csm = CascadedShadowMap::new(&ShadowSettings::default());
    let mut sink = RecordingSink::new();
    csm.make(&mut sink, &view, &projection, Vec3::new(0.3, -1.0, 0.2), 0.0, |_| {});

    let distances = *csm.distances();
    assert!(approx_rel(distances[0], 1.0), "near = {}", distances[0]);
    assert!(approx_rel(distances[CASCADE_COUNT], 1000.0), "far = {}", distances[CASCADE_COUNT]);

    let uploaded: CascadeConstants = sink.last_constants_as(CASCADE_CONSTANTS_SLOT).expect("constants bound");
    assert_eq!(uploaded, csm.constants());
    assert_eq!(uploaded.cascade_plane_distances.as_slice(), &distances[1..]);
}

#[test]
fn every_cascade_encloses_its_slice() {
    let (view, projection) = camera();
    let light = Vec3::new(-0.5, -1.0, 0.4);
    let mut csm = CascadedShadowMap::new(&ShadowSettings::default());
    csm.make(&mut RecordingSink::new(), &view, &projection, light, 200.0, |_| {});

    let distances = *csm.distances();
    for (index, vp) in csm.view_projections().iter().enumerate() {
        let slice = with_depth_range(&projection, distances[index], distances[index + 1]);
        let corners = frustum_corners_world(&view, &slice);
        assert_inside_ndc(vp, &corners);
    }
}

#[test]
fn critical_depth_caps_far_split() {
    let (view, projection) = camera();
    let mut csm = CascadedShadowMap::new(&ShadowSettings::default());

    csm.make(&mut RecordingSink::new(), &view, &projection, Vec3::NEG_Y, 100.0, |_| {});
    assert_eq!(csm.distances()[CASCADE_COUNT], 100.0);

    // Beyond the camera far plane the projection wins.
    csm.make(&mut RecordingSink::new(), &view, &projection, Vec3::NEG_Y, 5000.0, |_| {});
    assert!(approx_rel(csm.distances()[CASCADE_COUNT], 1000.0));
}

#[test]
fn configured_critical_depth_applies_without_argument() -> anyhow::Result<()> {
    let (view, projection) = camera();
    let settings = EngineSettings::from_json_str(r#"{ "shadow": { "critical_depth": 100.0 } }"#)?;
    let mut csm = CascadedShadowMap::new(&settings.shadow);
    assert!(approx(csm.critical_depth, 100.0));

    csm.make(&mut RecordingSink::new(), &view, &projection, Vec3::NEG_Y, 0.0, |_| {});
    assert_eq!(csm.distances()[CASCADE_COUNT], 100.0, "splits = {:?}", csm.distances());

    // An explicit cutoff overrides the configured one.
    csm.make(&mut RecordingSink::new(), &view, &projection, Vec3::NEG_Y, 50.0, |_| {});
    assert_eq!(csm.distances()[CASCADE_COUNT], 50.0, "splits = {:?}", csm.distances());
    Ok(())
}

#[test]
fn map_size_comes_from_settings() {
    let settings = ShadowSettings {
        map_size: 1024,
        ..ShadowSettings::default()
    };
    let csm = CascadedShadowMap::new(&settings);
    assert_eq!(csm.map_size(), 1024);
    assert_eq!(csm.viewport(), Viewport::square(1024));
    assert!(approx(csm.split_scheme_weight, 0.82));
}
