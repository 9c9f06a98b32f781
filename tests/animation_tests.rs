//! Animation System Tests
//!
//! Tests for:
//! - AnimationSequencer advance/sample, looping, one-shot clamping
//! - Transition semantics (idempotence, restart, toggling within a frame)
//! - Keyframe blending (lerp/slerp, node-count checks)
//! - NodeHierarchy global reconstruction and parent-order validation
//! - Skeleton validation (bone limit, node references)
//! - AnimatedModel: clips, skinning palette, joints, draw submission

use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Quat, Vec3};

use tundra::animation::blend::{blend, blend_keyframes};
use tundra::animation::clip::{AnimationClip, Keyframe, KeyframeNode};
use tundra::animation::hierarchy::{NodeHierarchy, SceneNode};
use tundra::animation::model::AnimatedModel;
use tundra::animation::sequencer::AnimationSequencer;
use tundra::animation::skeleton::{Bone, MAX_BONES, Skeleton};
use tundra::assets::{MaterialAsset, MemoryAssetProvider, MeshAsset, ModelAsset, Subset};
use tundra::collision::frustum::Frustum;
use tundra::errors::TundraError;
use tundra::render::commands::{
    BONE_CONSTANTS_SLOT, BoneConstants, CASCADE_COUNT, Command, MATERIAL_CONSTANTS_SLOT, MaterialConstants,
    OBJECT_CONSTANTS_SLOT, ObjectConstants, PipelineState, RecordingSink,
};

const EPSILON: f32 = 1e-5;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    approx(a.x, b.x) && approx(a.y, b.y) && approx(a.z, b.z)
}

/// One-node keyframe translated along X.
fn keyframe_at(x: f32) -> Keyframe {
    Keyframe::new(vec![KeyframeNode::from_local(Vec3::ONE, Quat::IDENTITY, Vec3::new(x, 0.0, 0.0))])
}

fn clip(name: &str, frames: usize, rate: f32) -> AnimationClip {
    AnimationClip::new(name, rate, (0..frames).map(|i| keyframe_at(i as f32)).collect())
}

/// Two-node chain: `root` with child `hand`, one skinned mesh bound to both.
fn rig_asset() -> ModelAsset {
    let nodes = vec![SceneNode::new(1, "root", None), SceneNode::new(2, "hand", Some(0))];

    let positions = vec![Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 0.0, -1.0), Vec3::new(0.0, 2.0, 1.0)];
    let mut body = MeshAsset::new("body", positions, vec![0, 1, 2, 0, 2, 1], vec![
        Subset::new("skin", 0, 3),
        Subset::new("cloth", 3, 3),
    ]);
    body.skeleton = Skeleton::new(vec![
        Bone {
            unique_id: 10,
            name: "root".into(),
            parent_index: None,
            node_index: 0,
            offset_transform: Mat4::IDENTITY,
        },
        Bone {
            unique_id: 11,
            name: "hand".into(),
            parent_index: Some(0),
            node_index: 1,
            offset_transform: Mat4::from_translation(Vec3::new(0.0, -1.0, 0.0)),
        },
    ]);

    let pose = |root_x: f32| {
        Keyframe::new(vec![
            KeyframeNode::from_local(Vec3::ONE, Quat::IDENTITY, Vec3::new(root_x, 0.0, 0.0)),
            KeyframeNode::from_local(Vec3::ONE, Quat::IDENTITY, Vec3::new(0.0, 1.0, 0.0)),
        ])
    };

    ModelAsset {
        name: "rig".into(),
        nodes,
        meshes: vec![body],
        materials: vec![MaterialAsset {
            name: "skin".into(),
            constants: MaterialConstants {
                diffuse: glam::Vec4::new(1.0, 0.5, 0.5, 1.0),
                ..Default::default()
            },
        }],
        clips: vec![AnimationClip::new("idle", 30.0, vec![pose(0.0), pose(2.0)])],
    }
}

// ============================================================================
// Sequencer: Sampling
// ============================================================================

#[test]
fn tick_advances_then_samples() {
    let clips = [clip("walk", 4, 4.0)];
    let mut seq = AnimationSequencer::new(0, true);

    assert!(!seq.tick(&clips, 0.25));
    assert_eq!(seq.frame(), 1, "first tick already advances");
    assert!(!seq.tick(&clips, 0.25));
    assert_eq!(seq.frame(), 2);
}

#[test]
fn looping_clip_wraps_to_zero_after_duration() {
    let clips = [clip("walk", 4, 4.0)];
    let mut seq = AnimationSequencer::new(0, true);

    let mut frames = Vec::new();
    for _ in 0..4 {
        assert!(!seq.tick(&clips, 0.25), "looping clip never reports finished");
        frames.push(seq.frame());
    }
    assert_eq!(frames, vec![1, 2, 3, 0]);
    assert!(approx(seq.elapsed(), 0.0), "elapsed resets on wrap, got {}", seq.elapsed());
}

#[test]
fn one_shot_clamps_and_reports_finished() {
    let clips = [clip("die", 10, 10.0)];
    let mut seq = AnimationSequencer::new(0, false);

    assert!(seq.tick(&clips, 2.0), "overrun must report finished");
    assert_eq!(seq.frame(), 9, "frame clamps to the last keyframe");
    assert!(seq.is_finished());
    assert!(vec3_approx(seq.current_keyframe(&clips).nodes[0].translation, Vec3::new(9.0, 0.0, 0.0)));
}

#[test]
fn finished_is_reported_once() {
    let clips = [clip("die", 10, 10.0)];
    let mut seq = AnimationSequencer::new(0, false);

    assert!(seq.tick(&clips, 2.0));
    assert!(!seq.tick(&clips, 0.1));
    assert_eq!(seq.frame(), 9);
}

#[test]
fn empty_clip_never_advances() {
    let clips = [AnimationClip::new("empty", 30.0, Vec::new())];
    let mut seq = AnimationSequencer::new(0, false);
    assert!(!seq.tick(&clips, 1.0));
    assert_eq!(seq.frame(), 0);
}

#[test]
#[should_panic(expected = "out of range")]
fn tick_with_invalid_clip_panics() {
    let clips = [clip("walk", 4, 4.0)];
    let mut seq = AnimationSequencer::new(3, true);
    seq.tick(&clips, 0.1);
}

// ============================================================================
// Sequencer: Transitions
// ============================================================================

#[test]
fn transition_to_same_clip_is_idempotent() {
    let clips = [clip("idle", 8, 8.0), clip("run", 8, 8.0)];
    let mut seq = AnimationSequencer::new(0, true);
    seq.tick(&clips, 0.25);

    seq.transition(1, true);
    seq.tick(&clips, 0.25);
    let (frame, elapsed) = (seq.frame(), seq.elapsed());

    seq.transition(1, true);
    assert_eq!(seq.frame(), frame);
    assert!(approx(seq.elapsed(), elapsed));
    seq.transition(1, false);
    assert!(seq.is_looping(), "re-requesting the current clip keeps its loop flag");
}

#[test]
fn transition_to_new_clip_restarts() {
    let clips = [clip("idle", 8, 8.0), clip("run", 8, 8.0)];
    let mut seq = AnimationSequencer::new(0, true);
    seq.tick(&clips, 0.5);

    seq.transition(1, true);
    assert_eq!(seq.clip(), 1);
    assert_eq!(seq.frame(), 0);
    assert!(approx(seq.elapsed(), 0.0));
}

#[test]
fn toggling_back_within_a_frame_keeps_first_reset() {
    let clips = [clip("idle", 8, 8.0), clip("run", 8, 8.0)];
    let mut seq = AnimationSequencer::new(0, true);
    seq.tick(&clips, 0.5);
    assert_eq!(seq.frame(), 4);

    // No tick between the two requests: clip 0 is still the displayed one.
    seq.transition(1, true);
    seq.transition(0, true);
    assert_eq!(seq.previous_clip(), 0);
    assert_eq!(seq.frame(), 0, "the switch to clip 1 already reset the cursor");

    seq.tick(&clips, 0.125);
    assert_eq!(seq.frame(), 1);
}

#[test]
fn transition_clears_finished_flag() {
    let clips = [clip("attack", 4, 4.0), clip("idle", 4, 4.0)];
    let mut seq = AnimationSequencer::new(0, false);
    assert!(seq.tick(&clips, 5.0));

    seq.transition(1, false);
    assert!(!seq.is_finished());
    assert!(!seq.tick(&clips, 0.25));
    assert_eq!(seq.frame(), 1);
}

// ============================================================================
// Blending
// ============================================================================

#[test]
fn blend_halfway_interpolates_translation() {
    let out = blend(&keyframe_at(0.0), &keyframe_at(10.0), 0.5).expect("same node count");
    assert!(vec3_approx(out.nodes[0].translation, Vec3::new(5.0, 0.0, 0.0)), "got {}", out.nodes[0].translation);
}

#[test]
fn blend_slerps_rotation() {
    let a = Keyframe::new(vec![KeyframeNode::from_local(Vec3::ONE, Quat::IDENTITY, Vec3::ZERO)]);
    let b = Keyframe::new(vec![KeyframeNode::from_local(Vec3::ONE, Quat::from_rotation_y(FRAC_PI_2), Vec3::ZERO)]);
    let out = blend(&a, &b, 0.5).expect("blend");

    let expected = Quat::from_rotation_y(FRAC_PI_2 / 2.0);
    assert!(out.nodes[0].rotation.abs_diff_eq(expected, 1e-5), "got {:?}", out.nodes[0].rotation);
}

#[test]
fn blend_endpoints_return_inputs() {
    let a = keyframe_at(1.0);
    let b = keyframe_at(3.0);
    let mut out = Keyframe::default();

    blend_keyframes(&a, &b, 0.0, &mut out).expect("blend");
    assert!(vec3_approx(out.nodes[0].translation, a.nodes[0].translation));
    blend_keyframes(&a, &b, 1.0, &mut out).expect("blend");
    assert!(vec3_approx(out.nodes[0].translation, b.nodes[0].translation));
    assert_eq!(out.len(), 1, "output is overwritten, not appended");
}

#[test]
fn blend_rejects_node_count_mismatch() {
    let err = blend(&keyframe_at(0.0), &Keyframe::identity(2), 0.5).unwrap_err();
    assert!(matches!(err, TundraError::NodeCountMismatch { left: 1, right: 2 }), "got {err}");
}

// ============================================================================
// Hierarchy & Skeleton
// ============================================================================

#[test]
fn globals_chain_parent_before_child() {
    let hierarchy = NodeHierarchy::new(vec![
        SceneNode::new(1, "root", None),
        SceneNode::new(2, "spine", Some(0)),
        SceneNode::new(3, "head", Some(1)),
    ])
    .expect("valid order");

    let mut keyframe = Keyframe::new(vec![
        KeyframeNode::from_local(Vec3::ONE, Quat::from_rotation_y(FRAC_PI_2), Vec3::new(1.0, 0.0, 0.0)),
        KeyframeNode::from_local(Vec3::ONE, Quat::IDENTITY, Vec3::new(1.0, 0.0, 0.0)),
        KeyframeNode::from_local(Vec3::splat(2.0), Quat::IDENTITY, Vec3::new(0.0, 1.0, 0.0)),
    ]);
    hierarchy.update_globals(&mut keyframe).expect("matching size");

    let spine = keyframe.nodes[1].global_transform.w_axis.truncate();
    assert!(vec3_approx(spine, Vec3::new(1.0, 0.0, -1.0)), "spine at {spine}");

    let head = keyframe.nodes[2].global_transform.w_axis.truncate();
    assert!(vec3_approx(head, Vec3::new(1.0, 1.0, -1.0)), "head at {head}");
}

#[test]
fn hierarchy_rejects_forward_parent() {
    let err = NodeHierarchy::new(vec![SceneNode::new(1, "a", Some(1)), SceneNode::new(2, "b", None)]).unwrap_err();
    assert!(matches!(err, TundraError::InvalidHierarchy { index: 0, parent: 1, .. }), "got {err}");
}

#[test]
fn hierarchy_rejects_self_parent() {
    let err = NodeHierarchy::new(vec![SceneNode::new(1, "a", None), SceneNode::new(2, "b", Some(1))]).unwrap_err();
    assert!(matches!(err, TundraError::InvalidHierarchy { index: 1, parent: 1, .. }));
}

#[test]
fn update_globals_rejects_wrong_size() {
    let hierarchy = NodeHierarchy::new(vec![SceneNode::new(1, "root", None)]).expect("valid");
    let mut keyframe = Keyframe::identity(3);
    assert!(hierarchy.update_globals(&mut keyframe).is_err());
}

#[test]
fn skeleton_rejects_too_many_bones() {
    let bones = (0..=MAX_BONES)
        .map(|i| Bone {
            unique_id: i as u64,
            name: format!("b{i}"),
            parent_index: None,
            node_index: 0,
            offset_transform: Mat4::IDENTITY,
        })
        .collect();
    let err = Skeleton::new(bones).validate("giant", 1).unwrap_err();
    assert!(matches!(err, TundraError::TooManyBones { count, max: MAX_BONES, .. } if count == MAX_BONES + 1));
}

#[test]
fn skeleton_rejects_missing_node() {
    let skeleton = Skeleton::new(vec![Bone {
        unique_id: 1,
        name: "lost".into(),
        parent_index: None,
        node_index: 5,
        offset_transform: Mat4::IDENTITY,
    }]);
    let err = skeleton.validate("mesh", 2).unwrap_err();
    assert!(matches!(err, TundraError::BoneNodeOutOfRange { node_index: 5, node_count: 2, .. }));
}

// ============================================================================
// Animated Model
// ============================================================================

#[test]
fn model_builds_and_finds_clips() {
    let model = AnimatedModel::new(&rig_asset()).expect("valid asset");
    assert_eq!(model.name(), "rig");
    assert_eq!(model.hierarchy().len(), 2);
    assert_eq!(model.clip_index("idle"), Some(0));
    assert_eq!(model.clip_index("jump"), None);
    assert!(model.mesh("body").is_some_and(MeshAsset::is_skinned));
}

#[test]
fn model_loads_through_provider() {
    let provider = MemoryAssetProvider::new();
    provider.insert("rig", rig_asset()).expect("fresh id");

    let model = AnimatedModel::load(&provider, "rig").expect("known id");
    assert_eq!(model.meshes().len(), 1);

    let err = AnimatedModel::load(&provider, "ghost").unwrap_err();
    assert!(matches!(err, TundraError::AssetNotFound(ref id) if id == "ghost"));
}

#[test]
fn model_rejects_clip_with_wrong_node_count() {
    let mut asset = rig_asset();
    asset.clips.push(clip("broken", 2, 30.0));
    let err = AnimatedModel::new(&asset).unwrap_err();
    assert!(matches!(err, TundraError::NodeCountMismatch { left: 1, right: 2 }), "got {err}");
}

#[test]
fn model_rejects_mesh_on_missing_node() {
    let mut asset = rig_asset();
    asset.meshes[0].node_index = 7;
    let err = AnimatedModel::new(&asset).unwrap_err();
    assert!(matches!(err, TundraError::MeshNodeOutOfRange { node_index: 7, .. }));
}

#[test]
fn append_clips_is_all_or_nothing() {
    let mut model = AnimatedModel::new(&rig_asset()).expect("valid");
    let good = AnimationClip::new("wave", 30.0, vec![Keyframe::identity(2)]);
    let bad = clip("broken", 2, 30.0);

    assert!(model.append_clips([good.clone(), bad]).is_err());
    assert_eq!(model.clips().len(), 1);

    model.append_clips([good]).expect("matching clip");
    assert_eq!(model.clip_index("wave"), Some(1));
}

#[test]
fn blend_animations_rebuilds_globals() {
    let model = AnimatedModel::new(&rig_asset()).expect("valid");
    let frames = &model.clips()[0].sequence;
    let pose = model.blend_animations(&frames[0], &frames[1], 0.5).expect("blend");

    let hand = pose.nodes[1].global_transform.w_axis.truncate();
    assert!(vec3_approx(hand, Vec3::new(1.0, 1.0, 0.0)), "hand at {hand}");
}

#[test]
fn bone_palette_combines_offset_and_pose() {
    let model = AnimatedModel::new(&rig_asset()).expect("valid");
    let mut pose = model.clips()[0].sequence[1].clone();
    model.update_animation(&mut pose).expect("matching");

    let mesh = model.mesh("body").expect("mesh");
    let palette = model.bone_transforms(mesh, &pose);

    // Mesh sits on the root node, so the root bone is identity in mesh space.
    assert!(palette.bone_transforms[0].abs_diff_eq(Mat4::IDENTITY, 1e-5));
    // Hand: inverse(root) * hand_global * offset = T(0,1,0) * T(0,-1,0).
    assert!(palette.bone_transforms[1].abs_diff_eq(Mat4::IDENTITY, 1e-5));
    assert_eq!(palette.bone_transforms[2], Mat4::IDENTITY, "unused entries stay identity");
}

#[test]
fn joint_reports_world_position() {
    let model = AnimatedModel::new(&rig_asset()).expect("valid");
    let mut pose = model.clips()[0].sequence[1].clone();
    model.update_animation(&mut pose).expect("matching");

    let world = Mat4::from_translation(Vec3::new(0.0, 0.0, 5.0));
    let hand = model.joint("body", "hand", &world, &pose).expect("known joint");
    assert!(vec3_approx(hand, Vec3::new(2.0, 1.0, 5.0)), "hand at {hand}");

    let err = model.joint("body", "tail", &world, &pose).unwrap_err();
    assert!(matches!(err, TundraError::JointNotFound { .. }));
}

#[test]
fn mesh_world_transform_uses_pose_when_available() {
    let model = AnimatedModel::new(&rig_asset()).expect("valid");
    let mesh = model.mesh("body").expect("mesh");
    let mut pose = model.clips()[0].sequence[1].clone();
    model.update_animation(&mut pose).expect("matching");

    let animated = model.mesh_world_transform(mesh, &Mat4::IDENTITY, Some(&pose));
    assert!(vec3_approx(animated.w_axis.truncate(), Vec3::new(2.0, 0.0, 0.0)));

    let rest = model.mesh_world_transform(mesh, &Mat4::IDENTITY, None);
    assert_eq!(rest, Mat4::IDENTITY);

    let bounds = model.world_bounding_box(mesh, &Mat4::IDENTITY, Some(&pose));
    assert!(approx(bounds.min.x, 1.0) && approx(bounds.max.x, 3.0), "bounds = {bounds:?}");
}

#[test]
fn render_submits_one_draw_per_subset() {
    let model = AnimatedModel::new(&rig_asset()).expect("valid");
    let mut pose = model.clips()[0].sequence[0].clone();
    model.update_animation(&mut pose).expect("matching");

    let mut sink = RecordingSink::new();
    let drawn = model.render(&mut sink, &Mat4::IDENTITY, Some(&pose), None).expect("render");

    assert_eq!(drawn, 1);
    assert_eq!(sink.draws(), vec![(3, 0, 1), (3, 3, 1)]);
    assert_eq!(sink.bound_meshes(), vec!["body"]);
    assert!(sink.commands.contains(&Command::BindPipeline(PipelineState::SkinnedMesh)));
    assert!(sink.commands.contains(&Command::BindMaterial("cloth".into())));

    let object: ObjectConstants = sink.last_constants_as(OBJECT_CONSTANTS_SLOT).expect("object block");
    assert_eq!(object.world, Mat4::IDENTITY);
    let bones: BoneConstants = sink.last_constants_as(BONE_CONSTANTS_SLOT).expect("bone block");
    assert!(bones.bone_transforms[1].abs_diff_eq(Mat4::IDENTITY, 1e-5));

    // The last subset uses a material without authored constants.
    let material: MaterialConstants = sink.last_constants_as(MATERIAL_CONSTANTS_SLOT).expect("material block");
    assert_eq!(material, MaterialConstants::default());
}

#[test]
fn render_skips_culled_meshes() {
    let model = AnimatedModel::new(&rig_asset()).expect("valid");
    let view = Mat4::look_at_lh(Vec3::new(0.0, 0.0, -10.0), Vec3::ZERO, Vec3::Y);
    let projection = Mat4::perspective_lh(1.0, 1.0, 0.1, 100.0);
    let frustum = Frustum::from_matrix(projection * view);

    let mut sink = RecordingSink::new();
    let visible = model.render(&mut sink, &Mat4::IDENTITY, None, Some(&frustum)).expect("render");
    assert_eq!(visible, 1);

    sink.clear();
    let behind = Mat4::from_translation(Vec3::new(0.0, 0.0, -50.0));
    let culled = model.render(&mut sink, &behind, None, Some(&frustum)).expect("render");
    assert_eq!(culled, 0);
    assert!(sink.draws().is_empty());
}

#[test]
fn render_rejects_mismatched_pose() {
    let model = AnimatedModel::new(&rig_asset()).expect("valid");
    let mut sink = RecordingSink::new();
    let err = model.render(&mut sink, &Mat4::IDENTITY, Some(&Keyframe::identity(5)), None).unwrap_err();
    assert!(matches!(err, TundraError::NodeCountMismatch { left: 5, right: 2 }));
}

#[test]
fn cast_shadow_draws_one_instance_per_cascade() {
    let model = AnimatedModel::new(&rig_asset()).expect("valid");
    let mut sink = RecordingSink::new();
    model.cast_shadow(&mut sink, &Mat4::IDENTITY, None).expect("shadow");

    let instances = CASCADE_COUNT as u32;
    assert_eq!(sink.draws(), vec![(3, 0, instances), (3, 3, instances)]);
    assert!(sink.commands.contains(&Command::BindPipeline(PipelineState::SkinnedShadowCaster)));
    assert!(
        !sink.commands.iter().any(|c| matches!(c, Command::BindMaterial(_))),
        "shadow pass binds no materials"
    );
}
