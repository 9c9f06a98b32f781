use glam::{Mat4, Quat, Vec3};

/// Pose of one scene node inside a keyframe.
///
/// `scaling`, `rotation` and `translation` are the node's local pose and are
/// what blending operates on. `global_transform` maps node space to scene
/// space and is rebuilt from the local poses by
/// [`NodeHierarchy::update_globals`](super::hierarchy::NodeHierarchy::update_globals).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyframeNode {
    pub global_transform: Mat4,
    pub scaling: Vec3,
    pub rotation: Quat,
    pub translation: Vec3,
}

impl KeyframeNode {
    #[must_use]
    pub fn from_local(scaling: Vec3, rotation: Quat, translation: Vec3) -> Self {
        Self {
            global_transform: Mat4::IDENTITY,
            scaling,
            rotation,
            translation,
        }
    }

    /// Local matrix: scale, then rotate, then translate.
    #[inline]
    #[must_use]
    pub fn local_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scaling, self.rotation, self.translation)
    }
}

impl Default for KeyframeNode {
    fn default() -> Self {
        Self::from_local(Vec3::ONE, Quat::IDENTITY, Vec3::ZERO)
    }
}

/// One sampled pose of the whole node hierarchy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Keyframe {
    pub nodes: Vec<KeyframeNode>,
}

impl Keyframe {
    #[must_use]
    pub fn new(nodes: Vec<KeyframeNode>) -> Self {
        Self { nodes }
    }

    /// Keyframe of `count` nodes in the identity pose.
    #[must_use]
    pub fn identity(count: usize) -> Self {
        Self {
            nodes: vec![KeyframeNode::default(); count],
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Sampled animation: keyframes captured at a fixed rate.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    pub name: String,
    /// Keyframes per second.
    pub sampling_rate: f32,
    pub sequence: Vec<Keyframe>,
}

impl AnimationClip {
    #[must_use]
    pub fn new(name: impl Into<String>, sampling_rate: f32, sequence: Vec<Keyframe>) -> Self {
        Self {
            name: name.into(),
            sampling_rate,
            sequence,
        }
    }

    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.sequence.len()
    }

    /// Playback length in seconds.
    #[must_use]
    pub fn duration(&self) -> f32 {
        if self.sampling_rate > 0.0 {
            self.sequence.len() as f32 / self.sampling_rate
        } else {
            0.0
        }
    }

    #[must_use]
    pub fn keyframe(&self, frame: usize) -> Option<&Keyframe> {
        self.sequence.get(frame)
    }
}
