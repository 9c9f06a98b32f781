//! Skeletal animation
//!
//! Sampled clips, bind-pose skeletons, blending and playback sequencing, plus
//! [`AnimatedModel`] which turns a pose into draw calls.

pub mod blend;
pub mod clip;
pub mod hierarchy;
pub mod model;
pub mod sequencer;
pub mod skeleton;

pub use blend::{blend, blend_keyframes};
pub use clip::{AnimationClip, Keyframe, KeyframeNode};
pub use hierarchy::{NodeHierarchy, SceneNode};
pub use model::AnimatedModel;
pub use sequencer::AnimationSequencer;
pub use skeleton::{Bone, MAX_BONES, Skeleton};
