use crate::errors::{Result, TundraError};

use super::clip::{Keyframe, KeyframeNode};

/// Interpolates two keyframes node by node into `out`.
///
/// Scale and translation are interpolated linearly, rotation spherically.
/// The blended `global_transform`s are reset to identity; rebuild them with
/// [`NodeHierarchy::update_globals`](super::hierarchy::NodeHierarchy::update_globals).
pub fn blend_keyframes(a: &Keyframe, b: &Keyframe, factor: f32, out: &mut Keyframe) -> Result<()> {
    if a.nodes.len() != b.nodes.len() {
        return Err(TundraError::NodeCountMismatch {
            left: a.nodes.len(),
            right: b.nodes.len(),
        });
    }

    out.nodes.clear();
    out.nodes.extend(a.nodes.iter().zip(&b.nodes).map(|(na, nb)| {
        KeyframeNode::from_local(
            na.scaling.lerp(nb.scaling, factor),
            na.rotation.slerp(nb.rotation, factor),
            na.translation.lerp(nb.translation, factor),
        )
    }));
    Ok(())
}

/// Allocating form of [`blend_keyframes`].
pub fn blend(a: &Keyframe, b: &Keyframe, factor: f32) -> Result<Keyframe> {
    let mut out = Keyframe::default();
    blend_keyframes(a, b, factor, &mut out)?;
    Ok(out)
}
