use glam::Mat4;

use crate::errors::{Result, TundraError};

use super::clip::Keyframe;

/// Node of the authored scene hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneNode {
    pub unique_id: u64,
    pub name: String,
    /// `None` for roots.
    pub parent: Option<usize>,
}

impl SceneNode {
    #[must_use]
    pub fn new(unique_id: u64, name: impl Into<String>, parent: Option<usize>) -> Self {
        Self {
            unique_id,
            name: name.into(),
            parent,
        }
    }
}

/// Checks that every parent index points strictly before its child.
///
/// Together with the flat storage this rules out cycles and guarantees a
/// parent is always processed before its children.
pub fn validate_parent_order<I>(context: &str, parents: I) -> Result<()>
where
    I: IntoIterator<Item = Option<usize>>,
{
    for (index, parent) in parents.into_iter().enumerate() {
        if let Some(parent) = parent
            && parent >= index
        {
            return Err(TundraError::InvalidHierarchy {
                context: context.to_string(),
                index,
                parent,
            });
        }
    }
    Ok(())
}

/// Flat, parent-before-child node arena.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeHierarchy {
    nodes: Vec<SceneNode>,
}

impl NodeHierarchy {
    pub fn new(nodes: Vec<SceneNode>) -> Result<Self> {
        validate_parent_order("scene nodes", nodes.iter().map(|n| n.parent))?;
        Ok(Self { nodes })
    }

    #[must_use]
    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.name == name)
    }

    /// Rebuilds every `global_transform` of `keyframe` from its local poses.
    ///
    /// `global = parent_global * T * R * S`, with identity above the roots.
    pub fn update_globals(&self, keyframe: &mut Keyframe) -> Result<()> {
        if keyframe.nodes.len() != self.nodes.len() {
            return Err(TundraError::NodeCountMismatch {
                left: keyframe.nodes.len(),
                right: self.nodes.len(),
            });
        }

        for (index, node) in self.nodes.iter().enumerate() {
            let parent_global = node
                .parent
                .map_or(Mat4::IDENTITY, |p| keyframe.nodes[p].global_transform);
            let pose = &mut keyframe.nodes[index];
            pose.global_transform = parent_global * pose.local_matrix();
        }
        Ok(())
    }
}
