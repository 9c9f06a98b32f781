use glam::Mat4;

use crate::errors::{Result, TundraError};

use super::hierarchy::validate_parent_order;

/// Maximum bones per mesh; the size of the skinning palette.
pub const MAX_BONES: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    pub unique_id: u64,
    pub name: String,
    /// Index into the same bone list, `None` for roots.
    pub parent_index: Option<usize>,
    /// Index into the scene node list.
    pub node_index: usize,
    /// Bind-pose inverse: maps mesh space into bone space.
    pub offset_transform: Mat4,
}

/// Bind pose of one skinned mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Skeleton {
    pub bones: Vec<Bone>,
}

impl Skeleton {
    #[must_use]
    pub fn new(bones: Vec<Bone>) -> Self {
        Self { bones }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.bones.iter().position(|b| b.name == name)
    }

    /// Checks bone order, node references and the palette size.
    pub fn validate(&self, mesh: &str, node_count: usize) -> Result<()> {
        if self.bones.len() > MAX_BONES {
            return Err(TundraError::TooManyBones {
                mesh: mesh.to_string(),
                count: self.bones.len(),
                max: MAX_BONES,
            });
        }

        validate_parent_order(
            &format!("skeleton of '{mesh}'"),
            self.bones.iter().map(|b| b.parent_index),
        )?;

        if let Some(bone) = self.bones.iter().find(|b| b.node_index >= node_count) {
            return Err(TundraError::BoneNodeOutOfRange {
                bone: bone.name.clone(),
                node_index: bone.node_index,
                node_count,
            });
        }
        Ok(())
    }
}
