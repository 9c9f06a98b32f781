use glam::{Mat4, Vec3};

use crate::animation::clip::AnimationClip;
use crate::animation::hierarchy::SceneNode;
use crate::animation::skeleton::Skeleton;
use crate::collision::bounds::BoundingBox;
use crate::render::commands::MaterialConstants;

/// Contiguous index range drawn with one material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subset {
    pub material: String,
    pub start_index: u32,
    pub index_count: u32,
}

impl Subset {
    #[must_use]
    pub fn new(material: impl Into<String>, start_index: u32, index_count: u32) -> Self {
        Self {
            material: material.into(),
            start_index,
            index_count,
        }
    }

    /// `true` when `index` (a position in the index list) belongs to this subset.
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        let start = self.start_index as usize;
        index >= start && index < start + self.index_count as usize
    }
}

/// Finds the subset owning an index-list position.
#[must_use]
pub fn find_subset(subsets: &[Subset], index: usize) -> Option<&Subset> {
    subsets.iter().find(|s| s.contains(index))
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaterialAsset {
    pub name: String,
    pub constants: MaterialConstants,
}

/// One mesh of a model as produced by the asset provider.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshAsset {
    pub unique_id: u64,
    pub name: String,
    /// Scene node that carries this mesh when animated.
    pub node_index: usize,
    pub positions: Vec<Vec3>,
    pub indices: Vec<u32>,
    pub subsets: Vec<Subset>,
    /// Local-space bounds of `positions`.
    pub bounds: BoundingBox,
    pub default_global_transform: Mat4,
    /// Pivot correction applied before any node transform.
    pub geometric_transform: Mat4,
    /// Empty for rigid meshes.
    pub skeleton: Skeleton,
}

impl MeshAsset {
    /// Rigid mesh with identity transforms and bounds fitted to `positions`.
    #[must_use]
    pub fn new(name: impl Into<String>, positions: Vec<Vec3>, indices: Vec<u32>, subsets: Vec<Subset>) -> Self {
        let bounds = BoundingBox::from_points(positions.iter().copied()).unwrap_or_default();
        Self {
            unique_id: 0,
            name: name.into(),
            node_index: 0,
            positions,
            indices,
            subsets,
            bounds,
            default_global_transform: Mat4::IDENTITY,
            geometric_transform: Mat4::IDENTITY,
            skeleton: Skeleton::default(),
        }
    }

    #[must_use]
    pub fn is_skinned(&self) -> bool {
        !self.skeleton.is_empty()
    }
}

/// Everything the core needs from an imported model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelAsset {
    pub name: String,
    pub nodes: Vec<SceneNode>,
    pub meshes: Vec<MeshAsset>,
    pub materials: Vec<MaterialAsset>,
    pub clips: Vec<AnimationClip>,
}

impl ModelAsset {
    #[must_use]
    pub fn mesh(&self, name: &str) -> Option<&MeshAsset> {
        self.meshes.iter().find(|m| m.name == name)
    }

    #[must_use]
    pub fn material(&self, name: &str) -> Option<&MaterialAsset> {
        self.materials.iter().find(|m| m.name == name)
    }
}
