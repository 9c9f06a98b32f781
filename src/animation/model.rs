//! Animated Model
//!
//! Validated, render-ready form of a [`ModelAsset`]: the node hierarchy,
//! meshes with their skeletons, materials and animation clips.
//!
//! The model itself is immutable during playback. Poses live in caller-owned
//! [`Keyframe`]s (usually sampled through an
//! [`AnimationSequencer`](super::sequencer::AnimationSequencer)), so one model
//! can be shared by any number of actors.
//!
//! # Transform chains
//!
//! - Animated mesh: `world * node_global * geometric`
//! - Static mesh: `world * default_global * geometric`
//! - Bone palette entry: `inverse(mesh_global) * bone_global * offset`

use glam::{Mat4, Vec3};
use rustc_hash::FxHashMap;

use crate::assets::{AssetProvider, MeshAsset, ModelAsset};
use crate::collision::bounds::BoundingBox;
use crate::collision::frustum::Frustum;
use crate::errors::{Result, TundraError};
use crate::render::commands::{
    BONE_CONSTANTS_SLOT, BoneConstants, CASCADE_COUNT, CommandSink, MATERIAL_CONSTANTS_SLOT,
    MaterialConstants, OBJECT_CONSTANTS_SLOT, ObjectConstants, PipelineState, bind_constant_block,
};

use super::blend::blend_keyframes;
use super::clip::{AnimationClip, Keyframe};
use super::hierarchy::NodeHierarchy;

#[derive(Debug, Clone)]
pub struct AnimatedModel {
    name: String,
    hierarchy: NodeHierarchy,
    meshes: Vec<MeshAsset>,
    materials: FxHashMap<String, MaterialConstants>,
    clips: Vec<AnimationClip>,
}

impl AnimatedModel {
    /// Builds a model, rejecting inconsistent asset data.
    pub fn new(asset: &ModelAsset) -> Result<Self> {
        let hierarchy = NodeHierarchy::new(asset.nodes.clone())?;
        let node_count = hierarchy.len();

        for mesh in &asset.meshes {
            mesh.skeleton.validate(&mesh.name, node_count)?;
            if node_count > 0 && mesh.node_index >= node_count {
                return Err(TundraError::MeshNodeOutOfRange {
                    mesh: mesh.name.clone(),
                    node_index: mesh.node_index,
                    node_count,
                });
            }
        }

        let mut model = Self {
            name: asset.name.clone(),
            hierarchy,
            meshes: asset.meshes.clone(),
            materials: asset
                .materials
                .iter()
                .map(|m| (m.name.clone(), m.constants))
                .collect(),
            clips: Vec::new(),
        };
        model.append_clips(asset.clips.iter().cloned())?;

        log::debug!(
            "Model '{}' ready: {} nodes, {} meshes, {} clips",
            model.name,
            model.hierarchy.len(),
            model.meshes.len(),
            model.clips.len()
        );
        Ok(model)
    }

    /// Loads `id` from `provider` and builds it.
    pub fn load(provider: &dyn AssetProvider, id: &str) -> Result<Self> {
        Self::new(&*provider.model(id)?)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn hierarchy(&self) -> &NodeHierarchy {
        &self.hierarchy
    }

    #[must_use]
    pub fn meshes(&self) -> &[MeshAsset] {
        &self.meshes
    }

    #[must_use]
    pub fn mesh(&self, name: &str) -> Option<&MeshAsset> {
        self.meshes.iter().find(|m| m.name == name)
    }

    #[must_use]
    pub fn clips(&self) -> &[AnimationClip] {
        &self.clips
    }

    #[must_use]
    pub fn clip_index(&self, name: &str) -> Option<usize> {
        self.clips.iter().position(|c| c.name == name)
    }

    /// Adds further animation sets, e.g. clips authored in separate files.
    ///
    /// Every keyframe must cover the whole node hierarchy. Nothing is added
    /// when any keyframe is rejected.
    pub fn append_clips<I>(&mut self, clips: I) -> Result<()>
    where
        I: IntoIterator<Item = AnimationClip>,
    {
        let clips: Vec<AnimationClip> = clips.into_iter().collect();
        let node_count = self.hierarchy.len();
        for clip in &clips {
            if let Some(frame) = clip.sequence.iter().find(|k| k.len() != node_count) {
                log::error!("Clip '{}' of '{}' does not match the node hierarchy", clip.name, self.name);
                return Err(TundraError::NodeCountMismatch {
                    left: frame.len(),
                    right: node_count,
                });
            }
        }
        self.clips.extend(clips);
        Ok(())
    }

    // ========================================================================
    // Pose
    // ========================================================================

    /// Rebuilds the global transforms of `keyframe` from its local poses.
    pub fn update_animation(&self, keyframe: &mut Keyframe) -> Result<()> {
        self.hierarchy.update_globals(keyframe)
    }

    /// Blends two keyframes and rebuilds the globals of the result.
    pub fn blend_animations(&self, a: &Keyframe, b: &Keyframe, factor: f32) -> Result<Keyframe> {
        let mut out = Keyframe::default();
        blend_keyframes(a, b, factor, &mut out)?;
        self.update_animation(&mut out)?;
        Ok(out)
    }

    fn check_keyframe(&self, keyframe: Option<&Keyframe>) -> Result<()> {
        match keyframe {
            Some(k) if !k.is_empty() && k.len() != self.hierarchy.len() => {
                Err(TundraError::NodeCountMismatch {
                    left: k.len(),
                    right: self.hierarchy.len(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Global transform of the node carrying `mesh`, when a pose is available.
    fn mesh_node_global(mesh: &MeshAsset, keyframe: Option<&Keyframe>) -> Option<Mat4> {
        keyframe
            .and_then(|k| k.nodes.get(mesh.node_index))
            .map(|n| n.global_transform)
    }

    /// Skinning palette of `mesh` for `keyframe`; identity beyond the bone count.
    #[must_use]
    pub fn bone_transforms(&self, mesh: &MeshAsset, keyframe: &Keyframe) -> BoneConstants {
        let mut constants = BoneConstants::default();
        let mesh_global_inv = Self::mesh_node_global(mesh, Some(keyframe))
            .unwrap_or(Mat4::IDENTITY)
            .inverse();

        for (slot, bone) in constants.bone_transforms.iter_mut().zip(&mesh.skeleton.bones) {
            if let Some(node) = keyframe.nodes.get(bone.node_index) {
                *slot = mesh_global_inv * node.global_transform * bone.offset_transform;
            }
        }
        constants
    }

    /// Object-to-world matrix of `mesh`.
    #[must_use]
    pub fn mesh_world_transform(&self, mesh: &MeshAsset, world: &Mat4, keyframe: Option<&Keyframe>) -> Mat4 {
        let node = Self::mesh_node_global(mesh, keyframe).unwrap_or(mesh.default_global_transform);
        *world * node * mesh.geometric_transform
    }

    /// World-space box of `mesh`.
    #[must_use]
    pub fn world_bounding_box(&self, mesh: &MeshAsset, world: &Mat4, keyframe: Option<&Keyframe>) -> BoundingBox {
        mesh.bounds
            .transform(&self.mesh_world_transform(mesh, world, keyframe))
    }

    /// World-space position of a bone.
    pub fn joint(&self, mesh_name: &str, bone_name: &str, world: &Mat4, keyframe: &Keyframe) -> Result<Vec3> {
        let not_found = || TundraError::JointNotFound {
            mesh: mesh_name.to_string(),
            bone: bone_name.to_string(),
        };

        let mesh = self.mesh(mesh_name).ok_or_else(not_found)?;
        let bone_index = mesh.skeleton.index_of(bone_name).ok_or_else(not_found)?;
        let node_index = mesh.skeleton.bones[bone_index].node_index;
        let node = keyframe
            .nodes
            .get(node_index)
            .ok_or_else(|| TundraError::NodeCountMismatch {
                left: keyframe.len(),
                right: self.hierarchy.len(),
            })?;

        Ok(world.transform_point3(node.global_transform.w_axis.truncate()))
    }

    // ========================================================================
    // Drawing
    // ========================================================================

    /// Draws every mesh not culled by `frustum`. Returns the number of meshes drawn.
    pub fn render(
        &self,
        sink: &mut dyn CommandSink,
        world: &Mat4,
        keyframe: Option<&Keyframe>,
        frustum: Option<&Frustum>,
    ) -> Result<usize> {
        self.check_keyframe(keyframe)?;

        let mut drawn = 0;
        for mesh in &self.meshes {
            if let Some(frustum) = frustum
                && !frustum.intersects_box(&self.world_bounding_box(mesh, world, keyframe))
            {
                continue;
            }
            self.submit_mesh(sink, mesh, world, keyframe, false);
            drawn += 1;
        }
        Ok(drawn)
    }

    /// Draws every mesh into the cascade array, one instance per cascade.
    pub fn cast_shadow(&self, sink: &mut dyn CommandSink, world: &Mat4, keyframe: Option<&Keyframe>) -> Result<()> {
        self.check_keyframe(keyframe)?;
        for mesh in &self.meshes {
            self.submit_mesh(sink, mesh, world, keyframe, true);
        }
        Ok(())
    }

    fn submit_mesh(
        &self,
        sink: &mut dyn CommandSink,
        mesh: &MeshAsset,
        world: &Mat4,
        keyframe: Option<&Keyframe>,
        shadow: bool,
    ) {
        let skinned = mesh.is_skinned();
        sink.bind_mesh(&mesh.name);
        sink.bind_pipeline(PipelineState::for_mesh(skinned, shadow));

        let object = ObjectConstants {
            world: self.mesh_world_transform(mesh, world, keyframe),
        };

        if skinned {
            // Without a pose the palette stays identity so the bind pose renders.
            let bones = match keyframe {
                Some(k) if !k.is_empty() => self.bone_transforms(mesh, k),
                _ => BoneConstants::default(),
            };
            bind_constant_block(sink, BONE_CONSTANTS_SLOT, &bones);
        }
        bind_constant_block(sink, OBJECT_CONSTANTS_SLOT, &object);

        let instances = if shadow { CASCADE_COUNT as u32 } else { 1 };
        for subset in &mesh.subsets {
            if !shadow {
                let material = self.materials.get(&subset.material).copied().unwrap_or_default();
                bind_constant_block(sink, MATERIAL_CONSTANTS_SLOT, &material);
                sink.bind_material(&subset.material);
            }
            sink.draw_indexed(subset.index_count, subset.start_index, instances);
        }
    }
}
