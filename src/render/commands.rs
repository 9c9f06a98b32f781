//! GPU Command Submission
//!
//! The engine core never talks to a graphics API directly. Everything it
//! wants drawn goes through a [`CommandSink`], which a backend implements on
//! top of its immediate context. [`RecordingSink`] is the headless
//! implementation used by tools and tests.
//!
//! Constant blocks handed to [`CommandSink::bind_constants`] are `#[repr(C)]`
//! [`Pod`] structs, uploaded as raw bytes.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};

use crate::animation::skeleton::MAX_BONES;

/// Slot of [`ObjectConstants`].
pub const OBJECT_CONSTANTS_SLOT: u32 = 0;
/// Slot of [`BoneConstants`].
pub const BONE_CONSTANTS_SLOT: u32 = 1;
/// Slot of [`MaterialConstants`].
pub const MATERIAL_CONSTANTS_SLOT: u32 = 2;
/// Slot of [`CascadeConstants`].
pub const CASCADE_CONSTANTS_SLOT: u32 = 13;

/// Number of cascades in the shadow depth array.
pub const CASCADE_COUNT: usize = 4;

// ============================================================================
// Constant Layouts
// ============================================================================

/// Per-object constants.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ObjectConstants {
    pub world: Mat4,
}

/// Skinning palette: one matrix per bone, identity for unused entries.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct BoneConstants {
    pub bone_transforms: [Mat4; MAX_BONES],
}

impl Default for BoneConstants {
    fn default() -> Self {
        Self {
            bone_transforms: [Mat4::IDENTITY; MAX_BONES],
        }
    }
}

/// Surface colors of one material.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MaterialConstants {
    pub ambient: Vec4,
    /// `w` is opacity.
    pub diffuse: Vec4,
    /// `w` is shininess.
    pub specular: Vec4,
    pub reflection: Vec4,
    pub emissive: Vec4,
}

impl Default for MaterialConstants {
    fn default() -> Self {
        Self {
            ambient: Vec4::new(0.2, 0.2, 0.2, 1.0),
            diffuse: Vec4::new(0.8, 0.8, 0.8, 1.0),
            specular: Vec4::new(0.0, 0.0, 0.0, 1.0),
            reflection: Vec4::new(0.0, 0.0, 0.0, 1.0),
            emissive: Vec4::new(0.0, 0.0, 0.0, 1.0),
        }
    }
}

/// Light view-projection and far split distance of every cascade.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CascadeConstants {
    pub view_projection: [Mat4; CASCADE_COUNT],
    pub cascade_plane_distances: [f32; CASCADE_COUNT],
}

// ============================================================================
// Command Sink
// ============================================================================

/// Shader and fixed-function state bundles known to the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineState {
    /// Lit, non-skinned geometry.
    StaticMesh,
    /// Lit, skinned geometry.
    SkinnedMesh,
    /// Depth-only, layered output selected per instance.
    StaticShadowCaster,
    /// Depth-only skinned geometry, layered output selected per instance.
    SkinnedShadowCaster,
}

impl PipelineState {
    #[must_use]
    pub fn for_mesh(skinned: bool, shadow: bool) -> Self {
        match (skinned, shadow) {
            (false, false) => Self::StaticMesh,
            (true, false) => Self::SkinnedMesh,
            (false, true) => Self::StaticShadowCaster,
            (true, true) => Self::SkinnedShadowCaster,
        }
    }
}

/// Depth attachment selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthTarget {
    /// The main scene depth buffer.
    Scene,
    /// Layered depth array of the cascaded shadow map.
    CascadeArray { size: u32, layers: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    /// Full-target viewport with the `[0, 1]` depth range.
    #[must_use]
    pub fn square(size: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: size as f32,
            height: size as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

/// Destination of every draw the core issues.
pub trait CommandSink {
    fn bind_pipeline(&mut self, state: PipelineState);
    fn bind_constants(&mut self, slot: u32, bytes: &[u8]);
    fn bind_mesh(&mut self, name: &str);
    fn bind_material(&mut self, name: &str);
    fn set_depth_target(&mut self, target: DepthTarget);
    fn clear_depth(&mut self, depth: f32);
    fn set_viewport(&mut self, viewport: Viewport);
    /// Pushes the current render targets and viewport.
    fn save_targets(&mut self);
    /// Pops what the matching [`save_targets`](Self::save_targets) pushed.
    fn restore_targets(&mut self);
    fn draw_indexed(&mut self, index_count: u32, start_index: u32, instance_count: u32);
    fn dispatch(&mut self, x: u32, y: u32, z: u32);
}

/// Typed helper over [`CommandSink::bind_constants`].
pub fn bind_constant_block<T: Pod>(sink: &mut dyn CommandSink, slot: u32, block: &T) {
    sink.bind_constants(slot, bytemuck::bytes_of(block));
}

// ============================================================================
// Recording Sink
// ============================================================================

/// One recorded call.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    BindPipeline(PipelineState),
    BindConstants { slot: u32, bytes: Vec<u8> },
    BindMesh(String),
    BindMaterial(String),
    SetDepthTarget(DepthTarget),
    ClearDepth(f32),
    SetViewport(Viewport),
    SaveTargets,
    RestoreTargets,
    DrawIndexed {
        index_count: u32,
        start_index: u32,
        instance_count: u32,
    },
    Dispatch { x: u32, y: u32, z: u32 },
}

/// Sink that stores every command in submission order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub commands: Vec<Command>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// `(index_count, start_index, instance_count)` of every draw.
    #[must_use]
    pub fn draws(&self) -> Vec<(u32, u32, u32)> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::DrawIndexed {
                    index_count,
                    start_index,
                    instance_count,
                } => Some((*index_count, *start_index, *instance_count)),
                _ => None,
            })
            .collect()
    }

    /// Bytes of the most recent constant block bound at `slot`.
    #[must_use]
    pub fn last_constants(&self, slot: u32) -> Option<&[u8]> {
        self.commands.iter().rev().find_map(|c| match c {
            Command::BindConstants { slot: s, bytes } if *s == slot => Some(bytes.as_slice()),
            _ => None,
        })
    }

    /// Most recent constant block at `slot`, reinterpreted as `T`.
    #[must_use]
    pub fn last_constants_as<T: Pod>(&self, slot: u32) -> Option<T> {
        self.last_constants(slot)
            .and_then(|bytes| bytemuck::try_pod_read_unaligned(bytes).ok())
    }

    #[must_use]
    pub fn bound_meshes(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::BindMesh(name) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl CommandSink for RecordingSink {
    fn bind_pipeline(&mut self, state: PipelineState) {
        self.commands.push(Command::BindPipeline(state));
    }

    fn bind_constants(&mut self, slot: u32, bytes: &[u8]) {
        self.commands.push(Command::BindConstants {
            slot,
            bytes: bytes.to_vec(),
        });
    }

    fn bind_mesh(&mut self, name: &str) {
        self.commands.push(Command::BindMesh(name.to_string()));
    }

    fn bind_material(&mut self, name: &str) {
        self.commands.push(Command::BindMaterial(name.to_string()));
    }

    fn set_depth_target(&mut self, target: DepthTarget) {
        self.commands.push(Command::SetDepthTarget(target));
    }

    fn clear_depth(&mut self, depth: f32) {
        self.commands.push(Command::ClearDepth(depth));
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.commands.push(Command::SetViewport(viewport));
    }

    fn save_targets(&mut self) {
        self.commands.push(Command::SaveTargets);
    }

    fn restore_targets(&mut self) {
        self.commands.push(Command::RestoreTargets);
    }

    fn draw_indexed(&mut self, index_count: u32, start_index: u32, instance_count: u32) {
        self.commands.push(Command::DrawIndexed {
            index_count,
            start_index,
            instance_count,
        });
    }

    fn dispatch(&mut self, x: u32, y: u32, z: u32) {
        self.commands.push(Command::Dispatch { x, y, z });
    }
}
