//! Rendering interface
//!
//! - [`commands`]: the command sink the core submits work through, plus the
//!   constant block layouts it uploads.

pub mod commands;

pub use commands::{
    BoneConstants, CascadeConstants, Command, CommandSink, DepthTarget, MaterialConstants,
    ObjectConstants, PipelineState, RecordingSink, Viewport,
};
