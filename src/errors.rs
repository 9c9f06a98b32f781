//! Error Types
//!
//! This module defines the error type shared by every subsystem of the engine.
//!
//! # Overview
//!
//! [`TundraError`] covers the failure modes that come from incorrectly
//! authored data or incorrect use of the runtime:
//! - Registry misuse (duplicate or missing names, wrong type on lookup)
//! - Animation data inconsistencies (node counts, broken hierarchies)
//! - Event dispatch without a handler
//! - Scene lifecycle errors
//! - Settings and I/O failures
//!
//! Geometric edge cases (parallel rays, degenerate triangles) are never
//! errors; the collision queries report them as "no hit" instead.
//!
//! # Usage
//!
//! ```rust,ignore
//! use tundra::errors::{Result, TundraError};
//!
//! fn lookup(world: &World) -> Result<()> {
//!     let _avatar = world.actor("avatar")?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the Tundra runtime.
#[derive(Error, Debug)]
pub enum TundraError {
    // ========================================================================
    // Registry Errors
    // ========================================================================
    /// An entry with the same name is already registered.
    #[error("{registry} already contains an entry named '{name}'")]
    DuplicateName {
        /// Registry label
        registry: &'static str,
        /// Offending name
        name: String,
    },

    /// No entry with this name is registered.
    #[error("{registry} has no entry named '{name}'")]
    NotFound {
        /// Registry label
        registry: &'static str,
        /// Missing name
        name: String,
    },

    /// The entry exists but is not of the requested type.
    #[error("entry '{name}' is not a {expected}")]
    TypeMismatch {
        /// Entry name
        name: String,
        /// Requested type
        expected: &'static str,
    },

    // ========================================================================
    // Animation Errors
    // ========================================================================
    /// Two keyframes (or a keyframe and a hierarchy) disagree on node count.
    #[error("node count mismatch: {left} vs {right}")]
    NodeCountMismatch {
        /// Node count on the left-hand side
        left: usize,
        /// Node count on the right-hand side
        right: usize,
    },

    /// A parent index does not point strictly before its child.
    #[error("invalid hierarchy in {context}: entry {index} has parent {parent}")]
    InvalidHierarchy {
        /// Which hierarchy was being validated
        context: String,
        /// Child index
        index: usize,
        /// Parent index found
        parent: usize,
    },

    /// A bone index references a scene node that does not exist.
    #[error("bone '{bone}' references node {node_index}, but only {node_count} nodes exist")]
    BoneNodeOutOfRange {
        /// Bone name
        bone: String,
        /// Referenced node index
        node_index: usize,
        /// Number of scene nodes
        node_count: usize,
    },

    /// A mesh is attached to a scene node that does not exist.
    #[error("mesh '{mesh}' references node {node_index}, but only {node_count} nodes exist")]
    MeshNodeOutOfRange {
        /// Mesh name
        mesh: String,
        /// Referenced node index
        node_index: usize,
        /// Number of scene nodes
        node_count: usize,
    },

    /// The skeleton has more bones than the skinning constants can hold.
    #[error("mesh '{mesh}' has {count} bones, the maximum is {max}")]
    TooManyBones {
        /// Mesh name
        mesh: String,
        /// Bone count
        count: usize,
        /// Maximum supported
        max: usize,
    },

    /// No bone with this name exists in the mesh.
    #[error("could not find joint '{bone}' in mesh '{mesh}'")]
    JointNotFound {
        /// Mesh name
        mesh: String,
        /// Bone name
        bone: String,
    },

    // ========================================================================
    // Event Errors
    // ========================================================================
    /// Dispatch to a key with no registered handler.
    #[error("no handler is registered for event '{0}'")]
    UnhandledEvent(String),

    // ========================================================================
    // Scene Errors
    // ========================================================================
    /// The scene name was never registered with the manager.
    #[error("unknown scene '{0}'")]
    UnknownScene(String),

    /// The scene's background preload has not finished yet.
    #[error("scene '{0}' is still preloading")]
    SceneBusy(String),

    /// A scene reported failure from `initialize`.
    #[error("scene '{scene}' failed to initialize: {reason}")]
    SceneInit {
        /// Scene name
        scene: String,
        /// Failure description
        reason: String,
    },

    /// No scene is active.
    #[error("no active scene")]
    NoActiveScene,

    /// A background preload task panicked or was aborted.
    #[error("preload task failed: {0}")]
    TaskJoin(String),

    // ========================================================================
    // Asset Errors
    // ========================================================================
    /// The asset provider does not know this identifier.
    #[error("asset not found: {0}")]
    AssetNotFound(String),

    // ========================================================================
    // Settings & I/O Errors
    // ========================================================================
    /// Settings could not be parsed.
    #[error("settings parse error: {0}")]
    Settings(#[from] serde_json::Error),

    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<tokio::task::JoinError> for TundraError {
    fn from(err: tokio::task::JoinError) -> Self {
        TundraError::TaskJoin(err.to_string())
    }
}

/// Alias for `Result<T, TundraError>`.
pub type Result<T> = std::result::Result<T, TundraError>;
