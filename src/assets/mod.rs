//! Asset data consumed by the core.
//!
//! Importers live outside the engine; they hand over [`ModelAsset`]s through
//! an [`AssetProvider`].

pub mod model;
pub mod provider;

pub use model::{MaterialAsset, MeshAsset, ModelAsset, Subset, find_subset};
pub use provider::{AssetProvider, MemoryAssetProvider};
