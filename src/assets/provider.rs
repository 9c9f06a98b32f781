use std::sync::Arc;

use crate::errors::{Result, TundraError};
use crate::scene::registry::Registry;

use super::model::ModelAsset;

/// Source of imported model data.
///
/// Loading, caching and file formats are the implementor's business.
pub trait AssetProvider: Send + Sync {
    fn model(&self, id: &str) -> Result<Arc<ModelAsset>>;
}

/// Provider serving models registered in memory.
pub struct MemoryAssetProvider {
    models: Registry<ModelAsset>,
}

impl MemoryAssetProvider {
    #[must_use]
    pub fn new() -> Self {
        Self {
            models: Registry::new("model assets"),
        }
    }

    pub fn insert(&self, id: &str, model: ModelAsset) -> Result<Arc<ModelAsset>> {
        self.models.insert(id, model)
    }

    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        self.models.names()
    }
}

impl Default for MemoryAssetProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetProvider for MemoryAssetProvider {
    fn model(&self, id: &str) -> Result<Arc<ModelAsset>> {
        self.models
            .try_get(id)
            .ok_or_else(|| TundraError::AssetNotFound(id.to_string()))
    }
}
