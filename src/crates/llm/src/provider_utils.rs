//! Provider utility functions for connection testing and model listing.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Information about an available model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model identifier/name.
    pub id: String,

    /// Size on disk in bytes, when the provider reports it.
    pub size: Option<u64>,

    /// Last modification time as reported by the provider.
    pub modified_at: Option<String>,
}

impl ModelInfo {
    /// Create a new ModelInfo with just an ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            size: None,
            modified_at: None,
        }
    }
}

/// Extended provider functionality for connection testing and model listing.
#[async_trait]
pub trait ProviderUtils: Send + Sync {
    /// Ping the provider to check if it's reachable and responsive.
    ///
    /// Returns `Ok(true)` if the provider is available, `Ok(false)` if
    /// unreachable.
    async fn ping(&self) -> Result<bool>;

    /// Fetch the list of models installed on the provider.
    async fn fetch_models(&self) -> Result<Vec<ModelInfo>>;

    /// Get the configured model.
    fn current_model(&self) -> &str;
}
