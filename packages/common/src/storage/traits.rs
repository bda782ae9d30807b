use async_trait::async_trait;
use serde::Deserialize;

use super::error::StorageError;

/// Parameters of a single upload to the remote asset store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub bytes: Vec<u8>,
    /// Logical folder (namespace) on the store.
    pub folder: String,
    /// Explicit identifier; the store generates one when absent.
    pub public_id: Option<String>,
    pub overwrite: bool,
}

/// What the store reports back about a stored asset.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteAsset {
    pub secure_url: String,
    pub public_id: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    /// Stored size; not every response carries it.
    #[serde(default)]
    pub bytes: Option<u64>,
    #[serde(default)]
    pub format: String,
}

/// Remote image host that accepts uploads and serves transformed variants by URL.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Store an image and return its secure URL and identity.
    async fn upload(&self, request: UploadRequest) -> Result<RemoteAsset, StorageError>;
}
