//! Image ingestion: read, compress when oversized, store remotely, derive variants.

use std::sync::Arc;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{info, instrument, warn};

use crate::compress::{CompressError, Compressor};
use crate::config::CompressionPolicy;
use crate::storage::{AssetStore, StorageError, UploadRequest, variants};

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Failure to ingest a single file. The message is meant for an operator.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read upload: {0}")]
    Read(#[from] std::io::Error),

    #[error(transparent)]
    Compress(#[from] CompressError),

    #[error("compression task failed: {0}")]
    Task(String),

    #[error(transparent)]
    Store(#[from] StorageError),
}

/// Raw upload content.
pub enum UploadSource {
    Bytes(Vec<u8>),
    Reader(BoxReader),
}

impl From<Vec<u8>> for UploadSource {
    fn from(bytes: Vec<u8>) -> Self {
        UploadSource::Bytes(bytes)
    }
}

impl From<&[u8]> for UploadSource {
    fn from(bytes: &[u8]) -> Self {
        UploadSource::Bytes(bytes.to_vec())
    }
}

impl From<BoxReader> for UploadSource {
    fn from(reader: BoxReader) -> Self {
        UploadSource::Reader(reader)
    }
}

impl UploadSource {
    async fn into_bytes(self) -> Result<Vec<u8>, std::io::Error> {
        match self {
            UploadSource::Bytes(bytes) => Ok(bytes),
            UploadSource::Reader(mut reader) => {
                let mut buf = Vec::new();
                reader.read_to_end(&mut buf).await?;
                Ok(buf)
            }
        }
    }
}

/// Where and how an upload lands on the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    pub folder: String,
    pub public_id: Option<String>,
    pub overwrite: bool,
}

impl UploadOptions {
    pub fn in_folder(folder: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            public_id: None,
            overwrite: false,
        }
    }
}

/// Metadata of one stored image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub original_url: String,
    pub web_url: String,
    pub thumbnail_url: String,
    pub public_id: String,
    pub width: u32,
    pub height: u32,
    pub bytes: u64,
    pub format: String,
}

/// Pushes images to an [`AssetStore`], compressing oversized ones first.
#[derive(Clone)]
pub struct Ingestor {
    store: Arc<dyn AssetStore>,
    compressor: Compressor,
}

impl Ingestor {
    pub fn new(store: Arc<dyn AssetStore>, policy: CompressionPolicy) -> Self {
        Self {
            store,
            compressor: Compressor::new(policy),
        }
    }

    pub fn policy(&self) -> &CompressionPolicy {
        self.compressor.policy()
    }

    #[instrument(skip(self, source), fields(folder = %options.folder))]
    pub async fn upload(
        &self,
        source: impl Into<UploadSource>,
        options: UploadOptions,
    ) -> Result<UploadResult, IngestError> {
        let mut data = source.into().into_bytes().await?;
        let mut size = data.len() as u64;

        if self.compressor.policy().needs_compression(size) {
            data = self.shrink(data).await?;
            size = data.len() as u64;
        }

        let remote = self
            .store
            .upload(UploadRequest {
                bytes: data,
                folder: options.folder,
                public_id: options.public_id,
                overwrite: options.overwrite,
            })
            .await?;

        Ok(UploadResult {
            web_url: variants::web_url(&remote.secure_url),
            thumbnail_url: variants::thumbnail_url(&remote.secure_url),
            original_url: remote.secure_url,
            public_id: remote.public_id,
            width: remote.width,
            height: remote.height,
            bytes: remote.bytes.unwrap_or(size),
            format: remote.format,
        })
    }

    /// Run the compressor off the async executor. Keeps the original bytes when
    /// re-encoding did not make them smaller.
    async fn shrink(&self, data: Vec<u8>) -> Result<Vec<u8>, IngestError> {
        let compressor = self.compressor.clone();
        let original_len = data.len();

        let (data, outcome) = tokio::task::spawn_blocking(move || {
            let outcome = compressor.compress(&data);
            (data, outcome)
        })
        .await
        .map_err(|e| IngestError::Task(e.to_string()))?;
        let outcome = outcome?;

        if outcome.bytes.len() >= original_len {
            warn!(
                original = original_len,
                compressed = outcome.bytes.len(),
                "Re-encoding did not shrink the image, keeping original bytes"
            );
            return Ok(data);
        }

        info!(
            original = original_len,
            compressed = outcome.bytes.len(),
            quality = ?outcome.quality,
            format = outcome.format.extension(),
            steps = outcome.steps,
            "Compressed oversized upload"
        );
        Ok(outcome.bytes)
    }
}
