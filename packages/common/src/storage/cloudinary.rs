use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, instrument};

use super::error::StorageError;
use super::traits::{AssetStore, RemoteAsset, UploadRequest};
use crate::config::CloudinaryConfig;

/// Cloudinary-backed [`AssetStore`] using signed multipart uploads.
pub struct CloudinaryStore {
    config: CloudinaryConfig,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

impl CloudinaryStore {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(config: CloudinaryConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    /// Parameters covered by the request signature.
    fn signed_params(
        &self,
        request: &UploadRequest,
        timestamp: i64,
    ) -> BTreeMap<&'static str, String> {
        let mut params = BTreeMap::new();
        params.insert("folder", request.folder.clone());
        params.insert("format", "auto".to_string());
        params.insert("overwrite", request.overwrite.to_string());
        if let Some(public_id) = request.public_id.as_ref().filter(|id| !id.is_empty()) {
            params.insert("public_id", public_id.clone());
        }
        params.insert("timestamp", timestamp.to_string());
        params
    }
}

/// Hex SHA-256 over `k1=v1&k2=v2...` (keys sorted) followed by the API secret.
pub fn sign(params: &BTreeMap<&str, String>, api_secret: &str) -> String {
    let joined = params
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
impl AssetStore for CloudinaryStore {
    #[instrument(skip(self, request), fields(folder = %request.folder, size = request.bytes.len()))]
    async fn upload(&self, request: UploadRequest) -> Result<RemoteAsset, StorageError> {
        let timestamp = chrono::Utc::now().timestamp();
        let params = self.signed_params(&request, timestamp);
        let signature = sign(&params, &self.config.api_secret);

        let mut form = Form::new()
            .part("file", Part::bytes(request.bytes).file_name("upload"))
            .text("api_key", self.config.api_key.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");
        for (key, value) in params {
            if !value.is_empty() {
                form = form.text(key, value);
            }
        }

        let response = self
            .client
            .post(self.config.upload_endpoint())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| body.trim().to_string());
            return Err(StorageError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let asset: RemoteAsset = serde_json::from_str(&body)
            .map_err(|e| StorageError::InvalidResponse(e.to_string()))?;
        if asset.secure_url.is_empty() {
            return Err(StorageError::InvalidResponse(
                "response has no secure_url".into(),
            ));
        }

        debug!(public_id = %asset.public_id, "Stored remote asset");
        Ok(asset)
    }
}
