use serde::Deserialize;

/// Size and quality bounds for re-encoding oversized uploads.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CompressionPolicy {
    /// Uploads larger than this are re-encoded before leaving the server. Default: 10 MiB.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,
    /// Fraction of `max_bytes` the quality search aims for. Default: 0.93.
    #[serde(default = "default_target_ratio")]
    pub target_ratio: f64,
    /// Lowest JPEG quality the search may reach. Default: 20.
    #[serde(default = "default_min_quality")]
    pub min_quality: u8,
    /// Highest JPEG quality the search may reach. Default: 85.
    #[serde(default = "default_max_quality")]
    pub max_quality: u8,
}

fn default_max_bytes() -> u64 {
    10 * 1024 * 1024
}
fn default_target_ratio() -> f64 {
    0.93
}
fn default_min_quality() -> u8 {
    20
}
fn default_max_quality() -> u8 {
    85
}

impl CompressionPolicy {
    /// Byte size the quality search converges toward.
    pub fn target_bytes(&self) -> u64 {
        (self.max_bytes as f64 * self.target_ratio) as u64
    }

    /// Whether a payload of `len` bytes must be compressed first.
    pub fn needs_compression(&self, len: u64) -> bool {
        len > self.max_bytes
    }
}

impl Default for CompressionPolicy {
    fn default() -> Self {
        Self {
            max_bytes: default_max_bytes(),
            target_ratio: default_target_ratio(),
            min_quality: default_min_quality(),
            max_quality: default_max_quality(),
        }
    }
}

/// Credentials and endpoint for the Cloudinary upload API.
#[derive(Debug, Deserialize, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    /// API origin. Default: "https://api.cloudinary.com".
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

fn default_api_base() -> String {
    "https://api.cloudinary.com".into()
}

impl CloudinaryConfig {
    pub fn new(
        cloud_name: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            cloud_name: cloud_name.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            api_base: default_api_base(),
        }
    }

    /// Endpoint for image uploads on this cloud.
    pub fn upload_endpoint(&self) -> String {
        format!(
            "{}/v1_1/{}/image/upload",
            self.api_base.trim_end_matches('/'),
            self.cloud_name
        )
    }
}
