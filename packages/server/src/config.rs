use common::config::{CloudinaryConfig, CompressionPolicy};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    /// Pool size. Default: 20. In-memory SQLite needs exactly 1.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    20
}

/// Catalog and upload settings.
#[derive(Debug, Deserialize, Clone)]
pub struct MediaConfig {
    /// Remote folder used when an upload names none. Default: "uploads".
    #[serde(default = "default_folder")]
    pub default_folder: String,
    /// Catalog listing page size. Default: 24.
    #[serde(default = "default_page_size")]
    pub page_size: u64,
    /// Maximum request body for upload requests, in bytes. Default: 128 MiB.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: usize,
}

fn default_folder() -> String {
    "uploads".into()
}
fn default_page_size() -> u64 {
    24
}
fn default_max_upload_size() -> usize {
    128 * 1024 * 1024
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            default_folder: default_folder(),
            page_size: default_page_size(),
            max_upload_size: default_max_upload_size(),
        }
    }
}

/// Public-site content defaults.
#[derive(Debug, Deserialize, Clone)]
pub struct SiteConfig {
    /// Footer text served when no active footer section exists.
    #[serde(default = "default_copyright")]
    pub default_copyright: String,
}

fn default_copyright() -> String {
    "© 2025 All rights reserved.".into()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            default_copyright: default_copyright(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cloudinary: CloudinaryConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub compression: CompressionPolicy,
    #[serde(default)]
    pub site: SiteConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., FOLIO__CLOUDINARY__API_SECRET)
            .add_source(Environment::with_prefix("FOLIO").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
