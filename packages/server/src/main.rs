use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::http::HeaderValue;
use common::Ingestor;
use common::storage::CloudinaryStore;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{Level, info, warn};

use server::config::{AppConfig, CorsConfig};
use server::database::init_db;
use server::state::AppState;

fn build_cors(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(config.max_age));

    if config.allow_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allow_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load().context("Failed to load config")?;

    let db = init_db(&config.database)
        .await
        .context("Failed to initialize database")?;

    let store = Arc::new(CloudinaryStore::new(config.cloudinary.clone()));
    let ingestor = Ingestor::new(store, config.compression.clone());
    info!(
        cloud_name = %config.cloudinary.cloud_name,
        max_bytes = config.compression.max_bytes,
        "Image host configured"
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;
    let cors = build_cors(&config.server.cors);

    let state = AppState {
        db,
        config,
        ingestor,
    };
    let app = server::build_router(state).layer(cors);

    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
