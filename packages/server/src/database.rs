use std::time::Duration;

use sea_orm::sea_query::Index;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use tracing::{info, warn};

use crate::config::DatabaseConfig;
use crate::entity::{media_asset, page_section};

pub async fn init_db(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(config.url.clone());

    // Set connection pool options
    opt.max_connections(config.max_connections)
        .min_connections(config.max_connections.min(2))
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(true);

    let db = Database::connect(opt).await?;
    sync_schema(&db).await?;
    ensure_indexes(&db).await?;

    Ok(db)
}

/// Create or update tables from the entity definitions.
pub async fn sync_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    db.get_schema_builder()
        .register(media_asset::Entity)
        .register(page_section::Entity)
        .sync(db)
        .await
}

/// Ensure required secondary indexes exist.
///
/// Schema sync only creates the unique constraints declared on the entities.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Newest-first catalog listing:
    // SELECT ... FROM media_asset ORDER BY created_at DESC, id DESC
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_media_asset_created")
        .table(media_asset::Entity)
        .col(media_asset::Column::CreatedAt)
        .to_owned();

    let backend = db.get_database_backend();
    match db.execute_raw(backend.build(&stmt)).await {
        Ok(_) => info!("Ensured index idx_media_asset_created exists"),
        Err(e) => warn!("Failed to create index idx_media_asset_created: {}", e),
    }

    Ok(())
}
