use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "media_asset")]
pub struct Model {
    /// Opaque catalog ID (UUIDv7).
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    pub original_url: String,

    /// Web-optimized variant; empty when unknown.
    pub web_url: String,

    /// Thumbnail variant; empty when unknown.
    pub thumbnail_url: String,

    /// Identifier on the image host. Never shared by two rows.
    #[sea_orm(unique)]
    pub public_id: Option<String>,

    pub folder: String,

    pub width: Option<i32>,
    pub height: Option<i32>,

    /// In bytes.
    pub file_size: Option<i64>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
