use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::{Pagination, lenient_page};
use crate::entity::media_asset;

/// Compact catalog entry, as used by image pickers and upload responses.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct MediaSummary {
    /// Catalog ID (UUIDv7).
    #[schema(example = "01936f0e-1234-7abc-8000-000000000001")]
    pub id: String,
    #[schema(example = "team offsite")]
    pub title: String,
    #[schema(example = "https://res.cloudinary.com/demo/image/upload/v1/uploads/team.jpg")]
    pub original_url: String,
    #[schema(
        example = "https://res.cloudinary.com/demo/image/upload/f_webp,q_80,w_1920,c_limit/v1/uploads/team.jpg"
    )]
    pub web_url: String,
    #[schema(
        example = "https://res.cloudinary.com/demo/image/upload/f_webp,q_70,w_300,c_limit/v1/uploads/team.jpg"
    )]
    pub thumbnail_url: String,
}

/// Full catalog entry for management views.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct MediaDetail {
    pub id: String,
    pub title: String,
    pub description: String,
    pub original_url: String,
    pub web_url: String,
    pub thumbnail_url: String,
    /// Identifier on the image host.
    #[schema(example = "uploads/team_abc123")]
    pub public_id: Option<String>,
    #[schema(example = "uploads")]
    pub folder: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
    /// Size in bytes.
    pub file_size: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<media_asset::Model> for MediaSummary {
    fn from(model: media_asset::Model) -> Self {
        Self {
            id: model.id.to_string(),
            title: model.title,
            original_url: model.original_url,
            web_url: model.web_url,
            thumbnail_url: model.thumbnail_url,
        }
    }
}

impl From<media_asset::Model> for MediaDetail {
    fn from(model: media_asset::Model) -> Self {
        Self {
            id: model.id.to_string(),
            title: model.title,
            description: model.description,
            original_url: model.original_url,
            web_url: model.web_url,
            thumbnail_url: model.thumbnail_url,
            public_id: model.public_id,
            folder: model.folder,
            width: model.width,
            height: model.height,
            file_size: model.file_size,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// One file of a batch that could not be ingested.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct UploadErrorEntry {
    #[schema(example = "broken.png")]
    pub filename: String,
    #[schema(example = "failed to decode image: Format error decoding Png")]
    pub error: String,
}

/// Response for a batch with at least one catalogued file.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct BatchUploadResponse {
    /// Always `true`.
    pub success: bool,
    pub images: Vec<MediaSummary>,
    pub count: usize,
    /// Per-file failures; `null` when every file succeeded.
    pub errors: Option<Vec<UploadErrorEntry>>,
}

/// Response for a batch in which no file could be catalogued.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct BatchFailureResponse {
    /// Always `false`.
    pub success: bool,
    #[schema(example = "image host rejected upload (401): Invalid Signature")]
    pub error: String,
    pub errors: Vec<UploadErrorEntry>,
}

/// Listing output shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ListMode {
    /// ID, title and the three URLs.
    Compact,
    /// Every stored field.
    #[default]
    Full,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MediaListQuery {
    /// Page number (1-based). Invalid values read as 1; values past the end as the last page.
    #[serde(default, deserialize_with = "lenient_page")]
    #[param(value_type = Option<u64>)]
    pub page: Option<u64>,
    /// `compact` or `full` (default).
    pub mode: Option<ListMode>,
    /// Legacy picker switch: `json` selects compact mode.
    pub format: Option<String>,
    /// Only entries whose title matches exactly.
    pub title: Option<String>,
}

impl MediaListQuery {
    /// Title filter, with a blank value read as no filter.
    pub fn title_filter(&self) -> Option<&str> {
        self.title.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    pub fn list_mode(&self) -> ListMode {
        match (self.mode, self.format.as_deref()) {
            (Some(mode), _) => mode,
            (None, Some("json")) => ListMode::Compact,
            _ => ListMode::Full,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(untagged)]
pub enum MediaListItem {
    Compact(MediaSummary),
    Full(MediaDetail),
}

impl MediaListItem {
    pub fn from_model(model: media_asset::Model, mode: ListMode) -> Self {
        match mode {
            ListMode::Compact => MediaListItem::Compact(model.into()),
            ListMode::Full => MediaListItem::Full(model.into()),
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct MediaListResponse {
    pub images: Vec<MediaListItem>,
    pub pagination: Pagination,
}
