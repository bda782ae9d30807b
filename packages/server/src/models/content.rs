use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::page_section;

/// Replace-style upsert of one homepage section.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SectionRequest {
    /// Must not be blank. On the footer this is the copyright text.
    #[schema(example = "We build brands")]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    /// Extra template keys. Explicit fields take precedence on name clashes.
    #[serde(default)]
    pub extra_attributes: BTreeMap<String, String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SectionResponse {
    #[schema(example = "hero")]
    pub slug: String,
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub image_url: String,
    pub extra_attributes: BTreeMap<String, String>,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

impl From<page_section::Model> for SectionResponse {
    fn from(model: page_section::Model) -> Self {
        Self {
            slug: model.slug,
            title: model.title,
            subtitle: model.subtitle,
            description: model.description,
            image_url: model.image_url,
            extra_attributes: model.extra_attributes.0,
            is_active: model.is_active,
            updated_at: model.updated_at,
        }
    }
}
