use axum::Json;
use axum::extract::{Path, State};
use serde_json::{Map, Value};
use tracing::instrument;

use crate::content::{self, Section};
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::content::{SectionRequest, SectionResponse};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Content",
    operation_id = "getHomepageContent",
    summary = "Homepage content",
    description = "Returns one object per active homepage section, keyed by slug (`hero`, `about`, `services_section`, `portfolio`, `faq_section`, `contact`, `footer`). Each object holds the section's extra attributes overlaid with its typed fields. Sections without an active row are omitted, except `footer`, which falls back to the configured copyright text under `copyright_text`.",
    responses(
        (status = 200, description = "Homepage sections", body = Object),
    ),
)]
#[instrument(skip(state))]
pub async fn get_homepage_content(
    State(state): State<AppState>,
) -> Result<Json<Map<String, Value>>, AppError> {
    let page = content::homepage(&state.db, &state.config.site).await?;
    Ok(Json(page))
}

#[utoipa::path(
    put,
    path = "/sections/{slug}",
    tag = "Content",
    operation_id = "putSection",
    summary = "Create or replace a homepage section",
    params(("slug" = String, Path, description = "Section slug, e.g. `hero` or `footer`")),
    request_body = SectionRequest,
    responses(
        (status = 200, description = "Section stored", body = SectionResponse),
        (status = 400, description = "Unknown slug or blank title (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(slug = %slug))]
pub async fn put_section(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    AppJson(payload): AppJson<SectionRequest>,
) -> Result<Json<SectionResponse>, AppError> {
    let section: Section = slug
        .parse()
        .map_err(|e: content::UnknownSection| AppError::Validation(e.to_string()))?;

    if payload.title.trim().is_empty() {
        return Err(AppError::Validation("Title cannot be empty".into()));
    }

    let model = content::upsert_section(&state.db, section, payload).await?;
    Ok(Json(model.into()))
}
