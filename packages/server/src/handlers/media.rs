use axum::Json;
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use common::UploadOptions;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::catalog::{self, NewAsset};
use crate::entity::media_asset;
use crate::error::{AppError, ErrorBody};
use crate::models::media::*;
use crate::state::AppState;
use crate::utils::filename::{display_filename, title_from_filename, validate_folder};

/// A file part read from the upload form.
struct PendingFile {
    filename: String,
    data: Bytes,
}

/// Text fields and files of one upload form.
#[derive(Default)]
struct UploadForm {
    files: Vec<PendingFile>,
    folder: Option<String>,
    title: Option<String>,
    description: Option<String>,
}

impl UploadForm {
    async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await? {
            match field.name() {
                Some("images") | Some("image") => {
                    let filename = field
                        .file_name()
                        .map(display_filename)
                        .unwrap_or_default()
                        .to_string();
                    let data = field.bytes().await?;
                    // Browsers send an empty, nameless part for an untouched file input.
                    if filename.is_empty() && data.is_empty() {
                        continue;
                    }
                    let filename = if filename.is_empty() {
                        positional_name(form.files.len())
                    } else {
                        filename
                    };
                    form.files.push(PendingFile { filename, data });
                }
                Some("folder") => form.folder = Some(field.text().await?),
                Some("title") => form.title = Some(field.text().await?),
                Some("description") => form.description = Some(field.text().await?),
                _ => {} // Ignore unknown fields.
            }
        }

        Ok(form)
    }
}

/// Stand-in name for the `index`-th file part when the client sent none.
fn positional_name(index: usize) -> String {
    format!("file {}", index + 1)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Reject parts whose name clearly marks them as something other than an image.
fn check_content_type(filename: &str) -> Result<(), String> {
    match mime_guess::from_path(filename).first() {
        Some(mime) if mime.type_() != mime_guess::mime::IMAGE => {
            Err(format!("unsupported file type: {mime}"))
        }
        _ => Ok(()),
    }
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Media",
    operation_id = "uploadImages",
    summary = "Upload one or more images",
    description = "Multipart upload. File parts go under `images` (repeatable) or `image`. Optional text fields: `folder`, `title`, `description`; the title and description apply to the first file only, later files are titled after their filename. Files over the compression threshold are re-encoded before upload. A failing file does not stop the batch: it is reported in `errors`. Uploading an image whose remote public ID is already catalogued returns the existing entry.",
    request_body(content_type = "multipart/form-data", description = "Image files plus optional folder/title/description"),
    responses(
        (status = 200, description = "At least one image catalogued", body = BatchUploadResponse),
        (status = 400, description = "No file part or invalid folder (VALIDATION_ERROR)", body = ErrorBody),
        (status = 413, description = "Request body too large (PAYLOAD_TOO_LARGE)", body = ErrorBody),
        (status = 500, description = "No image could be uploaded", body = BatchFailureResponse),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn upload_images(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = UploadForm::read(multipart).await?;

    if form.files.is_empty() {
        return Err(AppError::Validation("No image file provided".into()));
    }

    let folder = match non_blank(form.folder) {
        Some(folder) => {
            validate_folder(&folder).map_err(|e| AppError::Validation(e.message().into()))?
        }
        None => state.config.media.default_folder.clone(),
    };

    let mut title = non_blank(form.title);
    let mut description = form.description;
    let mut images = Vec::new();
    let mut errors = Vec::new();

    for file in form.files {
        // The form's title and description belong to the first file only.
        let file_title = title
            .take()
            .unwrap_or_else(|| title_from_filename(&file.filename));
        let file_description = description.take().unwrap_or_default();

        if let Err(error) = check_content_type(&file.filename) {
            warn!(filename = %file.filename, %error, "Skipping upload");
            errors.push(UploadErrorEntry {
                filename: file.filename,
                error,
            });
            continue;
        }

        let uploaded = match state
            .ingestor
            .upload(file.data.to_vec(), UploadOptions::in_folder(folder.clone()))
            .await
        {
            Ok(uploaded) => uploaded,
            Err(e) => {
                warn!(filename = %file.filename, error = %e, "Upload failed");
                errors.push(UploadErrorEntry {
                    filename: file.filename,
                    error: e.to_string(),
                });
                continue;
            }
        };

        let asset = NewAsset::from_upload(uploaded, file_title, file_description, folder.clone());
        let (model, created) = catalog::insert_or_get(&state.db, asset).await?;
        info!(filename = %file.filename, id = %model.id, created, "Image catalogued");
        images.push(MediaSummary::from(model));
    }

    if images.is_empty() {
        let error = errors
            .first()
            .map(|e| e.error.clone())
            .unwrap_or_else(|| "No images were uploaded".into());
        let body = BatchFailureResponse {
            success: false,
            error,
            errors,
        };
        return Ok((StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response());
    }

    let body = BatchUploadResponse {
        success: true,
        count: images.len(),
        images,
        errors: (!errors.is_empty()).then_some(errors),
    };
    Ok(Json(body).into_response())
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Media",
    operation_id = "listMedia",
    summary = "List catalogued images",
    description = "Newest first, one page at a time. `mode=compact` (or the legacy `format=json`) returns only IDs, titles and URLs for image pickers; `mode=full` (default) returns every stored field. `title` narrows the listing to entries with exactly that title. Out-of-range pages resolve to the nearest valid page.",
    params(MediaListQuery),
    responses(
        (status = 200, description = "One page of images", body = MediaListResponse),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_media(
    State(state): State<AppState>,
    Query(query): Query<MediaListQuery>,
) -> Result<Json<MediaListResponse>, AppError> {
    let mode = query.list_mode();
    let (items, pagination) = catalog::list_page(
        &state.db,
        query.page,
        state.config.media.page_size,
        query.title_filter(),
    )
    .await?;

    Ok(Json(MediaListResponse {
        images: items
            .into_iter()
            .map(|model| MediaListItem::from_model(model, mode))
            .collect(),
        pagination,
    }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Media",
    operation_id = "getMedia",
    summary = "Get a catalogued image by ID",
    params(("id" = String, Path, description = "Catalog ID (UUID)")),
    responses(
        (status = 200, description = "Image details", body = MediaDetail),
        (status = 400, description = "Malformed ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Image not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_media(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MediaDetail>, AppError> {
    let model = find_media(&state, &id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Media",
    operation_id = "deleteMedia",
    summary = "Remove an image from the catalog",
    description = "Deletes the catalog entry only. The image stays on the remote host.",
    params(("id" = String, Path, description = "Catalog ID (UUID)")),
    responses(
        (status = 204, description = "Image removed"),
        (status = 400, description = "Malformed ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Image not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn delete_media(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    if !catalog::delete_asset(&state.db, id).await? {
        return Err(AppError::NotFound("Image not found".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}

fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::Validation(format!("Invalid image ID: {raw}")))
}

async fn find_media(state: &AppState, raw_id: &str) -> Result<media_asset::Model, AppError> {
    let id = parse_id(raw_id)?;
    catalog::find_asset(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Image not found".into()))
}

/// Body limit for upload requests.
pub fn upload_body_limit(max_size: usize) -> DefaultBodyLimit {
    DefaultBodyLimit::max(max_size)
}
