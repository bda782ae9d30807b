//! Persistent catalog of uploaded images.

use chrono::Utc;
use common::UploadResult;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::entity::media_asset;
use crate::models::shared::Pagination;

/// Catalog entry about to be written.
#[derive(Debug, Clone)]
pub struct NewAsset {
    pub title: String,
    pub description: String,
    pub original_url: String,
    pub web_url: String,
    pub thumbnail_url: String,
    pub public_id: Option<String>,
    pub folder: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub file_size: Option<i64>,
}

impl NewAsset {
    pub fn from_upload(
        upload: UploadResult,
        title: String,
        description: String,
        folder: String,
    ) -> Self {
        Self {
            title,
            description,
            original_url: upload.original_url,
            web_url: upload.web_url,
            thumbnail_url: upload.thumbnail_url,
            public_id: Some(upload.public_id).filter(|id| !id.is_empty()),
            folder,
            width: i32::try_from(upload.width).ok(),
            height: i32::try_from(upload.height).ok(),
            file_size: i64::try_from(upload.bytes).ok(),
        }
    }

    fn into_active_model(self) -> media_asset::ActiveModel {
        let now = Utc::now();
        media_asset::ActiveModel {
            id: Set(Uuid::now_v7()),
            title: Set(self.title),
            description: Set(self.description),
            original_url: Set(self.original_url),
            web_url: Set(self.web_url),
            thumbnail_url: Set(self.thumbnail_url),
            public_id: Set(self.public_id),
            folder: Set(self.folder),
            width: Set(self.width),
            height: Set(self.height),
            file_size: Set(self.file_size),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }
}

/// Insert `asset` unless a row with the same `public_id` exists.
///
/// Returns the stored row and whether it was created by this call. When the
/// public ID is already catalogued the existing row is returned unchanged.
/// Assets without a public ID are always inserted.
#[instrument(skip(db, asset), fields(public_id = ?asset.public_id))]
pub async fn insert_or_get<C: ConnectionTrait>(
    db: &C,
    asset: NewAsset,
) -> Result<(media_asset::Model, bool), DbErr> {
    let Some(public_id) = asset.public_id.clone() else {
        let model = asset.into_active_model().insert(db).await?;
        return Ok((model, true));
    };

    let result = media_asset::Entity::insert(asset.into_active_model())
        .on_conflict(
            OnConflict::column(media_asset::Column::PublicId)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await;

    let created = match result {
        Ok(rows) => rows > 0,
        Err(DbErr::RecordNotInserted) => false,
        Err(e) => return Err(e),
    };

    let model = media_asset::Entity::find()
        .filter(media_asset::Column::PublicId.eq(public_id.as_str()))
        .one(db)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("media asset {public_id}")))?;

    if !created {
        debug!(id = %model.id, "Public ID already catalogued");
    }
    Ok((model, created))
}

/// One page of the catalog, newest first.
///
/// With `title` set only entries with exactly that title are counted and
/// returned.
#[instrument(skip(db))]
pub async fn list_page<C: ConnectionTrait>(
    db: &C,
    requested: Option<u64>,
    per_page: u64,
    title: Option<&str>,
) -> Result<(Vec<media_asset::Model>, Pagination), DbErr> {
    let per_page = Ord::max(per_page, 1);
    let matching = || {
        media_asset::Entity::find().apply_if(title, |query, title| {
            query.filter(media_asset::Column::Title.eq(title))
        })
    };

    let total = matching().paginate(db, per_page).num_items().await?;
    let pagination = Pagination::resolve(requested, total, per_page);

    let items = matching()
        .order_by_desc(media_asset::Column::CreatedAt)
        .order_by_desc(media_asset::Column::Id)
        .offset(Some(pagination.offset(per_page)))
        .limit(Some(per_page))
        .all(db)
        .await?;

    Ok((items, pagination))
}

pub async fn find_asset<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<media_asset::Model>, DbErr> {
    media_asset::Entity::find_by_id(id).one(db).await
}

/// Remove a catalog entry. The remote image is left in place.
pub async fn delete_asset<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<bool, DbErr> {
    let result = media_asset::Entity::delete_by_id(id).exec(db).await?;
    Ok(result.rows_affected > 0)
}
