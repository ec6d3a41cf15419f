//! PostgreSQL-backed `PhotoRepository` implementation using Diesel ORM.
//!
//! Batch writes (upload batches, bulk deletes, reordering) each run inside a
//! single transaction. Every bulk statement is additionally filtered by the
//! owning project so identifiers from other projects are ignored.

use async_trait::async_trait;
use diesel::dsl::now;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{PhotoRepository, PhotoRepositoryError};
use crate::domain::{AssetId, ExifData, Photo, PhotoFlag, PhotoId, ProjectId};

use super::diesel_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{PhotoRecord, PhotoRow};
use super::pool::{DbPool, PoolError};
use super::schema::photos;

/// Diesel-backed implementation of the photo repository port.
#[derive(Clone)]
pub struct DieselPhotoRepository {
    pool: DbPool,
}

impl DieselPhotoRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PhotoRepositoryError {
    map_basic_pool_error(error, PhotoRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> PhotoRepositoryError {
    map_basic_diesel_error(
        error,
        PhotoRepositoryError::query,
        PhotoRepositoryError::connection,
    )
}

fn out_of_range(column: &str) -> PhotoRepositoryError {
    PhotoRepositoryError::query(format!("{column} out of range"))
}

fn parse_asset(raw: String) -> Result<AssetId, PhotoRepositoryError> {
    AssetId::new(raw).map_err(|err| PhotoRepositoryError::query(err.to_string()))
}

fn photo_to_record(photo: &Photo) -> Result<PhotoRecord, PhotoRepositoryError> {
    let exif = photo
        .exif
        .as_ref()
        .map(serde_json::to_value)
        .transpose()
        .map_err(|err| PhotoRepositoryError::query(format!("serialise exif: {err}")))?;

    Ok(PhotoRecord {
        id: *photo.id.as_uuid(),
        project_id: *photo.project_id.as_uuid(),
        title: photo.title.clone(),
        caption: photo.caption.clone(),
        image: photo.image.as_str().to_owned(),
        byte_size: photo
            .byte_size
            .map(i64::try_from)
            .transpose()
            .map_err(|_| out_of_range("byte_size"))?,
        content_type: photo.content_type.clone(),
        width: photo
            .width
            .map(i32::try_from)
            .transpose()
            .map_err(|_| out_of_range("width"))?,
        height: photo
            .height
            .map(i32::try_from)
            .transpose()
            .map_err(|_| out_of_range("height"))?,
        exif,
        featured: photo.featured,
        needs_attention: photo.needs_attention,
        display_order: photo.display_order,
        uploaded_at: photo.uploaded_at,
        updated_at: photo.updated_at,
    })
}

fn row_to_photo(row: PhotoRow) -> Result<Photo, PhotoRepositoryError> {
    let PhotoRow {
        id,
        project_id,
        title,
        caption,
        image,
        byte_size,
        content_type,
        width,
        height,
        exif,
        featured,
        needs_attention,
        display_order,
        uploaded_at,
        updated_at,
    } = row;

    // Unreadable EXIF degrades to absent metadata rather than hiding the photo.
    let exif = exif.and_then(|value| serde_json::from_value::<ExifData>(value).ok());

    Ok(Photo {
        id: PhotoId::from_uuid(id),
        project_id: ProjectId::from_uuid(project_id),
        title,
        caption,
        image: parse_asset(image)?,
        byte_size: byte_size.and_then(|size| u64::try_from(size).ok()),
        content_type,
        width: width.and_then(|w| u32::try_from(w).ok()),
        height: height.and_then(|h| u32::try_from(h).ok()),
        exif,
        featured,
        needs_attention,
        display_order,
        uploaded_at,
        updated_at,
    })
}

fn uuids(ids: &[PhotoId]) -> Vec<Uuid> {
    ids.iter().map(|id| *id.as_uuid()).collect()
}

#[async_trait]
impl PhotoRepository for DieselPhotoRepository {
    async fn next_display_order(&self, project: &ProjectId) -> Result<i32, PhotoRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let highest: Option<i32> = photos::table
            .filter(photos::project_id.eq(project.as_uuid()))
            .select(diesel::dsl::max(photos::display_order))
            .first(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(highest.map_or(0, |order| order.saturating_add(1)))
    }

    async fn insert_batch(&self, batch: &[Photo]) -> Result<(), PhotoRepositoryError> {
        if batch.is_empty() {
            return Ok(());
        }
        let records = batch
            .iter()
            .map(photo_to_record)
            .collect::<Result<Vec<_>, _>>()?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                diesel::insert_into(photos::table)
                    .values(&records)
                    .execute(conn)
                    .await
                    .map(|_| ())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &PhotoId) -> Result<Option<Photo>, PhotoRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = photos::table
            .filter(photos::id.eq(id.as_uuid()))
            .select(PhotoRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_photo).transpose()
    }

    async fn list_for_project(
        &self,
        project: &ProjectId,
    ) -> Result<Vec<Photo>, PhotoRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<PhotoRow> = photos::table
            .filter(photos::project_id.eq(project.as_uuid()))
            .order((photos::display_order.asc(), photos::uploaded_at.asc()))
            .select(PhotoRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_photo).collect()
    }

    async fn update(&self, photo: &Photo) -> Result<(), PhotoRepositoryError> {
        let record = photo_to_record(photo)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(photos::table.filter(photos::id.eq(record.id)))
            .set(&record)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        if updated == 0 {
            return Err(PhotoRepositoryError::query(format!(
                "photo {} no longer exists",
                photo.id
            )));
        }
        Ok(())
    }

    async fn delete(&self, id: &PhotoId) -> Result<Option<AssetId>, PhotoRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let image = diesel::delete(photos::table.filter(photos::id.eq(id.as_uuid())))
            .returning(photos::image)
            .get_result::<String>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        image.map(parse_asset).transpose()
    }

    async fn delete_many(
        &self,
        project: &ProjectId,
        ids: &[PhotoId],
    ) -> Result<Vec<AssetId>, PhotoRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let project_id = *project.as_uuid();
        let ids = uuids(ids);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let images = conn
            .transaction(|conn| {
                async move {
                    diesel::delete(
                        photos::table
                            .filter(photos::project_id.eq(project_id))
                            .filter(photos::id.eq_any(&ids)),
                    )
                    .returning(photos::image)
                    .get_results::<String>(conn)
                    .await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        images.into_iter().map(parse_asset).collect()
    }

    async fn set_flag(
        &self,
        project: &ProjectId,
        ids: &[PhotoId],
        flag: PhotoFlag,
        value: bool,
    ) -> Result<usize, PhotoRepositoryError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let ids = uuids(ids);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let targets = photos::table
            .filter(photos::project_id.eq(project.as_uuid()))
            .filter(photos::id.eq_any(&ids));

        let updated = match flag {
            PhotoFlag::Featured => {
                diesel::update(targets)
                    .set((photos::featured.eq(value), photos::updated_at.eq(now)))
                    .execute(&mut conn)
                    .await
            }
            PhotoFlag::NeedsAttention => {
                diesel::update(targets)
                    .set((photos::needs_attention.eq(value), photos::updated_at.eq(now)))
                    .execute(&mut conn)
                    .await
            }
        }
        .map_err(map_diesel_error)?;

        Ok(updated)
    }

    async fn reorder(
        &self,
        project: &ProjectId,
        ordered: &[PhotoId],
    ) -> Result<usize, PhotoRepositoryError> {
        let project_id = *project.as_uuid();
        let positions = ordered
            .iter()
            .enumerate()
            .map(|(index, id)| {
                i32::try_from(index)
                    .map(|position| (*id.as_uuid(), position))
                    .map_err(|_| out_of_range("display_order"))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                let mut updated = 0;
                for (id, position) in positions {
                    updated += diesel::update(
                        photos::table
                            .filter(photos::project_id.eq(project_id))
                            .filter(photos::id.eq(id)),
                    )
                    .set(photos::display_order.eq(position))
                    .execute(conn)
                    .await?;
                }
                Ok::<_, diesel::result::Error>(updated)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for record conversion in both directions.
    use std::collections::BTreeMap;

    use chrono::Utc;
    use rstest::rstest;

    use super::*;

    fn sample_photo() -> Photo {
        let stamp = Utc::now();
        let mut tags = BTreeMap::new();
        tags.insert("Image Make".to_owned(), "NIKON".to_owned());
        Photo {
            id: PhotoId::random(),
            project_id: ProjectId::random(),
            title: "Pier".to_owned(),
            caption: "Low tide".to_owned(),
            image: AssetId::new("photos/p1").expect("asset"),
            byte_size: Some(2048),
            content_type: Some("image/jpeg".to_owned()),
            width: Some(640),
            height: Some(480),
            exif: Some(ExifData::new(tags)),
            featured: true,
            needs_attention: false,
            display_order: 3,
            uploaded_at: stamp,
            updated_at: stamp,
        }
    }

    fn record_to_row(record: PhotoRecord) -> PhotoRow {
        PhotoRow {
            id: record.id,
            project_id: record.project_id,
            title: record.title,
            caption: record.caption,
            image: record.image,
            byte_size: record.byte_size,
            content_type: record.content_type,
            width: record.width,
            height: record.height,
            exif: record.exif,
            featured: record.featured,
            needs_attention: record.needs_attention,
            display_order: record.display_order,
            uploaded_at: record.uploaded_at,
            updated_at: record.updated_at,
        }
    }

    #[rstest]
    fn stored_photo_reads_back_unchanged() {
        let photo = sample_photo();
        let record = photo_to_record(&photo).expect("record");
        assert_eq!(record.exif, Some(serde_json::json!({"Image Make": "NIKON"})));

        let restored = row_to_photo(record_to_row(record)).expect("row");
        assert_eq!(restored, photo);
    }

    #[rstest]
    fn unreadable_exif_is_dropped() {
        let record = photo_to_record(&sample_photo()).expect("record");
        let row = PhotoRow {
            exif: Some(serde_json::json!(["not", "a", "map"])),
            ..record_to_row(record)
        };
        let photo = row_to_photo(row).expect("row");
        assert!(photo.exif.is_none());
    }

    #[rstest]
    fn oversized_dimensions_are_rejected() {
        let photo = Photo {
            width: Some(u32::MAX),
            ..sample_photo()
        };
        let err = photo_to_record(&photo).expect_err("too wide");
        assert_eq!(err, PhotoRepositoryError::query("width out of range"));
    }
}
