//! Photo domain services: ingestion, edits, and bulk operations.
//!
//! Uploads run through the media pipeline on the blocking pool, are stored
//! in the asset store, and only then become rows. Bulk uploads treat every
//! file independently and insert all successes in one batch.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::asset_lifecycle::AssetLifecycle;
use crate::domain::media::{MediaPipeline, PhotoMetadata, UploadSource};
use crate::domain::ports::{
    AssetFolder, AssetStore, BulkActionOutcome, BulkUploadReport, DEFAULT_MAX_BULK_FILES,
    FailedUpload, PhotoRepository, PhotoUpload, PhotosCommand, PhotosQuery, ProjectRepository,
    UploadedPhoto,
};
use crate::domain::service_support::{
    field_error, map_media_error, map_photo_error, map_store_error, owned_photo, owned_project,
    persist_source, process_upload,
};
use crate::domain::{
    AssetId, BulkAction, Error, Photo, PhotoEdit, PhotoId, ProjectId, UserId,
};

const NO_FILES: &str = "Select at least one photo to upload.";
const NO_VALID_PHOTOS: &str = "No valid photos selected.";
const BATCH_NOT_SAVED: &str = "Upload could not be saved.";

/// Photo service implementing the photo driving ports.
pub struct PhotoService<P, R, S: ?Sized> {
    projects: Arc<P>,
    photos: Arc<R>,
    lifecycle: AssetLifecycle<S>,
    media: MediaPipeline,
    clock: Arc<dyn Clock>,
    max_bulk_files: usize,
}

impl<P, R, S: ?Sized> Clone for PhotoService<P, R, S> {
    fn clone(&self) -> Self {
        Self {
            projects: Arc::clone(&self.projects),
            photos: Arc::clone(&self.photos),
            lifecycle: self.lifecycle.clone(),
            media: self.media.clone(),
            clock: Arc::clone(&self.clock),
            max_bulk_files: self.max_bulk_files,
        }
    }
}

/// Ordered ids with duplicates removed, keeping first occurrences.
fn dedup_ordered(ids: Vec<PhotoId>) -> Vec<PhotoId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

/// A stored, not yet persisted upload.
struct Staged {
    photo: Photo,
    filename: Option<String>,
    fresh: bool,
}

impl<P, R, S> PhotoService<P, R, S>
where
    P: ProjectRepository,
    R: PhotoRepository,
    S: AssetStore + ?Sized,
{
    pub fn new(
        projects: Arc<P>,
        photos: Arc<R>,
        lifecycle: AssetLifecycle<S>,
        media: MediaPipeline,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            projects,
            photos,
            lifecycle,
            media,
            clock,
            max_bulk_files: DEFAULT_MAX_BULK_FILES,
        }
    }

    /// Override the per-request bulk upload cap.
    #[must_use]
    pub fn with_max_bulk_files(mut self, max_bulk_files: usize) -> Self {
        self.max_bulk_files = max_bulk_files;
        self
    }

    /// Validate, inspect, and store one upload.
    ///
    /// The returned photo has no display order yet.
    async fn stage(
        &self,
        project: &ProjectId,
        source: UploadSource,
        caption: String,
    ) -> Result<Staged, Error> {
        let filename = source.filename().map(str::to_owned);
        let (source, outcome) = process_upload(&self.media, source).await?;
        let metadata = outcome.map_err(|err| map_media_error(&err, "image"))?;

        let store = self.lifecycle.store().as_ref();
        let (image, fresh) = persist_source(store, source, AssetFolder::Photos)
            .await
            .map_err(map_store_error)?;

        let photo = Photo::ingested(*project, image, metadata, caption, self.clock.utc());
        Ok(Staged {
            photo,
            filename,
            fresh,
        })
    }

    /// Delete assets written for uploads that never became rows.
    async fn discard(&self, staged: &[Staged]) {
        let orphans: Vec<AssetId> = staged
            .iter()
            .filter(|entry| entry.fresh)
            .map(|entry| entry.photo.image.clone())
            .collect();
        self.lifecycle.on_destroyed(orphans).await;
    }

    async fn next_display_order(&self, project: &ProjectId) -> Result<i32, Error> {
        self.photos
            .next_display_order(project)
            .await
            .map_err(map_photo_error)
    }
}

#[async_trait]
impl<P, R, S> PhotosQuery for PhotoService<P, R, S>
where
    P: ProjectRepository,
    R: PhotoRepository,
    S: AssetStore + ?Sized,
{
    async fn get_photo(&self, owner: &UserId, id: &PhotoId) -> Result<Photo, Error> {
        owned_photo(self.projects.as_ref(), self.photos.as_ref(), owner, id).await
    }
}

#[async_trait]
impl<P, R, S> PhotosCommand for PhotoService<P, R, S>
where
    P: ProjectRepository,
    R: PhotoRepository,
    S: AssetStore + ?Sized,
{
    async fn upload_photo(
        &self,
        owner: &UserId,
        project: &ProjectId,
        upload: PhotoUpload,
    ) -> Result<Photo, Error> {
        let project = owned_project(self.projects.as_ref(), owner, project).await?;
        let order = self.next_display_order(&project.id).await?;

        let mut staged = self.stage(&project.id, upload.source, upload.caption).await?;
        staged.photo.display_order = order;

        if let Err(error) = self
            .photos
            .insert_batch(std::slice::from_ref(&staged.photo))
            .await
        {
            self.discard(std::slice::from_ref(&staged)).await;
            return Err(map_photo_error(error));
        }
        info!(photo_id = %staged.photo.id, project_id = %project.id, "uploaded photo");
        Ok(staged.photo)
    }

    async fn bulk_upload(
        &self,
        owner: &UserId,
        project: &ProjectId,
        sources: Vec<UploadSource>,
    ) -> Result<BulkUploadReport, Error> {
        let project = owned_project(self.projects.as_ref(), owner, project).await?;
        if sources.is_empty() {
            return Err(field_error(NO_FILES, "photos", "no_files"));
        }
        if sources.len() > self.max_bulk_files {
            return Err(field_error(
                format!(
                    "Too many files selected. Maximum allowed: {}",
                    self.max_bulk_files
                ),
                "photos",
                "too_many_files",
            ));
        }

        let first_order = self.next_display_order(&project.id).await?;

        let mut staged: Vec<Staged> = Vec::with_capacity(sources.len());
        let mut failed = Vec::new();
        for source in sources {
            let filename = source.filename().map(str::to_owned);
            match self.stage(&project.id, source, String::new()).await {
                Ok(mut entry) => {
                    let offset = i32::try_from(staged.len()).unwrap_or(i32::MAX);
                    entry.photo.display_order = first_order.saturating_add(offset);
                    staged.push(entry);
                }
                Err(error) => {
                    warn!(?filename, %error, "bulk upload entry rejected");
                    failed.push(FailedUpload {
                        filename,
                        error: error.message().to_owned(),
                    });
                }
            }
        }

        if staged.is_empty() {
            return Ok(BulkUploadReport {
                successful: Vec::new(),
                failed,
            });
        }

        let rows: Vec<Photo> = staged.iter().map(|entry| entry.photo.clone()).collect();
        if let Err(error) = self.photos.insert_batch(&rows).await {
            warn!(%error, files = staged.len(), "bulk upload batch insert failed");
            self.discard(&staged).await;
            failed.extend(staged.into_iter().map(|entry| FailedUpload {
                filename: entry.filename,
                error: BATCH_NOT_SAVED.to_owned(),
            }));
            return Ok(BulkUploadReport {
                successful: Vec::new(),
                failed,
            });
        }

        info!(
            project_id = %project.id,
            succeeded = staged.len(),
            failed = failed.len(),
            "bulk upload finished"
        );
        Ok(BulkUploadReport {
            successful: staged
                .into_iter()
                .map(|entry| UploadedPhoto {
                    photo: entry.photo,
                    filename: entry.filename,
                })
                .collect(),
            failed,
        })
    }

    async fn edit_photo(
        &self,
        owner: &UserId,
        id: &PhotoId,
        edit: PhotoEdit,
    ) -> Result<Photo, Error> {
        let edit = edit
            .validated()
            .map_err(|err| field_error(err.to_string(), "title", "title_too_long"))?;
        let mut photo = owned_photo(self.projects.as_ref(), self.photos.as_ref(), owner, id).await?;
        photo.apply(edit, self.clock.utc());
        self.photos.update(&photo).await.map_err(map_photo_error)?;
        Ok(photo)
    }

    async fn replace_image(
        &self,
        owner: &UserId,
        id: &PhotoId,
        source: UploadSource,
    ) -> Result<Photo, Error> {
        let mut photo = owned_photo(self.projects.as_ref(), self.photos.as_ref(), owner, id).await?;
        if matches!(&source, UploadSource::Existing(existing) if *existing == photo.image) {
            return Ok(photo);
        }

        let (source, outcome) = process_upload(&self.media, source).await?;
        let PhotoMetadata {
            byte_size,
            content_type,
            width,
            height,
            exif,
            ..
        } = outcome.map_err(|err| map_media_error(&err, "image"))?;
        let store = self.lifecycle.store().as_ref();
        let (image, fresh) = persist_source(store, source, AssetFolder::Photos)
            .await
            .map_err(map_store_error)?;

        self.lifecycle
            .on_replaced(Some(&photo.image), Some(&image))
            .await;
        photo.image = image;
        photo.byte_size = byte_size;
        photo.content_type = content_type;
        photo.width = width;
        photo.height = height;
        photo.exif = exif;
        photo.updated_at = self.clock.utc();

        if let Err(error) = self.photos.update(&photo).await {
            if fresh {
                self.lifecycle.on_destroyed([photo.image.clone()]).await;
            }
            return Err(map_photo_error(error));
        }
        Ok(photo)
    }

    async fn delete_photo(&self, owner: &UserId, id: &PhotoId) -> Result<(), Error> {
        let photo = owned_photo(self.projects.as_ref(), self.photos.as_ref(), owner, id).await?;
        let removed = self
            .photos
            .delete(&photo.id)
            .await
            .map_err(map_photo_error)?;
        self.lifecycle.on_destroyed(removed).await;
        Ok(())
    }

    async fn apply_bulk_action(
        &self,
        owner: &UserId,
        project: &ProjectId,
        action: BulkAction,
        ids: Vec<PhotoId>,
    ) -> Result<BulkActionOutcome, Error> {
        let project = owned_project(self.projects.as_ref(), owner, project).await?;
        let members: HashSet<PhotoId> = self
            .photos
            .list_for_project(&project.id)
            .await
            .map_err(map_photo_error)?
            .into_iter()
            .map(|photo| photo.id)
            .collect();
        let selected: Vec<PhotoId> = dedup_ordered(ids)
            .into_iter()
            .filter(|id| members.contains(id))
            .collect();
        if selected.is_empty() {
            return Err(field_error(NO_VALID_PHOTOS, "photoIds", "no_valid_photos"));
        }

        let affected = match action.flag_update() {
            None => {
                let removed = self
                    .photos
                    .delete_many(&project.id, &selected)
                    .await
                    .map_err(map_photo_error)?;
                let count = removed.len();
                self.lifecycle.on_destroyed(removed).await;
                count
            }
            Some((flag, value)) => self
                .photos
                .set_flag(&project.id, &selected, flag, value)
                .await
                .map_err(map_photo_error)?,
        };

        info!(project_id = %project.id, ?action, affected, "applied bulk action");
        Ok(BulkActionOutcome {
            action,
            affected,
            message: action.summary(affected),
        })
    }

    async fn reorder_photos(
        &self,
        owner: &UserId,
        project: &ProjectId,
        ordered: Vec<PhotoId>,
    ) -> Result<usize, Error> {
        let project = owned_project(self.projects.as_ref(), owner, project).await?;
        let ordered = dedup_ordered(ordered);
        self.photos
            .reorder(&project.id, &ordered)
            .await
            .map_err(map_photo_error)
    }
}

#[cfg(test)]
#[path = "photo_service_tests.rs"]
mod tests;
