//! Driving ports for photo ingestion and management.

use async_trait::async_trait;

use crate::domain::media::UploadSource;
use crate::domain::{BulkAction, Error, Photo, PhotoEdit, PhotoId, ProjectId, UserId};

/// Default cap on files per bulk upload.
pub const DEFAULT_MAX_BULK_FILES: usize = 20;

/// Single upload with an optional caption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUpload {
    pub source: UploadSource,
    pub caption: String,
}

/// Bulk upload entry that was stored and persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedPhoto {
    pub photo: Photo,
    pub filename: Option<String>,
}

/// Bulk upload entry that was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedUpload {
    pub filename: Option<String>,
    /// Human-readable reason.
    pub error: String,
}

/// Per-file outcome of a bulk upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkUploadReport {
    pub successful: Vec<UploadedPhoto>,
    pub failed: Vec<FailedUpload>,
}

impl BulkUploadReport {
    pub fn total_success(&self) -> usize {
        self.successful.len()
    }

    pub fn total_failed(&self) -> usize {
        self.failed.len()
    }
}

/// Result of a bulk action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkActionOutcome {
    pub action: BulkAction,
    pub affected: usize,
    /// Summary such as `Marked 2 photos as featured.`
    pub message: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PhotosCommand: Send + Sync {
    /// Ingest one upload and append it to the project.
    async fn upload_photo(
        &self,
        owner: &UserId,
        project: &ProjectId,
        upload: PhotoUpload,
    ) -> Result<Photo, Error>;

    /// Ingest uploads one at a time; each file succeeds or fails on its own
    /// and the successes are inserted together.
    async fn bulk_upload(
        &self,
        owner: &UserId,
        project: &ProjectId,
        sources: Vec<UploadSource>,
    ) -> Result<BulkUploadReport, Error>;

    async fn edit_photo(
        &self,
        owner: &UserId,
        id: &PhotoId,
        edit: PhotoEdit,
    ) -> Result<Photo, Error>;

    /// Swap the photo's image, deleting the superseded asset.
    async fn replace_image(
        &self,
        owner: &UserId,
        id: &PhotoId,
        source: UploadSource,
    ) -> Result<Photo, Error>;

    async fn delete_photo(&self, owner: &UserId, id: &PhotoId) -> Result<(), Error>;

    /// Apply `action` to the listed photos of `project`; other ids are
    /// ignored.
    async fn apply_bulk_action(
        &self,
        owner: &UserId,
        project: &ProjectId,
        action: BulkAction,
        ids: Vec<PhotoId>,
    ) -> Result<BulkActionOutcome, Error>;

    /// Renumber the listed photos of `project` in the given order.
    async fn reorder_photos(
        &self,
        owner: &UserId,
        project: &ProjectId,
        ordered: Vec<PhotoId>,
    ) -> Result<usize, Error>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PhotosQuery: Send + Sync {
    async fn get_photo(&self, owner: &UserId, id: &PhotoId) -> Result<Photo, Error>;
}
