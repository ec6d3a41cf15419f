//! Port for photo persistence.
//!
//! Every bulk mutation takes the owning project id and must ignore photos
//! that belong to another project.

use async_trait::async_trait;

use crate::domain::{AssetId, Photo, PhotoFlag, PhotoId, ProjectId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by photo repository adapters.
    pub enum PhotoRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "photo repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "photo repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PhotoRepository: Send + Sync {
    /// Display order for the next appended photo: `max + 1`, or `0` when
    /// the project is empty.
    async fn next_display_order(&self, project: &ProjectId) -> Result<i32, PhotoRepositoryError>;

    /// Insert all photos in one transaction.
    async fn insert_batch(&self, photos: &[Photo]) -> Result<(), PhotoRepositoryError>;

    async fn find_by_id(&self, id: &PhotoId) -> Result<Option<Photo>, PhotoRepositoryError>;

    /// Photos of a project by display order, then upload time.
    async fn list_for_project(&self, project: &ProjectId)
    -> Result<Vec<Photo>, PhotoRepositoryError>;

    /// Overwrite the mutable fields of an existing photo.
    async fn update(&self, photo: &Photo) -> Result<(), PhotoRepositoryError>;

    /// Delete one photo, returning its asset when a row was removed.
    async fn delete(&self, id: &PhotoId) -> Result<Option<AssetId>, PhotoRepositoryError>;

    /// Delete the listed photos of `project`, returning their assets.
    async fn delete_many(
        &self,
        project: &ProjectId,
        ids: &[PhotoId],
    ) -> Result<Vec<AssetId>, PhotoRepositoryError>;

    /// Set `flag` to `value` on the listed photos of `project`.
    ///
    /// Returns the number of matched rows.
    async fn set_flag(
        &self,
        project: &ProjectId,
        ids: &[PhotoId],
        flag: PhotoFlag,
        value: bool,
    ) -> Result<usize, PhotoRepositoryError>;

    /// Assign each listed photo of `project` its index as display order,
    /// in one transaction. Returns the number of updated rows.
    async fn reorder(
        &self,
        project: &ProjectId,
        ordered: &[PhotoId],
    ) -> Result<usize, PhotoRepositoryError>;
}
