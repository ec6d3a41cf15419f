//! Port for project persistence.

use async_trait::async_trait;

use crate::domain::{AssetId, Project, ProjectId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by project repository adapters.
    pub enum ProjectRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "project repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "project repository query failed: {message}",
    }
}

/// One page of an owner's projects, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectPage {
    pub projects: Vec<Project>,
    /// Number of projects the owner has across all pages.
    pub total: u64,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// List `owner`'s projects ordered by creation time, newest first.
    async fn list_for_owner(
        &self,
        owner: &UserId,
        offset: u64,
        limit: u64,
    ) -> Result<ProjectPage, ProjectRepositoryError>;

    async fn insert(&self, project: &Project) -> Result<(), ProjectRepositoryError>;

    async fn find_by_id(&self, id: &ProjectId) -> Result<Option<Project>, ProjectRepositoryError>;

    /// Overwrite the mutable fields of an existing project.
    async fn update(&self, project: &Project) -> Result<(), ProjectRepositoryError>;

    /// Delete a project and its photos.
    ///
    /// Returns the cover asset (if any) followed by every photo asset.
    async fn delete(&self, id: &ProjectId) -> Result<Vec<AssetId>, ProjectRepositoryError>;
}
