//! Driving ports for owner-scoped project management.
//!
//! Every operation resolves the project first and answers `not_found` when
//! it belongs to someone else.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::media::UploadSource;
use crate::domain::{Error, Photo, Project, ProjectId, UserId};

/// Projects shown per listing page.
pub const PROJECTS_PER_PAGE: u64 = 10;

/// Unvalidated project form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectInput {
    pub title: String,
    pub description: Option<String>,
    pub target_end: Option<NaiveDate>,
}

/// One page of the caller's projects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectListing {
    pub projects: Vec<Project>,
    pub total: u64,
    /// 1-based page actually returned.
    pub page: u64,
    pub per_page: u64,
}

impl ProjectListing {
    /// Number of pages; at least one even when empty.
    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(self.per_page).max(1)
    }
}

/// A project together with its ordered photos.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDetail {
    pub project: Project,
    pub photos: Vec<Photo>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectsQuery: Send + Sync {
    /// List a page of `owner`'s projects, newest first.
    ///
    /// Page numbers below one read page one; past the end reads the last
    /// page.
    async fn list_projects(&self, owner: &UserId, page: u64) -> Result<ProjectListing, Error>;

    async fn get_project(&self, owner: &UserId, id: &ProjectId) -> Result<ProjectDetail, Error>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectsCommand: Send + Sync {
    async fn create_project(&self, owner: &UserId, input: ProjectInput)
    -> Result<Project, Error>;

    async fn update_project(
        &self,
        owner: &UserId,
        id: &ProjectId,
        input: ProjectInput,
    ) -> Result<Project, Error>;

    /// Store a new cover image and delete the one it supersedes.
    async fn replace_cover(
        &self,
        owner: &UserId,
        id: &ProjectId,
        source: UploadSource,
    ) -> Result<Project, Error>;

    async fn clear_cover(&self, owner: &UserId, id: &ProjectId) -> Result<Project, Error>;

    /// Delete the project and its photos, then clean up their assets.
    async fn delete_project(&self, owner: &UserId, id: &ProjectId) -> Result<(), Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 1)]
    #[case(10, 1)]
    #[case(11, 2)]
    #[case(25, 3)]
    fn total_pages_rounds_up(#[case] total: u64, #[case] expected: u64) {
        let listing = ProjectListing {
            projects: Vec::new(),
            total,
            page: 1,
            per_page: PROJECTS_PER_PAGE,
        };
        assert_eq!(listing.total_pages(), expected);
    }
}
