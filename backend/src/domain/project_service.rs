//! Project domain services.
//!
//! Ownership is enforced on every lookup: a project owned by someone else is
//! reported exactly like a missing one.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::asset_lifecycle::AssetLifecycle;
use crate::domain::media::{MediaPipeline, UploadSource};
use crate::domain::ports::{
    AssetFolder, AssetStore, PROJECTS_PER_PAGE, PhotoRepository, ProjectDetail, ProjectInput,
    ProjectListing, ProjectRepository, ProjectsCommand, ProjectsQuery,
};
use crate::domain::service_support::{
    field_error, map_photo_error, map_project_error, map_store_error, owned_project,
    persist_source, validate_upload,
};
use crate::domain::{Error, Project, ProjectDraft, ProjectId, ProjectValidationError, UserId};

fn map_validation_error(error: &ProjectValidationError) -> Error {
    field_error(error.to_string(), error.field(), error.code())
}

/// Project service implementing the project driving ports.
pub struct ProjectService<P, R, S: ?Sized> {
    projects: Arc<P>,
    photos: Arc<R>,
    lifecycle: AssetLifecycle<S>,
    media: MediaPipeline,
    clock: Arc<dyn Clock>,
}

impl<P, R, S: ?Sized> Clone for ProjectService<P, R, S> {
    fn clone(&self) -> Self {
        Self {
            projects: Arc::clone(&self.projects),
            photos: Arc::clone(&self.photos),
            lifecycle: self.lifecycle.clone(),
            media: self.media.clone(),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<P, R, S> ProjectService<P, R, S>
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
        }
    }

    fn draft(&self, input: ProjectInput) -> Result<ProjectDraft, Error> {
        let today = self.clock.utc().date_naive();
        ProjectDraft::try_new(
            &input.title,
            input.description.as_deref(),
            input.target_end,
            today,
        )
        .map_err(|err| map_validation_error(&err))
    }

    async fn save(&self, project: &Project) -> Result<(), Error> {
        self.projects
            .update(project)
            .await
            .map_err(map_project_error)
    }
}

#[async_trait]
impl<P, R, S> ProjectsQuery for ProjectService<P, R, S>
where
    P: ProjectRepository,
    R: PhotoRepository,
    S: AssetStore + ?Sized,
{
    async fn list_projects(&self, owner: &UserId, page: u64) -> Result<ProjectListing, Error> {
        let requested = page.max(1);
        let offset = (requested - 1).saturating_mul(PROJECTS_PER_PAGE);
        let mut result = self
            .projects
            .list_for_owner(owner, offset, PROJECTS_PER_PAGE)
            .await
            .map_err(map_project_error)?;
        let last_page = result.total.div_ceil(PROJECTS_PER_PAGE).max(1);

        let page = if requested > last_page {
            result = self
                .projects
                .list_for_owner(owner, (last_page - 1) * PROJECTS_PER_PAGE, PROJECTS_PER_PAGE)
                .await
                .map_err(map_project_error)?;
            last_page
        } else {
            requested
        };

        Ok(ProjectListing {
            projects: result.projects,
            total: result.total,
            page,
            per_page: PROJECTS_PER_PAGE,
        })
    }

    async fn get_project(&self, owner: &UserId, id: &ProjectId) -> Result<ProjectDetail, Error> {
        let project = owned_project(self.projects.as_ref(), owner, id).await?;
        let photos = self
            .photos
            .list_for_project(&project.id)
            .await
            .map_err(map_photo_error)?;
        Ok(ProjectDetail { project, photos })
    }
}

#[async_trait]
impl<P, R, S> ProjectsCommand for ProjectService<P, R, S>
where
    P: ProjectRepository,
    R: PhotoRepository,
    S: AssetStore + ?Sized,
{
    async fn create_project(&self, owner: &UserId, input: ProjectInput) -> Result<Project, Error> {
        let draft = self.draft(input)?;
        let project = Project::new(owner.clone(), draft, self.clock.utc());
        self.projects
            .insert(&project)
            .await
            .map_err(map_project_error)?;
        info!(project_id = %project.id, %owner, "created project");
        Ok(project)
    }

    async fn update_project(
        &self,
        owner: &UserId,
        id: &ProjectId,
        input: ProjectInput,
    ) -> Result<Project, Error> {
        let mut project = owned_project(self.projects.as_ref(), owner, id).await?;
        let draft = self.draft(input)?;
        project.apply(draft, self.clock.utc());
        self.save(&project).await?;
        Ok(project)
    }

    async fn replace_cover(
        &self,
        owner: &UserId,
        id: &ProjectId,
        source: UploadSource,
    ) -> Result<Project, Error> {
        let mut project = owned_project(self.projects.as_ref(), owner, id).await?;
        let source = validate_upload(&self.media, source, "image").await?;
        let store = self.lifecycle.store().as_ref();
        let (cover, fresh) = persist_source(store, source, AssetFolder::ProjectCovers)
            .await
            .map_err(map_store_error)?;

        self.lifecycle
            .on_replaced(project.cover.as_ref(), Some(&cover))
            .await;
        project.cover = Some(cover);
        project.updated_at = self.clock.utc();
        if let Err(error) = self.save(&project).await {
            if fresh {
                self.lifecycle.on_destroyed(project.cover).await;
            }
            return Err(error);
        }
        Ok(project)
    }

    async fn clear_cover(&self, owner: &UserId, id: &ProjectId) -> Result<Project, Error> {
        let mut project = owned_project(self.projects.as_ref(), owner, id).await?;
        self.lifecycle
            .on_replaced(project.cover.as_ref(), None)
            .await;
        project.cover = None;
        project.updated_at = self.clock.utc();
        self.save(&project).await?;
        Ok(project)
    }

    async fn delete_project(&self, owner: &UserId, id: &ProjectId) -> Result<(), Error> {
        let project = owned_project(self.projects.as_ref(), owner, id).await?;
        let assets = self
            .projects
            .delete(&project.id)
            .await
            .map_err(map_project_error)?;
        info!(project_id = %project.id, assets = assets.len(), "deleted project");
        self.lifecycle.on_destroyed(assets).await;
        Ok(())
    }
}

#[cfg(test)]
#[path = "project_service_tests.rs"]
mod tests;
