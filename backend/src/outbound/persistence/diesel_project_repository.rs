//! PostgreSQL-backed `ProjectRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{ProjectPage, ProjectRepository, ProjectRepositoryError};
use crate::domain::{AssetId, Project, ProjectId, ProjectTitle, UserId};

use super::diesel_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewProjectRow, ProjectRow, ProjectUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::{photos, projects};

/// Diesel-backed implementation of the project repository port.
#[derive(Clone)]
pub struct DieselProjectRepository {
    pool: DbPool,
}

impl DieselProjectRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ProjectRepositoryError {
    map_basic_pool_error(error, ProjectRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ProjectRepositoryError {
    map_basic_diesel_error(
        error,
        ProjectRepositoryError::query,
        ProjectRepositoryError::connection,
    )
}

fn to_sql_count(value: u64, what: &str) -> Result<i64, ProjectRepositoryError> {
    i64::try_from(value).map_err(|_| ProjectRepositoryError::query(format!("{what} out of range")))
}

fn parse_asset(raw: String) -> Result<AssetId, ProjectRepositoryError> {
    AssetId::new(raw).map_err(|err| ProjectRepositoryError::query(err.to_string()))
}

fn row_to_project(row: ProjectRow) -> Result<Project, ProjectRepositoryError> {
    let ProjectRow {
        id,
        owner_id,
        title,
        description,
        start_date,
        target_end,
        cover,
        created_at,
        updated_at,
    } = row;

    let title = ProjectTitle::new(title).map_err(|err| {
        ProjectRepositoryError::query(format!("stored project {id} is invalid: {err}"))
    })?;
    Ok(Project {
        id: ProjectId::from_uuid(id),
        owner: UserId::from_uuid(owner_id),
        title,
        description,
        start_date,
        target_end,
        cover: cover.map(parse_asset).transpose()?,
        created_at,
        updated_at,
    })
}

#[async_trait]
impl ProjectRepository for DieselProjectRepository {
    async fn list_for_owner(
        &self,
        owner: &UserId,
        offset: u64,
        limit: u64,
    ) -> Result<ProjectPage, ProjectRepositoryError> {
        let offset = to_sql_count(offset, "offset")?;
        let limit = to_sql_count(limit, "limit")?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = projects::table
            .filter(projects::owner_id.eq(owner.as_uuid()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let rows: Vec<ProjectRow> = projects::table
            .filter(projects::owner_id.eq(owner.as_uuid()))
            .order((projects::created_at.desc(), projects::id.desc()))
            .offset(offset)
            .limit(limit)
            .select(ProjectRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(ProjectPage {
            projects: rows
                .into_iter()
                .map(row_to_project)
                .collect::<Result<_, _>>()?,
            total: u64::try_from(total).unwrap_or_default(),
        })
    }

    async fn insert(&self, project: &Project) -> Result<(), ProjectRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewProjectRow {
            id: *project.id.as_uuid(),
            owner_id: *project.owner.as_uuid(),
            title: project.title.as_ref(),
            description: &project.description,
            start_date: project.start_date,
            target_end: project.target_end,
            cover: project.cover.as_ref().map(AssetId::as_str),
            created_at: project.created_at,
            updated_at: project.updated_at,
        };

        diesel::insert_into(projects::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &ProjectId) -> Result<Option<Project>, ProjectRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = projects::table
            .filter(projects::id.eq(id.as_uuid()))
            .select(ProjectRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_project).transpose()
    }

    async fn update(&self, project: &Project) -> Result<(), ProjectRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = ProjectUpdate {
            title: project.title.as_ref(),
            description: &project.description,
            target_end: project.target_end,
            cover: project.cover.as_ref().map(AssetId::as_str),
            updated_at: project.updated_at,
        };

        let updated = diesel::update(projects::table.filter(projects::id.eq(project.id.as_uuid())))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        if updated == 0 {
            return Err(ProjectRepositoryError::query(format!(
                "project {} no longer exists",
                project.id
            )));
        }
        Ok(())
    }

    async fn delete(&self, id: &ProjectId) -> Result<Vec<AssetId>, ProjectRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let project_id = *id.as_uuid();

        let raw_assets = conn
            .transaction(|conn| {
                async move {
                    let cover = projects::table
                        .filter(projects::id.eq(project_id))
                        .select(projects::cover)
                        .first::<Option<String>>(conn)
                        .await
                        .optional()?
                        .flatten();

                    let images = photos::table
                        .filter(photos::project_id.eq(project_id))
                        .order((photos::display_order.asc(), photos::uploaded_at.asc()))
                        .select(photos::image)
                        .load::<String>(conn)
                        .await?;

                    diesel::delete(projects::table.filter(projects::id.eq(project_id)))
                        .execute(conn)
                        .await?;

                    Ok::<_, diesel::result::Error>(cover.into_iter().chain(images).collect::<Vec<_>>())
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        raw_assets.into_iter().map(parse_asset).collect()
    }
}
