//! Project endpoints, all scoped to the signed-in owner.
//!
//! Another user's project is indistinguishable from a missing one: both
//! answer `404 not_found`.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::ports::{AssetStore, ProjectDetail, ProjectInput, ProjectListing, Transformation};
use crate::domain::{Project, ProjectId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::accounts::missing_image;
use crate::inbound::http::multipart::read_upload_form;
use crate::inbound::http::photos_dto::PhotoResponse;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Create or replace form for a project.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRequest {
    #[schema(example = "Coastal Light")]
    pub title: String,
    pub description: Option<String>,
    /// Must not lie before today.
    #[schema(value_type = Option<String>, format = Date, example = "2026-06-30")]
    pub target_end: Option<NaiveDate>,
}

impl From<ProjectRequest> for ProjectInput {
    fn from(value: ProjectRequest) -> Self {
        Self {
            title: value.title,
            description: value.description,
            target_end: value.target_end,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    #[schema(example = "2026-03-14")]
    pub start_date: String,
    pub target_end: Option<String>,
    /// 1200×630 cover rendition.
    pub cover_url: Option<String>,
    pub is_overdue: bool,
    /// Negative once overdue; absent without a target date.
    pub days_until_target: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

impl ProjectResponse {
    pub fn from_project(project: &Project, assets: &dyn AssetStore, today: NaiveDate) -> Self {
        Self {
            id: project.id.to_string(),
            title: project.title.to_string(),
            description: project.description.clone(),
            start_date: project.start_date.to_string(),
            target_end: project.target_end.map(|date| date.to_string()),
            cover_url: project
                .cover
                .as_ref()
                .map(|cover| assets.url(cover, &Transformation::cover())),
            is_overdue: project.is_overdue(today),
            days_until_target: project.days_until_target(today),
            created_at: project.created_at.to_rfc3339(),
            updated_at: project.updated_at.to_rfc3339(),
        }
    }
}

/// One page of projects, newest first.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPageResponse {
    pub projects: Vec<ProjectResponse>,
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub total_pages: u64,
}

/// A project with its photos in display order.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetailResponse {
    pub project: ProjectResponse,
    pub photos: Vec<PhotoResponse>,
}

/// Listing query. Unparseable or out-of-range pages fall back rather than
/// fail.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListProjectsQuery {
    /// 1-based page; defaults to the first.
    #[param(value_type = Option<u64>)]
    pub page: Option<String>,
}

impl ListProjectsQuery {
    fn page(&self) -> u64 {
        self.page
            .as_deref()
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .unwrap_or(1)
    }
}

fn today(state: &HttpState) -> NaiveDate {
    state.clock.utc().date_naive()
}

fn project_json(state: &HttpState, project: &Project) -> ProjectResponse {
    ProjectResponse::from_project(project, state.assets.as_ref(), today(state))
}

fn page_json(state: &HttpState, listing: &ProjectListing) -> ProjectPageResponse {
    ProjectPageResponse {
        projects: listing
            .projects
            .iter()
            .map(|project| project_json(state, project))
            .collect(),
        page: listing.page,
        per_page: listing.per_page,
        total: listing.total,
        total_pages: listing.total_pages(),
    }
}

fn detail_json(state: &HttpState, detail: &ProjectDetail) -> ProjectDetailResponse {
    ProjectDetailResponse {
        project: project_json(state, &detail.project),
        photos: detail
            .photos
            .iter()
            .map(|photo| PhotoResponse::from_photo(photo, state.assets.as_ref()))
            .collect(),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/projects",
    params(ListProjectsQuery),
    responses(
        (status = 200, description = "Page of projects", body = ProjectPageResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["projects"],
    operation_id = "listProjects"
)]
#[get("/projects")]
pub async fn list_projects(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ListProjectsQuery>,
) -> ApiResult<web::Json<ProjectPageResponse>> {
    let owner = session.require_user_id()?;
    let listing = state
        .projects_query
        .list_projects(&owner, query.page())
        .await?;
    Ok(web::Json(page_json(&state, &listing)))
}

#[utoipa::path(
    post,
    path = "/api/v1/projects",
    request_body = ProjectRequest,
    responses(
        (status = 201, description = "Project created", body = ProjectResponse),
        (status = 400, description = "Invalid title or target date", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["projects"],
    operation_id = "createProject"
)]
#[post("/projects")]
pub async fn create_project(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ProjectRequest>,
) -> ApiResult<HttpResponse> {
    let owner = session.require_user_id()?;
    let project = state
        .projects
        .create_project(&owner, payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(project_json(&state, &project)))
}

#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}",
    params(("id" = Uuid, Path, description = "Project identifier")),
    responses(
        (status = 200, description = "Project with photos", body = ProjectDetailResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["projects"],
    operation_id = "getProject"
)]
#[get("/projects/{id}")]
pub async fn get_project(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<ProjectDetailResponse>> {
    let owner = session.require_user_id()?;
    let id = ProjectId::from_uuid(path.into_inner());
    let detail = state.projects_query.get_project(&owner, &id).await?;
    Ok(web::Json(detail_json(&state, &detail)))
}

/// Replace title, description, and target date.
#[utoipa::path(
    put,
    path = "/api/v1/projects/{id}",
    params(("id" = Uuid, Path, description = "Project identifier")),
    request_body = ProjectRequest,
    responses(
        (status = 200, description = "Updated project", body = ProjectResponse),
        (status = 400, description = "Invalid title or target date", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["projects"],
    operation_id = "updateProject"
)]
#[put("/projects/{id}")]
pub async fn update_project(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<ProjectRequest>,
) -> ApiResult<web::Json<ProjectResponse>> {
    let owner = session.require_user_id()?;
    let id = ProjectId::from_uuid(path.into_inner());
    let project = state
        .projects
        .update_project(&owner, &id, payload.into_inner().into())
        .await?;
    Ok(web::Json(project_json(&state, &project)))
}

/// Delete the project, its photos, and every asset they reference.
#[utoipa::path(
    delete,
    path = "/api/v1/projects/{id}",
    params(("id" = Uuid, Path, description = "Project identifier")),
    responses(
        (status = 204, description = "Project deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["projects"],
    operation_id = "deleteProject"
)]
#[delete("/projects/{id}")]
pub async fn delete_project(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let owner = session.require_user_id()?;
    let id = ProjectId::from_uuid(path.into_inner());
    state.projects.delete_project(&owner, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    put,
    path = "/api/v1/projects/{id}/cover",
    params(("id" = Uuid, Path, description = "Project identifier")),
    request_body(content_type = "multipart/form-data", description = "Image file in the `image` field"),
    responses(
        (status = 200, description = "Updated project", body = ProjectResponse),
        (status = 400, description = "Missing, oversized, or corrupt image", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 503, description = "Asset store unavailable", body = ErrorSchema)
    ),
    tags = ["projects"],
    operation_id = "replaceProjectCover"
)]
#[put("/projects/{id}/cover")]
pub async fn replace_cover(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: Multipart,
) -> ApiResult<web::Json<ProjectResponse>> {
    let owner = session.require_user_id()?;
    let id = ProjectId::from_uuid(path.into_inner());
    let mut form = read_upload_form(payload, &state.uploads).await?;
    let image = form.take_file("image").ok_or_else(missing_image)?;
    let project = state.projects.replace_cover(&owner, &id, image).await?;
    Ok(web::Json(project_json(&state, &project)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/projects/{id}/cover",
    params(("id" = Uuid, Path, description = "Project identifier")),
    responses(
        (status = 200, description = "Updated project", body = ProjectResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["projects"],
    operation_id = "clearProjectCover"
)]
#[delete("/projects/{id}/cover")]
pub async fn clear_cover(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<ProjectResponse>> {
    let owner = session.require_user_id()?;
    let id = ProjectId::from_uuid(path.into_inner());
    let project = state.projects.clear_cover(&owner, &id).await?;
    Ok(web::Json(project_json(&state, &project)))
}

#[cfg(test)]
#[path = "projects_tests.rs"]
mod tests;
