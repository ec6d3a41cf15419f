//! Photo endpoints: upload, edit, image replacement, bulk actions, reorder.
//!
//! ```text
//! POST   /api/v1/projects/{id}/photos          multipart `image` + `caption`, or `photos`×N
//! POST   /api/v1/projects/{id}/photos/bulk     {"action":"feature","photoIds":[…]}
//! POST   /api/v1/projects/{id}/photos/reorder  {"photoIds":[…]}
//! GET    /api/v1/photos/{id}
//! PUT    /api/v1/photos/{id}                   {"title":"…","featured":true}
//! PUT    /api/v1/photos/{id}/image             multipart `image`
//! DELETE /api/v1/photos/{id}
//! ```

use actix_multipart::Multipart;
use actix_web::{HttpResponse, delete, get, post, put, web};
use uuid::Uuid;

use crate::domain::ports::PhotoUpload;
use crate::domain::{PhotoId, ProjectId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::accounts::missing_image;
use crate::inbound::http::multipart::read_upload_form;
use crate::inbound::http::photos_dto::{
    BulkActionRequest, BulkActionResponse, BulkUploadResponse, PhotoEditRequest, PhotoResponse,
    ReorderRequest, ReorderResponse,
};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

const SINGLE_FIELD: &str = "image";
const BULK_FIELD: &str = "photos";

/// Upload one photo (`image`) or many (`photos`).
///
/// A single upload answers `201` with the photo. A bulk upload answers `200`
/// with a per-file report; individual failures do not fail the request.
#[utoipa::path(
    post,
    path = "/api/v1/projects/{id}/photos",
    params(("id" = Uuid, Path, description = "Project identifier")),
    request_body(
        content_type = "multipart/form-data",
        description = "Either one file in `image` with an optional `caption`, or up to 20 files in `photos`"
    ),
    responses(
        (status = 201, description = "Photo uploaded", body = PhotoResponse),
        (status = 200, description = "Bulk upload report", body = BulkUploadResponse),
        (status = 400, description = "Invalid upload", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Project not found", body = ErrorSchema),
        (status = 503, description = "Asset store unavailable", body = ErrorSchema)
    ),
    tags = ["photos"],
    operation_id = "uploadPhotos"
)]
#[post("/projects/{id}/photos")]
pub async fn upload_photos(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    let owner = session.require_user_id()?;
    let project = ProjectId::from_uuid(path.into_inner());
    let mut form = read_upload_form(payload, &state.uploads).await?;

    let single = if form.has_files(BULK_FIELD) {
        None
    } else {
        form.take_file(SINGLE_FIELD)
    };
    if let Some(source) = single {
        let caption = form.text("caption").unwrap_or_default().trim().to_owned();
        let photo = state
            .photos
            .upload_photo(&owner, &project, PhotoUpload { source, caption })
            .await?;
        return Ok(HttpResponse::Created()
            .json(PhotoResponse::from_photo(&photo, state.assets.as_ref())));
    }

    let sources = form.take_files(BULK_FIELD);
    let report = state.photos.bulk_upload(&owner, &project, sources).await?;
    Ok(HttpResponse::Ok().json(BulkUploadResponse::from_report(
        report,
        state.assets.as_ref(),
    )))
}

/// Apply one action to a selection of the project's photos.
#[utoipa::path(
    post,
    path = "/api/v1/projects/{id}/photos/bulk",
    params(("id" = Uuid, Path, description = "Project identifier")),
    request_body = BulkActionRequest,
    responses(
        (status = 200, description = "Action applied", body = BulkActionResponse),
        (status = 400, description = "No valid photos selected", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Project not found", body = ErrorSchema)
    ),
    tags = ["photos"],
    operation_id = "bulkPhotoAction"
)]
#[post("/projects/{id}/photos/bulk")]
pub async fn bulk_action(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<BulkActionRequest>,
) -> ApiResult<web::Json<BulkActionResponse>> {
    let owner = session.require_user_id()?;
    let project = ProjectId::from_uuid(path.into_inner());
    let request = payload.into_inner();
    let outcome = state
        .photos
        .apply_bulk_action(&owner, &project, request.action, request.photo_ids())
        .await?;
    Ok(web::Json(outcome.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/projects/{id}/photos/reorder",
    params(("id" = Uuid, Path, description = "Project identifier")),
    request_body = ReorderRequest,
    responses(
        (status = 200, description = "Photos renumbered", body = ReorderResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Project not found", body = ErrorSchema)
    ),
    tags = ["photos"],
    operation_id = "reorderPhotos"
)]
#[post("/projects/{id}/photos/reorder")]
pub async fn reorder_photos(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<ReorderRequest>,
) -> ApiResult<web::Json<ReorderResponse>> {
    let owner = session.require_user_id()?;
    let project = ProjectId::from_uuid(path.into_inner());
    let ordered = payload
        .into_inner()
        .photo_ids
        .into_iter()
        .map(PhotoId::from_uuid)
        .collect();
    let updated = state
        .photos
        .reorder_photos(&owner, &project, ordered)
        .await?;
    Ok(web::Json(ReorderResponse { updated }))
}

#[utoipa::path(
    get,
    path = "/api/v1/photos/{id}",
    params(("id" = Uuid, Path, description = "Photo identifier")),
    responses(
        (status = 200, description = "Photo", body = PhotoResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["photos"],
    operation_id = "getPhoto"
)]
#[get("/photos/{id}")]
pub async fn get_photo(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<PhotoResponse>> {
    let owner = session.require_user_id()?;
    let id = PhotoId::from_uuid(path.into_inner());
    let photo = state.photos_query.get_photo(&owner, &id).await?;
    Ok(web::Json(PhotoResponse::from_photo(
        &photo,
        state.assets.as_ref(),
    )))
}

#[utoipa::path(
    put,
    path = "/api/v1/photos/{id}",
    params(("id" = Uuid, Path, description = "Photo identifier")),
    request_body = PhotoEditRequest,
    responses(
        (status = 200, description = "Updated photo", body = PhotoResponse),
        (status = 400, description = "Invalid field", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["photos"],
    operation_id = "editPhoto"
)]
#[put("/photos/{id}")]
pub async fn edit_photo(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<PhotoEditRequest>,
) -> ApiResult<web::Json<PhotoResponse>> {
    let owner = session.require_user_id()?;
    let id = PhotoId::from_uuid(path.into_inner());
    let photo = state
        .photos
        .edit_photo(&owner, &id, payload.into_inner().into())
        .await?;
    Ok(web::Json(PhotoResponse::from_photo(
        &photo,
        state.assets.as_ref(),
    )))
}

/// Swap the stored image; the superseded asset is deleted.
#[utoipa::path(
    put,
    path = "/api/v1/photos/{id}/image",
    params(("id" = Uuid, Path, description = "Photo identifier")),
    request_body(content_type = "multipart/form-data", description = "Image file in the `image` field"),
    responses(
        (status = 200, description = "Updated photo", body = PhotoResponse),
        (status = 400, description = "Missing, oversized, or corrupt image", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 503, description = "Asset store unavailable", body = ErrorSchema)
    ),
    tags = ["photos"],
    operation_id = "replacePhotoImage"
)]
#[put("/photos/{id}/image")]
pub async fn replace_image(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: Multipart,
) -> ApiResult<web::Json<PhotoResponse>> {
    let owner = session.require_user_id()?;
    let id = PhotoId::from_uuid(path.into_inner());
    let mut form = read_upload_form(payload, &state.uploads).await?;
    let image = form.take_file(SINGLE_FIELD).ok_or_else(missing_image)?;
    let photo = state.photos.replace_image(&owner, &id, image).await?;
    Ok(web::Json(PhotoResponse::from_photo(
        &photo,
        state.assets.as_ref(),
    )))
}

#[utoipa::path(
    delete,
    path = "/api/v1/photos/{id}",
    params(("id" = Uuid, Path, description = "Photo identifier")),
    responses(
        (status = 204, description = "Photo deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["photos"],
    operation_id = "deletePhoto"
)]
#[delete("/photos/{id}")]
pub async fn delete_photo(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let owner = session.require_user_id()?;
    let id = PhotoId::from_uuid(path.into_inner());
    state.photos.delete_photo(&owner, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "photos_tests.rs"]
mod tests;
