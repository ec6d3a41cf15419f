//! Helpers shared by the domain services: error mapping, ownership lookups,
//! and off-reactor media processing.

use serde_json::json;

use crate::domain::media::{MediaPipeline, MediaValidationError, PhotoMetadata, UploadSource};
use crate::domain::ports::{
    AssetFolder, AssetStore, AssetStoreError, PasswordHashError, PhotoRepository,
    PhotoRepositoryError, ProjectRepository, ProjectRepositoryError, UserPersistenceError,
};
use crate::domain::{AssetId, Error, Photo, PhotoId, Project, ProjectId, TraceId, UserId};

pub(crate) const PROJECT_NOT_FOUND: &str = "Project not found";
pub(crate) const PHOTO_NOT_FOUND: &str = "Photo not found";
pub(crate) const EMAIL_IN_USE: &str = "This email address is already in use.";
pub(crate) const USERNAME_TAKEN: &str = "A user with that username already exists.";

/// `invalid_request` carrying the offending form field and a stable code.
pub(crate) fn field_error(message: impl Into<String>, field: &str, code: &str) -> Error {
    Error::invalid_request(message).with_details(json!({ "field": field, "code": code }))
}

pub(crate) fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateUsername { .. } => {
            field_error(USERNAME_TAKEN, "username", "duplicate_username")
        }
        UserPersistenceError::DuplicateEmail { .. } => {
            field_error(EMAIL_IN_USE, "email", "duplicate_email")
        }
    }
}

pub(crate) fn map_project_error(error: ProjectRepositoryError) -> Error {
    match error {
        ProjectRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("project repository unavailable: {message}"))
        }
        ProjectRepositoryError::Query { message } => {
            Error::internal(format!("project repository error: {message}"))
        }
    }
}

pub(crate) fn map_photo_error(error: PhotoRepositoryError) -> Error {
    match error {
        PhotoRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("photo repository unavailable: {message}"))
        }
        PhotoRepositoryError::Query { message } => {
            Error::internal(format!("photo repository error: {message}"))
        }
    }
}

pub(crate) fn map_store_error(error: AssetStoreError) -> Error {
    match error {
        AssetStoreError::Unavailable { message } => {
            Error::service_unavailable(format!("asset store unavailable: {message}"))
        }
        AssetStoreError::Rejected { message } => {
            Error::internal(format!("asset store rejected upload: {message}"))
        }
    }
}

pub(crate) fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(error.to_string())
}

pub(crate) fn map_media_error(error: &MediaValidationError, field: &str) -> Error {
    field_error(error.to_string(), field, error.code())
}

/// Load `id` and check it belongs to `owner`; foreign projects read as
/// missing.
pub(crate) async fn owned_project<P>(
    projects: &P,
    owner: &UserId,
    id: &ProjectId,
) -> Result<Project, Error>
where
    P: ProjectRepository + ?Sized,
{
    projects
        .find_by_id(id)
        .await
        .map_err(map_project_error)?
        .filter(|project| project.is_owned_by(owner))
        .ok_or_else(|| Error::not_found(PROJECT_NOT_FOUND))
}

/// Load `id` and check its project belongs to `owner`.
pub(crate) async fn owned_photo<P, R>(
    projects: &P,
    photos: &R,
    owner: &UserId,
    id: &PhotoId,
) -> Result<Photo, Error>
where
    P: ProjectRepository + ?Sized,
    R: PhotoRepository + ?Sized,
{
    let photo = photos
        .find_by_id(id)
        .await
        .map_err(map_photo_error)?
        .ok_or_else(|| Error::not_found(PHOTO_NOT_FOUND))?;
    owned_project(projects, owner, &photo.project_id)
        .await
        .map_err(|_| Error::not_found(PHOTO_NOT_FOUND))?;
    Ok(photo)
}

/// Run the full ingestion pipeline on the blocking pool.
///
/// Hands the source back alongside its metadata so the caller can store
/// the untouched bytes.
pub(crate) async fn process_upload(
    media: &MediaPipeline,
    source: UploadSource,
) -> Result<(UploadSource, Result<PhotoMetadata, MediaValidationError>), Error> {
    let media = media.clone();
    TraceId::spawn_blocking(move || {
        let outcome = media.process_upload(&source);
        (source, outcome)
    })
    .await
    .map_err(|err| Error::internal(format!("media processing task failed: {err}")))
}

/// Validate an upload on the blocking pool without extracting metadata.
pub(crate) async fn validate_upload(
    media: &MediaPipeline,
    source: UploadSource,
    field: &str,
) -> Result<UploadSource, Error> {
    let media = media.clone();
    let (source, outcome) = TraceId::spawn_blocking(move || {
        let outcome = media.validate(&source);
        (source, outcome)
    })
    .await
    .map_err(|err| Error::internal(format!("media validation task failed: {err}")))?;
    outcome.map_err(|err| map_media_error(&err, field))?;
    Ok(source)
}

/// Asset for `source`: fresh bytes are stored under `folder`, existing
/// references pass through.
///
/// The flag reports whether a new asset was written.
pub(crate) async fn persist_source<S>(
    store: &S,
    source: UploadSource,
    folder: AssetFolder,
) -> Result<(AssetId, bool), AssetStoreError>
where
    S: AssetStore + ?Sized,
{
    match source {
        UploadSource::Fresh {
            bytes,
            content_type,
            ..
        } => store
            .store(bytes, &content_type, folder)
            .await
            .map(|id| (id, true)),
        UploadSource::Existing(id) => Ok((id, false)),
    }
}
