//! Domain primitives, aggregates, and services.
//!
//! Purpose: define the strongly typed entities used by the HTTP and
//! persistence adapters, the ports those adapters implement, and the
//! services that enforce ownership and drive asset cleanup.
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and stable identifiers.
//! - User, Project, Photo: aggregates with their identifiers and value types.
//! - media: upload validation and metadata extraction.
//! - ports: driving and driven port traits.
//! - AccountService, ProjectService, PhotoService: port implementations.

mod account_service;
pub mod asset;
pub mod asset_lifecycle;
pub mod auth;
pub mod error;
pub mod media;
pub mod photo;
mod photo_service;
pub mod ports;
pub mod project;
mod project_service;
mod service_support;
pub mod trace_id;
pub mod user;

pub use self::account_service::AccountService;
pub use self::asset::{AssetId, AssetIdValidationError};
pub use self::asset_lifecycle::AssetLifecycle;
pub use self::auth::{
    LoginCredentials, LoginValidationError, PASSWORD_MIN, Registration,
    RegistrationValidationError,
};
pub use self::error::{Error, ErrorCode};
pub use self::photo::{
    BulkAction, CameraInfo, ExifData, PHOTO_TITLE_MAX, Photo, PhotoEdit, PhotoFlag, PhotoId,
    PhotoValidationError,
};
pub use self::photo_service::PhotoService;
pub use self::project::{
    PROJECT_TITLE_MAX, Project, ProjectDraft, ProjectId, ProjectTitle, ProjectValidationError,
};
pub use self::project_service::ProjectService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    BIO_MAX, EmailAddress, USERNAME_MAX, User, UserId, UserValidationError, Username, biography,
    personal_name,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use lightbox::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
