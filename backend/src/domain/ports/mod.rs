//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, asset store, password hasher) expose
//! strongly typed errors generated by [`define_port_error!`]; driving ports
//! return the domain [`Error`](crate::domain::Error) envelope.

mod macros;
pub(crate) use macros::define_port_error;

mod account_command;
mod asset_store;
mod login_service;
mod password_hasher;
mod photo_repository;
mod photos;
mod project_repository;
mod projects;
mod user_repository;

#[cfg(test)]
pub use account_command::{MockAccountCommand, MockUserProfileQuery};
pub use account_command::{AccountCommand, ProfileUpdate, UserProfileQuery};
#[cfg(test)]
pub use asset_store::MockAssetStore;
pub use asset_store::{AssetFolder, AssetStore, AssetStoreError, CropMode, Hint, Transformation};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::LoginService;
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use photo_repository::MockPhotoRepository;
pub use photo_repository::{PhotoRepository, PhotoRepositoryError};
#[cfg(test)]
pub use photos::{MockPhotosCommand, MockPhotosQuery};
pub use photos::{
    BulkActionOutcome, BulkUploadReport, DEFAULT_MAX_BULK_FILES, FailedUpload, PhotoUpload,
    PhotosCommand, PhotosQuery, UploadedPhoto,
};
#[cfg(test)]
pub use project_repository::MockProjectRepository;
pub use project_repository::{ProjectPage, ProjectRepository, ProjectRepositoryError};
#[cfg(test)]
pub use projects::{MockProjectsCommand, MockProjectsQuery};
pub use projects::{
    PROJECTS_PER_PAGE, ProjectDetail, ProjectInput, ProjectListing, ProjectsCommand, ProjectsQuery,
};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{StoredCredentials, UserPersistenceError, UserRepository};
