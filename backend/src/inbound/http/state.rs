//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and depend only on driving
//! ports, the asset store's URL rendering, and a clock. Tests swap in the
//! in-memory adapters without touching handler code.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    AccountCommand, AssetStore, LoginService, PhotosCommand, PhotosQuery, ProjectsCommand,
    ProjectsQuery, UserProfileQuery,
};
use crate::inbound::http::multipart::UploadLimits;

/// Parameter object bundling the port implementations.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub accounts: Arc<dyn AccountCommand>,
    pub profile: Arc<dyn UserProfileQuery>,
    pub projects: Arc<dyn ProjectsCommand>,
    pub projects_query: Arc<dyn ProjectsQuery>,
    pub photos: Arc<dyn PhotosCommand>,
    pub photos_query: Arc<dyn PhotosQuery>,
    /// Used for delivery URLs only; writes go through the services.
    pub assets: Arc<dyn AssetStore>,
    pub clock: Arc<dyn Clock>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub accounts: Arc<dyn AccountCommand>,
    pub profile: Arc<dyn UserProfileQuery>,
    pub projects: Arc<dyn ProjectsCommand>,
    pub projects_query: Arc<dyn ProjectsQuery>,
    pub photos: Arc<dyn PhotosCommand>,
    pub photos_query: Arc<dyn PhotosQuery>,
    pub assets: Arc<dyn AssetStore>,
    pub clock: Arc<dyn Clock>,
    pub uploads: UploadLimits,
}

impl HttpState {
    pub fn new(ports: HttpStatePorts, uploads: UploadLimits) -> Self {
        let HttpStatePorts {
            login,
            accounts,
            profile,
            projects,
            projects_query,
            photos,
            photos_query,
            assets,
            clock,
        } = ports;
        Self {
            login,
            accounts,
            profile,
            projects,
            projects_query,
            photos,
            photos_query,
            assets,
            clock,
            uploads,
        }
    }
}
