//! Builders for the asset store and the HTTP state ports.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tracing::{info, info_span};
use zeroize::Zeroizing;

use lightbox::domain::media::{MediaPipeline, MediaPolicy};
use lightbox::domain::ports::{AssetStore, PhotoRepository, ProjectRepository, UserRepository};
use lightbox::domain::{AccountService, AssetLifecycle, PhotoService, ProjectService};
use lightbox::inbound::http::multipart::UploadLimits;
use lightbox::inbound::http::state::{HttpState, HttpStatePorts};
use lightbox::outbound::media_store::{
    CloudinaryAssetStore, CloudinaryCredentials, FilesystemAssetStore,
};
use lightbox::outbound::memory::{InMemoryAssetStore, InMemoryRepository};
use lightbox::outbound::persistence::{
    DieselPhotoRepository, DieselProjectRepository, DieselUserRepository,
};
use lightbox::outbound::security::Argon2PasswordHasher;
use lightbox::settings::{AppSettings, MediaBackend};

use super::ServerConfig;

fn invalid_settings(err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidInput, err.to_string())
}

/// Select the asset store named by the settings.
///
/// # Errors
/// Returns [`std::io::Error`] for unknown backends, missing Cloudinary
/// credentials, or an unusable media directory.
pub(crate) fn build_asset_store(
    settings: &AppSettings,
    clock: Arc<dyn Clock>,
) -> std::io::Result<Arc<dyn AssetStore>> {
    let backend = settings.media_backend().map_err(invalid_settings)?;
    info!(?backend, "configuring asset store");
    match backend {
        MediaBackend::Memory => Ok(Arc::new(InMemoryAssetStore::new())),
        MediaBackend::Filesystem => Ok(Arc::new(FilesystemAssetStore::open(
            settings.media_root(),
            settings.media_base_url(),
        )?)),
        MediaBackend::Cloudinary => {
            let account = settings.cloudinary().map_err(invalid_settings)?;
            let credentials = CloudinaryCredentials {
                cloud_name: account.cloud_name,
                api_key: account.api_key,
                api_secret: Zeroizing::new(account.api_secret),
            };
            let store = CloudinaryAssetStore::new(credentials, settings.request_timeout(), clock)
                .map_err(std::io::Error::other)?;
            Ok(Arc::new(store))
        }
    }
}

/// Shared pieces every service needs.
struct ServiceInputs {
    assets: Arc<dyn AssetStore>,
    media: MediaPipeline,
    clock: Arc<dyn Clock>,
    max_bulk_files: usize,
}

fn wire_ports<U, P, R>(
    users: Arc<U>,
    projects: Arc<P>,
    photos: Arc<R>,
    inputs: ServiceInputs,
) -> HttpStatePorts
where
    U: UserRepository + 'static,
    P: ProjectRepository + 'static,
    R: PhotoRepository + 'static,
{
    let ServiceInputs {
        assets,
        media,
        clock,
        max_bulk_files,
    } = inputs;
    let lifecycle = AssetLifecycle::new(Arc::clone(&assets), info_span!("asset_lifecycle"));

    let accounts = Arc::new(AccountService::new(
        users,
        Arc::new(Argon2PasswordHasher::new()),
        lifecycle.clone(),
        media.clone(),
        Arc::clone(&clock),
    ));
    let project_service = Arc::new(ProjectService::new(
        Arc::clone(&projects),
        Arc::clone(&photos),
        lifecycle.clone(),
        media.clone(),
        Arc::clone(&clock),
    ));
    let photo_service = Arc::new(
        PhotoService::new(projects, photos, lifecycle, media, Arc::clone(&clock))
            .with_max_bulk_files(max_bulk_files),
    );

    HttpStatePorts {
        login: accounts.clone(),
        accounts: accounts.clone(),
        profile: accounts,
        projects: project_service.clone(),
        projects_query: project_service,
        photos: photo_service.clone(),
        photos_query: photo_service,
        assets,
        clock,
    }
}

/// Build handler state from the configuration.
///
/// Uses the Diesel repositories when a pool is configured and the in-memory
/// tables otherwise.
///
/// # Errors
/// Propagates asset store construction failures.
pub(crate) fn build_http_state(config: &ServerConfig) -> std::io::Result<HttpState> {
    let settings = &config.settings;
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let assets = build_asset_store(settings, Arc::clone(&clock))?;
    let policy = MediaPolicy::new(settings.max_upload_bytes(), settings.allowed_types());
    let inputs = ServiceInputs {
        assets,
        media: MediaPipeline::new(policy, info_span!("media")),
        clock,
        max_bulk_files: settings.max_bulk_files(),
    };

    let ports = match &config.db_pool {
        Some(pool) => wire_ports(
            Arc::new(DieselUserRepository::new(pool.clone())),
            Arc::new(DieselProjectRepository::new(pool.clone())),
            Arc::new(DieselPhotoRepository::new(pool.clone())),
            inputs,
        ),
        None => {
            info!("no database configured; using in-memory repositories");
            let tables = Arc::new(InMemoryRepository::default());
            wire_ports(Arc::clone(&tables), Arc::clone(&tables), tables, inputs)
        }
    };

    let uploads = UploadLimits::new(settings.max_upload_bytes(), settings.max_bulk_files());
    Ok(HttpState::new(ports, uploads))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightbox::domain::AssetId;
    use lightbox::domain::ports::Transformation;
    use rstest::rstest;

    #[rstest]
    fn memory_backend_is_the_default() {
        let store = build_asset_store(&AppSettings::default(), Arc::new(DefaultClock))
            .expect("memory store");
        let id = AssetId::new("photos/a").expect("asset id");
        assert!(
            store
                .url(&id, &Transformation::ORIGINAL)
                .starts_with("memory://")
        );
    }

    #[rstest]
    fn cloudinary_without_credentials_is_rejected() {
        let settings = AppSettings {
            media_backend: Some("cloudinary".to_owned()),
            ..AppSettings::default()
        };
        let err = build_asset_store(&settings, Arc::new(DefaultClock))
            .err()
            .expect("missing credentials");
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
    }

    #[rstest]
    fn filesystem_backend_opens_the_media_root() {
        let dir = tempfile::tempdir().expect("temp dir");
        let settings = AppSettings {
            media_backend: Some("filesystem".to_owned()),
            media_root: Some(dir.path().to_path_buf()),
            media_base_url: Some("https://cdn.example.test/media".to_owned()),
            ..AppSettings::default()
        };
        let store = build_asset_store(&settings, Arc::new(DefaultClock)).expect("filesystem store");
        let id = AssetId::new("photos/a").expect("asset id");
        assert!(
            store
                .url(&id, &Transformation::ORIGINAL)
                .starts_with("https://cdn.example.test/media")
        );
    }
}
