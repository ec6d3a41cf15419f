//! Whole-application harness over the in-memory adapters.
//!
//! [`TestHarness`] wires the real domain services to
//! [`InMemoryRepository`], [`InMemoryAssetStore`], and a [`FixtureClock`],
//! then exposes an actix `App` with the production route table. Tests keep
//! handles on the adapters to inspect rows and asset deletions.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, test, web};
use mockable::Clock;
use serde_json::json;
use tracing::Span;

use crate::Trace;
use crate::domain::media::{DEFAULT_ALLOWED_TYPES, MediaPipeline, MediaPolicy};
use crate::domain::ports::DEFAULT_MAX_BULK_FILES;
use crate::domain::{AccountService, AssetLifecycle, PhotoService, ProjectService};
use crate::inbound::http::multipart::UploadLimits;
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::memory::{InMemoryAssetStore, InMemoryRepository};
use crate::outbound::security::Argon2PasswordHasher;
use crate::test_support::clock::FixtureClock;
use crate::test_support::multipart::MultipartBody;

/// Password used by [`register_request`].
pub const TEST_PASSWORD: &str = "correct-horse";

/// Session middleware with a throwaway key and an insecure `session` cookie.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Services and adapters behind one test application.
pub struct TestHarness {
    pub repository: Arc<InMemoryRepository>,
    pub assets: Arc<InMemoryAssetStore>,
    pub clock: Arc<FixtureClock>,
    pub state: HttpState,
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::with_limits(UploadLimits::new(
            crate::domain::media::DEFAULT_MAX_UPLOAD_BYTES,
            DEFAULT_MAX_BULK_FILES,
        ))
    }
}

impl TestHarness {
    pub fn new() -> Self {
        Self::default()
    }

    /// Harness whose media policy and bulk cap follow `limits`.
    pub fn with_limits(limits: UploadLimits) -> Self {
        let repository = Arc::new(InMemoryRepository::default());
        let assets = Arc::new(InMemoryAssetStore::new());
        let clock = Arc::new(FixtureClock::default());
        let dyn_clock: Arc<dyn Clock> = clock.clone();

        let policy = MediaPolicy::new(
            limits.max_file_bytes(),
            DEFAULT_ALLOWED_TYPES.iter().map(|ty| (*ty).to_owned()),
        );
        let media = MediaPipeline::new(policy, Span::none());
        let lifecycle = AssetLifecycle::new(Arc::clone(&assets), Span::none());

        let accounts = Arc::new(AccountService::new(
            Arc::clone(&repository),
            Arc::new(Argon2PasswordHasher::new()),
            lifecycle.clone(),
            media.clone(),
            Arc::clone(&dyn_clock),
        ));
        let projects = Arc::new(ProjectService::new(
            Arc::clone(&repository),
            Arc::clone(&repository),
            lifecycle.clone(),
            media.clone(),
            Arc::clone(&dyn_clock),
        ));
        let photos = Arc::new(
            PhotoService::new(
                Arc::clone(&repository),
                Arc::clone(&repository),
                lifecycle,
                media,
                Arc::clone(&dyn_clock),
            )
            .with_max_bulk_files(limits.max_files()),
        );

        let state = HttpState::new(
            HttpStatePorts {
                login: accounts.clone(),
                accounts: accounts.clone(),
                profile: accounts,
                projects: projects.clone(),
                projects_query: projects,
                photos: photos.clone(),
                photos_query: photos,
                assets: assets.clone(),
                clock: dyn_clock,
            },
            limits,
        );

        Self {
            repository,
            assets,
            clock,
            state,
        }
    }

    /// The production route table with tracing and a test session.
    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        App::new()
            .app_data(web::Data::new(self.state.clone()))
            .wrap(test_session_middleware())
            .wrap(Trace)
            .configure(crate::inbound::http::configure)
    }
}

/// `POST /api/v1/register` for `username` with [`TEST_PASSWORD`].
pub fn register_request(username: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/v1/register")
        .set_json(json!({
            "username": username,
            "password": TEST_PASSWORD,
            "passwordConfirmation": TEST_PASSWORD,
        }))
}

/// The `session` cookie set on `response`.
///
/// # Panics
///
/// Panics when the response did not set one.
pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("response sets a session cookie")
}

/// Multipart request carrying `body` to `uri` with the given method.
pub fn multipart_request(
    request: test::TestRequest,
    uri: &str,
    body: MultipartBody,
) -> test::TestRequest {
    let (content_type, payload) = body.finish();
    request
        .uri(uri)
        .insert_header(("content-type", content_type))
        .set_payload(payload)
}
