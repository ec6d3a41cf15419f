//! HTTP inbound adapter exposing REST endpoints.
//!
//! Every JSON route lives under `/api/v1` and is registered by
//! [`configure`]; the health probes sit at the root and are mounted by the
//! server alongside their [`health::HealthState`].

use actix_web::web;

pub mod accounts;
pub mod error;
pub mod health;
pub mod multipart;
pub mod photos;
pub mod photos_dto;
pub mod projects;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;

pub use error::ApiResult;

/// Register the `/api/v1` scope and its extractor configuration.
///
/// Callers supply [`state::HttpState`] as `web::Data` and wrap the app in a
/// session middleware.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(error::json_config())
        .app_data(error::query_config())
        .service(
            web::scope("/api/v1")
                .service(accounts::register)
                .service(accounts::login)
                .service(accounts::logout)
                .service(accounts::get_profile)
                .service(accounts::update_profile)
                .service(accounts::replace_avatar)
                .service(accounts::clear_avatar)
                .service(accounts::delete_account)
                .service(projects::list_projects)
                .service(projects::create_project)
                .service(projects::get_project)
                .service(projects::update_project)
                .service(projects::delete_project)
                .service(projects::replace_cover)
                .service(projects::clear_cover)
                .service(photos::upload_photos)
                .service(photos::bulk_action)
                .service(photos::reorder_photos)
                .service(photos::get_photo)
                .service(photos::edit_photo)
                .service(photos::replace_image)
                .service(photos::delete_photo),
        );
}
