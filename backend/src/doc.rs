//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every handler under `inbound::http`, the schema
//! wrappers for domain types that do not derive `ToSchema`, and the session
//! cookie security scheme. Swagger UI serves it in debug builds and
//! `cargo run --bin openapi-dump` prints it for external tooling.

use crate::inbound::http::accounts::{
    LoginRequest, ProfileRequest, ProfileResponse, RegisterRequest,
};
use crate::inbound::http::photos_dto::{
    BulkActionRequest, BulkActionResponse, BulkUploadResponse, FailedUploadResponse,
    PhotoEditRequest, PhotoResponse, ReorderRequest, ReorderResponse, UploadedPhotoResponse,
};
use crate::inbound::http::projects::{
    ProjectDetailResponse, ProjectPageResponse, ProjectRequest, ProjectResponse,
};
use crate::inbound::http::schemas::{
    BulkActionSchema, CameraInfoSchema, ErrorCodeSchema, ErrorSchema,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login or /api/v1/register.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Lightbox API",
        description = "Photography projects, photo uploads, and photographer accounts."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::accounts::register,
        crate::inbound::http::accounts::login,
        crate::inbound::http::accounts::logout,
        crate::inbound::http::accounts::get_profile,
        crate::inbound::http::accounts::update_profile,
        crate::inbound::http::accounts::replace_avatar,
        crate::inbound::http::accounts::clear_avatar,
        crate::inbound::http::accounts::delete_account,
        crate::inbound::http::projects::list_projects,
        crate::inbound::http::projects::create_project,
        crate::inbound::http::projects::get_project,
        crate::inbound::http::projects::update_project,
        crate::inbound::http::projects::delete_project,
        crate::inbound::http::projects::replace_cover,
        crate::inbound::http::projects::clear_cover,
        crate::inbound::http::photos::upload_photos,
        crate::inbound::http::photos::bulk_action,
        crate::inbound::http::photos::reorder_photos,
        crate::inbound::http::photos::get_photo,
        crate::inbound::http::photos::edit_photo,
        crate::inbound::http::photos::replace_image,
        crate::inbound::http::photos::delete_photo,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        CameraInfoSchema,
        BulkActionSchema,
        RegisterRequest,
        LoginRequest,
        ProfileRequest,
        ProfileResponse,
        ProjectRequest,
        ProjectResponse,
        ProjectPageResponse,
        ProjectDetailResponse,
        PhotoResponse,
        PhotoEditRequest,
        BulkActionRequest,
        BulkActionResponse,
        ReorderRequest,
        ReorderResponse,
        UploadedPhotoResponse,
        FailedUploadResponse,
        BulkUploadResponse,
    )),
    tags(
        (name = "accounts", description = "Registration, sessions, and profiles"),
        (name = "projects", description = "Photography projects owned by the caller"),
        (name = "photos", description = "Photo uploads and management within projects"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the registered paths and schema field structure.

    use super::*;
    use rstest::rstest;
    use utoipa::OpenApi;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    // Note: utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";

    /// Assert that an Object schema contains a field with the given name.
    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    fn openapi_error_schema_has_required_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get(ERROR_SCHEMA_NAME).expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
        assert_object_schema_has_field(error_schema, "traceId");
    }

    #[rstest]
    fn photo_schema_exposes_rendition_urls() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let photo = schemas.get("PhotoResponse").expect("PhotoResponse schema");

        for field in ["imageUrl", "thumbnailUrl", "galleryUrl", "camera"] {
            assert_object_schema_has_field(photo, field);
        }
    }

    #[rstest]
    #[case("/api/v1/register")]
    #[case("/api/v1/profile/avatar")]
    #[case("/api/v1/projects/{id}/cover")]
    #[case("/api/v1/projects/{id}/photos/bulk")]
    #[case("/api/v1/projects/{id}/photos/reorder")]
    #[case("/api/v1/photos/{id}/image")]
    #[case("/health/ready")]
    fn every_route_is_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[rstest]
    fn session_cookie_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("SessionCookie"));
    }
}
