//! OpenAPI schema definitions for domain types.
//!
//! Domain types do not derive `ToSchema`; these wrappers mirror their wire
//! shape and are registered with utoipa under the domain type's path.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The record does not exist or belongs to someone else.
    #[schema(rename = "not_found")]
    NotFound,
    #[schema(rename = "conflict")]
    Conflict,
    /// Database or asset store unreachable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// Unexpected failure; the message is redacted.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    #[schema(example = "Title cannot be empty")]
    message: String,
    /// Correlation identifier, also sent in the `trace-id` header.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Field-level context such as `{"field": "title", "code": "empty_title"}`.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::CameraInfo`].
#[derive(ToSchema)]
#[schema(as = crate::domain::CameraInfo)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct CameraInfoSchema {
    #[schema(example = "FUJIFILM")]
    make: Option<String>,
    #[schema(example = "X-T5")]
    model: Option<String>,
    lens: Option<String>,
    #[schema(example = "1/250")]
    exposure_time: Option<String>,
    #[schema(example = "f/2.8")]
    f_number: Option<String>,
    #[schema(example = "400")]
    iso: Option<String>,
    focal_length: Option<String>,
    #[schema(example = "2026:03:14 09:30:00")]
    taken_at: Option<String>,
}

/// OpenAPI schema for [`crate::domain::BulkAction`].
#[derive(ToSchema)]
#[schema(as = crate::domain::BulkAction)]
pub enum BulkActionSchema {
    #[schema(rename = "delete")]
    Delete,
    #[schema(rename = "feature")]
    Feature,
    #[schema(rename = "unfeature")]
    Unfeature,
    /// Mark as needing attention.
    #[schema(rename = "flag")]
    Flag,
    #[schema(rename = "unflag")]
    Unflag,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::PartialSchema;

    fn schema_json<T: PartialSchema>() -> String {
        serde_json::to_string(&T::schema()).expect("schema serialises to JSON")
    }

    #[rstest]
    fn error_code_schema_lists_every_code() {
        let json = schema_json::<ErrorCodeSchema>();
        for code in [
            "invalid_request",
            "unauthorized",
            "forbidden",
            "not_found",
            "conflict",
            "service_unavailable",
            "internal_error",
        ] {
            assert!(json.contains(code), "missing {code}");
        }
    }

    #[rstest]
    fn error_schema_uses_wire_field_names() {
        assert_eq!(ErrorSchema::name(), "crate.domain.Error");
        let json = schema_json::<ErrorSchema>();
        assert!(json.contains("traceId"));
        assert!(json.contains("details"));
    }

    #[rstest]
    fn camera_schema_matches_serialised_camera_info() {
        let json = schema_json::<CameraInfoSchema>();
        assert!(json.contains("exposureTime"));
        assert!(json.contains("fNumber"));
    }

    #[rstest]
    fn bulk_action_schema_uses_snake_case() {
        let json = schema_json::<BulkActionSchema>();
        for action in ["delete", "feature", "unfeature", "flag", "unflag"] {
            assert!(json.contains(&format!("\"{action}\"")), "missing {action}");
        }
    }
}
