//! Tests for HTTP error mapping.

use super::*;
use actix_web::body::to_bytes;
use actix_web::{App, test as actix_test};
use rstest::rstest;
use serde::Deserialize;
use serde_json::Value;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

async fn rendered(error: &Error) -> (StatusCode, Option<String>, Error) {
    let response = ResponseError::error_response(error);
    let status = response.status();
    let header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let bytes = to_bytes(response.into_body()).await.expect("body");
    let payload = serde_json::from_slice(&bytes).expect("error envelope");
    (status, header, payload)
}

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("login required"), StatusCode::UNAUTHORIZED)]
#[case(Error::forbidden("denied"), StatusCode::FORBIDDEN)]
#[case(Error::not_found("Project not found"), StatusCode::NOT_FOUND)]
#[case(Error::conflict("stale"), StatusCode::CONFLICT)]
#[case(
    Error::service_unavailable("asset store down"),
    StatusCode::SERVICE_UNAVAILABLE
)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_follows_the_error_code(#[case] error: Error, #[case] expected: StatusCode) {
    assert_eq!(ResponseError::status_code(&error), expected);
}

#[actix_web::test]
async fn internal_errors_are_redacted_but_keep_the_trace_id() {
    let error = Error::internal("photo repository error: relation missing")
        .with_trace_id(TRACE_ID)
        .with_details(json!({ "sql": "select" }));

    let (status, header, payload) = rendered(&error).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(header.as_deref(), Some(TRACE_ID));
    assert_eq!(payload.message(), "Internal server error");
    assert_eq!(payload.trace_id(), Some(TRACE_ID));
    assert!(payload.details().is_none());
}

#[actix_web::test]
async fn validation_errors_keep_their_field_details() {
    let error = Error::invalid_request("Title cannot be empty")
        .with_details(json!({ "field": "title", "code": "empty_title" }));

    let (status, header, payload) = rendered(&error).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(header.is_none());
    assert_eq!(payload.message(), "Title cannot be empty");
    assert_eq!(
        payload.details(),
        Some(&json!({ "field": "title", "code": "empty_title" }))
    );
}

#[rstest]
fn actix_errors_become_opaque_internal_errors() {
    let err: Error = actix_web::error::ErrorBadRequest("boom").into();
    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(err.message(), "Internal server error");
}

#[rstest]
fn multipart_errors_are_client_errors() {
    let err: Error = MultipartError::Incomplete.into();
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.details(), Some(&json!({ "code": "malformed_multipart" })));
}

#[derive(Deserialize)]
struct Echo {
    #[expect(dead_code, reason = "only deserialised to exercise the extractor")]
    title: String,
}

#[actix_web::test]
async fn malformed_json_uses_the_error_envelope() {
    let app = actix_test::init_service(App::new().app_data(json_config()).route(
        "/",
        web::post().to(|_: web::Json<Echo>| async { HttpResponse::Ok().finish() }),
    ))
    .await;

    let request = actix_test::TestRequest::post()
        .uri("/")
        .insert_header(("content-type", "application/json"))
        .set_payload("{\"title\": 3")
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["details"]["code"], "invalid_json");
}
