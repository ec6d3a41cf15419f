//! Tests for the account endpoints.

use actix_web::http::StatusCode;
use actix_web::test;
use rstest::rstest;
use serde_json::{Value, json};

use crate::test_support::app::{
    TEST_PASSWORD, TestHarness, multipart_request, register_request, session_cookie,
};
use crate::test_support::media::{png_bytes, truncated_png};
use crate::test_support::multipart::MultipartBody;

#[actix_web::test]
async fn register_signs_the_new_user_in() {
    let harness = TestHarness::new();
    let app = test::init_service(harness.app()).await;

    let res = test::call_service(&app, register_request("ada").to_request()).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let cookie = session_cookie(&res);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["username"], "ada");
    assert_eq!(body["fullName"], "ada");
    assert_eq!(body["avatarUrl"], Value::Null);

    let profile = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/profile")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(profile.status(), StatusCode::OK);
}

#[actix_web::test]
async fn profile_reports_the_normalised_email() {
    let harness = TestHarness::new();
    let app = test::init_service(harness.app()).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/register")
            .set_json(json!({
                "username": "ada",
                "email": " Ada@Example.COM ",
                "password": TEST_PASSWORD,
                "passwordConfirmation": TEST_PASSWORD,
            }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["email"], "Ada@example.com");
}

#[rstest]
#[case(json!({"username": "ada", "password": "short", "passwordConfirmation": "short"}), "password", "password_too_short")]
#[case(json!({"username": "ada", "password": "longenough", "passwordConfirmation": "different"}), "passwordConfirmation", "password_mismatch")]
#[case(json!({"username": "a b", "password": "longenough", "passwordConfirmation": "longenough"}), "username", "invalid")]
#[case(json!({"username": "ada", "email": "nope", "password": "longenough", "passwordConfirmation": "longenough"}), "email", "invalid")]
#[actix_web::test]
async fn register_reports_the_offending_field(
    #[case] payload: Value,
    #[case] field: &str,
    #[case] code: &str,
) {
    let harness = TestHarness::new();
    let app = test::init_service(harness.app()).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/register")
            .set_json(payload)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["details"]["field"], field);
    assert_eq!(body["details"]["code"], code);
}

#[actix_web::test]
async fn duplicate_username_is_rejected() {
    let harness = TestHarness::new();
    let app = test::init_service(harness.app()).await;
    test::call_service(&app, register_request("ada").to_request()).await;

    let res = test::call_service(&app, register_request("ada").to_request()).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["field"], "username");
}

#[rstest]
#[case("ada", TEST_PASSWORD, StatusCode::OK)]
#[case("ada", "wrong-password", StatusCode::UNAUTHORIZED)]
#[case("grace", TEST_PASSWORD, StatusCode::UNAUTHORIZED)]
#[case("  ", TEST_PASSWORD, StatusCode::BAD_REQUEST)]
#[actix_web::test]
async fn login_checks_credentials(
    #[case] username: &str,
    #[case] password: &str,
    #[case] expected: StatusCode,
) {
    let harness = TestHarness::new();
    let app = test::init_service(harness.app()).await;
    test::call_service(&app, register_request("ada").to_request()).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(json!({ "username": username, "password": password }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), expected);
}

#[actix_web::test]
async fn logout_clears_the_session() {
    let harness = TestHarness::new();
    let app = test::init_service(harness.app()).await;
    let registered = test::call_service(&app, register_request("ada").to_request()).await;
    let cookie = session_cookie(&registered);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/logout")
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert_eq!(session_cookie(&res).value(), "");
}

#[actix_web::test]
async fn profile_requires_a_session() {
    let harness = TestHarness::new();
    let app = test::init_service(harness.app()).await;

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/v1/profile").to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn profile_update_rejects_an_email_in_use() {
    let harness = TestHarness::new();
    let app = test::init_service(harness.app()).await;
    let grace = test::call_service(&app, register_request("grace").to_request()).await;
    let grace_cookie = session_cookie(&grace);
    let ada = test::call_service(&app, register_request("ada").to_request()).await;
    let ada_cookie = session_cookie(&ada);

    let claimed = test::call_service(
        &app,
        test::TestRequest::put()
            .uri("/api/v1/profile")
            .cookie(grace_cookie)
            .set_json(json!({ "firstName": "Grace", "lastName": "Hopper", "email": "g@example.com" }))
            .to_request(),
    )
    .await;
    assert_eq!(claimed.status(), StatusCode::OK);
    let body: Value = test::read_body_json(claimed).await;
    assert_eq!(body["fullName"], "Grace Hopper");

    let res = test::call_service(
        &app,
        test::TestRequest::put()
            .uri("/api/v1/profile")
            .cookie(ada_cookie)
            .set_json(json!({ "email": "G@EXAMPLE.com" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["message"], "This email address is already in use.");
}

#[actix_web::test]
async fn avatar_replacement_deletes_the_previous_asset() {
    let harness = TestHarness::new();
    let app = test::init_service(harness.app()).await;
    let registered = test::call_service(&app, register_request("ada").to_request()).await;
    let cookie = session_cookie(&registered);

    let upload = |bytes: Vec<u8>| {
        multipart_request(
            test::TestRequest::put(),
            "/api/v1/profile/avatar",
            MultipartBody::new().file("image", "me.png", "image/png", bytes),
        )
        .cookie(cookie.clone())
        .to_request()
    };

    let first = test::call_service(&app, upload(png_bytes(32, 32))).await;
    assert_eq!(first.status(), StatusCode::OK);
    let first: Value = test::read_body_json(first).await;
    assert!(
        first["avatarUrl"]
            .as_str()
            .is_some_and(|url| url.contains("c_thumb"))
    );
    assert_eq!(harness.assets.len(), 1);

    let second = test::call_service(&app, upload(png_bytes(16, 16))).await;
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(harness.assets.len(), 1);
    assert_eq!(harness.assets.deleted().len(), 1);
}

#[actix_web::test]
async fn corrupt_avatar_is_rejected_without_storing() {
    let harness = TestHarness::new();
    let app = test::init_service(harness.app()).await;
    let registered = test::call_service(&app, register_request("ada").to_request()).await;
    let cookie = session_cookie(&registered);

    let res = test::call_service(
        &app,
        multipart_request(
            test::TestRequest::put(),
            "/api/v1/profile/avatar",
            MultipartBody::new().file("image", "me.png", "image/png", truncated_png()),
        )
        .cookie(cookie)
        .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(harness.assets.is_empty());
}

#[actix_web::test]
async fn avatar_upload_without_a_file_is_rejected() {
    let harness = TestHarness::new();
    let app = test::init_service(harness.app()).await;
    let registered = test::call_service(&app, register_request("ada").to_request()).await;
    let cookie = session_cookie(&registered);

    let res = test::call_service(
        &app,
        multipart_request(
            test::TestRequest::put(),
            "/api/v1/profile/avatar",
            MultipartBody::new().text("caption", "no file"),
        )
        .cookie(cookie)
        .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["code"], "missing_image");
}

#[actix_web::test]
async fn deleting_the_account_signs_out_and_removes_the_user() {
    let harness = TestHarness::new();
    let app = test::init_service(harness.app()).await;
    let registered = test::call_service(&app, register_request("ada").to_request()).await;
    let cookie = session_cookie(&registered);

    let res = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri("/api/v1/account")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let login = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(json!({ "username": "ada", "password": TEST_PASSWORD }))
            .to_request(),
    )
    .await;
    assert_eq!(login.status(), StatusCode::UNAUTHORIZED);
}
