//! End-to-end workflow over the in-memory adapters.
//!
//! A photographer signs up, builds a project, fills it with photos, curates
//! them, and finally removes everything. Every asset written along the way
//! must be released by the end.

use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::test;
use lightbox::domain::TRACE_ID_HEADER;
use lightbox::test_support::app::{
    TestHarness, multipart_request, register_request, session_cookie,
};
use lightbox::test_support::media::{jpeg_with_camera_exif, png_bytes};
use lightbox::test_support::multipart::MultipartBody;
use rstest::rstest;
use serde_json::{Value, json};

fn get(uri: &str, cookie: &Cookie<'static>) -> actix_http::Request {
    test::TestRequest::get()
        .uri(uri)
        .cookie(cookie.clone())
        .to_request()
}

#[actix_web::test]
async fn project_lifecycle_releases_every_asset() {
    let harness = TestHarness::new();
    let app = test::init_service(harness.app()).await;

    let registered = test::call_service(&app, register_request("ada").to_request()).await;
    assert_eq!(registered.status(), StatusCode::CREATED);
    let cookie = session_cookie(&registered);

    let avatar = test::call_service(
        &app,
        multipart_request(
            test::TestRequest::put(),
            "/api/v1/profile/avatar",
            MultipartBody::new().file("image", "me.png", "image/png", png_bytes(20, 20)),
        )
        .cookie(cookie.clone())
        .to_request(),
    )
    .await;
    assert_eq!(avatar.status(), StatusCode::OK);

    let project = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/projects")
            .cookie(cookie.clone())
            .set_json(json!({ "title": "Night Market", "description": "Neon and steam" }))
            .to_request(),
    )
    .await;
    assert_eq!(project.status(), StatusCode::CREATED);
    let project: Value = test::read_body_json(project).await;
    let project_id = project["id"].as_str().expect("project id").to_owned();
    let project_uri = format!("/api/v1/projects/{project_id}");

    let cover = test::call_service(
        &app,
        multipart_request(
            test::TestRequest::put(),
            &format!("{project_uri}/cover"),
            MultipartBody::new().file("image", "cover.png", "image/png", png_bytes(60, 32)),
        )
        .cookie(cookie.clone())
        .to_request(),
    )
    .await;
    assert_eq!(cover.status(), StatusCode::OK);

    let bulk = test::call_service(
        &app,
        multipart_request(
            test::TestRequest::post(),
            &format!("{project_uri}/photos"),
            MultipartBody::new()
                .file(
                    "photos",
                    "stall_one.jpg",
                    "image/jpeg",
                    jpeg_with_camera_exif("SONY", "ILCE-7M4"),
                )
                .file("photos", "stall_two.png", "image/png", png_bytes(48, 32))
                .file("photos", "stall_three.png", "image/png", png_bytes(32, 48)),
        )
        .cookie(cookie.clone())
        .to_request(),
    )
    .await;
    assert_eq!(bulk.status(), StatusCode::OK);
    let bulk: Value = test::read_body_json(bulk).await;
    assert_eq!(bulk["totalSuccess"], 3);
    assert_eq!(bulk["totalFailed"], 0);
    assert_eq!(harness.assets.len(), 5);

    let detail = test::call_service(&app, get(&project_uri, &cookie)).await;
    let detail: Value = test::read_body_json(detail).await;
    let photo_ids: Vec<String> = detail["photos"]
        .as_array()
        .expect("photos")
        .iter()
        .filter_map(|photo| photo["id"].as_str().map(str::to_owned))
        .collect();
    assert_eq!(photo_ids.len(), 3);
    assert_eq!(detail["photos"][0]["camera"]["model"], "ILCE-7M4");

    let featured = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("{project_uri}/photos/bulk"))
            .cookie(cookie.clone())
            .set_json(json!({ "action": "feature", "photoIds": [photo_ids[2]] }))
            .to_request(),
    )
    .await;
    let featured: Value = test::read_body_json(featured).await;
    assert_eq!(featured["message"], "Marked 1 photo as featured.");

    let reordered = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("{project_uri}/photos/reorder"))
            .cookie(cookie.clone())
            .set_json(json!({ "photoIds": [photo_ids[2], photo_ids[0], photo_ids[1]] }))
            .to_request(),
    )
    .await;
    assert_eq!(reordered.status(), StatusCode::OK);

    let detail = test::call_service(&app, get(&project_uri, &cookie)).await;
    let detail: Value = test::read_body_json(detail).await;
    assert_eq!(detail["photos"][0]["id"], photo_ids[2].as_str());
    assert_eq!(detail["photos"][0]["featured"], true);

    let deleted = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&project_uri)
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);
    assert_eq!(harness.repository.photo_count(), 0);
    assert_eq!(harness.assets.len(), 1);

    let account = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri("/api/v1/account")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(account.status(), StatusCode::NO_CONTENT);
    assert!(harness.assets.is_empty());
    assert_eq!(harness.assets.deleted().len(), 5);
}

#[actix_web::test]
async fn account_deletion_cascades_through_projects() {
    let harness = TestHarness::new();
    let app = test::init_service(harness.app()).await;
    let registered = test::call_service(&app, register_request("grace").to_request()).await;
    let cookie = session_cookie(&registered);

    for title in ["Fog", "Rain"] {
        let created = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/projects")
                .cookie(cookie.clone())
                .set_json(json!({ "title": title }))
                .to_request(),
        )
        .await;
        let created: Value = test::read_body_json(created).await;
        let uploaded = test::call_service(
            &app,
            multipart_request(
                test::TestRequest::post(),
                &format!(
                    "/api/v1/projects/{}/photos",
                    created["id"].as_str().expect("id")
                ),
                MultipartBody::new().file("image", "x.png", "image/png", png_bytes(8, 8)),
            )
            .cookie(cookie.clone())
            .to_request(),
        )
        .await;
        assert_eq!(uploaded.status(), StatusCode::CREATED);
    }
    assert_eq!(harness.assets.len(), 2);

    let res = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri("/api/v1/account")
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert_eq!(harness.repository.photo_count(), 0);
    assert!(harness.assets.is_empty());
}

#[rstest]
#[case("GET", "/api/v1/projects")]
#[case("GET", "/api/v1/profile")]
#[case("DELETE", "/api/v1/account")]
#[case("GET", "/api/v1/photos/6f8f8f8e-1d2b-4c3a-9b8a-0a1b2c3d4e5f")]
#[actix_web::test]
async fn anonymous_requests_are_unauthorised(#[case] method: &str, #[case] uri: &str) {
    let harness = TestHarness::new();
    let app = test::init_service(harness.app()).await;
    let method = actix_web::http::Method::from_bytes(method.as_bytes()).expect("method");

    let res = test::call_service(
        &app,
        test::TestRequest::default()
            .method(method)
            .uri(uri)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.headers().contains_key(TRACE_ID_HEADER));
    let body: Value = test::read_body_json(res).await;
    insta::allow_duplicates! {
        insta::assert_json_snapshot!(body, { ".traceId" => "[trace_id]" }, @r###"
        {
          "code": "unauthorized",
          "message": "login required",
          "traceId": "[trace_id]"
        }
        "###);
    }
}

#[actix_web::test]
async fn malformed_json_is_an_invalid_request() {
    let harness = TestHarness::new();
    let app = test::init_service(harness.app()).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/login")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], "invalid_request");
}
