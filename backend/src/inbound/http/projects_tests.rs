//! Tests for the project endpoints.

use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::test;
use chrono::Duration;
use rstest::rstest;
use serde_json::{Value, json};

use crate::test_support::app::{TestHarness, multipart_request, register_request, session_cookie};
use crate::test_support::clock::{fixture_now, fixture_today};
use crate::test_support::media::png_bytes;
use crate::test_support::multipart::MultipartBody;

fn create(cookie: &Cookie<'static>, payload: Value) -> actix_http::Request {
    test::TestRequest::post()
        .uri("/api/v1/projects")
        .cookie(cookie.clone())
        .set_json(payload)
        .to_request()
}

#[actix_web::test]
async fn create_then_fetch_a_project() {
    let harness = TestHarness::new();
    let app = test::init_service(harness.app()).await;
    let registered = test::call_service(&app, register_request("ada").to_request()).await;
    let cookie = session_cookie(&registered);
    let target = fixture_today() + Duration::days(10);

    let res = test::call_service(
        &app,
        create(
            &cookie,
            json!({ "title": "  Coastal Light ", "description": "Dawn walks", "targetEnd": target }),
        ),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(res).await;
    assert_eq!(created["title"], "Coastal Light");
    assert_eq!(created["startDate"], fixture_today().to_string());
    assert_eq!(created["daysUntilTarget"], 10);
    assert_eq!(created["isOverdue"], false);
    assert_eq!(created["coverUrl"], Value::Null);

    let id = created["id"].as_str().expect("project id");
    let detail = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/projects/{id}"))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(detail.status(), StatusCode::OK);
    let detail: Value = test::read_body_json(detail).await;
    assert_eq!(detail["project"]["id"], id);
    assert_eq!(detail["photos"], json!([]));
}

#[rstest]
#[case(json!({ "title": "   " }), "title", "empty_title")]
#[case(json!({ "title": "x".repeat(201) }), "title", "title_too_long")]
#[case(json!({ "title": "Dunes", "targetEnd": "2026-03-13" }), "targetEnd", "target_end_in_past")]
#[actix_web::test]
async fn invalid_project_forms_name_the_field(
    #[case] payload: Value,
    #[case] field: &str,
    #[case] code: &str,
) {
    let harness = TestHarness::new();
    let app = test::init_service(harness.app()).await;
    let registered = test::call_service(&app, register_request("ada").to_request()).await;
    let cookie = session_cookie(&registered);

    let res = test::call_service(&app, create(&cookie, payload)).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["field"], field);
    assert_eq!(body["details"]["code"], code);
}

#[actix_web::test]
async fn overdue_projects_report_negative_days() {
    let harness = TestHarness::new();
    let app = test::init_service(harness.app()).await;
    let registered = test::call_service(&app, register_request("ada").to_request()).await;
    let cookie = session_cookie(&registered);
    let created = test::call_service(
        &app,
        create(&cookie, json!({ "title": "Dunes", "targetEnd": fixture_today() })),
    )
    .await;
    let created: Value = test::read_body_json(created).await;
    let id = created["id"].as_str().expect("project id").to_owned();

    harness.clock.set(fixture_now() + Duration::days(3));
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/projects/{id}"))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["project"]["isOverdue"], true);
    assert_eq!(body["project"]["daysUntilTarget"], -3);
}

#[rstest]
#[case("", 1)]
#[case("?page=2", 2)]
#[case("?page=99", 2)]
#[case("?page=abc", 1)]
#[case("?page=0", 1)]
#[actix_web::test]
async fn listing_pages_are_lenient(#[case] query: &str, #[case] expected_page: u64) {
    let harness = TestHarness::new();
    let app = test::init_service(harness.app()).await;
    let registered = test::call_service(&app, register_request("ada").to_request()).await;
    let cookie = session_cookie(&registered);
    for n in 0..12 {
        harness.clock.set(fixture_now() + Duration::minutes(n));
        let res = test::call_service(&app, create(&cookie, json!({ "title": format!("P{n}") }))).await;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/projects{query}"))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["total"], 12);
    assert_eq!(body["totalPages"], 2);
    assert_eq!(body["perPage"], 10);
    assert_eq!(body["page"], expected_page);
    let expected_len = if expected_page == 1 { 10 } else { 2 };
    assert_eq!(
        body["projects"].as_array().map(Vec::len),
        Some(expected_len)
    );
}

#[actix_web::test]
async fn listing_is_newest_first_and_owner_scoped() {
    let harness = TestHarness::new();
    let app = test::init_service(harness.app()).await;
    let ada = test::call_service(&app, register_request("ada").to_request()).await;
    let ada = session_cookie(&ada);
    let grace = test::call_service(&app, register_request("grace").to_request()).await;
    let grace = session_cookie(&grace);

    test::call_service(&app, create(&ada, json!({ "title": "Older" }))).await;
    harness.clock.set(fixture_now() + Duration::hours(1));
    test::call_service(&app, create(&ada, json!({ "title": "Newer" }))).await;
    test::call_service(&app, create(&grace, json!({ "title": "Hers" }))).await;

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/projects")
            .cookie(ada)
            .to_request(),
    )
    .await;

    let body: Value = test::read_body_json(res).await;
    let titles: Vec<&str> = body["projects"]
        .as_array()
        .expect("projects array")
        .iter()
        .filter_map(|project| project["title"].as_str())
        .collect();
    assert_eq!(titles, ["Newer", "Older"]);
}

#[actix_web::test]
async fn another_users_project_is_not_found() {
    let harness = TestHarness::new();
    let app = test::init_service(harness.app()).await;
    let ada = test::call_service(&app, register_request("ada").to_request()).await;
    let ada = session_cookie(&ada);
    let grace = test::call_service(&app, register_request("grace").to_request()).await;
    let grace = session_cookie(&grace);
    let created = test::call_service(&app, create(&ada, json!({ "title": "Private" }))).await;
    let created: Value = test::read_body_json(created).await;
    let uri = format!("/api/v1/projects/{}", created["id"].as_str().expect("id"));

    let get = test::call_service(
        &app,
        test::TestRequest::get().uri(&uri).cookie(grace.clone()).to_request(),
    )
    .await;
    assert_eq!(get.status(), StatusCode::NOT_FOUND);

    let put = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&uri)
            .cookie(grace.clone())
            .set_json(json!({ "title": "Mine now" }))
            .to_request(),
    )
    .await;
    assert_eq!(put.status(), StatusCode::NOT_FOUND);

    let delete = test::call_service(
        &app,
        test::TestRequest::delete().uri(&uri).cookie(grace).to_request(),
    )
    .await;
    assert_eq!(delete.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn update_replaces_every_field() {
    let harness = TestHarness::new();
    let app = test::init_service(harness.app()).await;
    let registered = test::call_service(&app, register_request("ada").to_request()).await;
    let cookie = session_cookie(&registered);
    let created = test::call_service(
        &app,
        create(
            &cookie,
            json!({ "title": "Draft", "description": "notes", "targetEnd": fixture_today() }),
        ),
    )
    .await;
    let created: Value = test::read_body_json(created).await;

    harness.clock.set(fixture_now() + Duration::minutes(5));
    let res = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/v1/projects/{}", created["id"].as_str().expect("id")))
            .cookie(cookie)
            .set_json(json!({ "title": "Final" }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["title"], "Final");
    assert_eq!(body["description"], "");
    assert_eq!(body["targetEnd"], Value::Null);
    assert_eq!(body["createdAt"], created["createdAt"]);
    assert_ne!(body["updatedAt"], created["updatedAt"]);
}

#[actix_web::test]
async fn cover_can_be_set_replaced_and_cleared() {
    let harness = TestHarness::new();
    let app = test::init_service(harness.app()).await;
    let registered = test::call_service(&app, register_request("ada").to_request()).await;
    let cookie = session_cookie(&registered);
    let created = test::call_service(&app, create(&cookie, json!({ "title": "Covers" }))).await;
    let created: Value = test::read_body_json(created).await;
    let uri = format!("/api/v1/projects/{}/cover", created["id"].as_str().expect("id"));
    let upload = || {
        multipart_request(
            test::TestRequest::put(),
            &uri,
            MultipartBody::new().file("image", "cover.png", "image/png", png_bytes(40, 21)),
        )
        .cookie(cookie.clone())
        .to_request()
    };

    let first = test::call_service(&app, upload()).await;
    assert_eq!(first.status(), StatusCode::OK);
    let first: Value = test::read_body_json(first).await;
    assert!(
        first["coverUrl"]
            .as_str()
            .is_some_and(|url| url.contains("c_fill,w_1200,h_630"))
    );

    let second = test::call_service(&app, upload()).await;
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(harness.assets.deleted().len(), 1);

    let cleared = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&uri)
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(cleared.status(), StatusCode::OK);
    let cleared: Value = test::read_body_json(cleared).await;
    assert_eq!(cleared["coverUrl"], Value::Null);
    assert!(harness.assets.is_empty());
}

#[actix_web::test]
async fn deleting_a_project_releases_its_assets() {
    let harness = TestHarness::new();
    let app = test::init_service(harness.app()).await;
    let registered = test::call_service(&app, register_request("ada").to_request()).await;
    let cookie = session_cookie(&registered);
    let created = test::call_service(&app, create(&cookie, json!({ "title": "Doomed" }))).await;
    let created: Value = test::read_body_json(created).await;
    let id = created["id"].as_str().expect("id");

    let photo = test::call_service(
        &app,
        multipart_request(
            test::TestRequest::post(),
            &format!("/api/v1/projects/{id}/photos"),
            MultipartBody::new().file("image", "a.png", "image/png", png_bytes(8, 8)),
        )
        .cookie(cookie.clone())
        .to_request(),
    )
    .await;
    assert_eq!(photo.status(), StatusCode::CREATED);
    let cover = test::call_service(
        &app,
        multipart_request(
            test::TestRequest::put(),
            &format!("/api/v1/projects/{id}/cover"),
            MultipartBody::new().file("image", "c.png", "image/png", png_bytes(8, 8)),
        )
        .cookie(cookie.clone())
        .to_request(),
    )
    .await;
    assert_eq!(cover.status(), StatusCode::OK);
    assert_eq!(harness.assets.len(), 2);

    let res = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/v1/projects/{id}"))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert!(harness.assets.is_empty());
    assert_eq!(harness.repository.photo_count(), 0);
}

#[actix_web::test]
async fn project_routes_require_a_session() {
    let harness = TestHarness::new();
    let app = test::init_service(harness.app()).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/projects")
            .set_json(json!({ "title": "Nope" }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
