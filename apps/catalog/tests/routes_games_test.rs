mod common;
mod support;

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use catalog::middleware::RequestTrace;
use catalog::routes;
use catalog::state::app_state::AppState;
use catalog::storage::StoreOpKind;
use common::assert_problem;
use serde_json::{json, Value};
use support::{memory_harness, MemoryHarness};

fn state_for(h: &MemoryHarness) -> AppState {
    AppState::new(Arc::new(h.repo.clone()), Arc::new(h.store.clone()))
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .wrap(RequestTrace)
                .app_data(web::Data::new($state))
                .configure(routes::configure),
        )
        .await
    };
}

fn nova_body() -> Value {
    json!({
        "title": "Nova",
        "description": "A space game",
        "release_date": { "year": 2020, "month": 5, "day": 1 },
        "tags": ["A", "B"],
        "genres": ["X"],
        "cover": STANDARD.encode(b"cover bytes"),
    })
}

#[actix_web::test]
async fn create_then_read_game() {
    let h = memory_harness();
    let app = app!(state_for(&h));

    let req = test::TestRequest::post()
        .uri("/api/games")
        .set_json(nova_body())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert!(resp.headers().contains_key("x-request-id"));
    let created: Value = test::read_body_json(resp).await;
    let id = created["id"].as_i64().expect("id");
    assert!(created.get("image_error").is_none());

    let req = test::TestRequest::get()
        .uri(&format!("/api/games/{id}"))
        .to_request();
    let game: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(game["title"], "Nova");
    assert_eq!(game["status"], "DRAFT");
    assert_eq!(game["tags"].as_array().map(Vec::len), Some(2));
    assert_eq!(game["genres"][0]["name"], "X");

    let req = test::TestRequest::get()
        .uri(&format!("/api/games/{id}/cover"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert_eq!(&body[..], b"cover bytes");
}

#[actix_web::test]
async fn failed_cover_upload_still_creates() {
    let h = memory_harness();
    h.store.inject_failure(StoreOpKind::Save);
    let app = app!(state_for(&h));

    let req = test::TestRequest::post()
        .uri("/api/games")
        .set_json(nova_body())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    assert!(created["image_error"].as_str().is_some());
    assert_eq!(h.repo.game_count(), 1);
}

#[actix_web::test]
async fn duplicate_is_conflict() {
    let h = memory_harness();
    let app = app!(state_for(&h));

    for expected in [StatusCode::CREATED, StatusCode::CONFLICT] {
        let req = test::TestRequest::post()
            .uri("/api/games")
            .set_json(nova_body())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), expected);
        if expected == StatusCode::CONFLICT {
            let body: Value = test::read_body_json(resp).await;
            assert_problem(&body, 409, "GAME_ALREADY_EXISTS");
        }
    }
}

#[actix_web::test]
async fn unknown_tag_is_bad_request() {
    let h = memory_harness();
    let app = app!(state_for(&h));

    let mut body = nova_body();
    body["tags"] = json!(["A", "nope"]);
    let req = test::TestRequest::post()
        .uri("/api/games")
        .set_json(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_problem(&body, 400, "TAG_NOT_FOUND");
    assert_eq!(h.repo.game_count(), 0);
    assert!(h.store.keys().is_empty());
}

#[actix_web::test]
async fn invalid_input_maps_to_validation_codes() {
    let h = memory_harness();
    let app = app!(state_for(&h));

    let mut body = nova_body();
    body["title"] = json!("   ");
    let req = test::TestRequest::post()
        .uri("/api/games")
        .set_json(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_problem(&body, 400, "MISSING_TITLE");

    let mut body = nova_body();
    body["release_date"] = json!({ "year": 2021, "month": 2, "day": 30 });
    let req = test::TestRequest::post()
        .uri("/api/games")
        .set_json(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    assert_problem(&body, 400, "INVALID_RELEASE_DATE");

    let req = test::TestRequest::get().uri("/api/games/0").to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    assert_problem(&body, 400, "INVALID_GAME_ID");
}

#[actix_web::test]
async fn status_updates_follow_the_state_machine() {
    let h = memory_harness();
    let app = app!(state_for(&h));
    let req = test::TestRequest::post()
        .uri("/api/games")
        .set_json(nova_body())
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let id = created["id"].as_i64().expect("id");
    let uri = format!("/api/games/{id}/status");

    let put = |status: &str| {
        test::TestRequest::put()
            .uri(&uri)
            .set_json(json!({ "status": status }))
            .to_request()
    };

    let resp = test::call_service(&app, put("PUBLISH")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_problem(&body, 400, "ILLEGAL_STATUS_TRANSITION");

    let resp = test::call_service(&app, put("ARCHIVED")).await;
    let body: Value = test::read_body_json(resp).await;
    assert_problem(&body, 400, "UNKNOWN_STATUS");

    let resp = test::call_service(&app, put("PENDING")).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let resp = test::call_service(&app, put("PUBLISH")).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get().uri("/api/games").to_request();
    let listed: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
    assert_eq!(listed[0]["title"], "Nova");
}

#[actix_web::test]
async fn listing_applies_query_filters() {
    let h = memory_harness();
    let app = app!(state_for(&h));
    for (title, year, tags) in [
        ("Alpha", 2020, vec!["A"]),
        ("Beta", 2021, vec!["A"]),
        ("Gamma", 2020, vec!["C"]),
    ] {
        let body = json!({
            "title": title,
            "description": "d",
            "release_date": { "year": year, "month": 1, "day": 1 },
            "tags": tags,
            "genres": ["X"],
        });
        let req = test::TestRequest::post()
            .uri("/api/games")
            .set_json(body)
            .to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;
        let id = created["id"].as_i64().expect("id");
        for status in ["PENDING", "PUBLISH"] {
            let req = test::TestRequest::put()
                .uri(&format!("/api/games/{id}/status"))
                .set_json(json!({ "status": status }))
                .to_request();
            assert!(test::call_service(&app, req).await.status().is_success());
        }
    }

    let req = test::TestRequest::get()
        .uri("/api/games?year=2020&tags=A,B")
        .to_request();
    let listed: Value = test::call_and_read_body_json(&app, req).await;
    let titles: Vec<_> = listed
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|g| g["title"].as_str())
        .collect();
    assert_eq!(titles, vec!["Alpha"]);

    let req = test::TestRequest::get().uri("/api/games?limit=2").to_request();
    let listed: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(2));
}

#[actix_web::test]
async fn delete_game_and_missing_game() {
    let h = memory_harness();
    let app = app!(state_for(&h));
    let req = test::TestRequest::post()
        .uri("/api/games")
        .set_json(nova_body())
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let id = created["id"].as_i64().expect("id");

    let req = test::TestRequest::delete()
        .uri(&format!("/api/games/{id}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["id"].as_i64(), Some(id));
    assert_eq!(h.store.count(StoreOpKind::Delete), 1);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/games/{id}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_problem(&body, 404, "GAME_NOT_FOUND");
}

#[actix_web::test]
async fn problem_trace_id_matches_request_header() {
    let h = memory_harness();
    let app = app!(state_for(&h));

    let req = test::TestRequest::get().uri("/api/games/77").to_request();
    let resp = test::call_service(&app, req).await;
    let header = resp
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .expect("x-request-id header");
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["trace_id"].as_str(), Some(header.as_str()));
}

#[actix_web::test]
async fn health_without_database() {
    let h = memory_harness();
    let app = app!(state_for(&h));

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["db"], "none");
    assert_eq!(body["migrations"], "n/a");
}
