use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::search::{SearchIndexRecord, SearchResponse};
use crate::server::router;
use crate::tests::{lazy_state, lazy_state_with, unreachable_membership, FakeIndex};

async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn record(id: &str, name: &str) -> SearchIndexRecord {
    SearchIndexRecord {
        object_id: id.to_string(),
        name: name.to_string(),
        url: format!("https://example.org/{name}"),
        category: "Books".to_string(),
        languages: vec!["Python".to_string()],
        paid: false,
        notes: None,
    }
}

#[tokio::test]
async fn search_forwards_filters_and_zero_based_page() {
    let index = Arc::new(FakeIndex::answering(SearchResponse {
        hits: vec![record("1", "automate"), record("2", "fluent")],
        page: 0,
        nb_pages: 1,
        hits_per_page: 5,
        nb_hits: 2,
    }));
    let app = router::build(lazy_state(index.clone(), true));

    let (status, body) = call(
        app,
        get("/search?q=boring&languages=Python&languages=Go&paid=false&page_size=5"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let queries = index.queries.lock().unwrap().clone();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].query, "boring");
    assert_eq!(queries[0].page, 0);
    assert_eq!(queries[0].hits_per_page, 5);
    assert_eq!(
        queries[0].filters,
        "paid=0 AND (languages:Python OR languages:Go)"
    );
    assert_eq!(body["apiVersion"], "1.0");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["data"][0]["id"], 1);
    assert_eq!(body["data"][1]["name"], "fluent");
    assert_eq!(
        body["pagination_details"],
        json!({"page": 0, "number_of_pages": 1, "records_per_page": 5, "total_count": 2})
    );
}

#[tokio::test]
async fn search_skips_foreign_hits() {
    let index = Arc::new(FakeIndex::answering(SearchResponse {
        hits: vec![record("not-a-number", "stray"), record("7", "kept")],
        page: 0,
        nb_pages: 1,
        hits_per_page: 20,
        nb_hits: 2,
    }));
    let app = router::build(lazy_state(index, true));

    let (status, body) = call(app, get("/search?q=x")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["id"], 7);
}

#[tokio::test]
async fn search_past_last_page_is_not_found() {
    let index = Arc::new(FakeIndex::answering(SearchResponse {
        hits: vec![],
        page: 3,
        nb_pages: 2,
        hits_per_page: 20,
        nb_hits: 25,
    }));
    let app = router::build(lazy_state(index, true));

    let (status, body) = call(app, get("/search?q=x&page=3")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "not found");
    assert_eq!(body["errors"][0]["code"], "not-found");
}

#[tokio::test]
async fn search_with_index_down_is_internal_error() {
    let app = router::build(lazy_state(Arc::new(FakeIndex::unavailable()), true));

    let (status, body) = call(app, get("/search?q=x")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["errors"][0]["code"], "internal-server-error");
    assert_eq!(body["errors"][0]["status"], 500);
}

#[tokio::test]
async fn negative_search_page_is_unprocessable() {
    let index = Arc::new(FakeIndex::default());
    let app = router::build(lazy_state(index.clone(), true));

    let (status, body) = call(app, get("/search?q=x&page=-1")).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"][0]["code"], "unprocessable-entity");
    assert!(index.queries.lock().unwrap().is_empty());
}

#[tokio::test]
async fn create_without_api_key_is_unauthorized() {
    let app = router::build(lazy_state(Arc::new(FakeIndex::default()), true));

    let (status, body) = call(
        app,
        post_json(
            "/resources",
            json!({"name": "n", "url": "https://n.org", "category": "c", "paid": false}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["errors"][0]["code"], "invalid-credentials");
}

#[tokio::test]
async fn future_updated_after_is_unprocessable() {
    let app = router::build(lazy_state(Arc::new(FakeIndex::default()), true));

    let (status, body) = call(app, get("/resources?updated_after=12-31-2999")).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"][0]["code"], "unprocessable-entity");
}

#[tokio::test]
async fn non_integer_id_is_not_found() {
    let app = router::build(lazy_state(Arc::new(FakeIndex::default()), true));

    let (status, body) = call(app, get("/resources/abc")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["errors"][0]["code"], "not-found");
}

#[tokio::test]
async fn zero_page_size_is_unprocessable() {
    let app = router::build(lazy_state(Arc::new(FakeIndex::default()), true));

    let (status, _) = call(app, get("/languages?page_size=0")).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn unknown_route_uses_error_envelope() {
    let app = router::build(lazy_state(Arc::new(FakeIndex::default()), true));

    let (status, body) = call(app, get("/nowhere")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["apiVersion"], "1.0");
}

#[tokio::test]
async fn api_key_for_non_member_is_unauthorized() {
    let app = router::build(lazy_state(Arc::new(FakeIndex::default()), false));

    let (status, body) = call(
        app,
        post_json("/apikey", json!({"email": "a@b.c", "password": "wrong"})),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["errors"][0]["code"], "invalid-credentials");
}

#[tokio::test]
async fn api_key_with_empty_body_is_missing_body() {
    let app = router::build(lazy_state(Arc::new(FakeIndex::default()), true));

    let (status, body) = call(app, post_json("/apikey", json!({}))).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"][0]["code"], "missing-body");
}

#[tokio::test]
async fn api_key_with_broken_json_is_malformed() {
    let app = router::build(lazy_state(Arc::new(FakeIndex::default()), true));
    let request = Request::post("/apikey")
        .header("content-type", "application/json")
        .body(Body::from("{\"email\": "))
        .unwrap();

    let (status, body) = call(app, request).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"][0]["code"], "malformed-body");
}

#[tokio::test]
async fn update_without_api_key_is_unauthorized() {
    let app = router::build(lazy_state(Arc::new(FakeIndex::default()), true));
    let request = Request::put("/resources/1")
        .header("content-type", "application/json")
        .body(Body::from(json!({"paid": true}).to_string()))
        .unwrap();

    let (status, body) = call(app, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["errors"][0]["code"], "invalid-credentials");
}

#[tokio::test]
async fn api_key_with_membership_service_down_is_internal_error() {
    let app = router::build(lazy_state_with(
        Arc::new(FakeIndex::default()),
        unreachable_membership(),
    ));

    let (status, body) = call(
        app,
        post_json("/apikey", json!({"email": "a@b.c", "password": "pw"})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["errors"][0]["code"], "internal-server-error");
}
