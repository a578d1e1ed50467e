use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use subscriptions::subs::{InMemorySubscriptionStore, SubscriptionService};
use tower::ServiceExt; // for `oneshot`

fn app_with_store() -> (Arc<InMemorySubscriptionStore>, Router) {
    let store = Arc::new(InMemorySubscriptionStore::new());
    let app = subscriptions::app(SubscriptionService::new(store.clone()));
    (store, app)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, value)
}

fn netflix() -> Value {
    json!({
        "service_name": "Netflix",
        "price": 100,
        "user_id": "u1",
        "start_date": "2025-01-01T00:00:00Z",
        "end_date": "2025-12-31T00:00:00Z"
    })
}

#[tokio::test]
async fn root_responds_ok() {
    let (_, app) = app_with_store();
    let (status, body) = send(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("Subscriptions API".to_string()));
}

#[tokio::test]
async fn crud_lifecycle() {
    let (_, app) = app_with_store();

    let (status, created) = send(&app, Method::POST, "/subs", Some(netflix())).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["service_name"], "Netflix");
    assert_eq!(created["start_date"], "2025-01-01T00:00:00Z");

    let (status, fetched) = send(&app, Method::GET, &format!("/subs/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let mut replacement = netflix();
    replacement["price"] = json!(250);
    replacement["id"] = json!(999);
    let (status, updated) =
        send(&app, Method::PUT, &format!("/subs/{id}"), Some(replacement)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"].as_i64(), Some(id));
    assert_eq!(updated["price"], 250);

    let (status, _) = send(&app, Method::DELETE, &format!("/subs/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, Method::DELETE, &format!("/subs/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "subscription not found");

    let (status, _) = send(&app, Method::GET, &format!("/subs/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_reports_validation_message() {
    let (_, app) = app_with_store();
    let mut payload = netflix();
    payload["price"] = json!(-3);
    let (status, body) = send(&app, Method::POST, "/subs", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "price must be greater than 0");

    let mut payload = netflix();
    payload["start_date"] = json!("2025-01-01");
    let (status, _) = send(&app, Method::POST, "/subs", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn zero_dates_are_treated_as_missing() {
    let (store, app) = app_with_store();
    let mut payload = netflix();
    payload["start_date"] = json!("0001-01-01T00:00:00Z");
    let (status, body) = send(&app, Method::POST, "/subs", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "start_date is required");

    let mut payload = netflix();
    payload["end_date"] = json!("0001-01-01T00:00:00Z");
    let (status, body) = send(&app, Method::POST, "/subs", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "end_date is required");
    assert_eq!(store.len().await, 0);
}

#[tokio::test]
async fn update_unknown_id_is_not_found() {
    let (_, app) = app_with_store();
    let (status, _) = send(&app, Method::PUT, "/subs/77", Some(netflix())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_ids_are_bad_requests() {
    let (_, app) = app_with_store();
    for uri in ["/subs/abc", "/subs/-1"] {
        let (status, body) = send(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["error"], "invalid id");
    }
}

#[tokio::test]
async fn list_switches_shape_with_pagination() {
    let (_, app) = app_with_store();
    for _ in 0..3 {
        send(&app, Method::POST, "/subs", Some(netflix())).await;
    }

    let (status, all) = send(&app, Method::GET, "/subs", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().map(Vec::len), Some(3));

    let (status, page) = send(&app, Method::GET, "/subs?page=2&limit=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["subscriptions"].as_array().map(Vec::len), Some(1));
    assert_eq!(page["pagination"], json!({ "page": 2, "limit": 2, "total": 3 }));

    let (_, fallback) = send(&app, Method::GET, "/subs?limit=500", None).await;
    assert_eq!(fallback["pagination"]["limit"], 10);
    assert_eq!(fallback["pagination"]["page"], 1);
}

#[tokio::test]
async fn empty_pagination_params_return_plain_list() {
    let (_, app) = app_with_store();
    send(&app, Method::POST, "/subs", Some(netflix())).await;

    let (status, all) = send(&app, Method::GET, "/subs?page=&limit=", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn list_page_on_empty_collection() {
    let (_, app) = app_with_store();
    let (status, page) = send(&app, Method::GET, "/subs?page=1&limit=10", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["subscriptions"], json!([]));
    assert_eq!(page["pagination"]["total"], 0);
}

#[tokio::test]
async fn total_for_period_sums_overlap() {
    let (_, app) = app_with_store();
    send(&app, Method::POST, "/subs", Some(netflix())).await;
    let mut other = netflix();
    other["user_id"] = json!("u2");
    send(&app, Method::POST, "/subs", Some(other)).await;

    let (status, body) = send(
        &app,
        Method::GET,
        "/subs/total?start_date=2025-02-01T00:00:00Z&end_date=2025-04-01T00:00:00Z",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "total": 400 }));

    let (_, filtered) = send(
        &app,
        Method::GET,
        "/subs/total?start_date=2025-02-01T00:00:00Z&end_date=2025-04-01T00:00:00Z&user_id=u1",
        None,
    )
    .await;
    assert_eq!(filtered, json!({ "total": 200 }));
}

#[tokio::test]
async fn total_for_period_validates_parameters() {
    let (_, app) = app_with_store();

    let (status, body) = send(&app, Method::GET, "/subs/total", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "start_date is required");

    let (status, body) = send(
        &app,
        Method::GET,
        "/subs/total?start_date=2025-02-01T00:00:00Z",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "end_date is required");

    let (status, body) = send(
        &app,
        Method::GET,
        "/subs/total?start_date=01.02.2025&end_date=2025-04-01T00:00:00Z",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid start_date format, expected RFC3339");

    let (status, body) = send(
        &app,
        Method::GET,
        "/subs/total?start_date=2025-04-01T00:00:00Z&end_date=2025-02-01T00:00:00Z",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "end_date must be after start_date");
}

#[tokio::test]
async fn storage_failures_hide_details() {
    let (store, app) = app_with_store();
    store.fail_with("password authentication failed").await;
    let (status, body) = send(&app, Method::GET, "/subs", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "internal server error" }));
}
