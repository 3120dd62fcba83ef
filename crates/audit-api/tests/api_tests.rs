//! Integration tests for the audit API endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server, backed by the in-memory store. This validates
//! handler logic, routing, and error mapping without a database.

#![allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]

use std::sync::Arc;

use audit_api::router::build_router;
use audit_api::state::AppState;
use audit_db::{EventRepository, MemoryEventStore};
use audit_types::{EventId, NewEvent};
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{DateTime, Duration, Utc};
use serde_json::{Value, json};
use tower::ServiceExt;

fn base_time() -> DateTime<Utc> {
    "2024-05-01T12:00:00Z".parse().unwrap()
}

fn body(entity: &str, action: &str, time: DateTime<Utc>) -> NewEvent {
    NewEvent {
        id: None,
        entity: entity.to_owned(),
        action: action.to_owned(),
        event: format!("{entity} {action}"),
        time,
        author: String::from("alice"),
    }
}

/// Build a router over a store seeded with five events, one minute apart.
async fn make_test_router() -> (Router, MemoryEventStore) {
    let store = MemoryEventStore::new();
    let seed = [
        ("User", "CREATE"),
        ("User", "UPDATE"),
        ("User", "DELETE"),
        ("Order", "CREATE"),
        ("Order", "UPDATE"),
    ];
    for (minute, (entity, action)) in (0_i64..).zip(seed) {
        store
            .insert(body(entity, action, base_time() + Duration::minutes(minute)))
            .await
            .unwrap();
    }

    let state = Arc::new(AppState::new(store.clone()));
    (build_router(state), store)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, payload: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

async fn first_id(store: &MemoryEventStore) -> EventId {
    store
        .list(&audit_db::EventFilter::new())
        .await
        .unwrap()
        .first()
        .map(|e| e.id)
        .unwrap()
}

// =========================================================================
// Listing
// =========================================================================

#[tokio::test]
async fn test_list_all_events_newest_first() {
    let (router, _) = make_test_router().await;

    let response = router
        .oneshot(Request::get("/event").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    let events = json.as_array().unwrap();
    assert_eq!(events.len(), 5);
    assert_eq!(events[0]["entity"], "Order");
    assert_eq!(events[0]["action"], "UPDATE");
    assert_eq!(events[4]["action"], "CREATE");
    assert_eq!(events[4]["entity"], "User");
}

#[tokio::test]
async fn test_list_filter_single_value_is_equality() {
    let (router, _) = make_test_router().await;

    let response = router
        .oneshot(Request::get("/event?entity=User").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    let events = json.as_array().unwrap();
    assert_eq!(events.len(), 3);
    assert!(events.iter().all(|e| e["entity"] == "User"));
}

#[tokio::test]
async fn test_list_filter_repeated_value_is_membership() {
    let (router, _) = make_test_router().await;

    let response = router
        .oneshot(
            Request::get("/event?action=CREATE&action=UPDATE")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    let events = json.as_array().unwrap();
    assert_eq!(events.len(), 4);
    assert!(
        events
            .iter()
            .all(|e| e["action"] == "CREATE" || e["action"] == "UPDATE")
    );
}

#[tokio::test]
async fn test_list_filter_parameters_are_anded() {
    let (router, _) = make_test_router().await;

    let response = router
        .oneshot(
            Request::get("/event?entity=Order&action=CREATE&action=DELETE")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let json = body_to_json(response.into_body()).await;
    let events = json.as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["entity"], "Order");
    assert_eq!(events[0]["action"], "CREATE");
}

#[tokio::test]
async fn test_list_filter_decodes_percent_encoding() {
    let (router, store) = make_test_router().await;
    store
        .insert(body("Line Item", "CREATE", base_time()))
        .await
        .unwrap();

    let response = router
        .oneshot(
            Request::get("/event?entity=Line%20Item")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_list_unknown_parameter_returns_empty() {
    let (router, _) = make_test_router().await;

    let response = router
        .oneshot(Request::get("/event?colour=blue").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert!(json.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_list_is_capped_at_one_hundred() {
    let store = MemoryEventStore::new();
    for minute in 0..130 {
        store
            .insert(body("User", "CREATE", base_time() + Duration::minutes(minute)))
            .await
            .unwrap();
    }
    let router = build_router(Arc::new(AppState::new(store)));

    let response = router
        .oneshot(Request::get("/event").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let json = body_to_json(response.into_body()).await;
    let events = json.as_array().unwrap();
    assert_eq!(events.len(), 100);
    let newest: DateTime<Utc> = serde_json::from_value(events[0]["time"].clone()).unwrap();
    assert_eq!(newest, base_time() + Duration::minutes(129));
}

// =========================================================================
// Create
// =========================================================================

#[tokio::test]
async fn test_create_returns_201_with_location() {
    let (router, store) = make_test_router().await;

    let payload = json!({
        "entity": "Invoice",
        "action": "CREATE",
        "event": "invoice 42 issued",
        "time": "2024-06-01T09:30:00Z",
        "author": "billing",
    });
    let response = router
        .oneshot(json_request("POST", "/event", &payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let location = response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_owned();
    let json = body_to_json(response.into_body()).await;
    let id = json["id"].as_str().unwrap();
    assert_eq!(location, format!("/event/{id}"));
    assert_eq!(json["entity"], "Invoice");

    let stored = store.get_by_id(id.parse().unwrap()).await.unwrap();
    assert_eq!(stored.author, "billing");
}

#[tokio::test]
async fn test_create_then_get_roundtrip() {
    let (router, _) = make_test_router().await;

    let payload = json!({
        "entity": "Invoice",
        "action": "CREATE",
        "event": "invoice 42 issued",
        "time": "2024-06-01T09:30:00Z",
        "author": "billing",
    });
    let created = router
        .clone()
        .oneshot(json_request("POST", "/event", &payload))
        .await
        .unwrap();
    let location = created
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_owned();
    let created_json = body_to_json(created.into_body()).await;

    let response = router
        .oneshot(Request::get(&location).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let fetched = body_to_json(response.into_body()).await;
    assert_eq!(fetched, created_json);
}

#[tokio::test]
async fn test_create_malformed_body_returns_400() {
    let (router, store) = make_test_router().await;

    let response = router
        .oneshot(
            Request::post("/event")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert!(
        json["message"]
            .as_str()
            .unwrap()
            .starts_with("Incorrect body")
    );
    assert_eq!(store.len().await, 5);
}

#[tokio::test]
async fn test_create_wrong_field_type_returns_400() {
    let (router, _) = make_test_router().await;

    let response = router
        .oneshot(json_request("POST", "/event", &json!({ "entity": 7 })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_duplicate_id_returns_400() {
    let (router, store) = make_test_router().await;
    let existing = first_id(&store).await;

    let payload = json!({ "id": existing.to_string(), "entity": "User" });
    let response = router
        .oneshot(json_request("POST", "/event", &payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["message"], "Event with this Id already exists");
}

// =========================================================================
// Get / update / delete
// =========================================================================

#[tokio::test]
async fn test_get_event_by_id() {
    let (router, store) = make_test_router().await;
    let id = first_id(&store).await;

    let response = router
        .oneshot(
            Request::get(format!("/event/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["id"], id.to_string());
}

#[tokio::test]
async fn test_get_event_not_found() {
    let (router, _) = make_test_router().await;

    let response = router
        .oneshot(
            Request::get(format!("/event/{}", EventId::new()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["message"], "Event not found");
}

#[tokio::test]
async fn test_get_event_invalid_id() {
    let (router, _) = make_test_router().await;

    let response = router
        .oneshot(Request::get("/event/not-an-id").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert!(json["message"].as_str().unwrap().contains("not-an-id"));
}

#[tokio::test]
async fn test_update_replaces_event() {
    let (router, store) = make_test_router().await;
    let id = first_id(&store).await;

    let payload = json!({
        "id": EventId::new().to_string(),
        "entity": "Account",
        "action": "UPDATE",
        "time": "2025-01-01T00:00:00Z",
    });
    let response = router
        .oneshot(json_request("PUT", &format!("/event/{id}"), &payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let stored = store.get_by_id(id).await.unwrap();
    assert_eq!(stored.id, id);
    assert_eq!(stored.entity, "Account");
    assert!(stored.author.is_empty());
    assert!(stored.event.is_empty());
}

#[tokio::test]
async fn test_update_missing_event_returns_404() {
    let (router, _) = make_test_router().await;

    let response = router
        .oneshot(json_request(
            "PUT",
            &format!("/event/{}", EventId::new()),
            &json!({ "entity": "User" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_malformed_body_returns_400() {
    let (router, store) = make_test_router().await;
    let id = first_id(&store).await;

    let response = router
        .oneshot(
            Request::put(format!("/event/{id}"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("42"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_removes_event() {
    let (router, store) = make_test_router().await;
    let id = first_id(&store).await;

    let response = router
        .clone()
        .oneshot(
            Request::delete(format!("/event/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(store.len().await, 4);

    let again = router
        .oneshot(
            Request::delete(format!("/event/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}

// =========================================================================
// Misc
// =========================================================================

#[tokio::test]
async fn test_swagger_returns_openapi_document() {
    let (router, _) = make_test_router().await;

    let response = router
        .oneshot(Request::get("/swagger").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert!(json["openapi"].as_str().unwrap().starts_with('3'));
    assert_eq!(json["info"]["title"], "Audit API documentation");
    assert!(json["paths"]["/event"].is_object());
}

#[tokio::test]
async fn test_nonexistent_route_returns_json_404() {
    let (router, _) = make_test_router().await;

    let response = router
        .oneshot(Request::get("/api/nonexistent").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["message"], "Not found");
}

#[tokio::test]
async fn test_unsupported_method_returns_json_405() {
    let (router, _) = make_test_router().await;

    let response = router
        .oneshot(Request::patch("/event").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["message"], "Method not allowed");
}
