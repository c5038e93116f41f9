//! Integration tests for the HTTP API
//!
//! Router-level tests via tower's oneshot; a cloned router shares the
//! same session map, so multi-request flows work in-process.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;

use timewarp::core::create_router;

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn create_session(app: &axum::Router) -> String {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/session/new")
                .header("content-type", "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    json["session_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_router();

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_create_session() {
    let app = create_router();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/session/new")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"params": {"tau": 1.0}}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["session_id"].is_string());
    assert!(json["websocket_url"].is_string());
}

#[tokio::test]
async fn test_session_not_found() {
    let app = create_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/session/nonexistent")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_flow() {
    let app = create_router();
    let session_id = create_session(&app).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/session/{}/update", session_id))
                .header("content-type", "application/json")
                .body(Body::from(
                    r#"{"loopGain": 0.9, "coupling": 0.9, "predictionError": 0.1}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["step"], 1);
    assert!(json["absorption"].as_f64().unwrap() > 0.0);
    assert!(json["subjectiveDtScale"].as_f64().unwrap() < 1.0);
    assert!(json["band"].is_string());

    // Status reflects the update
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/session/{}", session_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let status = body_json(response).await;
    assert_eq!(status["step"], 1);
    assert_eq!(status["sessionId"], Value::String(session_id));
}

#[tokio::test]
async fn test_state_roundtrip_over_http() {
    let app = create_router();
    let session_id = create_session(&app).await;

    // Drive the kernel a few steps
    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/session/{}/update", session_id))
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"loopGain": 0.7, "predictionError": 0.2}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    // Export
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/session/{}/state", session_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let exported = body_json(response).await;
    assert!(exported["params"]["wGain"].is_number());
    assert!(exported["subjectiveDtScale"].is_number());

    // Import the exported blob into a fresh session
    let other_id = create_session(&app).await;
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/session/{}/state", other_id))
                .header("content-type", "application/json")
                .body(Body::from(exported.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let imported = body_json(response).await;
    assert_eq!(imported, exported);
}

#[tokio::test]
async fn test_partial_import_touches_one_field() {
    let app = create_router();
    let session_id = create_session(&app).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/session/{}/state", session_id))
                .header("content-type", "application/json")
                .body(Body::from(r#"{"absorption": 0.4}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let state = body_json(response).await;
    assert_eq!(state["absorption"].as_f64().unwrap(), 0.4);
    assert_eq!(state["timelessness"].as_f64().unwrap(), 0.0);
    assert_eq!(state["subjectiveDtScale"].as_f64().unwrap(), 1.0);
}

#[tokio::test]
async fn test_reset_returns_to_floors() {
    let app = create_router();
    let session_id = create_session(&app).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/session/{}/update", session_id))
                .header("content-type", "application/json")
                .body(Body::from(r#"{"loopGain": 1.0, "coupling": 1.0}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/session/{}/reset", session_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["step"], 0);
    assert_eq!(json["absorption"].as_f64().unwrap(), 0.0);
    assert_eq!(json["subjectiveDtScale"].as_f64().unwrap(), 1.0);
}

#[tokio::test]
async fn test_update_rejects_unknown_signal_keys() {
    let app = create_router();
    let session_id = create_session(&app).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/session/{}/update", session_id))
                .header("content-type", "application/json")
                .body(Body::from(r#"{"flux": 0.9}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    // deny_unknown_fields at the serde boundary
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
