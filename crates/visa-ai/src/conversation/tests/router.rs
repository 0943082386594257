use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use tower::ServiceExt;

use super::common::*;
use crate::conversation::router::{conversation_router, turn_handler, TurnRequest};

#[tokio::test]
async fn turn_handler_always_replies_ok() {
    let service = Arc::new(scripted_service(Vec::new()));

    let response = turn_handler(
        State(service),
        axum::Json(TurnRequest {
            user_id: user().0,
            message: "hi".to_string(),
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn message_route_accepts_json_turns() {
    let service = Arc::new(scripted_service(Vec::new()));
    let router = conversation_router(service.clone());

    let payload = serde_json::json!({
        "user_id": user().0,
        "message": "hello there",
    });

    let response = router
        .oneshot(
            axum::http::Request::post("/api/v1/conversation/messages")
                .header(axum::http::header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from(payload.to_string()))
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    // The turn went through the dispatcher and was persisted.
    assert!(service.store().peek(&user()).is_some());
}
