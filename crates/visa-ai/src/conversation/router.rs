use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};

use super::domain::UserId;
use super::service::ConversationService;

/// Router builder exposing the conversation turn endpoint.
pub fn conversation_router(service: Arc<ConversationService>) -> Router {
    Router::new()
        .route("/api/v1/conversation/messages", post(turn_handler))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct TurnRequest {
    pub(crate) user_id: String,
    pub(crate) message: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct TurnResponse {
    pub(crate) user_id: String,
    pub(crate) reply: String,
}

pub(crate) async fn turn_handler(
    State(service): State<Arc<ConversationService>>,
    axum::Json(request): axum::Json<TurnRequest>,
) -> Response {
    let user_id = UserId(request.user_id);
    let reply = service.handle_message(&request.message, &user_id).await;

    let body = TurnResponse {
        user_id: user_id.0,
        reply,
    };
    (StatusCode::OK, axum::Json(body)).into_response()
}
