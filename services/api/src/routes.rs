use std::sync::Arc;

use axum::body::Bytes;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::json;
use sha2::Sha256;
use tracing::warn;

use visa_ai::conversation::collaborators::MessageDelivery;
use visa_ai::conversation::{conversation_router, ConversationService, UserId};

use crate::infra::AppState;

/// Verifies the `X-Webhook-Signature` header: hex HMAC-SHA256 of the raw
/// request body under the shared channel secret. Without a configured
/// secret (development only) unsigned requests pass.
#[derive(Clone)]
pub(crate) struct WebhookSignature {
    secret: Option<Arc<str>>,
}

impl WebhookSignature {
    pub(crate) fn new(secret: Option<String>) -> Self {
        Self {
            secret: secret.map(Into::into),
        }
    }

    pub(crate) fn verify(&self, body: &[u8], header: Option<&str>) -> Result<(), SignatureError> {
        let Some(secret) = &self.secret else {
            return Ok(());
        };

        let header = header.ok_or(SignatureError::Missing)?;
        let signature = hex::decode(header.trim()).map_err(|_| SignatureError::Malformed)?;

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .map_err(|_| SignatureError::Malformed)?;
        mac.update(body);
        mac.verify_slice(&signature)
            .map_err(|_| SignatureError::Mismatch)
    }

    #[cfg(test)]
    pub(crate) fn sign(&self, body: &[u8]) -> Option<String> {
        let secret = self.secret.as_ref()?;
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).ok()?;
        mac.update(body);
        Some(hex::encode(mac.finalize().into_bytes()))
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub(crate) enum SignatureError {
    #[error("missing webhook signature")]
    Missing,
    #[error("malformed webhook signature")]
    Malformed,
    #[error("webhook signature mismatch")]
    Mismatch,
}

#[derive(Clone)]
pub(crate) struct WebhookState {
    pub(crate) service: Arc<ConversationService>,
    pub(crate) delivery: Arc<dyn MessageDelivery>,
    pub(crate) signature: WebhookSignature,
}

/// Full route set: the conversation endpoint from the core crate, the
/// messaging webhook, and the operational endpoints.
pub(crate) fn with_conversation_routes(
    service: Arc<ConversationService>,
    webhook: WebhookState,
) -> axum::Router {
    conversation_router(service)
        .route(
            "/api/v1/webhook/whatsapp",
            axum::routing::post(webhook_handler).with_state(webhook),
        )
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

#[derive(Debug, Deserialize)]
pub(crate) struct InboundMessage {
    pub(crate) from: String,
    pub(crate) body: String,
}

pub(crate) async fn webhook_handler(
    axum::extract::State(state): axum::extract::State<WebhookState>,
    headers: HeaderMap,
    body: Bytes,
) -> axum::response::Response {
    let signature_header = headers
        .get("x-webhook-signature")
        .and_then(|value| value.to_str().ok());

    if let Err(err) = state.signature.verify(&body, signature_header) {
        warn!(error = %err, "rejected webhook delivery");
        let payload = json!({ "error": err.to_string() });
        return (StatusCode::UNAUTHORIZED, Json(payload)).into_response();
    }

    let inbound: InboundMessage = match serde_json::from_slice(&body) {
        Ok(inbound) => inbound,
        Err(err) => {
            let payload = json!({ "error": format!("invalid webhook payload: {err}") });
            return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
        }
    };

    let user_id = UserId(inbound.from);
    let reply = state.service.handle_message(&inbound.body, &user_id).await;

    // Delivery is best-effort; the reply is returned either way.
    if let Err(err) = state.delivery.deliver(&user_id, &reply).await {
        warn!(user = %user_id, error = %err, "reply delivery failed");
    }

    let payload = json!({ "to": user_id.0, "reply": reply });
    (StatusCode::OK, Json(payload)).into_response()
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tower::ServiceExt;

    use visa_ai::conversation::{SessionPolicy, SessionStore};

    use crate::infra::{offline_collaborators, LoggingDelivery};

    fn build_service() -> Arc<ConversationService> {
        let store = Arc::new(SessionStore::new(SessionPolicy::default()));
        Arc::new(ConversationService::new(
            store,
            offline_collaborators(),
            Duration::from_secs(5),
        ))
    }

    fn webhook_state(secret: Option<String>) -> (WebhookState, LoggingDelivery) {
        let delivery = LoggingDelivery::default();
        let state = WebhookState {
            service: build_service(),
            delivery: Arc::new(delivery.clone()),
            signature: WebhookSignature::new(secret),
        };
        (state, delivery)
    }

    #[test]
    fn signatures_verify_round_trip() {
        let signature = WebhookSignature::new(Some("shh".to_string()));
        let body = br#"{"from":"+1555","body":"hi"}"#;

        let signed = signature.sign(body).expect("secret configured");
        assert_eq!(signature.verify(body, Some(&signed)), Ok(()));
        assert_eq!(
            signature.verify(b"tampered", Some(&signed)),
            Err(SignatureError::Mismatch)
        );
        assert_eq!(signature.verify(body, None), Err(SignatureError::Missing));
        assert_eq!(
            signature.verify(body, Some("zz-not-hex")),
            Err(SignatureError::Malformed)
        );
    }

    #[test]
    fn unsigned_requests_pass_without_a_configured_secret() {
        let signature = WebhookSignature::new(None);
        assert_eq!(signature.verify(b"anything", None), Ok(()));
    }

    #[tokio::test]
    async fn webhook_accepts_a_signed_turn_and_delivers_the_reply() {
        let (state, delivery) = webhook_state(Some("channel-secret".to_string()));
        let router = axum::Router::new()
            .route("/api/v1/webhook/whatsapp", axum::routing::post(webhook_handler))
            .with_state(state.clone());

        let body = serde_json::to_vec(&json!({ "from": "+15550042", "body": "hello" }))
            .expect("payload serializes");
        let signed = state.signature.sign(&body).expect("secret configured");

        let response = router
            .oneshot(
                axum::http::Request::post("/api/v1/webhook/whatsapp")
                    .header(header::CONTENT_TYPE, "application/json")
                    .header("x-webhook-signature", signed)
                    .body(axum::body::Body::from(body))
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        let sent = delivery.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].1.contains("Welcome to the Immigration Assistant"));
    }

    #[tokio::test]
    async fn webhook_rejects_bad_signatures() {
        let (state, delivery) = webhook_state(Some("channel-secret".to_string()));
        let router = axum::Router::new()
            .route("/api/v1/webhook/whatsapp", axum::routing::post(webhook_handler))
            .with_state(state);

        let response = router
            .oneshot(
                axum::http::Request::post("/api/v1/webhook/whatsapp")
                    .header(header::CONTENT_TYPE, "application/json")
                    .header("x-webhook-signature", "00".repeat(32))
                    .body(axum::body::Body::from(r#"{"from":"+1","body":"hi"}"#))
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(delivery.sent().is_empty());
    }
}
