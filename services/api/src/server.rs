use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use tracing::info;

use visa_ai::config::AppConfig;
use visa_ai::conversation::{ConversationService, SessionPolicy, SessionStore};
use visa_ai::error::AppError;
use visa_ai::telemetry;

use crate::cli::ServeArgs;
use crate::infra::{offline_collaborators, AppState, LoggingDelivery};
use crate::routes::{with_conversation_routes, WebhookSignature, WebhookState};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(SessionStore::new(SessionPolicy {
        time_to_live: config.dispatcher.session_ttl,
        max_sessions: config.dispatcher.session_capacity,
    }));
    let service = Arc::new(ConversationService::new(
        store,
        offline_collaborators(),
        config.dispatcher.collaborator_timeout,
    ));

    let webhook = WebhookState {
        service: service.clone(),
        delivery: Arc::new(LoggingDelivery::default()),
        signature: WebhookSignature::new(config.messaging.webhook_secret.clone()),
    };

    let app = with_conversation_routes(service, webhook)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "immigration assistant ready");

    axum::serve(listener, app).await?;
    Ok(())
}
