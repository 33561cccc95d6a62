use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use tower_http::timeout::TimeoutLayer;

use crate::conversation::ConversationHandler;
use crate::handlers;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub conversation: ConversationHandler,
    pub verify_token: Arc<str>,
}

impl AppState {
    pub fn new(conversation: ConversationHandler, verify_token: impl Into<Arc<str>>) -> Self {
        Self {
            conversation,
            verify_token: verify_token.into(),
        }
    }
}

/// Build the router.
///
/// The request timeout bounds the health routes only. `/webhook` runs each
/// delivery to completion; outbound sends carry their own timeout.
pub fn build_app(state: AppState, request_timeout_secs: u64) -> Router {
    let health: Router<AppState> = Router::new()
        .route("/", get(handlers::root))
        .route("/livez", get(handlers::livez))
        .route("/readyz", get(handlers::readyz))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(request_timeout_secs),
        ));

    Router::new()
        .merge(health)
        .route(
            "/webhook",
            get(handlers::verify_webhook).post(handlers::receive_webhook),
        )
        .with_state(state)
}
