//! WhatsApp webhook handlers.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use subbubot_protocol::WebhookPayload;
use subtle::ConstantTimeEq;
use tracing::{info, warn};

use crate::server::AppState;

/// `hub.mode` value the platform sends when subscribing.
pub const SUBSCRIBE_MODE: &str = "subscribe";

pub const VERIFY_MISMATCH: &str = "Verification token mismatch";

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters of the verification handshake.
#[derive(Debug, Default, Deserialize)]
pub struct VerifyParams {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

impl VerifyParams {
    /// The challenge to echo, if mode and token check out.
    pub fn verify(&self, expected_token: &str) -> Option<&str> {
        let mode_ok = self.mode.as_deref() == Some(SUBSCRIBE_MODE);
        let token_ok = self
            .verify_token
            .as_deref()
            .is_some_and(|token| bool::from(token.as_bytes().ct_eq(expected_token.as_bytes())));

        (mode_ok && token_ok).then(|| self.challenge.as_deref().unwrap_or_default())
    }
}

#[derive(Debug, Serialize)]
pub struct ReceivedResponse {
    status: &'static str,
}

impl ReceivedResponse {
    pub fn received() -> Self {
        Self { status: "received" }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /webhook
pub async fn verify_webhook(
    State(state): State<AppState>,
    Query(params): Query<VerifyParams>,
) -> Response {
    info!(mode = ?params.mode, "Webhook verification requested");

    match params.verify(&state.verify_token) {
        Some(challenge) => (StatusCode::OK, challenge.to_string()).into_response(),
        None => {
            warn!(mode = ?params.mode, "Webhook verification failed");
            (StatusCode::FORBIDDEN, VERIFY_MISMATCH).into_response()
        }
    }
}

/// POST /webhook
///
/// Always acknowledges with `200 {"status":"received"}`. Decoding and
/// per-message failures are logged, never returned to the platform.
pub async fn receive_webhook(State(state): State<AppState>, body: Bytes) -> Response {
    let payload = match WebhookPayload::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(bytes = body.len(), error = %e, "Ignoring malformed webhook body");
            WebhookPayload::default()
        }
    };

    info!(
        object = payload.object.as_deref().unwrap_or("-"),
        messages = payload.messages().count(),
        "Webhook received"
    );

    let summary = state.conversation.handle_delivery(&payload).await;
    if summary.failed > 0 {
        warn!(
            handled = summary.handled,
            skipped = summary.skipped,
            failed = summary.failed,
            "Webhook delivery processed with failures"
        );
    }

    (StatusCode::OK, Json(ReceivedResponse::received())).into_response()
}

// ============================================================================
// Tests
// ============================================================================
