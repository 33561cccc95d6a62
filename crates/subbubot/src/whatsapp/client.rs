//! Cloud API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use subbubot_protocol::{ApiErrorBody, OutboundMessage, SendMessageResponse};
use tracing::{info, warn};

use super::error::SendError;
use super::sender::{MessageSender, SendReceipt};
use crate::config::WhatsAppConfig;

/// Sends messages through `POST {base_url}/{phone_number_id}/messages`.
pub struct WhatsAppClient {
    client: Client,
    base_url: String,
    phone_number_id: Option<String>,
    access_token: Option<String>,
    send_timeout: Option<Duration>,
}

impl WhatsAppClient {
    pub fn new(
        base_url: String,
        phone_number_id: Option<String>,
        access_token: Option<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            phone_number_id,
            access_token,
            send_timeout: None,
        }
    }

    pub fn from_config(config: &WhatsAppConfig) -> Self {
        Self::new(
            config.api_base_url.clone(),
            config.phone_number_id.clone(),
            config.access_token.clone(),
        )
        .with_send_timeout(Duration::from_secs(config.send_timeout_seconds))
    }

    /// Bound each send; an elapsed send fails with [`SendError::Request`].
    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = Some(timeout);
        self
    }

    /// Whether both the token and the phone number id are set.
    pub fn is_configured(&self) -> bool {
        self.access_token.is_some() && self.phone_number_id.is_some()
    }

    fn messages_url(&self) -> Result<String, SendError> {
        let phone_number_id = self
            .phone_number_id
            .as_deref()
            .ok_or(SendError::NotConfigured("phone number id"))?;
        Ok(format!("{}/{}/messages", self.base_url, phone_number_id))
    }
}

#[async_trait]
impl MessageSender for WhatsAppClient {
    async fn send(&self, message: OutboundMessage) -> Result<SendReceipt, SendError> {
        let key = self
            .access_token
            .as_deref()
            .ok_or(SendError::NotConfigured("access token"))?;
        let url = self.messages_url()?;

        let mut request = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", key))
            .json(&message);
        if let Some(timeout) = self.send_timeout {
            request = request.timeout(timeout);
        }
        let response = request.send().await?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = api_error_message(&body);
            warn!(to = %message.to, kind = message.kind(), status, error = %reason, "WhatsApp send rejected");
            return Err(SendError::Api {
                status,
                message: reason,
            });
        }

        let parsed: SendMessageResponse = response.json().await.unwrap_or_default();
        let message_id = parsed.message_id().map(str::to_string);
        info!(
            to = %message.to,
            kind = message.kind(),
            status,
            message_id = message_id.as_deref().unwrap_or("-"),
            "Sent WhatsApp message"
        );

        Ok(SendReceipt { status, message_id })
    }
}

/// Prefer the platform's error message over the raw body.
fn api_error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) if !parsed.error.message.is_empty() => match parsed.error.code {
            Some(code) => format!("{} (code {})", parsed.error.message, code),
            None => parsed.error.message,
        },
        _ => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::Method::POST;
    use httpmock::MockServer;
    use serde_json::json;
    use subbubot_protocol::{InteractiveMessage, MediaKind};

    fn client_for(server: &MockServer) -> WhatsAppClient {
        WhatsAppClient::new(
            format!("{}/v17.0/", server.base_url()),
            Some("1234".to_string()),
            Some("test-token".to_string()),
        )
    }

    #[tokio::test]
    async fn sends_text_with_bearer_token() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v17.0/1234/messages")
                .header("authorization", "Bearer test-token")
                .json_body(json!({
                    "messaging_product": "whatsapp",
                    "recipient_type": "individual",
                    "to": "15551234567",
                    "type": "text",
                    "text": { "body": "Thanks for updating", "preview_url": false }
                }));
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "messaging_product": "whatsapp",
                    "contacts": [{ "input": "15551234567", "wa_id": "15551234567" }],
                    "messages": [{ "id": "wamid.abc" }]
                }));
        });

        let receipt = client_for(&server)
            .send_text("15551234567", "Thanks for updating")
            .await
            .unwrap();

        mock.assert();
        assert_eq!(receipt.status, 200);
        assert_eq!(receipt.message_id.as_deref(), Some("wamid.abc"));
    }

    #[tokio::test]
    async fn sends_media_and_interactive_payloads() {
        let server = MockServer::start_async().await;
        let media = server.mock(|when, then| {
            when.method(POST)
                .path("/v17.0/1234/messages")
                .body_includes("\"type\":\"image\"")
                .body_includes("\"caption\":\"Welcome\"");
            then.status(200).json_body(json!({ "messages": [{ "id": "wamid.m" }] }));
        });
        let interactive = server.mock(|when, then| {
            when.method(POST)
                .path("/v17.0/1234/messages")
                .body_includes("\"type\":\"interactive\"");
            then.status(200).json_body(json!({ "messages": [{ "id": "wamid.i" }] }));
        });

        let client = client_for(&server);
        let receipt = client
            .send_media("1", MediaKind::Image, "https://x/welcome.gif", Some("Welcome"))
            .await
            .unwrap();
        assert_eq!(receipt.message_id.as_deref(), Some("wamid.m"));

        let receipt = client
            .send_interactive(
                "1",
                InteractiveMessage::reply_buttons("Pick", [("a", "A"), ("b", "B")]),
            )
            .await
            .unwrap();
        assert_eq!(receipt.message_id.as_deref(), Some("wamid.i"));

        media.assert();
        interactive.assert();
    }

    #[tokio::test]
    async fn non_success_status_is_api_error() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/v17.0/1234/messages");
            then.status(400).json_body(json!({
                "error": {
                    "message": "Recipient phone number not in allowed list",
                    "type": "OAuthException",
                    "code": 131030
                }
            }));
        });

        let err = client_for(&server).send_text("1", "hello").await.unwrap_err();
        match err {
            SendError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(
                    message,
                    "Recipient phone number not in allowed list (code 131030)"
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn success_without_json_body_has_no_message_id() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/v17.0/1234/messages");
            then.status(200).body("ok");
        });

        let receipt = client_for(&server).send_text("1", "hello").await.unwrap();
        assert_eq!(receipt.status, 200);
        assert!(receipt.message_id.is_none());
    }

    #[tokio::test]
    async fn missing_credentials_fail_without_request() {
        let client = WhatsAppClient::new("http://127.0.0.1:9".to_string(), None, Some("t".into()));
        assert!(!client.is_configured());
        let err = client.send_text("1", "x").await.unwrap_err();
        assert!(matches!(err, SendError::NotConfigured("phone number id")));

        let client = WhatsAppClient::new("http://127.0.0.1:9".to_string(), Some("1".into()), None);
        let err = client.send_text("1", "x").await.unwrap_err();
        assert!(matches!(err, SendError::NotConfigured("access token")));
    }

    #[tokio::test]
    async fn connection_failure_is_request_error() {
        let client = WhatsAppClient::new(
            "http://127.0.0.1:9/v17.0".to_string(),
            Some("1".into()),
            Some("t".into()),
        );
        let err = client.send_text("1", "x").await.unwrap_err();
        assert!(matches!(err, SendError::Request(_)));
    }

    #[tokio::test]
    async fn slow_api_fails_after_send_timeout() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/v17.0/1234/messages");
            then.status(200)
                .delay(Duration::from_secs(2))
                .json_body(json!({ "messages": [{ "id": "wamid.late" }] }));
        });

        let client = client_for(&server).with_send_timeout(Duration::from_millis(200));
        let err = client.send_text("1", "hello").await.unwrap_err();
        match err {
            SendError::Request(e) => assert!(e.is_timeout(), "unexpected error: {e}"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn from_config_applies_send_timeout() {
        let config = WhatsAppConfig {
            send_timeout_seconds: 7,
            ..WhatsAppConfig::default()
        };
        let client = WhatsAppClient::from_config(&config);
        assert_eq!(client.send_timeout, Some(Duration::from_secs(7)));
        assert_eq!(client.base_url, "https://graph.facebook.com/v17.0");
    }

    #[test]
    fn api_error_message_falls_back_to_raw_body() {
        assert_eq!(api_error_message("gateway timeout"), "gateway timeout");
        assert_eq!(
            api_error_message(r#"{"error":{"message":"bad token"}}"#),
            "bad token"
        );
    }
}
