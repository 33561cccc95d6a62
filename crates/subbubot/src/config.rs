use std::fmt;
use std::io::ErrorKind;
use std::path::Path;

use serde::Deserialize;
use subbubot_protocol::MediaKind;
use thiserror::Error;
use tokio::fs;

/// Default config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "subbubot.yaml";

pub const ENV_WHATSAPP_TOKEN: &str = "WHATSAPP_TOKEN";
pub const ENV_PHONE_NUMBER_ID: &str = "PHONE_NUMBER_ID";
pub const ENV_VERIFY_TOKEN: &str = "VERIFY_TOKEN";
pub const ENV_WELCOME_MEDIA_URL: &str = "WELCOME_MEDIA_URL";
pub const ENV_API_BASE_URL: &str = "WHATSAPP_API_BASE_URL";
pub const ENV_PORT: &str = "PORT";

// ============================================================================
// Config (root)
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub whatsapp: WhatsAppConfig,
    #[serde(default)]
    pub welcome: WelcomeConfig,
}

impl Config {
    /// Load from a YAML file. A missing file yields defaults.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(ConfigError::Io(e)),
        };
        Ok(serde_saphyr::from_str(&contents)?)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from `lookup`. Empty values are ignored.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(token) = get(ENV_WHATSAPP_TOKEN) {
            self.whatsapp.access_token = Some(token);
        }
        if let Some(id) = get(ENV_PHONE_NUMBER_ID) {
            self.whatsapp.phone_number_id = Some(id);
        }
        if let Some(token) = get(ENV_VERIFY_TOKEN) {
            self.whatsapp.verify_token = token;
        }
        if let Some(url) = get(ENV_API_BASE_URL) {
            self.whatsapp.api_base_url = url;
        }
        if let Some(url) = get(ENV_WELCOME_MEDIA_URL) {
            self.welcome.media_url = Some(url);
        }
        if let Some(port) = get(ENV_PORT) {
            self.server.port = port.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                name: ENV_PORT,
                value: port,
            })?;
        }
        Ok(())
    }
}

// ============================================================================
// ServerConfig
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_request_timeout() -> u64 {
    30
}

// ============================================================================
// WhatsAppConfig
// ============================================================================

/// Credentials for the Cloud API and the webhook handshake secret.
#[derive(Deserialize)]
pub struct WhatsAppConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub phone_number_id: Option<String>,
    #[serde(default = "default_verify_token")]
    pub verify_token: String,
    /// Bound on a single outbound send.
    #[serde(default = "default_send_timeout")]
    pub send_timeout_seconds: u64,
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            access_token: None,
            phone_number_id: None,
            verify_token: default_verify_token(),
            send_timeout_seconds: default_send_timeout(),
        }
    }
}

impl fmt::Debug for WhatsAppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WhatsAppConfig")
            .field("api_base_url", &self.api_base_url)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("phone_number_id", &self.phone_number_id)
            .field("verify_token", &"<redacted>")
            .field("send_timeout_seconds", &self.send_timeout_seconds)
            .finish()
    }
}

fn default_api_base_url() -> String {
    "https://graph.facebook.com/v17.0".to_string()
}

fn default_verify_token() -> String {
    "verify_token".to_string()
}

fn default_send_timeout() -> u64 {
    10
}

// ============================================================================
// WelcomeConfig
// ============================================================================

/// Media sent ahead of the service menu.
#[derive(Debug, Clone, Deserialize)]
pub struct WelcomeConfig {
    /// Public link to an image/GIF or video. Unset skips the media send.
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(default)]
    pub media_kind: MediaKind,
    #[serde(default = "default_welcome_caption")]
    pub caption: Option<String>,
}

impl Default for WelcomeConfig {
    fn default() -> Self {
        Self {
            media_url: None,
            media_kind: MediaKind::default(),
            caption: default_welcome_caption(),
        }
    }
}

fn default_welcome_caption() -> Option<String> {
    Some("Welcome to SubbuBot".to_string())
}

// ============================================================================
// ConfigError
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Yaml(#[from] serde_saphyr::Error),

    #[error("invalid value for {name}: {value:?}")]
    InvalidEnv { name: &'static str, value: String },
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.request_timeout_seconds, 30);
        assert_eq!(
            config.whatsapp.api_base_url,
            "https://graph.facebook.com/v17.0"
        );
        assert_eq!(config.whatsapp.verify_token, "verify_token");
        assert_eq!(config.whatsapp.send_timeout_seconds, 10);
        assert!(config.whatsapp.access_token.is_none());
        assert!(config.welcome.media_url.is_none());
        assert_eq!(config.welcome.media_kind, MediaKind::Image);
        assert_eq!(
            config.welcome.caption.as_deref(),
            Some("Welcome to SubbuBot")
        );
    }

    #[tokio::test]
    async fn test_load_missing_file_returns_defaults() {
        let tmp_dir = TempDir::new().unwrap();
        let missing_path = tmp_dir.path().join("missing-config.yaml");
        let config = Config::load(&missing_path).await.unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.whatsapp.verify_token, "verify_token");
    }

    #[tokio::test]
    async fn test_load_valid_yaml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
server:
  host: "127.0.0.1"
  port: 3000
  request_timeout_seconds: 10
whatsapp:
  api_base_url: "http://localhost:9999/v17.0"
  access_token: "EAAB"
  phone_number_id: "1234"
  verify_token: "s3cret"
  send_timeout_seconds: 5
welcome:
  media_url: "https://cdn.example.com/welcome.mp4"
  media_kind: video
  caption: "Hello!"
"#
        )
        .unwrap();

        let config = Config::load(file.path()).await.unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.request_timeout_seconds, 10);
        assert_eq!(config.whatsapp.api_base_url, "http://localhost:9999/v17.0");
        assert_eq!(config.whatsapp.access_token.as_deref(), Some("EAAB"));
        assert_eq!(config.whatsapp.phone_number_id.as_deref(), Some("1234"));
        assert_eq!(config.whatsapp.verify_token, "s3cret");
        assert_eq!(config.whatsapp.send_timeout_seconds, 5);
        assert_eq!(
            config.welcome.media_url.as_deref(),
            Some("https://cdn.example.com/welcome.mp4")
        );
        assert_eq!(config.welcome.media_kind, MediaKind::Video);
        assert_eq!(config.welcome.caption.as_deref(), Some("Hello!"));
    }

    #[tokio::test]
    async fn test_load_partial_yaml_uses_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
server:
  port: 9000
"#
        )
        .unwrap();

        let config = Config::load(file.path()).await.unwrap();
        assert_eq!(config.server.host, "0.0.0.0"); // default
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.whatsapp.verify_token, "verify_token"); // default
        assert!(config.welcome.media_url.is_none()); // default
    }

    #[tokio::test]
    async fn test_load_invalid_yaml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "invalid: yaml: content: [").unwrap();

        let result = Config::load(file.path()).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_env_from(env(&[
                (ENV_WHATSAPP_TOKEN, "token-from-env"),
                (ENV_PHONE_NUMBER_ID, "555000"),
                (ENV_VERIFY_TOKEN, "hub-secret"),
                (ENV_WELCOME_MEDIA_URL, "https://cdn.example.com/hi.gif"),
                (ENV_API_BASE_URL, "http://127.0.0.1:1/v17.0"),
                (ENV_PORT, "8081"),
            ]))
            .unwrap();

        assert_eq!(config.whatsapp.access_token.as_deref(), Some("token-from-env"));
        assert_eq!(config.whatsapp.phone_number_id.as_deref(), Some("555000"));
        assert_eq!(config.whatsapp.verify_token, "hub-secret");
        assert_eq!(config.whatsapp.api_base_url, "http://127.0.0.1:1/v17.0");
        assert_eq!(
            config.welcome.media_url.as_deref(),
            Some("https://cdn.example.com/hi.gif")
        );
        assert_eq!(config.server.port, 8081);
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let mut config = Config::default();
        config
            .apply_env_from(env(&[(ENV_VERIFY_TOKEN, ""), (ENV_WELCOME_MEDIA_URL, "  ")]))
            .unwrap();
        assert_eq!(config.whatsapp.verify_token, "verify_token");
        assert!(config.welcome.media_url.is_none());
    }

    #[test]
    fn test_invalid_port_env() {
        let mut config = Config::default();
        let err = config
            .apply_env_from(env(&[(ENV_PORT, "not-a-port")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { name: ENV_PORT, .. }));
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut config = WhatsAppConfig::default();
        config.access_token = Some("EAAB-very-secret".to_string());
        config.verify_token = "hub-secret".to_string();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("EAAB-very-secret"));
        assert!(!rendered.contains("hub-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_config_error_display() {
        let io_error = ConfigError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "test",
        ));
        assert!(io_error.to_string().contains("failed to read config file"));
    }
}
