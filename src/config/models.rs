//! Configuration data structures for the translator client.
//!
//! This module defines the schema for the client settings: the translation
//! API endpoints, how access tokens are obtained and where they are cached,
//! HTTP transport tuning, and logging.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Base URL of the V2 HTTP translation API.
pub const API_BASE_URL: &str = "http://api.microsofttranslator.com/V2/Http.svc";

/// Base URL of the V3 JSON API, only used by `TransformText`.
pub const TRANSFORM_BASE_URL: &str = "http://api.microsofttranslator.com/V3/json/";

/// Token issuing endpoint.
pub const AUTH_BASE_URL: &str = "https://api.cognitive.microsoft.com/sts/v1.0/issueToken";

/// OAuth scope requested in client-credentials mode.
pub const API_CLIENT_SCOPE: &str = "http://api.microsofttranslator.com";

/// Access tokens are valid for 10 minutes.
pub const AUTH_EXPIRE_SECONDS: u64 = 10 * 60;

/// The root configuration object.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TranslatorConfig {
    /// Translation API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Authorization endpoint and client credentials.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Access token cache backend.
    #[serde(default)]
    pub store: StoreConfig,

    /// Transport settings (timeouts, proxy).
    #[serde(default)]
    pub http: HttpConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings for the translation endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to.
    /// Default: `http://api.microsofttranslator.com/V2/Http.svc`
    #[serde(default = "default_api_base_url")]
    pub base_url: String,

    /// Base URL for `TransformText`.
    /// Default: `http://api.microsofttranslator.com/V3/json/`
    #[serde(default = "default_transform_url")]
    pub transform_url: String,

    /// Fixed access token. When set, every call uses it verbatim and the
    /// client never contacts the authorization endpoint nor caches anything.
    #[serde(default)]
    pub access_token: Option<String>,
}

/// How the authorization endpoint is called and how its answer is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// OAuth2 client-credentials grant; answer is a JSON object with
    /// `access_token` and optional `expires_in`.
    ClientCredentials,
    /// `Ocp-Apim-Subscription-Key` header; answer is the raw token string.
    SubscriptionKey,
}

/// Settings for access token acquisition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Authorization mode.
    /// Default: `subscription_key`
    #[serde(default = "default_auth_mode")]
    pub mode: AuthMode,

    /// Authorization endpoint.
    /// Default: `https://api.cognitive.microsoft.com/sts/v1.0/issueToken`
    #[serde(default = "default_auth_base_url")]
    pub base_url: String,

    /// Client id (client-credentials mode).
    #[serde(default)]
    pub client_id: Option<String>,

    /// Client secret (client-credentials mode).
    #[serde(default)]
    pub client_secret: Option<String>,

    /// OAuth scope (client-credentials mode).
    /// Default: `http://api.microsofttranslator.com`
    #[serde(default = "default_scope")]
    pub scope: String,

    /// Subscription key (subscription-key mode).
    #[serde(default)]
    pub subscription_key: Option<String>,
}

impl AuthConfig {
    /// Stable client identifier used to derive the credential identity.
    pub fn client_identifier(&self) -> Option<&str> {
        match self.mode {
            AuthMode::ClientCredentials => self.client_id.as_deref(),
            AuthMode::SubscriptionKey => self.subscription_key.as_deref(),
        }
        .filter(|id| !id.is_empty())
    }
}

/// Token cache backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    /// One JSON record per identity in a directory.
    File,
    /// Process-wide in-memory map.
    Memory,
}

/// Settings for the access token cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend.
    /// Default: `file`
    #[serde(default = "default_store_kind")]
    pub kind: StoreKind,

    /// Directory holding cached tokens for the file backend.
    /// Default: the system temporary directory.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl StoreConfig {
    pub fn dir_or_default(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// Proxy protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProxyKind {
    Http,
    Socks5,
}

/// Outgoing proxy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    pub host: String,

    /// Default: `3128`
    #[serde(default = "default_proxy_port")]
    pub port: u16,

    /// Default: `http`
    #[serde(default = "default_proxy_kind")]
    pub kind: ProxyKind,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,
}

impl ProxyConfig {
    /// Proxy URL; a host that already carries a scheme is kept as given.
    pub fn url(&self) -> String {
        if self.host.contains("://") {
            return format!("{}:{}", self.host.trim_end_matches('/'), self.port);
        }
        let scheme = match self.kind {
            ProxyKind::Http => "http",
            ProxyKind::Socks5 => "socks5",
        };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }
}

/// Settings for the HTTP transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Whole request timeout in seconds.
    /// Default: `10`
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Connect timeout in seconds.
    /// Default: `5`
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,

    /// Default: `ms-translator/<crate version>`
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default)]
    pub proxy: Option<ProxyConfig>,
}

/// Settings for logging output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum log level (`trace`, `debug`, `info`, `warn`, `error`).
    /// Default: `warn`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format for logs (`pretty`, `compact`, `json`).
    /// Default: `compact`
    #[serde(default = "default_log_format")]
    pub format: String,

    /// File that log lines are appended to instead of stderr.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            transform_url: default_transform_url(),
            access_token: None,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            mode: default_auth_mode(),
            base_url: default_auth_base_url(),
            client_id: None,
            client_secret: None,
            scope: default_scope(),
            subscription_key: None,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            kind: default_store_kind(),
            dir: None,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
            user_agent: default_user_agent(),
            proxy: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

fn default_api_base_url() -> String {
    API_BASE_URL.to_string()
}

fn default_transform_url() -> String {
    TRANSFORM_BASE_URL.to_string()
}

fn default_auth_mode() -> AuthMode {
    AuthMode::SubscriptionKey
}

fn default_auth_base_url() -> String {
    AUTH_BASE_URL.to_string()
}

fn default_scope() -> String {
    API_CLIENT_SCOPE.to_string()
}

fn default_store_kind() -> StoreKind {
    StoreKind::File
}

fn default_proxy_port() -> u16 {
    3128
}

fn default_proxy_kind() -> ProxyKind {
    ProxyKind::Http
}

fn default_timeout() -> u64 {
    10
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_user_agent() -> String {
    format!("ms-translator/{}", env!("CARGO_PKG_VERSION"))
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "compact".to_string()
}
