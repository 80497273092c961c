// Error types for the translator client
// Author: kelexine (https://github.com/kelexine)

use crate::http::RawResult;
use thiserror::Error;
use tracing::error;

/// Why an authorization answer could not be turned into a token.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthDecodeError {
    #[error("Access token not found in response")]
    MissingToken,

    #[error("Access token found in response but it is not a string")]
    TokenNotString,

    #[error("Access token found in response but it is empty")]
    EmptyToken,

    #[error("Authorization response is not a JSON object: {0}")]
    InvalidJson(String),
}

#[derive(Error, Debug)]
pub enum TranslatorError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Transport error: {}", .0.describe())]
    Transport(RawResult),

    #[error("Authorization decode error: {0}")]
    AuthDecode(#[from] AuthDecodeError),

    #[error("HTTP status error: {}", .0.describe())]
    HttpStatus(RawResult),

    #[error("Validation error [{code}]: {message}")]
    Validation { code: &'static str, message: String },

    #[error("Unable to persist access token in {path}: {message}")]
    Persistence { path: String, message: String },

    #[error("Response decode error: {0}")]
    Decode(String),

    #[error("Config parsing error: {0}")]
    ConfigParsing(#[from] config::ConfigError),
}

impl TranslatorError {
    pub fn validation(code: &'static str, message: impl Into<String>) -> Self {
        TranslatorError::Validation {
            code,
            message: message.into(),
        }
    }

    /// Failed HTTP/transport call wrapped into the matching variant.
    ///
    /// Returns `None` for a 2xx answer.
    pub fn from_raw(raw: &RawResult) -> Option<Self> {
        match raw {
            RawResult::TransportFailure { .. } => Some(TranslatorError::Transport(raw.clone())),
            RawResult::Response { .. } if raw.is_success() => None,
            RawResult::Response { .. } => Some(TranslatorError::HttpStatus(raw.clone())),
        }
    }

    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            TranslatorError::Configuration(_) | TranslatorError::ConfigParsing(_) => "configuration",
            TranslatorError::Transport(_) => "transport",
            TranslatorError::AuthDecode(_) => "auth_decode",
            TranslatorError::HttpStatus(_) => "http_status",
            TranslatorError::Validation { .. } => "validation",
            TranslatorError::Persistence { .. } => "persistence",
            TranslatorError::Decode(_) => "decode",
        }
    }

    /// The raw transport result for HTTP and transport failures.
    pub fn raw_result(&self) -> Option<&RawResult> {
        match self {
            TranslatorError::Transport(raw) | TranslatorError::HttpStatus(raw) => Some(raw),
            _ => None,
        }
    }

    /// HTTP status of a non-2xx answer.
    pub fn status(&self) -> Option<u16> {
        match self {
            TranslatorError::HttpStatus(raw) => raw.status(),
            _ => None,
        }
    }

    /// `error` field of a JSON failure body, if the service sent one.
    pub fn service_error(&self) -> Option<String> {
        self.body_field("error")
    }

    /// `error_description` field of a JSON failure body.
    pub fn service_error_description(&self) -> Option<String> {
        self.body_field("error_description")
    }

    fn body_field(&self, field: &str) -> Option<String> {
        let body = self.raw_result()?.body()?;
        let json: serde_json::Value = serde_json::from_str(body).ok()?;
        json.get(field)?.as_str().map(str::to_string)
    }

    /// Emit the fatal event that accompanies every aborted call.
    pub fn log_fatal(&self, operation: &str) {
        error!(
            severity = "fatal",
            operation = operation,
            kind = self.kind(),
            "{}",
            crate::utils::logging::sanitize(&self.to_string())
        );
    }
}

pub type Result<T> = std::result::Result<T, TranslatorError>;
