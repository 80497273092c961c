// HTTP transport boundary
// Author: kelexine (https://github.com/kelexine)

mod client;

pub use client::HttpTransport;

use serde::Serialize;
use std::fmt;

/// Content type sent with every API call unless an operation overrides it.
pub const DEFAULT_CONTENT_TYPE: &str = "text/xml";

/// HTTP verbs understood by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request payload.
///
/// `Pairs` go to the query string for GET and to an urlencoded body otherwise.
/// `Raw` is sent verbatim as the body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Params {
    Empty,
    Pairs(Vec<(String, String)>),
    Raw(String),
}

impl Params {
    pub fn pairs<K, V, I>(items: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Params::Pairs(items.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    /// Look up a value among `Pairs`.
    pub fn get(&self, key: &str) -> Option<&str> {
        match self {
            Params::Pairs(pairs) => pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Params::Empty => true,
            Params::Pairs(pairs) => pairs.is_empty(),
            Params::Raw(body) => body.is_empty(),
        }
    }
}

/// A fully described outgoing call.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub bearer_token: Option<String>,
    pub params: Params,
    pub content_type: Option<String>,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            bearer_token: None,
            params: Params::Empty,
            content_type: Some(DEFAULT_CONTENT_TYPE.to_string()),
            headers: Vec::new(),
        }
    }

    pub fn bearer(mut self, token: Option<&str>) -> Self {
        self.bearer_token = token.map(str::to_string);
        self
    }

    pub fn params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    pub fn content_type(mut self, content_type: Option<&str>) -> Self {
        self.content_type = content_type.map(str::to_string);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Class of a failure that prevented any HTTP status from being received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportErrorKind {
    Builder,
    Connect,
    Timeout,
    Request,
    Body,
    Other,
}

impl TransportErrorKind {
    /// Stable numeric code for the failure class.
    pub fn code(&self) -> u32 {
        match self {
            TransportErrorKind::Builder => 3,
            TransportErrorKind::Connect => 7,
            TransportErrorKind::Timeout => 28,
            TransportErrorKind::Request => 55,
            TransportErrorKind::Body => 56,
            TransportErrorKind::Other => 1,
        }
    }
}

/// Outcome of exactly one transport call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RawResult {
    Response {
        status: u16,
        body: String,
        latency_ms: u64,
    },
    TransportFailure {
        kind: TransportErrorKind,
        message: String,
        latency_ms: u64,
    },
}

impl RawResult {
    pub fn status(&self) -> Option<u16> {
        match self {
            RawResult::Response { status, .. } => Some(*status),
            RawResult::TransportFailure { .. } => None,
        }
    }

    pub fn body(&self) -> Option<&str> {
        match self {
            RawResult::Response { body, .. } => Some(body),
            RawResult::TransportFailure { .. } => None,
        }
    }

    pub fn latency_ms(&self) -> u64 {
        match self {
            RawResult::Response { latency_ms, .. } | RawResult::TransportFailure { latency_ms, .. } => {
                *latency_ms
            }
        }
    }

    /// True for a received 2xx status.
    pub fn is_success(&self) -> bool {
        matches!(self.status(), Some(status) if (200..300).contains(&status))
    }

    /// Short human description used in error messages.
    pub fn describe(&self) -> String {
        match self {
            RawResult::Response { status, body, .. } => format!("HTTP {}: {}", status, body),
            RawResult::TransportFailure { kind, message, .. } => {
                format!("#{} ({:?}) {}", kind.code(), kind, message)
            }
        }
    }
}

/// Capability used by the token manager and the client to reach the service.
///
/// Implementations must not interpret tokens or bodies.
pub trait Transport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> RawResult;

    fn get(&self, url: &str, bearer_token: Option<&str>, params: Params) -> RawResult {
        self.send(&HttpRequest::new(Method::Get, url).bearer(bearer_token).params(params))
    }

    fn post(&self, url: &str, bearer_token: Option<&str>, params: Params) -> RawResult {
        self.send(&HttpRequest::new(Method::Post, url).bearer(bearer_token).params(params))
    }

    fn put(&self, url: &str, bearer_token: Option<&str>, params: Params) -> RawResult {
        self.send(&HttpRequest::new(Method::Put, url).bearer(bearer_token).params(params))
    }

    fn delete(&self, url: &str, bearer_token: Option<&str>, params: Params) -> RawResult {
        self.send(&HttpRequest::new(Method::Delete, url).bearer(bearer_token).params(params))
    }
}
