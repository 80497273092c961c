// Blocking HTTP transport backed by reqwest
// Author: kelexine (https://github.com/kelexine)

use super::{HttpRequest, Method, Params, RawResult, Transport, TransportErrorKind};
use crate::config::{HttpConfig, ProxyConfig};
use crate::error::{Result, TranslatorError};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Transport issuing real network calls.
///
/// Timeout, user agent and proxy are fixed when the transport is built; there
/// is no retry and no cancellation beyond the configured timeouts.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .user_agent(config.user_agent.clone())
            .use_rustls_tls();

        if let Some(proxy) = &config.proxy {
            builder = builder.proxy(build_proxy(proxy)?);
            debug!("Routing API calls through proxy {}:{}", proxy.host, proxy.port);
        }

        let client = builder.build().map_err(|e| {
            TranslatorError::Configuration(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self { client })
    }
}

fn build_proxy(config: &ProxyConfig) -> Result<reqwest::Proxy> {
    let proxy = reqwest::Proxy::all(config.url()).map_err(|e| {
        TranslatorError::Configuration(format!("Invalid proxy {}: {}", config.host, e))
    })?;

    Ok(match &config.username {
        Some(user) => proxy.basic_auth(user, config.password.as_deref().unwrap_or_default()),
        None => proxy,
    })
}

fn classify(err: &reqwest::Error) -> TransportErrorKind {
    if err.is_timeout() {
        TransportErrorKind::Timeout
    } else if err.is_connect() {
        TransportErrorKind::Connect
    } else if err.is_builder() {
        TransportErrorKind::Builder
    } else if err.is_body() || err.is_decode() {
        TransportErrorKind::Body
    } else if err.is_request() {
        TransportErrorKind::Request
    } else {
        TransportErrorKind::Other
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

impl Transport for HttpTransport {
    fn send(&self, request: &HttpRequest) -> RawResult {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &request.url);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let mut content_type = request.content_type.clone();

        builder = match (&request.params, request.method) {
            (Params::Pairs(pairs), Method::Get) => {
                if pairs.is_empty() {
                    builder
                } else {
                    builder.query(pairs)
                }
            }
            // The form sets its own urlencoded content type.
            (Params::Pairs(pairs), _) => {
                content_type = None;
                builder.form(pairs)
            }
            (Params::Raw(body), Method::Get) => {
                if !body.is_empty() {
                    warn!("Ignoring raw body on GET {}", request.url);
                }
                builder
            }
            (Params::Raw(body), _) => builder.body(body.clone()),
            (Params::Empty, Method::Get) => builder,
            (Params::Empty, _) => builder.body(String::new()),
        };

        if let Some(content_type) = content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }

        if let Some(token) = &request.bearer_token {
            builder = builder.bearer_auth(token);
        }

        info!("{} {}", request.method, request.url);

        let start = Instant::now();
        let response = match builder.send() {
            Ok(response) => response,
            Err(e) => {
                let kind = classify(&e);
                error!("Transport error #{} on {} {}: {}", kind.code(), request.method, request.url, e);
                return RawResult::TransportFailure {
                    kind,
                    message: e.to_string(),
                    latency_ms: elapsed_ms(start),
                };
            }
        };

        let status = response.status().as_u16();
        let body = match response.text() {
            Ok(body) => body,
            Err(e) => {
                error!("Failed to read response body from {}: {}", request.url, e);
                return RawResult::TransportFailure {
                    kind: TransportErrorKind::Body,
                    message: e.to_string(),
                    latency_ms: elapsed_ms(start),
                };
            }
        };
        let latency_ms = elapsed_ms(start);

        if status >= 400 {
            error!(
                "Response HTTP code {}, body length {} bytes, duration {}ms on endpoint {} {}",
                status,
                body.len(),
                latency_ms,
                request.method,
                request.url
            );
        } else if status >= 300 {
            warn!(
                "Response HTTP code {}, body length {} bytes, duration {}ms on endpoint {} {}",
                status,
                body.len(),
                latency_ms,
                request.method,
                request.url
            );
        } else {
            info!(
                "Response HTTP code {}, body length {} bytes, duration {}ms",
                status,
                body.len(),
                latency_ms
            );
        }

        RawResult::Response {
            status,
            body,
            latency_ms,
        }
    }
}
