// Translation API client module
// Author: kelexine (https://github.com/kelexine)

mod translator;

pub use crate::translation::{ContentType, TranslateOptions};
pub use translator::{TokenSource, TranslatorClient};

use crate::http::{Params, RawResult};
use crate::translation::DecodedBody;
use serde::Serialize;
use std::fmt;

/// Outcome of one successful API call.
#[derive(Debug, Clone, Serialize)]
pub struct Response {
    endpoint: String,
    params: Params,
    used_auth: bool,
    url: String,
    raw: RawResult,
    body: DecodedBody,
}

impl Response {
    pub(crate) fn new(
        endpoint: impl Into<String>,
        params: Params,
        used_auth: bool,
        url: impl Into<String>,
        raw: RawResult,
        body: DecodedBody,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            params,
            used_auth,
            url: url.into(),
            raw,
            body,
        }
    }

    /// Endpoint path as called, e.g. `/Translate`.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Parameters or body sent. Parameter calls carry `appId` here; raw-body
    /// calls carry it in `url`.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Whether a bearer token was attached.
    pub fn used_auth(&self) -> bool {
        self.used_auth
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn raw(&self) -> &RawResult {
        &self.raw
    }

    pub fn body(&self) -> &DecodedBody {
        &self.body
    }

    pub fn into_body(self) -> DecodedBody {
        self.body
    }

    pub fn status(&self) -> Option<u16> {
        self.raw.status()
    }

    pub fn latency_ms(&self) -> u64 {
        self.raw.latency_ms()
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.body {
            DecodedBody::Text(text) => f.write_str(text),
            body => {
                let json = serde_json::to_string(body).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

/// One or several language codes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageCodes(Vec<String>);

impl LanguageCodes {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<&str> for LanguageCodes {
    fn from(code: &str) -> Self {
        LanguageCodes(vec![code.to_string()])
    }
}

impl From<String> for LanguageCodes {
    fn from(code: String) -> Self {
        LanguageCodes(vec![code])
    }
}

impl From<Vec<String>> for LanguageCodes {
    fn from(codes: Vec<String>) -> Self {
        LanguageCodes(codes)
    }
}

impl From<Vec<&str>> for LanguageCodes {
    fn from(codes: Vec<&str>) -> Self {
        LanguageCodes(codes.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for LanguageCodes {
    fn from(codes: &[&str]) -> Self {
        LanguageCodes(codes.iter().map(|c| c.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for LanguageCodes {
    fn from(codes: [&str; N]) -> Self {
        LanguageCodes(codes.iter().map(|c| c.to_string()).collect())
    }
}
