//! Translator API client.
//!
//! `TranslatorClient` exposes one method per service operation. Each call
//! obtains a bearer token (at most one authorization round-trip), performs
//! exactly one API round-trip through the configured `Transport`, and decodes
//! the answer with the response normalizer. Failures are returned as
//! `TranslatorError` values after one fatal log event.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use super::{LanguageCodes, Response};
use crate::config::{ApiConfig, TranslatorConfig};
use crate::error::{Result, TranslatorError};
use crate::http::{HttpRequest, HttpTransport, Method, Params, Transport};
use crate::oauth::TokenManager;
use crate::store::{build_store, CredentialIdentity, CredentialStore};
use crate::translation::request::{
    array_of_string_body, break_sentences_params, detect_params, transform_params,
    translate_array_body, translate_params,
};
use crate::translation::{normalize, DecodeContext, ResponseShape, TranslateOptions};
use crate::utils::clock::{self, Clock};
use std::sync::Arc;
use tracing::{debug, info};

/// Placeholder application id the service still expects on every call.
const APP_ID_PARAM: &str = "appId";

/// Where bearer tokens come from.
pub enum TokenSource {
    /// Acquired and cached by a token manager.
    Managed(TokenManager),
    /// Used verbatim; nothing is requested nor cached.
    Fixed(String),
}

impl TokenSource {
    fn token(&self) -> Result<String> {
        match self {
            TokenSource::Managed(manager) => manager.access_token(false),
            TokenSource::Fixed(token) => Ok(token.clone()),
        }
    }
}

/// Client for the translation API.
pub struct TranslatorClient {
    api: ApiConfig,
    transport: Arc<dyn Transport>,
    tokens: TokenSource,
}

impl TranslatorClient {
    /// Creates a client issuing real network calls.
    ///
    /// # Errors
    ///
    /// Returns `TranslatorError::Configuration` when the HTTP client cannot be
    /// built or the credentials required by the auth mode are missing.
    pub fn new(config: TranslatorConfig) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new(&config.http)?);
        Self::from_parts(config, transport, clock::system())
    }

    /// Creates a client over an explicit transport and clock.
    pub fn from_parts(
        config: TranslatorConfig,
        transport: Arc<dyn Transport>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        if let Some(token) = config.api.access_token.clone().filter(|t| !t.is_empty()) {
            debug!("Using the configured access token; authorization is skipped");
            return Ok(Self {
                api: config.api,
                transport,
                tokens: TokenSource::Fixed(token),
            });
        }

        let client_id = TokenManager::validate(&config.auth)?;
        let identity = CredentialIdentity::new(config.api.base_url.clone(), client_id);
        let store = build_store(&config.store, identity, clock);
        let manager = TokenManager::new(config.auth, transport.clone(), store)?;

        Ok(Self::with_token_manager(config.api, transport, manager))
    }

    /// Creates a client around an existing token manager.
    pub fn with_token_manager(
        api: ApiConfig,
        transport: Arc<dyn Transport>,
        manager: TokenManager,
    ) -> Self {
        Self {
            api,
            transport,
            tokens: TokenSource::Managed(manager),
        }
    }

    pub fn token_manager(&self) -> Option<&TokenManager> {
        match &self.tokens {
            TokenSource::Managed(manager) => Some(manager),
            TokenSource::Fixed(_) => None,
        }
    }

    /// The credential store, for cleanup of cached tokens.
    pub fn store(&self) -> Option<&dyn CredentialStore> {
        self.token_manager().map(TokenManager::store)
    }

    /// Translates `text` into `to`.
    pub fn translate(&self, text: &str, to: &str, options: &TranslateOptions) -> Result<Response> {
        let params = translate_params(text, to, options);
        self.execute(
            Method::Get,
            "/Translate",
            self.api_url("/Translate"),
            params,
            DecodeContext::new(ResponseShape::Text),
        )
    }

    /// Translates every text of `texts` into `to`; answers map each input to
    /// its translation.
    pub fn translate_array<S: AsRef<str>>(
        &self,
        texts: &[S],
        to: &str,
        options: &TranslateOptions,
    ) -> Result<Response> {
        let texts = Self::non_empty(texts, "empty_texts", "texts array is empty.", "/TranslateArray")?;
        let body = translate_array_body(&texts, to, options);
        self.execute(
            Method::Post,
            "/TranslateArray",
            self.api_url("/TranslateArray"),
            Params::Raw(body),
            DecodeContext::new(ResponseShape::Translations).with_originals(&texts),
        )
    }

    /// Identifies the language of `text`.
    pub fn detect(&self, text: &str) -> Result<Response> {
        self.execute(
            Method::Get,
            "/Detect",
            self.api_url("/Detect"),
            detect_params(text),
            DecodeContext::new(ResponseShape::Text),
        )
    }

    /// Identifies the language of every text of `texts`.
    pub fn detect_array<S: AsRef<str>>(&self, texts: &[S]) -> Result<Response> {
        let texts = Self::non_empty(texts, "empty_texts", "texts array is empty.", "/DetectArray")?;
        let body = array_of_string_body(&texts);
        self.execute(
            Method::Post,
            "/DetectArray",
            self.api_url("/DetectArray"),
            Params::Raw(body),
            DecodeContext::new(ResponseShape::Strings).with_originals(&texts),
        )
    }

    /// Splits `text` into sentences.
    pub fn break_sentences(&self, text: &str, language: &str) -> Result<Response> {
        self.execute(
            Method::Get,
            "/BreakSentences",
            self.api_url("/BreakSentences"),
            break_sentences_params(text, language),
            DecodeContext::new(ResponseShape::SentenceLengths).with_source_text(text),
        )
    }

    /// Normalizes social media text; English only on the service side.
    pub fn transform_text(&self, text: &str, language: &str, category: &str) -> Result<Response> {
        self.execute(
            Method::Get,
            "/TransformText",
            join_url(&self.api.transform_url, "/TransformText"),
            transform_params(text, language, category),
            DecodeContext::new(ResponseShape::Json),
        )
    }

    /// Friendly names of `codes`, localized in `locale`.
    pub fn get_language_names(
        &self,
        locale: &str,
        codes: impl Into<LanguageCodes>,
    ) -> Result<Response> {
        let codes = codes.into();
        if codes.is_empty() {
            return Err(Self::rejected(
                "empty_language_codes",
                "languageCodes array is empty.",
                "/GetLanguageNames",
            ));
        }

        let codes = codes.into_vec();
        let url = format!(
            "{}?locale={}",
            self.api_url("/GetLanguageNames"),
            urlencoding::encode(locale)
        );
        self.execute(
            Method::Post,
            "/GetLanguageNames",
            url,
            Params::Raw(array_of_string_body(&codes)),
            DecodeContext::new(ResponseShape::Strings).with_originals(&codes),
        )
    }

    /// Language codes the service can translate between.
    pub fn get_languages_for_translate(&self) -> Result<Response> {
        self.execute(
            Method::Get,
            "/GetLanguagesForTranslate",
            self.api_url("/GetLanguagesForTranslate"),
            Params::Empty,
            DecodeContext::new(ResponseShape::Strings),
        )
    }

    fn api_url(&self, endpoint: &str) -> String {
        join_url(&self.api.base_url, endpoint)
    }

    fn non_empty<S: AsRef<str>>(
        items: &[S],
        code: &'static str,
        message: &str,
        endpoint: &str,
    ) -> Result<Vec<String>> {
        if items.is_empty() {
            return Err(Self::rejected(code, message, endpoint));
        }
        Ok(items.iter().map(|item| item.as_ref().to_string()).collect())
    }

    fn rejected(code: &'static str, message: &str, endpoint: &str) -> TranslatorError {
        let err = TranslatorError::validation(code, message);
        err.log_fatal(endpoint);
        err
    }

    /// Token, one round-trip, decode; logs the fatal event on failure.
    fn execute(
        &self,
        method: Method,
        endpoint: &'static str,
        url: String,
        params: Params,
        context: DecodeContext<'_>,
    ) -> Result<Response> {
        self.call(method, endpoint, url, params, context)
            .map_err(|err| {
                err.log_fatal(endpoint);
                err
            })
    }

    fn call(
        &self,
        method: Method,
        endpoint: &'static str,
        url: String,
        params: Params,
        context: DecodeContext<'_>,
    ) -> Result<Response> {
        let token = self.tokens.token()?;
        let (url, params) = with_app_id(url, params);

        let request = HttpRequest::new(method, &url)
            .bearer(Some(&token))
            .params(params.clone());

        let raw = self.transport.send(&request);
        crate::metrics::record_api_call(
            endpoint.trim_start_matches('/'),
            raw.status(),
            raw.latency_ms() as f64 / 1000.0,
        );

        let body = normalize(&raw, &context)?;
        info!("{} {} answered in {}ms", method, endpoint, raw.latency_ms());

        Ok(Response::new(endpoint, params, true, url, raw, body))
    }
}

/// `base` and `endpoint` joined by exactly one slash.
fn join_url(base: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        base.trim().trim_end_matches('/'),
        endpoint.trim().trim_start_matches('/')
    )
}

/// Adds the empty `appId` every call carries: as a parameter when the call
/// sends parameters, in the query string when it sends a raw body.
fn with_app_id(url: String, params: Params) -> (String, Params) {
    match params {
        Params::Empty => (url, Params::pairs([(APP_ID_PARAM, "")])),
        Params::Pairs(mut pairs) => {
            pairs.push((APP_ID_PARAM.to_string(), String::new()));
            (url, Params::Pairs(pairs))
        }
        Params::Raw(body) => {
            let separator = if url.contains('?') { '&' } else { '?' };
            (format!("{}{}{}=", url, separator, APP_ID_PARAM), Params::Raw(body))
        }
    }
}
