//! Access token lifecycle management.
//!
//! This module provides the `TokenManager`, which hands out a usable bearer
//! token for one credential identity. Tokens are read from the configured
//! `CredentialStore` first; when none is usable a new one is requested from
//! the authorization endpoint, decoded according to the configured
//! `AuthMode`, and persisted before being returned. Refreshes are serialized
//! per manager so concurrent callers sharing a manager trigger one
//! authorization round-trip.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use super::{decode_token_response, IssuedToken};
use crate::config::{AuthConfig, AuthMode};
use crate::error::{Result, TranslatorError};
use crate::http::{HttpRequest, Method, Params, Transport};
use crate::store::CredentialStore;
use crate::utils::logging::mask_token;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Header carrying the subscription key in subscription-key mode.
pub const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Obtains and caches access tokens for one identity.
pub struct TokenManager {
    config: AuthConfig,
    transport: Arc<dyn Transport>,
    store: Box<dyn CredentialStore>,
    /// Serializes authorization round-trips.
    refresh_lock: Mutex<()>,
}

impl TokenManager {
    /// Builds a manager after checking that `config` carries the
    /// credentials its mode requires.
    ///
    /// # Errors
    ///
    /// Returns `TranslatorError::Configuration` when a required credential
    /// is missing or empty.
    pub fn new(
        config: AuthConfig,
        transport: Arc<dyn Transport>,
        store: Box<dyn CredentialStore>,
    ) -> Result<Self> {
        Self::validate(&config)?;

        debug!(
            "Token manager ready (mode {:?}, {} store)",
            config.mode,
            store.backend()
        );

        Ok(Self {
            config,
            transport,
            store,
            refresh_lock: Mutex::new(()),
        })
    }

    /// Checks the credentials for the configured mode and returns the client
    /// identifier the credential identity is derived from.
    pub fn validate(config: &AuthConfig) -> Result<&str> {
        let missing = |field: &str| {
            TranslatorError::Configuration(format!(
                "auth.{} is required in {:?} mode",
                field, config.mode
            ))
        };

        if config.base_url.trim().is_empty() {
            return Err(missing("base_url"));
        }

        match config.mode {
            AuthMode::ClientCredentials => {
                if config.client_id.as_deref().unwrap_or_default().is_empty() {
                    return Err(missing("client_id"));
                }
                if config.client_secret.as_deref().unwrap_or_default().is_empty() {
                    return Err(missing("client_secret"));
                }
            }
            AuthMode::SubscriptionKey => {
                if config.subscription_key.as_deref().unwrap_or_default().is_empty() {
                    return Err(missing("subscription_key"));
                }
            }
        }

        config
            .client_identifier()
            .ok_or_else(|| missing("client_id"))
    }

    pub fn mode(&self) -> AuthMode {
        self.config.mode
    }

    /// The store tokens are cached in.
    pub fn store(&self) -> &dyn CredentialStore {
        self.store.as_ref()
    }

    /// Returns a usable access token.
    ///
    /// With `force_new` the cache is bypassed and the fresh token replaces
    /// whatever was stored.
    pub fn access_token(&self, force_new: bool) -> Result<String> {
        // Fast path: a cached token is still valid.
        if !force_new {
            if let Some(credential) = self.lookup() {
                return Ok(credential);
            }
        }

        let _guard = self.refresh_lock.lock();

        // Re-check after gaining the lock; another caller may have refreshed.
        if !force_new {
            if let Some(credential) = self.store.get() {
                debug!("Access token already refreshed by a concurrent caller");
                return Ok(credential.token.clone());
            }
        }

        let issued = self.request_token()?;

        self.store.store(&issued.token, issued.ttl_seconds)?;
        info!(
            "New access token {} cached in {} store for {}s",
            mask_token(&issued.token),
            self.store.backend(),
            issued.ttl_seconds
        );

        Ok(issued.token.clone())
    }

    fn lookup(&self) -> Option<String> {
        match self.store.get() {
            Some(credential) => {
                crate::metrics::record_token_lookup(true);
                debug!("Using cached access token {}", mask_token(&credential.token));
                Some(credential.token.clone())
            }
            None => {
                crate::metrics::record_token_lookup(false);
                debug!("No usable access token cached, requesting a new one");
                None
            }
        }
    }

    /// Describes the authorization call for the configured mode.
    fn authorization_request(&self) -> HttpRequest {
        let request = HttpRequest::new(Method::Post, &self.config.base_url).content_type(None);

        match self.config.mode {
            AuthMode::ClientCredentials => request.params(Params::pairs([
                ("grant_type", "client_credentials"),
                ("client_id", self.config.client_id.as_deref().unwrap_or_default()),
                ("client_secret", self.config.client_secret.as_deref().unwrap_or_default()),
                ("scope", self.config.scope.as_str()),
            ])),
            AuthMode::SubscriptionKey => request.header(
                SUBSCRIPTION_KEY_HEADER,
                self.config.subscription_key.as_deref().unwrap_or_default(),
            ),
        }
    }

    /// Performs exactly one authorization round-trip.
    fn request_token(&self) -> Result<IssuedToken> {
        let raw = self.transport.send(&self.authorization_request());

        if let Some(err) = TranslatorError::from_raw(&raw) {
            crate::metrics::record_auth_request(err.kind());
            warn!("Unable to get an access token: {}", raw.describe());
            return Err(err);
        }

        let body = raw.body().unwrap_or_default();
        match decode_token_response(self.config.mode, body) {
            Ok(issued) => {
                crate::metrics::record_auth_request("success");
                Ok(issued)
            }
            Err(e) => {
                crate::metrics::record_auth_request("auth_decode");
                warn!("Authorization answer rejected: {}", e);
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::RawResult;
    use crate::store::{CredentialIdentity, MemoryStore};
    use crate::utils::clock::ManualClock;
    use std::collections::VecDeque;

    #[derive(Default)]
    struct Scripted {
        answers: Mutex<VecDeque<RawResult>>,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl Scripted {
        fn with(answers: Vec<RawResult>) -> Arc<Self> {
            Arc::new(Self {
                answers: Mutex::new(answers.into()),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    impl Transport for Scripted {
        fn send(&self, request: &HttpRequest) -> RawResult {
            self.seen.lock().push(request.clone());
            self.answers.lock().pop_front().unwrap_or(RawResult::Response {
                status: 500,
                body: "unscripted".to_string(),
                latency_ms: 0,
            })
        }
    }

    fn ok(body: &str) -> RawResult {
        RawResult::Response { status: 200, body: body.to_string(), latency_ms: 1 }
    }

    /// Log output sink shared with a test subscriber.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn key_config() -> AuthConfig {
        AuthConfig {
            subscription_key: Some("key".to_string()),
            ..AuthConfig::default()
        }
    }

    fn memory() -> Box<dyn CredentialStore> {
        Box::new(MemoryStore::isolated(
            CredentialIdentity::new("http://api.example.com", "key"),
            ManualClock::new(0),
        ))
    }

    #[test]
    fn test_validate_requires_mode_credentials() {
        assert!(matches!(
            TokenManager::validate(&AuthConfig::default()),
            Err(TranslatorError::Configuration(_))
        ));

        let config = AuthConfig {
            mode: AuthMode::ClientCredentials,
            client_id: Some("id".to_string()),
            ..AuthConfig::default()
        };
        assert!(TokenManager::validate(&config).is_err());

        let config = AuthConfig {
            client_secret: Some("secret".to_string()),
            ..config
        };
        assert_eq!(TokenManager::validate(&config).unwrap(), "id");
    }

    #[test]
    fn test_token_is_cached() {
        let transport = Scripted::with(vec![ok("tok-1")]);
        let manager = TokenManager::new(key_config(), transport.clone(), memory()).unwrap();

        assert_eq!(manager.access_token(false).unwrap(), "tok-1");
        assert_eq!(manager.access_token(false).unwrap(), "tok-1");
        assert_eq!(transport.seen.lock().len(), 1);
    }

    #[test]
    fn test_force_new_bypasses_cache() {
        let transport = Scripted::with(vec![ok("tok-1"), ok("tok-2")]);
        let manager = TokenManager::new(key_config(), transport.clone(), memory()).unwrap();

        assert_eq!(manager.access_token(false).unwrap(), "tok-1");
        assert_eq!(manager.access_token(true).unwrap(), "tok-2");
        assert_eq!(manager.store().get().unwrap().token, "tok-2");
    }

    #[test]
    fn test_subscription_key_request_shape() {
        let transport = Scripted::with(vec![ok("tok")]);
        let manager = TokenManager::new(key_config(), transport.clone(), memory()).unwrap();
        manager.access_token(false).unwrap();

        let seen = transport.seen.lock();
        let request = &seen[0];
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.bearer_token, None);
        assert_eq!(request.params, Params::Empty);
        assert_eq!(
            request.headers,
            vec![(SUBSCRIPTION_KEY_HEADER.to_string(), "key".to_string())]
        );
    }

    #[test]
    fn test_client_credentials_request_shape() {
        let config = AuthConfig {
            mode: AuthMode::ClientCredentials,
            client_id: Some("id".to_string()),
            client_secret: Some("secret".to_string()),
            ..AuthConfig::default()
        };
        let transport = Scripted::with(vec![ok(r#"{"access_token":"tok","expires_in":600}"#)]);
        let manager = TokenManager::new(config, transport.clone(), memory()).unwrap();
        manager.access_token(false).unwrap();

        let seen = transport.seen.lock();
        let params = &seen[0].params;
        assert_eq!(params.get("grant_type"), Some("client_credentials"));
        assert_eq!(params.get("client_id"), Some("id"));
        assert_eq!(params.get("client_secret"), Some("secret"));
        assert_eq!(params.get("scope"), Some("http://api.microsofttranslator.com"));
        assert!(seen[0].headers.is_empty());
    }

    #[test]
    fn test_failed_authorization_stores_nothing() {
        let transport = Scripted::with(vec![RawResult::Response {
            status: 401,
            body: r#"{"error":"invalid_client"}"#.to_string(),
            latency_ms: 3,
        }]);
        let manager = TokenManager::new(key_config(), transport, memory()).unwrap();

        let err = manager.access_token(false).unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.service_error().as_deref(), Some("invalid_client"));
        assert!(!manager.store().has());
    }

    #[test]
    fn test_rejected_authorization_logs_no_error_event() {
        let transport = Scripted::with(vec![RawResult::Response {
            status: 401,
            body: "denied".to_string(),
            latency_ms: 1,
        }]);
        let manager = TokenManager::new(key_config(), transport, memory()).unwrap();

        let captured = Captured::default();
        let sink = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::ERROR)
            .with_ansi(false)
            .with_writer(move || sink.clone())
            .finish();

        let result = tracing::subscriber::with_default(subscriber, || manager.access_token(false));

        assert_eq!(result.unwrap_err().status(), Some(401));
        assert!(captured.0.lock().is_empty());
    }
}
