// Access token acquisition module
// Author: kelexine (https://github.com/kelexine)

mod manager;

pub use manager::TokenManager;

use crate::config::{AuthMode, AUTH_EXPIRE_SECONDS};
use crate::error::AuthDecodeError;
use zeroize::Zeroize;

/// A token fresh from the authorization endpoint.
#[derive(Clone, PartialEq, Eq, Zeroize)]
#[zeroize(drop)]
pub struct IssuedToken {
    pub token: String,
    pub ttl_seconds: u64,
}

// Custom Debug impl that never logs tokens
impl std::fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedToken")
            .field("token", &"[REDACTED]")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

/// Decodes a 2xx authorization answer according to `mode`.
///
/// Client-credentials answers are JSON objects carrying `access_token` and an
/// optional `expires_in` (number or numeric string). Subscription-key answers
/// are the bare token.
pub fn decode_token_response(mode: AuthMode, body: &str) -> Result<IssuedToken, AuthDecodeError> {
    match mode {
        AuthMode::SubscriptionKey => {
            let token = body.trim();
            if token.is_empty() {
                return Err(AuthDecodeError::EmptyToken);
            }
            Ok(IssuedToken {
                token: token.to_string(),
                ttl_seconds: AUTH_EXPIRE_SECONDS,
            })
        }
        AuthMode::ClientCredentials => {
            let json: serde_json::Value = serde_json::from_str(body.trim_start_matches('\u{feff}'))
                .map_err(|e| AuthDecodeError::InvalidJson(e.to_string()))?;

            let object = json
                .as_object()
                .ok_or_else(|| AuthDecodeError::InvalidJson("expected a JSON object".to_string()))?;

            let token = match object.get("access_token") {
                None => return Err(AuthDecodeError::MissingToken),
                Some(serde_json::Value::String(token)) => token.clone(),
                Some(_) => return Err(AuthDecodeError::TokenNotString),
            };

            if token.is_empty() {
                return Err(AuthDecodeError::EmptyToken);
            }

            let ttl_seconds = object
                .get("expires_in")
                .and_then(parse_expires_in)
                .unwrap_or(AUTH_EXPIRE_SECONDS);

            Ok(IssuedToken { token, ttl_seconds })
        }
    }
}

fn parse_expires_in(value: &serde_json::Value) -> Option<u64> {
    match value {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
