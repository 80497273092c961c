// Access token persistence
// Author: kelexine (https://github.com/kelexine)

mod file;
mod memory;

pub use file::{FileStore, FILE_PREFIX};
pub use memory::MemoryStore;

use crate::config::{StoreConfig, StoreKind};
use crate::error::Result;
use crate::utils::clock::Clock;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use zeroize::Zeroize;

/// A bearer token and the epoch second it stops being usable.
#[derive(Clone, PartialEq, Eq, Deserialize, Serialize, Zeroize)]
#[zeroize(drop)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub token: String,
    pub expires_at: i64,
}

// Custom Debug impl that never logs tokens
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl Credential {
    pub fn new(token: impl Into<String>, expires_at: i64) -> Self {
        Self {
            token: token.into(),
            expires_at,
        }
    }

    /// Usable iff `now < expires_at` and the token is not empty.
    pub fn is_usable(&self, now: i64) -> bool {
        !self.token.is_empty() && now < self.expires_at
    }
}

/// Who a cached credential belongs to.
///
/// Clients built from the same API base URL and client identifier derive the
/// same key and therefore share one cached token, across instances and across
/// processes using the same file store directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialIdentity {
    pub base_url: String,
    pub client_id: String,
}

impl CredentialIdentity {
    pub fn new(base_url: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client_id: client_id.into(),
        }
    }

    /// Lowercase hex SHA-256 of `"<base_url>/<client_id>"`.
    pub fn key(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.base_url.as_bytes());
        hasher.update(b"/");
        hasher.update(self.client_id.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Persistence capability for one credential identity.
///
/// `get` never returns an expired credential and `has` answers `false` for
/// one, so callers cannot tell "never stored" from "expired".
pub trait CredentialStore: Send + Sync {
    fn has(&self) -> bool {
        self.get().is_some()
    }

    fn get(&self) -> Option<Credential>;

    /// Stores `token` until `now + ttl_seconds`, replacing any previous one.
    fn store(&self, token: &str, ttl_seconds: u64) -> Result<()>;

    /// Removes this identity's credential. `Ok(false)` when none was stored.
    fn delete(&self) -> Result<bool>;

    /// Removes every expired credential known to this store; returns how many.
    fn sweep_expired(&self) -> Result<usize>;

    /// Removes every credential known to this store; returns how many.
    fn delete_all(&self) -> Result<usize>;

    /// Short backend name for logs.
    fn backend(&self) -> &'static str;
}

/// Builds the configured backend for `identity`.
pub fn build_store(
    config: &StoreConfig,
    identity: CredentialIdentity,
    clock: Arc<dyn Clock>,
) -> Box<dyn CredentialStore> {
    match config.kind {
        StoreKind::File => Box::new(FileStore::new(config.dir_or_default(), identity, clock)),
        StoreKind::Memory => Box::new(MemoryStore::process_wide(identity, clock)),
    }
}

fn expiry(now: i64, ttl_seconds: u64) -> i64 {
    now.saturating_add(i64::try_from(ttl_seconds).unwrap_or(i64::MAX))
}
