// In-memory credential store
// Author: kelexine (https://github.com/kelexine)

use super::{expiry, Credential, CredentialIdentity, CredentialStore};
use crate::error::Result;
use crate::utils::clock::Clock;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

type CredentialMap = Arc<RwLock<HashMap<String, Credential>>>;

/// Process-wide identity key → credential map shared by `process_wide` stores.
static PROCESS_CREDENTIALS: Lazy<CredentialMap> =
    Lazy::new(|| Arc::new(RwLock::new(HashMap::new())));

/// Credential store kept in memory.
///
/// Stores built with `process_wide` share one map, so every client in the
/// process with the same identity reuses the same token.
pub struct MemoryStore {
    key: String,
    credentials: CredentialMap,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    pub fn process_wide(identity: CredentialIdentity, clock: Arc<dyn Clock>) -> Self {
        Self {
            key: identity.key(),
            credentials: PROCESS_CREDENTIALS.clone(),
            clock,
        }
    }

    /// Store with its own private map.
    pub fn isolated(identity: CredentialIdentity, clock: Arc<dyn Clock>) -> Self {
        Self {
            key: identity.key(),
            credentials: Arc::new(RwLock::new(HashMap::new())),
            clock,
        }
    }

    /// Another identity backed by the same map as `self`.
    pub fn sibling(&self, identity: CredentialIdentity) -> Self {
        Self {
            key: identity.key(),
            credentials: self.credentials.clone(),
            clock: self.clock.clone(),
        }
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self) -> Option<Credential> {
        let now = self.clock.now();
        let credentials = self.credentials.read();
        let credential = credentials.get(&self.key).filter(|c| c.is_usable(now)).cloned();
        if credential.is_none() {
            debug!("No valid access token in memory for {}", &self.key[..16]);
        }
        credential
    }

    fn store(&self, token: &str, ttl_seconds: u64) -> Result<()> {
        let credential = Credential::new(token, expiry(self.clock.now(), ttl_seconds));
        self.credentials.write().insert(self.key.clone(), credential);
        info!("Access token stored in memory for {}s", ttl_seconds);
        Ok(())
    }

    fn delete(&self) -> Result<bool> {
        Ok(self.credentials.write().remove(&self.key).is_some())
    }

    fn sweep_expired(&self) -> Result<usize> {
        let now = self.clock.now();
        let mut credentials = self.credentials.write();
        let before = credentials.len();
        credentials.retain(|_, credential| now < credential.expires_at);
        let removed = before - credentials.len();
        if removed > 0 {
            debug!("Swept {} expired access tokens from memory", removed);
        }
        Ok(removed)
    }

    fn delete_all(&self) -> Result<usize> {
        let mut credentials = self.credentials.write();
        let count = credentials.len();
        credentials.clear();
        Ok(count)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
