//! Short-lived in-process credential cache.
//!
//! Entries are immutable and replaced wholesale (last writer wins). Locks are
//! held only for the map operation itself, never across an `.await`.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;

use super::credential::Credential;
use crate::types::CallerId;

#[derive(Debug, Clone)]
struct CacheEntry {
    credential: Credential,
    valid_until: DateTime<Utc>,
}

/// Per-caller credential cache with a bounded lifetime.
#[derive(Debug)]
pub struct CredentialCache {
    entries: RwLock<HashMap<CallerId, CacheEntry>>,
    ttl: Duration,
    skew: Duration,
}

impl CredentialCache {
    pub fn new(ttl: Duration, skew: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            skew,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    /// Return the cached credential if its deadline has not passed.
    pub async fn get(&self, caller: &CallerId) -> Option<Credential> {
        self.get_at(caller, Utc::now()).await
    }

    async fn get_at(&self, caller: &CallerId, now: DateTime<Utc>) -> Option<Credential> {
        let entries = self.entries.read().await;
        entries
            .get(caller)
            .filter(|entry| now < entry.valid_until)
            .map(|entry| entry.credential.clone())
    }

    /// Cache a credential until `min(now + ttl, expires_at - skew)`.
    pub async fn insert(&self, caller: &CallerId, credential: Credential) {
        self.insert_at(caller, credential, Utc::now()).await;
    }

    async fn insert_at(&self, caller: &CallerId, credential: Credential, now: DateTime<Utc>) {
        if !self.is_enabled() {
            return;
        }
        let Some(valid_until) = self.deadline(&credential, now) else {
            return;
        };
        let entry = CacheEntry {
            credential,
            valid_until,
        };
        self.entries.write().await.insert(caller.clone(), entry);
    }

    fn deadline(&self, credential: &Credential, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        // A TTL past chrono's range leaves the token's own expiry as the only bound
        let ttl_deadline = chrono::Duration::from_std(self.ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let deadline = match credential.expires_at {
            Some(expires_at) => {
                let skew = chrono::Duration::from_std(self.skew).ok()?;
                ttl_deadline.min(expires_at.checked_sub_signed(skew)?)
            }
            None => ttl_deadline,
        };
        (deadline > now).then_some(deadline)
    }

    /// Drop the cached credential for a caller.
    pub async fn invalidate(&self, caller: &CallerId) {
        self.entries.write().await.remove(caller);
    }

    /// Remove every entry whose deadline has passed. Returns how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| now < entry.valid_until);
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}
