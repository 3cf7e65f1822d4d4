//! # Client Cache
//!
//! Get-or-create storage for long-lived client handles, one key-space per
//! (role, deployment mode) pair.
//!
//! Every key owns a lazily-initialized slot (`tokio::sync::OnceCell`) inside a
//! `DashMap`. Concurrent callers for one key wait on a single construction
//! while callers for other keys proceed untouched; the map shard lock is never
//! held across the constructor's await. A failed construction removes its
//! empty slot so the next call starts from scratch. Entries are never evicted.
//!
//! The one remaining window: when a construction fails while another caller
//! is already waiting on that slot, the waiter constructs on the detached slot
//! and may race a newcomer that created a fresh one. Whichever slot is in the
//! map afterwards is the one retained.

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::OnceCell;
use tracing::debug;

use super::cache_key::CacheKey;
use super::clients::{ConsumerHandle, SenderHandle};
use super::mode::DeploymentMode;
use crate::error::ClientFactoryResult;

/// One key-space of cached handles
#[derive(Debug)]
pub struct ClientCache<H> {
    slots: DashMap<CacheKey, Arc<OnceCell<H>>>,
}

impl<H> Default for ClientCache<H> {
    fn default() -> Self {
        Self {
            slots: DashMap::new(),
        }
    }
}

impl<H: Clone + Send + Sync> ClientCache<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached handle for `key`, running `init` on a miss.
    ///
    /// `init` runs at most once per successful population of a key; its
    /// error is returned unchanged and leaves no entry behind.
    pub async fn get_or_try_init<F, Fut>(&self, key: &CacheKey, init: F) -> ClientFactoryResult<H>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ClientFactoryResult<H>>,
    {
        let slot = self.slots.entry(key.clone()).or_default().clone();

        if let Some(handle) = slot.get() {
            debug!(cache_key = %key, "client cache hit");
            return Ok(handle.clone());
        }

        match slot.get_or_try_init(init).await {
            Ok(handle) => {
                // Re-attach the slot if a failed attempt detached it meanwhile
                self.slots.entry(key.clone()).or_insert_with(|| slot.clone());
                Ok(handle.clone())
            }
            Err(err) => {
                self.slots
                    .remove_if(key, |_, current| Arc::ptr_eq(current, &slot) && current.get().is_none());
                Err(err)
            }
        }
    }

    /// Cached handle for `key`, if construction has completed
    pub fn get(&self, key: &CacheKey) -> Option<H> {
        self.slots
            .get(key)
            .and_then(|slot| slot.get().cloned())
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.get(key).is_some()
    }

    /// Number of populated entries
    pub fn len(&self) -> usize {
        self.slots
            .iter()
            .filter(|entry| entry.value().initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Populated keys, sorted
    pub fn keys(&self) -> Vec<CacheKey> {
        let mut keys: Vec<CacheKey> = self
            .slots
            .iter()
            .filter(|entry| entry.value().initialized())
            .map(|entry| entry.key().clone())
            .collect();
        keys.sort();
        keys
    }
}

/// The four independent key-spaces used by the client factory
#[derive(Debug, Default)]
pub struct ClientCaches {
    service_senders: ClientCache<SenderHandle>,
    service_consumers: ClientCache<ConsumerHandle>,
    sdk_senders: ClientCache<SenderHandle>,
    sdk_consumers: ClientCache<ConsumerHandle>,
}

impl ClientCaches {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn senders(&self, mode: DeploymentMode) -> &ClientCache<SenderHandle> {
        match mode {
            DeploymentMode::Service => &self.service_senders,
            DeploymentMode::Sdk => &self.sdk_senders,
        }
    }

    pub fn consumers(&self, mode: DeploymentMode) -> &ClientCache<ConsumerHandle> {
        match mode {
            DeploymentMode::Service => &self.service_consumers,
            DeploymentMode::Sdk => &self.sdk_consumers,
        }
    }

    pub fn stats(&self) -> ClientCacheStats {
        ClientCacheStats {
            service_senders: self.service_senders.keys(),
            service_consumers: self.service_consumers.keys(),
            sdk_senders: self.sdk_senders.keys(),
            sdk_consumers: self.sdk_consumers.keys(),
        }
    }
}

/// Snapshot of populated cache keys per key-space
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientCacheStats {
    pub service_senders: Vec<CacheKey>,
    pub service_consumers: Vec<CacheKey>,
    pub sdk_senders: Vec<CacheKey>,
    pub sdk_consumers: Vec<CacheKey>,
}

impl ClientCacheStats {
    pub fn total(&self) -> usize {
        self.service_senders.len()
            + self.service_consumers.len()
            + self.sdk_senders.len()
            + self.sdk_consumers.len()
    }
}
