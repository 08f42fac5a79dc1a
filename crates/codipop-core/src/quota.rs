//! Daily composition quota backed by the key-value store.
//!
//! The record is keyed by the device-local calendar date and rolls forward
//! lazily: the first read on a new day resets it and persists the reset.
//!
//! Storage faults fail open. An unreadable or malformed record is treated as
//! a fresh window, so a broken store never blocks the user. The quota is a
//! best-effort client-side control, not a billing boundary.

use codipop_types::quota::{DailyQuota, QUOTA_KEY, StoredQuota};

use crate::clock::Clock;
use crate::storage::kv_store::KvStore;

/// Tracks "date of last reset" + "count used today" in a [`KvStore`].
pub struct QuotaStore<K: KvStore, C: Clock> {
    kv: K,
    clock: C,
    limit: u32,
}

impl<K: KvStore, C: Clock> QuotaStore<K, C> {
    pub fn new(kv: K, clock: C, limit: u32) -> Self {
        Self { kv, clock, limit }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Calls left today, never negative.
    pub async fn remaining(&self) -> u32 {
        self.snapshot().await.remaining()
    }

    /// Consume one call if any remain. Returns false without mutating otherwise.
    pub async fn try_consume(&self) -> bool {
        let mut quota = self.snapshot().await;
        if quota.remaining() == 0 {
            return false;
        }

        quota.used += 1;
        self.persist(&quota).await;
        tracing::debug!(used = quota.used, limit = quota.limit, "consumed try-on quota");
        true
    }

    /// Current record for today, after any lazy reset.
    pub async fn snapshot(&self) -> DailyQuota {
        let today = self.clock.today();

        let stored = self
            .read_stored()
            .await
            .map(|stored| DailyQuota::from_stored(stored, self.limit));

        match stored {
            Some(quota) if !quota.is_stale(today) => quota,
            _ => {
                let fresh = DailyQuota::fresh(today, self.limit);
                self.persist(&fresh).await;
                fresh
            }
        }
    }

    async fn read_stored(&self) -> Option<StoredQuota> {
        let raw = match self.kv.get(QUOTA_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("quota record unreadable, treating as fresh: {e}");
                return None;
            }
        };

        match serde_json::from_str::<StoredQuota>(&raw) {
            Ok(stored) => Some(stored),
            Err(e) => {
                tracing::warn!("quota record malformed, treating as fresh: {e}");
                None
            }
        }
    }

    async fn persist(&self, quota: &DailyQuota) {
        let encoded = match serde_json::to_string(&quota.to_stored()) {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::warn!("failed to encode quota record: {e}");
                return;
            }
        };

        if let Err(e) = self.kv.set(QUOTA_KEY, &encoded).await {
            tracing::warn!("failed to persist quota record: {e}");
        }
    }
}
