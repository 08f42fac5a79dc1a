//! First-run onboarding flag.

use crate::storage::kv_store::KvStore;

pub const ONBOARDING_KEY: &str = "hasOnboarded";

/// Persistent "has seen onboarding" flag in a [`KvStore`].
///
/// Read failures count as not onboarded; showing the intro twice is harmless.
pub struct OnboardingFlag<K: KvStore> {
    kv: K,
}

impl<K: KvStore> OnboardingFlag<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    pub async fn has_onboarded(&self) -> bool {
        match self.kv.get(ONBOARDING_KEY).await {
            Ok(value) => value.as_deref() == Some("true"),
            Err(e) => {
                tracing::warn!("failed to read onboarding flag: {e}");
                false
            }
        }
    }

    /// Record that onboarding was completed. Failures are logged, not returned.
    pub async fn mark_onboarded(&self) {
        if let Err(e) = self.kv.set(ONBOARDING_KEY, "true").await {
            tracing::warn!("failed to save onboarding flag: {e}");
        }
    }

    /// Forget the flag so onboarding shows again.
    pub async fn reset(&self) {
        if let Err(e) = self.kv.delete(ONBOARDING_KEY).await {
            tracing::warn!("failed to clear onboarding flag: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::InMemoryKvStore;

    #[tokio::test]
    async fn test_flag_lifecycle() {
        let kv = InMemoryKvStore::new();
        let flag = OnboardingFlag::new(kv.clone());

        assert!(!flag.has_onboarded().await);
        flag.mark_onboarded().await;
        assert!(flag.has_onboarded().await);
        assert_eq!(kv.raw(ONBOARDING_KEY).as_deref(), Some("true"));

        flag.reset().await;
        assert!(!flag.has_onboarded().await);
    }

    #[tokio::test]
    async fn test_unexpected_value_is_not_onboarded() {
        let kv = InMemoryKvStore::new();
        kv.put_raw(ONBOARDING_KEY, "yes");
        assert!(!OnboardingFlag::new(kv).has_onboarded().await);
    }

    #[tokio::test]
    async fn test_read_failure_counts_as_not_onboarded() {
        let kv = InMemoryKvStore::new();
        kv.put_raw(ONBOARDING_KEY, "true");
        kv.fail_reads(true);
        assert!(!OnboardingFlag::new(kv).has_onboarded().await);
    }

    #[tokio::test]
    async fn test_write_failure_is_swallowed() {
        let kv = InMemoryKvStore::new();
        kv.fail_writes(true);
        let flag = OnboardingFlag::new(kv.clone());
        flag.mark_onboarded().await;
        assert!(kv.raw(ONBOARDING_KEY).is_none());
    }
}
