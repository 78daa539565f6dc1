use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::application::CounterStore;
use crate::domain::DomainError;

/// A quota window held by [`InMemoryCounterStore`].
///
/// `expires_at` is `None` until an expiry is armed, mirroring a freshly
/// incremented key that has not been given a TTL yet.
#[derive(Debug, Clone, Copy)]
struct Window {
    count: u64,
    expires_at: Option<Instant>,
}

impl Window {
    fn is_expired(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(deadline) => now >= deadline,
            None => false,
        }
    }
}

/// In-process [`CounterStore`] used as the fallback when no Redis URL is
/// configured, and as the fake in tests.
///
/// Expired windows are discarded lazily the next time their key is touched,
/// so the observable semantics match a TTL-based external store: an
/// increment on an expired key starts a fresh count at 1 with no expiry.
/// The counter is not shared across processes.
pub struct InMemoryCounterStore {
    windows: Arc<Mutex<HashMap<String, Window>>>,
}

impl InMemoryCounterStore {
    pub fn new() -> Self {
        Self {
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Current count for `key`, or `None` when the key is absent or expired.
    /// Diagnostic accessor used by tests to observe the stored state.
    pub async fn current_count(&self, key: &str) -> Option<u64> {
        let windows = self.windows.lock().await;
        let now = Instant::now();
        windows
            .get(key)
            .filter(|window| !window.is_expired(now))
            .map(|window| window.count)
    }
}

impl Default for InMemoryCounterStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn increment(&self, key: &str) -> Result<u64, DomainError> {
        let mut windows = self.windows.lock().await;
        let now = Instant::now();
        match windows.get_mut(key) {
            Some(window) if !window.is_expired(now) => {
                window.count += 1;
                Ok(window.count)
            }
            _ => {
                windows.insert(
                    key.to_string(),
                    Window {
                        count: 1,
                        expires_at: None,
                    },
                );
                Ok(1)
            }
        }
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), DomainError> {
        let mut windows = self.windows.lock().await;
        let now = Instant::now();
        if let Some(window) = windows.get_mut(key) {
            if !window.is_expired(now) {
                window.expires_at = Some(now + ttl);
            }
        }
        Ok(())
    }

    async fn time_to_live(&self, key: &str) -> Result<Duration, DomainError> {
        let windows = self.windows.lock().await;
        let now = Instant::now();
        let remaining = windows
            .get(key)
            .filter(|window| !window.is_expired(now))
            .and_then(|window| window.expires_at)
            .map(|deadline| deadline - now)
            .unwrap_or(Duration::ZERO);
        Ok(remaining)
    }

    async fn set_with_expiry(
        &self,
        key: &str,
        value: u64,
        ttl: Duration,
    ) -> Result<(), DomainError> {
        let mut windows = self.windows.lock().await;
        windows.insert(
            key.to_string(),
            Window {
                count: value,
                expires_at: Some(Instant::now() + ttl),
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_increment_starts_at_one_and_counts_up() {
        let store = InMemoryCounterStore::new();

        assert_eq!(store.increment("quota").await.unwrap(), 1);
        assert_eq!(store.increment("quota").await.unwrap(), 2);
        assert_eq!(store.increment("quota").await.unwrap(), 3);
        assert_eq!(store.current_count("quota").await, Some(3));
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let store = InMemoryCounterStore::new();

        store.increment("a").await.unwrap();
        store.increment("a").await.unwrap();
        store.increment("b").await.unwrap();

        assert_eq!(store.current_count("a").await, Some(2));
        assert_eq!(store.current_count("b").await, Some(1));
    }

    #[tokio::test]
    async fn test_increment_after_expiry_restarts_at_one() {
        let store = InMemoryCounterStore::new();

        store.increment("quota").await.unwrap();
        store.increment("quota").await.unwrap();
        store
            .expire("quota", Duration::from_millis(20))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(store.current_count("quota").await, None);
        assert_eq!(store.increment("quota").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_time_to_live_reports_remaining_window() {
        let store = InMemoryCounterStore::new();

        store.increment("quota").await.unwrap();
        store.expire("quota", Duration::from_secs(60)).await.unwrap();

        let remaining = store.time_to_live("quota").await.unwrap();
        assert!(remaining > Duration::from_secs(59));
        assert!(remaining <= Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_time_to_live_is_zero_for_missing_or_unarmed_keys() {
        let store = InMemoryCounterStore::new();

        assert_eq!(
            store.time_to_live("missing").await.unwrap(),
            Duration::ZERO
        );

        store.increment("unarmed").await.unwrap();
        assert_eq!(
            store.time_to_live("unarmed").await.unwrap(),
            Duration::ZERO
        );
    }

    #[tokio::test]
    async fn test_expire_on_missing_key_is_a_no_op() {
        let store = InMemoryCounterStore::new();

        store
            .expire("missing", Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(store.current_count("missing").await, None);
    }

    #[tokio::test]
    async fn test_set_with_expiry_overwrites_count_and_window() {
        let store = InMemoryCounterStore::new();

        for _ in 0..5 {
            store.increment("quota").await.unwrap();
        }
        store
            .set_with_expiry("quota", 1, Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(store.current_count("quota").await, Some(1));
        let remaining = store.time_to_live("quota").await.unwrap();
        assert!(remaining > Duration::from_secs(59));
        assert_eq!(store.increment("quota").await.unwrap(), 2);
    }
}
