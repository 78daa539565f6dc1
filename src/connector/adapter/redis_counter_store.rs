use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::debug;

use crate::application::CounterStore;
use crate::domain::DomainError;

/// Redis-backed [`CounterStore`]. This is the production store: every
/// gateway replica pointed at the same Redis shares one quota window.
///
/// Commands map one to one onto the trait: `INCR`, `EXPIRE`, `TTL` and
/// `SET .. EX`. TTLs are whole seconds; sub-second windows are rounded up
/// to one second. A `TTL` reply of -2 (missing key) or -1 (no expiry) is
/// reported as [`Duration::ZERO`].
#[derive(Clone)]
pub struct RedisCounterStore {
    connection: ConnectionManager,
}

impl RedisCounterStore {
    /// Connect to the Redis instance at `url`. Fails fast when the server
    /// is unreachable so a misconfigured deployment does not silently run
    /// without a shared counter.
    pub async fn connect(url: &str) -> Result<Self, DomainError> {
        let client = redis::Client::open(url)
            .map_err(|e| DomainError::store(format!("RedisCounterStore: invalid Redis URL: {e}")))?;
        let connection = ConnectionManager::new(client).await.map_err(|e| {
            DomainError::store(format!("RedisCounterStore: connection failed: {e}"))
        })?;
        debug!("RedisCounterStore: connected to {url}");
        Ok(Self { connection })
    }

    fn whole_seconds(ttl: Duration) -> u64 {
        ttl.as_secs().max(1)
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn increment(&self, key: &str) -> Result<u64, DomainError> {
        let mut connection = self.connection.clone();
        let count: i64 = connection
            .incr(key, 1)
            .await
            .map_err(|e| DomainError::store(format!("RedisCounterStore: INCR failed: {e}")))?;
        Ok(count.max(0) as u64)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), DomainError> {
        let mut connection = self.connection.clone();
        let _: () = connection
            .expire(key, Self::whole_seconds(ttl) as i64)
            .await
            .map_err(|e| DomainError::store(format!("RedisCounterStore: EXPIRE failed: {e}")))?;
        Ok(())
    }

    async fn time_to_live(&self, key: &str) -> Result<Duration, DomainError> {
        let mut connection = self.connection.clone();
        let ttl: i64 = connection
            .ttl(key)
            .await
            .map_err(|e| DomainError::store(format!("RedisCounterStore: TTL failed: {e}")))?;
        if ttl > 0 {
            Ok(Duration::from_secs(ttl as u64))
        } else {
            Ok(Duration::ZERO)
        }
    }

    async fn set_with_expiry(
        &self,
        key: &str,
        value: u64,
        ttl: Duration,
    ) -> Result<(), DomainError> {
        let mut connection = self.connection.clone();
        let _: () = connection
            .set_ex(key, value, Self::whole_seconds(ttl))
            .await
            .map_err(|e| DomainError::store(format!("RedisCounterStore: SET EX failed: {e}")))?;
        Ok(())
    }
}
