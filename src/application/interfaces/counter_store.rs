use std::time::Duration;

use async_trait::async_trait;

use crate::domain::DomainError;

/// The externally persisted counter behind the admission gate.
///
/// The quota window is the only mutable state shared across invocations,
/// including invocations running in other replicas, so it lives behind this
/// port rather than in the process. Correctness of the gate rests entirely on
/// `increment` being an atomic increment-and-read under concurrent callers;
/// no in-process locking supplements it.
///
/// Implementors: [`crate::connector::RedisCounterStore`] in production,
/// [`crate::connector::InMemoryCounterStore`] for single-process deployments
/// and tests.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Atomically increment the counter at `key` and return the
    /// post-increment value. Creates the key with value 1 when it is absent
    /// or already expired; a freshly created key carries no expiry until
    /// [`CounterStore::expire`] arms one.
    async fn increment(&self, key: &str) -> Result<u64, DomainError>;

    /// Arm (or re-arm) the expiry of `key` to `ttl` from now.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), DomainError>;

    /// Remaining time before `key` expires. Missing keys and keys without an
    /// expiry report zero.
    async fn time_to_live(&self, key: &str) -> Result<Duration, DomainError>;

    /// Overwrite `key` with `value` and an expiry of `ttl` from now,
    /// regardless of its current state.
    async fn set_with_expiry(
        &self,
        key: &str,
        value: u64,
        ttl: Duration,
    ) -> Result<(), DomainError>;
}
