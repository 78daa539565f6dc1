use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::application::{CounterStore, Sleeper, TokioSleeper};
use crate::domain::{Admission, DomainError};

pub const DEFAULT_MAX_REQUESTS: u64 = 14;
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);
pub const DEFAULT_COUNTER_KEY: &str = "chatgate:window";

/// Added to the observed TTL before sleeping so the wait cannot race the
/// store's own eviction of the window.
const EXPIRY_GRACE: Duration = Duration::from_secs(1);

/// Fixed-window admission gate with blocking catch-up.
///
/// Every call increments a single shared counter in the [`CounterStore`];
/// the first increment of a window arms its expiry. Calls that land inside
/// the window's capacity proceed immediately. Calls that overflow are *not*
/// rejected: they read the window's remaining TTL, suspend for that long plus
/// a one-second grace, then reset the counter to 1 with a fresh expiry and
/// proceed. Overflow callers pay the wait cost so that every accepted request
/// is eventually served; latency is traded for guaranteed admission.
///
/// The counter is the only cross-invocation shared state; the gate holds no
/// locks and relies entirely on the store's atomic increment-and-read.
///
/// **Known defect, kept deliberately**: the post-wait reset is not
/// coordinated among waiters. When several callers overflow the same window,
/// each waits out the same TTL and each blindly rewrites the counter to 1 on
/// waking, clobbering increments made by callers that woke slightly earlier.
/// Right after a busy window turns over, this thundering herd can admit more
/// than `max_requests` in quick succession. A correct replacement would hand
/// the reset to exactly one caller (a conditional set) and have the rest
/// re-check instead of resetting; that changes admission counts after a
/// burst, so it is not applied here.
#[derive(Clone)]
pub struct AdmissionGate {
    store: Arc<dyn CounterStore>,
    sleeper: Arc<dyn Sleeper>,
    key: String,
    max_requests: u64,
    window: Duration,
}

impl AdmissionGate {
    pub fn new(store: Arc<dyn CounterStore>, max_requests: u64, window: Duration) -> Self {
        Self {
            store,
            sleeper: Arc::new(TokioSleeper),
            key: DEFAULT_COUNTER_KEY.to_string(),
            max_requests,
            window,
        }
    }

    /// Use a counter key other than [`DEFAULT_COUNTER_KEY`], e.g. to keep
    /// several deployments apart on one Redis instance. The quota stays
    /// global per key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Replace the sleeper, letting tests observe waits without real delays.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn max_requests(&self) -> u64 {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Admit one call, suspending it first when the current window is full.
    ///
    /// Never rejects; the error arm only surfaces counter-store failures.
    pub async fn admit(&self) -> Result<Admission, DomainError> {
        let slot = self.store.increment(&self.key).await?;

        if slot == 1 {
            // This call created the window; arm its expiry.
            self.store.expire(&self.key, self.window).await?;
        }

        if slot <= self.max_requests {
            debug!(
                "Admitted request at slot {}/{} of the current window",
                slot, self.max_requests
            );
            return Ok(Admission::immediate(slot));
        }

        let ttl = self.store.time_to_live(&self.key).await?;
        let wait = ttl + EXPIRY_GRACE;
        warn!(
            "Quota window full (slot {} > {}); suspending request for {:.1}s",
            slot,
            self.max_requests,
            wait.as_secs_f64()
        );
        self.sleeper.sleep(wait).await;

        // Blind reset: every waiter that overflowed this window rewrites the
        // counter on waking, regardless of what other callers did meanwhile.
        self.store.set_with_expiry(&self.key, 1, self.window).await?;

        Ok(Admission::delayed(1, wait))
    }
}
