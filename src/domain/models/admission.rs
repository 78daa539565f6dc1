use std::time::Duration;

/// The outcome of one pass through the admission gate.
///
/// Admission is never a rejection: a call either proceeds immediately or is
/// suspended until the quota window turns over and then proceeds. `slot` is
/// the post-increment counter value this call observed. After an
/// overflow-triggered reset it is always 1, because the waking caller rewrote
/// the window before being admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    slot: u64,
    waited: Option<Duration>,
}

impl Admission {
    pub fn immediate(slot: u64) -> Self {
        Self { slot, waited: None }
    }

    pub fn delayed(slot: u64, waited: Duration) -> Self {
        Self {
            slot,
            waited: Some(waited),
        }
    }

    pub fn slot(&self) -> u64 {
        self.slot
    }

    pub fn waited(&self) -> Option<Duration> {
        self.waited
    }

    pub fn was_delayed(&self) -> bool {
        self.waited.is_some()
    }
}
