use std::sync::Arc;

use crate::application::RelayChatUseCase;

/// Shared handler state. The relay use case sits behind an [`Arc`] so each
/// request task gets a cheap clone of the same gate and upstream client.
#[derive(Clone)]
pub struct AppState {
    relay: Arc<RelayChatUseCase>,
}

impl AppState {
    pub fn new(relay: Arc<RelayChatUseCase>) -> Self {
        Self { relay }
    }

    pub fn relay(&self) -> &RelayChatUseCase {
        &self.relay
    }
}
