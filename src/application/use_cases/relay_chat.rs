use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use crate::application::{AdmissionGate, CompletionClient};
use crate::domain::{DomainError, Message};

/// Relays one validated conversation: admit through the gate, then forward
/// upstream. The gate is a precondition of the forward, not a wrapper around
/// it; the forwarder knows nothing about admission.
pub struct RelayChatUseCase {
    gate: AdmissionGate,
    client: Arc<dyn CompletionClient>,
}

impl RelayChatUseCase {
    pub fn new(gate: AdmissionGate, client: Arc<dyn CompletionClient>) -> Self {
        Self { gate, client }
    }

    pub async fn execute(&self, conversation: &[Message]) -> Result<Message, DomainError> {
        info!("Relaying conversation with {} messages", conversation.len());
        let start = Instant::now();

        let admission = self.gate.admit().await?;
        if let Some(waited) = admission.waited() {
            info!(
                "Admitted after waiting {:.1}s for the quota window to turn over",
                waited.as_secs_f64()
            );
        }

        let reply = self.client.complete(conversation).await?;

        info!(
            "Relayed conversation in {:.2}s (window slot {})",
            start.elapsed().as_secs_f64(),
            admission.slot()
        );

        Ok(reply)
    }
}
