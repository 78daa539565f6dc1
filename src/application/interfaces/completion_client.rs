use async_trait::async_trait;

use crate::domain::{DomainError, Message};

/// An interface for forwarding a conversation to a chat-completion service
/// and receiving the single reply message.
///
/// Implementors encapsulate transport, serialization, and vendor-specific API
/// details. Consumers (e.g. [`crate::application::RelayChatUseCase`]) remain
/// decoupled from any particular provider or HTTP client library.
///
/// Contract notes:
/// - The conversation is sent unmodified and in order.
/// - One call issues exactly one upstream request, with no retries and no
///   caching.
/// - An upstream non-success status comes back as
///   [`DomainError::UpstreamFailure`] carrying the upstream's own status code
///   and detail text; transport failures and malformed payloads come back as
///   [`DomainError::Internal`].
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Forward `conversation` upstream and return the assistant's reply.
    async fn complete(&self, conversation: &[Message]) -> Result<Message, DomainError>;
}
