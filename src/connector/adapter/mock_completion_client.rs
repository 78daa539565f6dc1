use std::sync::Mutex;

use async_trait::async_trait;

use crate::application::CompletionClient;
use crate::domain::{DomainError, Message};

const DEFAULT_REPLY: &str = "This is a canned reply from the mock completion client.";

/// Canned [`CompletionClient`] used with `--mock-upstream` and in tests.
///
/// Every call records the conversation it received, so tests can assert how
/// many upstream requests were issued and what they contained. Configure a
/// failure with [`MockCompletionClient::with_failure`] to exercise the
/// error passthrough path.
pub struct MockCompletionClient {
    reply: Message,
    failure: Option<(u16, String)>,
    conversations: Mutex<Vec<Vec<Message>>>,
}

impl MockCompletionClient {
    pub fn new() -> Self {
        Self {
            reply: Message::assistant(DEFAULT_REPLY),
            failure: None,
            conversations: Mutex::new(Vec::new()),
        }
    }

    /// Replace the canned assistant reply.
    pub fn with_reply(mut self, content: impl Into<String>) -> Self {
        self.reply = Message::assistant(content);
        self
    }

    /// Make every call fail as if the upstream had answered `status` with
    /// the given error detail.
    pub fn with_failure(mut self, status: u16, detail: impl Into<String>) -> Self {
        self.failure = Some((status, detail.into()));
        self
    }

    /// Number of completion calls received so far.
    pub fn calls(&self) -> usize {
        self.conversations.lock().unwrap().len()
    }

    /// The conversation received by the most recent call, if any.
    pub fn last_conversation(&self) -> Option<Vec<Message>> {
        self.conversations.lock().unwrap().last().cloned()
    }
}

impl Default for MockCompletionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete(&self, conversation: &[Message]) -> Result<Message, DomainError> {
        self.conversations.lock().unwrap().push(conversation.to_vec());

        match &self.failure {
            Some((status, detail)) => Err(DomainError::upstream(*status, detail.clone())),
            None => Ok(self.reply.clone()),
        }
    }
}
