use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::application::CompletionClient;
use crate::domain::{DomainError, Message};

const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";
const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const REQUEST_TIMEOUT_SECS: u64 = 30;
const GENERIC_UPSTREAM_DETAIL: &str = "upstream completion error";

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

/// Error payload shapes seen from OpenAI-compatible servers. Some put the
/// detail at the top level, some nest it under an `error` object.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    error: Option<NestedError>,
}

#[derive(Debug, Deserialize)]
struct NestedError {
    message: Option<String>,
}

/// [`CompletionClient`] for an OpenAI-compatible chat completions API.
///
/// One `complete` call issues exactly one `POST {base_url}/v1/chat/completions`
/// with bearer authentication and the conversation in received order. A
/// non-success upstream status is surfaced as
/// [`DomainError::UpstreamFailure`] carrying that status and the error
/// detail extracted from the body; transport failures and unreadable
/// success bodies become [`DomainError::Internal`].
///
/// Environment configuration (see [`OpenAiClient::from_env`]):
///
/// | Variable            | Required | Default                   |
/// |---------------------|----------|---------------------------|
/// | `CHATGATE_API_KEY`  | yes      | -                         |
/// | `CHATGATE_MODEL`    | no       | `gpt-4o-mini`             |
/// | `CHATGATE_BASE_URL` | no       | `https://api.openai.com`  |
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(
        api_key: impl Into<String>,
        model: Option<String>,
        base_url: Option<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();
        let base_url = base_url
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            client,
            api_key: api_key.into(),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url,
        }
    }

    /// Build a client from `CHATGATE_API_KEY`, `CHATGATE_MODEL` and
    /// `CHATGATE_BASE_URL`. Only the key is required.
    pub fn from_env() -> Result<Self, DomainError> {
        let api_key = std::env::var("CHATGATE_API_KEY").map_err(|_| {
            DomainError::internal("OpenAiClient: CHATGATE_API_KEY is not set")
        })?;
        Ok(Self::new(
            api_key,
            std::env::var("CHATGATE_MODEL").ok(),
            std::env::var("CHATGATE_BASE_URL").ok(),
        ))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Pull the human-readable detail out of an upstream error body,
    /// falling back to a generic line when the body is not recognizable.
    fn parse_error_detail(body: &str) -> String {
        serde_json::from_str::<ApiErrorBody>(body)
            .ok()
            .and_then(|parsed| {
                parsed
                    .message
                    .or_else(|| parsed.error.and_then(|nested| nested.message))
            })
            .filter(|detail| !detail.is_empty())
            .unwrap_or_else(|| GENERIC_UPSTREAM_DETAIL.to_string())
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, conversation: &[Message]) -> Result<Message, DomainError> {
        let request = ApiRequest {
            model: &self.model,
            messages: conversation,
        };

        debug!(
            "OpenAiClient: sending {} messages to {}",
            conversation.len(),
            self.base_url
        );

        let response = self
            .client
            .post(format!("{}{}", self.base_url, CHAT_COMPLETIONS_PATH))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| DomainError::internal(format!("OpenAiClient: request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = Self::parse_error_detail(&body);
            warn!("OpenAiClient: upstream returned {status}: {detail}");
            return Err(DomainError::upstream(status.as_u16(), detail));
        }

        let parsed: ApiResponse = response.json().await.map_err(|e| {
            DomainError::internal(format!("OpenAiClient: failed to parse response: {e}"))
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| {
                DomainError::internal("OpenAiClient: upstream response contained no choices")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;

    #[test]
    fn test_request_body_has_model_and_messages_in_order() {
        let conversation = vec![
            Message::system("be brief"),
            Message::user("hello"),
            Message::assistant("hi"),
            Message::user("what now?"),
        ];
        let request = ApiRequest {
            model: "gpt-4o-mini",
            messages: &conversation,
        };

        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["model"], "gpt-4o-mini");
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[1]["content"], "hello");
        assert_eq!(messages[3]["content"], "what now?");
    }

    #[test]
    fn test_error_detail_prefers_top_level_message() {
        let detail =
            OpenAiClient::parse_error_detail(r#"{"message": "rate limited"}"#);
        assert_eq!(detail, "rate limited");
    }

    #[test]
    fn test_error_detail_falls_back_to_nested_error_message() {
        let detail = OpenAiClient::parse_error_detail(
            r#"{"error": {"message": "invalid model", "type": "invalid_request_error"}}"#,
        );
        assert_eq!(detail, "invalid model");
    }

    #[test]
    fn test_error_detail_is_generic_for_unrecognizable_bodies() {
        assert_eq!(
            OpenAiClient::parse_error_detail("<html>502 Bad Gateway</html>"),
            GENERIC_UPSTREAM_DETAIL
        );
        assert_eq!(
            OpenAiClient::parse_error_detail(r#"{"message": ""}"#),
            GENERIC_UPSTREAM_DETAIL
        );
        assert_eq!(OpenAiClient::parse_error_detail(""), GENERIC_UPSTREAM_DETAIL);
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = OpenAiClient::new("key", None, Some("http://localhost:9999/".into()));
        assert_eq!(client.base_url(), "http://localhost:9999");
    }

    #[test]
    fn test_defaults_apply_when_unconfigured() {
        let client = OpenAiClient::new("key", None, None);
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
        assert_eq!(client.model(), DEFAULT_MODEL);
    }

    #[test]
    fn test_wire_roundtrip_of_assistant_reply() {
        let body = r#"{"choices": [{"message": {"role": "assistant", "content": "42"}}]}"#;
        let parsed: ApiResponse = serde_json::from_str(body).unwrap();

        let message = &parsed.choices[0].message;
        assert_eq!(message.role(), Role::Assistant);
        assert_eq!(message.content(), "42");
    }
}
