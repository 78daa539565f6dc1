use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use super::error::{ApiError, ErrorBody};
use super::state::AppState;
use crate::domain::{DomainError, Message};

/// Request body for `POST /chat`: the conversation so far, oldest first.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
}

/// `POST /chat`. Admits the request through the gate, forwards the
/// conversation upstream and answers with the assistant message.
///
/// The body must deserialize into [`ChatRequest`]; anything else (missing
/// or non-array `messages`, malformed JSON, wrong element shape) is
/// rejected with 400 before the gate or the upstream is touched.
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<Message>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        DomainError::invalid_input(format!("invalid messages payload: {rejection}"))
    })?;

    let reply = state.relay().execute(&request.messages).await?;
    Ok(Json(reply))
}

/// Fallback for every non-POST verb on `/chat`.
pub async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorBody::new("only POST is allowed")),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::application::{AdmissionGate, RelayChatUseCase};
    use crate::connector::{InMemoryCounterStore, MockCompletionClient};

    fn state_with(client: MockCompletionClient) -> (AppState, Arc<MockCompletionClient>) {
        let gate = AdmissionGate::new(
            Arc::new(InMemoryCounterStore::new()),
            14,
            Duration::from_secs(60),
        );
        let client = Arc::new(client);
        let relay = Arc::new(RelayChatUseCase::new(gate, client.clone()));
        (AppState::new(relay), client)
    }

    #[tokio::test]
    async fn test_chat_replies_with_the_assistant_message() {
        let (state, client) = state_with(MockCompletionClient::new().with_reply("pong"));
        let request = ChatRequest {
            messages: vec![Message::user("ping")],
        };

        let Json(reply) = chat(State(state), Ok(Json(request))).await.unwrap();

        assert!(reply.is_from_assistant());
        assert_eq!(reply.content(), "pong");
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn test_chat_passes_upstream_status_through() {
        let (state, _client) =
            state_with(MockCompletionClient::new().with_failure(429, "rate limited"));
        let request = ChatRequest {
            messages: vec![Message::user("ping")],
        };

        let err = chat(State(state), Ok(Json(request))).await.unwrap_err();

        assert_eq!(
            err.into_response().status(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[tokio::test]
    async fn test_method_not_allowed_is_405() {
        let response = method_not_allowed().await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
