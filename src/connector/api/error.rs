use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::warn;

use crate::domain::DomainError;

/// Body of every non-success response: `{"error": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Maps [`DomainError`] onto the HTTP contract:
///
/// - `InvalidInput` becomes 400
/// - `UpstreamFailure` passes the upstream status and detail through
/// - everything else becomes 500
#[derive(Debug)]
pub struct ApiError(DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self.0 {
            DomainError::InvalidInput(detail) => (StatusCode::BAD_REQUEST, detail),
            DomainError::UpstreamFailure { status, detail } => (
                StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                detail,
            ),
            err => {
                warn!("Request failed: {err}");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        };
        (status, Json(ErrorBody::new(detail))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: DomainError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn test_invalid_input_maps_to_400() {
        assert_eq!(
            status_of(DomainError::invalid_input("messages must be an array")),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_upstream_failure_keeps_its_status() {
        assert_eq!(
            status_of(DomainError::upstream(429, "rate limited")),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            status_of(DomainError::upstream(503, "overloaded")),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_unmappable_upstream_status_degrades_to_500() {
        assert_eq!(
            status_of(DomainError::upstream(0, "bogus")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_store_and_internal_errors_map_to_500() {
        assert_eq!(
            status_of(DomainError::store("redis down")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(DomainError::internal("boom")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
