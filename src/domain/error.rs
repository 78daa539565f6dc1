use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Upstream returned {status}: {detail}")]
    UpstreamFailure { status: u16, detail: String },

    #[error("Counter store error: {0}")]
    StoreError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn upstream(status: u16, detail: impl Into<String>) -> Self {
        Self::UpstreamFailure {
            status,
            detail: detail.into(),
        }
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::StoreError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    pub fn is_upstream_failure(&self) -> bool {
        matches!(self, Self::UpstreamFailure { .. })
    }

    pub fn is_store_error(&self) -> bool {
        matches!(self, Self::StoreError(_))
    }

    /// The upstream status code carried by an `UpstreamFailure`, if any.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::UpstreamFailure { status, .. } => Some(*status),
            _ => None,
        }
    }
}
