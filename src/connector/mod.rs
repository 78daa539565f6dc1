//! # Connector Layer
//!
//! External integrations implementing the application ports:
//! - Counter stores (Redis in production, in-memory fallback and test fake)
//! - Completion clients (OpenAI-compatible HTTP upstream, mock)
//! - The HTTP API surface (axum router, handlers, error mapping)

pub mod adapter;
pub mod api;

pub use adapter::*;
pub use api::*;
