//! # Application Layer
//!
//! Ports and orchestration logic sitting between the domain and the
//! connectors: the admission gate, the relay use case, and the traits they
//! depend on.

pub mod interfaces;
pub mod use_cases;

pub use interfaces::*;
pub use use_cases::*;
