mod chat;
mod error;
mod router;
mod state;

pub use chat::*;
pub use error::*;
pub use router::*;
pub use state::*;
