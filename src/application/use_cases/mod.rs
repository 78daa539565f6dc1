mod admission_gate;
mod relay_chat;

pub use admission_gate::*;
pub use relay_chat::*;
