mod admission;
mod message;

pub use admission::*;
pub use message::*;
