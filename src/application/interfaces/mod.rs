mod completion_client;
mod counter_store;
mod sleeper;

pub use completion_client::*;
pub use counter_store::*;
pub use sleeper::*;
