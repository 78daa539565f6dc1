mod in_memory_counter_store;
mod mock_completion_client;
mod openai_client;
mod redis_counter_store;

pub use in_memory_counter_store::*;
pub use mock_completion_client::*;
pub use openai_client::*;
pub use redis_counter_store::*;
