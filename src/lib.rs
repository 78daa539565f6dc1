pub mod application;
pub mod connector;
pub mod domain;

pub use application::{
    AdmissionGate, CompletionClient, CounterStore, RelayChatUseCase, Sleeper, TokioSleeper,
    TrackingSleeper, DEFAULT_COUNTER_KEY, DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW,
};

pub use connector::{
    build_router, AppState, ChatRequest, ErrorBody, InMemoryCounterStore, MockCompletionClient,
    OpenAiClient, RedisCounterStore,
};

pub use domain::{Admission, DomainError, Message, Role};
