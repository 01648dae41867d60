//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{FetchError, PollMessage, QuestionRecord, SinkError, TextMessage};

/// Source of one random question per call.
#[async_trait::async_trait]
pub trait QuestionSource: Send + Sync {
    /// Fetch one question, picked uniformly at random among eligible records.
    /// Network failure, malformed or error responses and an empty table are all `FetchError`.
    async fn fetch(&self) -> Result<QuestionRecord, FetchError>;
}

/// Messaging platform sink. Each call returns once the platform acknowledged (or rejected) it.
#[async_trait::async_trait]
pub trait MessageSink: Send + Sync {
    async fn send_text(&self, message: &TextMessage) -> Result<(), SinkError>;

    async fn send_poll(&self, poll: &PollMessage) -> Result<(), SinkError>;
}
