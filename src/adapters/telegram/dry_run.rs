//! Dry-run sink for trying a configuration without credentials.
//!
//! Logs each payload instead of sending it and always acknowledges.

use crate::domain::{PollMessage, SinkError, TextMessage};
use crate::ports::MessageSink;
use tracing::info;

#[derive(Debug, Default)]
pub struct DryRunSink;

impl DryRunSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl MessageSink for DryRunSink {
    async fn send_text(&self, message: &TextMessage) -> Result<(), SinkError> {
        info!(
            chars = message.body.chars().count(),
            body = %message.body,
            "[DRY RUN] text message"
        );
        Ok(())
    }

    async fn send_poll(&self, poll: &PollMessage) -> Result<(), SinkError> {
        info!(
            question = %poll.question,
            options = ?poll.options,
            correct_index = poll.correct_index,
            "[DRY RUN] quiz poll"
        );
        Ok(())
    }
}
