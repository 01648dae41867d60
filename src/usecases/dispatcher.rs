//! Dispatcher: sends composed payloads to the sink strictly in order.
//!
//! Each send is awaited before the next is issued, so the explanatory text is
//! always visible before its poll. The first failure stops the batch; nothing
//! is retried here (the scheduler re-invokes the whole run).

use crate::domain::{DispatchError, OutboundPayload};
use crate::ports::MessageSink;
use std::sync::Arc;
use tracing::{info, warn};

pub struct Dispatcher {
    sink: Arc<dyn MessageSink>,
}

impl Dispatcher {
    pub fn new(sink: Arc<dyn MessageSink>) -> Self {
        Self { sink }
    }

    /// Returns the number of payloads sent. On failure, `DispatchError::sent` holds
    /// the count acknowledged before `failed_at_index`.
    pub async fn send(&self, payloads: &[OutboundPayload]) -> Result<usize, DispatchError> {
        for (index, payload) in payloads.iter().enumerate() {
            let result = match payload {
                OutboundPayload::Text(message) => self.sink.send_text(message).await,
                OutboundPayload::Poll(poll) => self.sink.send_poll(poll).await,
            };
            if let Err(e) = result {
                warn!(index, kind = payload.kind(), error = %e, "payload rejected, stopping dispatch");
                return Err(DispatchError {
                    failed_at_index: index,
                    sent: index,
                    source: e,
                });
            }
            info!(index, kind = payload.kind(), "payload sent");
        }
        Ok(payloads.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PollMessage, SinkError, TextMessage};
    use crate::usecases::fakes::RecordingSink;

    fn text_then_poll() -> Vec<OutboundPayload> {
        vec![
            OutboundPayload::Text(TextMessage {
                body: "question".into(),
            }),
            OutboundPayload::Poll(PollMessage {
                question: "pick".into(),
                options: vec!["3".into(), "4".into(), "5".into(), "6".into()],
                correct_index: 1,
            }),
        ]
    }

    #[tokio::test]
    async fn test_sends_all_in_order() {
        let sink = Arc::new(RecordingSink::default());
        let dispatcher = Dispatcher::new(sink.clone());

        let sent = dispatcher.send(&text_then_poll()).await.unwrap();

        assert_eq!(sent, 2);
        assert_eq!(sink.attempts(), text_then_poll());
    }

    #[tokio::test]
    async fn test_first_failure_stops_before_second() {
        let sink = Arc::new(RecordingSink::failing_at(0));
        let dispatcher = Dispatcher::new(sink.clone());

        let err = dispatcher.send(&text_then_poll()).await.unwrap_err();

        assert_eq!(err.failed_at_index, 0);
        assert_eq!(err.sent, 0);
        assert!(matches!(err.source, SinkError::Rejected { status: 400, .. }));
        assert_eq!(sink.attempts().len(), 1);
    }

    #[tokio::test]
    async fn test_second_failure_reports_partial_count() {
        let sink = Arc::new(RecordingSink::failing_at(1));
        let dispatcher = Dispatcher::new(sink.clone());

        let err = dispatcher.send(&text_then_poll()).await.unwrap_err();

        assert_eq!(err.failed_at_index, 1);
        assert_eq!(err.sent, 1);
        assert!(err.to_string().contains("Bad Request"));
    }
}
