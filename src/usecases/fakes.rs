//! In-memory port implementations for use case tests.

use crate::domain::{
    FetchError, OutboundPayload, PollMessage, QuestionRecord, SinkError, TextMessage,
};
use crate::ports::{MessageSink, QuestionSource};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Records every attempted payload; rejects the attempt at `fail_at` (0-based).
#[derive(Default)]
pub struct RecordingSink {
    attempts: Mutex<Vec<OutboundPayload>>,
    fail_at: Option<usize>,
}

impl RecordingSink {
    pub fn failing_at(index: usize) -> Self {
        Self {
            attempts: Mutex::default(),
            fail_at: Some(index),
        }
    }

    pub fn attempts(&self) -> Vec<OutboundPayload> {
        self.attempts.lock().unwrap().clone()
    }

    fn record(&self, payload: OutboundPayload) -> Result<(), SinkError> {
        let mut attempts = self.attempts.lock().unwrap();
        let index = attempts.len();
        attempts.push(payload);
        if self.fail_at == Some(index) {
            return Err(SinkError::Rejected {
                status: 400,
                body: r#"{"ok":false,"description":"Bad Request"}"#.into(),
            });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl MessageSink for RecordingSink {
    async fn send_text(&self, message: &TextMessage) -> Result<(), SinkError> {
        self.record(OutboundPayload::Text(message.clone()))
    }

    async fn send_poll(&self, poll: &PollMessage) -> Result<(), SinkError> {
        self.record(OutboundPayload::Poll(poll.clone()))
    }
}

/// Returns a fixed record, or `Remote(error)` when built with `failing`.
pub struct StaticSource {
    record: Option<QuestionRecord>,
    error: Option<String>,
    calls: AtomicUsize,
}

impl StaticSource {
    pub fn new(record: QuestionRecord) -> Self {
        Self {
            record: Some(record),
            error: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: &str) -> Self {
        Self {
            record: None,
            error: Some(error.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl QuestionSource for StaticSource {
    async fn fetch(&self) -> Result<QuestionRecord, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match (&self.record, &self.error) {
            (Some(record), _) => Ok(record.clone()),
            (None, Some(error)) => Err(FetchError::Remote(error.clone())),
            (None, None) => Err(FetchError::Empty),
        }
    }
}

pub fn sample_record() -> QuestionRecord {
    QuestionRecord {
        id: "1".into(),
        question: "2+2=?".into(),
        option_a: "3".into(),
        option_b: "4".into(),
        option_c: "5".into(),
        option_d: "6".into(),
        correct: "B".into(),
        explanation: "Basic addition".into(),
    }
}
