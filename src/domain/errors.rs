//! Domain errors. One enum per pipeline stage.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

/// Question source failure. Any variant stops the current run.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("question source unreachable: {0}")]
    Network(String),

    #[error("question source returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed question source response: {0}")]
    Malformed(String),

    /// The source answered but signalled an explicit error (`{"error": "..."}`).
    #[error("question source error: {0}")]
    Remote(String),

    #[error("question source has no eligible records")]
    Empty,

    #[error("question file error: {0}")]
    Io(String),
}

/// Record violates the question invariants (non-empty id/question, correct in A-D).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComposeError {
    #[error("question record has an empty id")]
    MissingId,

    #[error("question record {id} has empty question text")]
    MissingQuestion { id: String },

    #[error("question record {id} has invalid correct label {value:?} (expected A, B, C or D)")]
    InvalidCorrect { id: String, value: String },
}

/// Single send failure reported by a message sink.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("request failed: {0}")]
    Network(String),

    /// Sink answered with a non-success status or `ok: false`. Status and body are kept verbatim.
    #[error("rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("unreadable response: {0}")]
    Malformed(String),
}

/// Dispatch stopped at `failed_at_index`; `sent` payloads were delivered before it.
#[derive(Error, Debug)]
#[error("payload {failed_at_index} failed after {sent} sent: {source}")]
pub struct DispatchError {
    pub failed_at_index: usize,
    pub sent: usize,
    #[source]
    pub source: SinkError,
}
