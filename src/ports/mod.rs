//! Port traits. API boundaries for the hexagon.
//!
//! Outbound only: the pipeline calls into the question source and the message sink.

pub mod outbound;

pub use outbound::{MessageSink, QuestionSource};
