//! Core domain layer. No external I/O dependencies.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod entities;
pub mod errors;
pub mod time_window;

pub use entities::{
    DeliveryOutcome, OptionLabel, OutboundPayload, PollMessage, QuestionRecord, Stage,
    TextMessage,
};
pub use errors::{ComposeError, DispatchError, FetchError, SinkError};
pub use time_window::{TimeWindow, WindowError};
