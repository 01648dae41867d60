//! Application use cases. Orchestrate domain logic via ports.

pub mod composer;
pub mod dispatcher;
pub mod pipeline;

#[cfg(test)]
pub(crate) mod fakes;

pub use composer::{ComposerConfig, MessageComposer};
pub use dispatcher::Dispatcher;
pub use pipeline::DeliveryPipeline;
