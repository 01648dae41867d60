//! Infrastructure adapters. Implement outbound ports.
//!
//! Question sources and Telegram sinks. Map errors to the domain error types.

pub mod source;
pub mod telegram;
