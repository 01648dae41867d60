//! quiz-courier: posts a random multiple-choice question to a Telegram channel
//! within a local-time delivery window. Hexagonal layout: domain, ports, adapters, use cases.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;
