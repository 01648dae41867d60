//! Telegram adapters. Bot API sink and a logging dry-run sink.

pub mod bot_api;
pub mod dry_run;

pub use bot_api::TelegramBotSink;
pub use dry_run::DryRunSink;
