//! Application configuration. Credentials, source location, delivery window.
//!
//! `AppConfig` is the raw, all-optional layer read from env / file; `RunConfig`
//! is the validated value handed to the pipeline and adapters.

use crate::domain::{TimeWindow, WindowError};
use crate::usecases::ComposerConfig;
use crate::usecases::composer::MIN_TEXT_LENGTH;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_WINDOW_START_HOUR: u32 = 11;
pub const DEFAULT_WINDOW_END_HOUR: u32 = 22;
/// UTC+05:30 (India Standard Time, no DST).
pub const DEFAULT_LOCAL_OFFSET_MINUTES: i32 = 330;
/// Telegram's single-message ceiling.
pub const DEFAULT_MAX_TEXT_LENGTH: usize = 4096;
/// Telegram's poll question ceiling.
pub const DEFAULT_POLL_QUESTION_LIMIT: usize = 300;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("invalid delivery window: {0}")]
    Window(#[from] WindowError),
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct AppConfig {
    /// HTTP endpoint returning one random question as JSON. Read from QUIZ_SOURCE_URL or APPS_SCRIPT_URL.
    #[serde(default)]
    pub source_url: Option<String>,

    /// Local CSV file used instead of `source_url`. Read from QUIZ_SOURCE_PATH.
    #[serde(default)]
    pub source_path: Option<String>,

    /// Telegram bot token. Read from QUIZ_BOT_TOKEN or TELEGRAM_BOT_TOKEN.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Target chat (`@channel` or numeric id). Read from QUIZ_CHANNEL_ID or TELEGRAM_CHANNEL_ID.
    #[serde(default)]
    pub channel_id: Option<String>,

    #[serde(default)]
    pub window_start_hour: Option<u32>,

    #[serde(default)]
    pub window_end_hour: Option<u32>,

    /// Fixed offset from UTC in minutes. Does not follow daylight-saving changes.
    #[serde(default)]
    pub local_offset_minutes: Option<i32>,

    #[serde(default)]
    pub max_text_length: Option<usize>,

    #[serde(default)]
    pub poll_question_limit: Option<usize>,

    #[serde(default)]
    pub http_timeout_secs: Option<u64>,

    /// Telegram Bot API base URL (override for self-hosted Bot API servers).
    #[serde(default)]
    pub api_base_url: Option<String>,

    /// Channels only accept anonymous polls. Default true.
    #[serde(default)]
    pub anonymous_polls: Option<bool>,

    /// Log payloads instead of sending them. Credentials not required.
    #[serde(default)]
    pub dry_run: Option<bool>,
}

/// Where questions come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceConfig {
    Http { url: String },
    CsvFile { path: PathBuf },
}

/// Where payloads go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkConfig {
    Telegram {
        api_base_url: String,
        bot_token: String,
        channel_id: String,
        anonymous_polls: bool,
    },
    DryRun,
}

/// Settings the pipeline itself reads on each run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub window: TimeWindow,
    pub composer: ComposerConfig,
}

/// Validated configuration for one process run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub pipeline: PipelineConfig,
    pub source: SourceConfig,
    pub sink: SinkConfig,
    pub http_timeout: Duration,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("QUIZ"));
        if let Ok(path) = std::env::var("QUIZ_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        let mut cfg: Self = c.build()?.try_deserialize()?;
        // Unprefixed names used by the GitHub Actions workflow secrets
        cfg.source_url = cfg
            .source_url
            .or_else(|| std::env::var("APPS_SCRIPT_URL").ok());
        cfg.bot_token = cfg
            .bot_token
            .or_else(|| std::env::var("TELEGRAM_BOT_TOKEN").ok());
        cfg.channel_id = cfg
            .channel_id
            .or_else(|| std::env::var("TELEGRAM_CHANNEL_ID").ok());
        Ok(cfg)
    }

    /// Validate and apply defaults.
    pub fn into_run_config(self) -> Result<RunConfig, ConfigError> {
        let window = TimeWindow::new(
            self.window_start_hour.unwrap_or(DEFAULT_WINDOW_START_HOUR),
            self.window_end_hour.unwrap_or(DEFAULT_WINDOW_END_HOUR),
            self.local_offset_minutes
                .unwrap_or(DEFAULT_LOCAL_OFFSET_MINUTES),
        )?;

        let max_text_length = self.max_text_length.unwrap_or(DEFAULT_MAX_TEXT_LENGTH);
        if max_text_length < MIN_TEXT_LENGTH {
            return Err(ConfigError::Invalid {
                key: "max_text_length",
                reason: format!("must be at least {MIN_TEXT_LENGTH}"),
            });
        }
        let poll_question_limit = self
            .poll_question_limit
            .unwrap_or(DEFAULT_POLL_QUESTION_LIMIT);
        if poll_question_limit == 0 {
            return Err(ConfigError::Invalid {
                key: "poll_question_limit",
                reason: "must be greater than zero".into(),
            });
        }

        let source = match (non_empty(self.source_url), non_empty(self.source_path)) {
            (Some(url), None) => SourceConfig::Http { url },
            (None, Some(path)) => SourceConfig::CsvFile {
                path: PathBuf::from(path),
            },
            (None, None) => return Err(ConfigError::Missing("source_url (or source_path)")),
            (Some(_), Some(_)) => {
                return Err(ConfigError::Invalid {
                    key: "source_path",
                    reason: "set either source_url or source_path, not both".into(),
                });
            }
        };

        let sink = if self.dry_run.unwrap_or(false) {
            SinkConfig::DryRun
        } else {
            SinkConfig::Telegram {
                api_base_url: self
                    .api_base_url
                    .unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.to_string()),
                bot_token: non_empty(self.bot_token).ok_or(ConfigError::Missing("bot_token"))?,
                channel_id: non_empty(self.channel_id)
                    .ok_or(ConfigError::Missing("channel_id"))?,
                anonymous_polls: self.anonymous_polls.unwrap_or(true),
            }
        };

        Ok(RunConfig {
            pipeline: PipelineConfig {
                window,
                composer: ComposerConfig {
                    max_text_length,
                    poll_question_limit,
                },
            },
            source,
            sink,
            http_timeout: Duration::from_secs(
                self.http_timeout_secs.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
            ),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
