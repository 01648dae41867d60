//! Wiring & DI. Entry point: load config, bootstrap adapters, run the pipeline once.
//! No business logic here; the scheduler (cron, CI workflow) decides when to invoke.

use chrono::Utc;
use dotenv::dotenv;
use quiz_courier::adapters::source::{AppsScriptSource, CsvFileSource};
use quiz_courier::adapters::telegram::{DryRunSink, TelegramBotSink};
use quiz_courier::domain::DeliveryOutcome;
use quiz_courier::ports::{MessageSink, QuestionSource};
use quiz_courier::shared::config::{AppConfig, SinkConfig, SourceConfig};
use quiz_courier::usecases::DeliveryPipeline;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    let run = AppConfig::load()?.into_run_config()?;
    let window = &run.pipeline.window;
    info!(
        start_hour = window.start_hour(),
        end_hour = window.end_hour(),
        local_now = %window.local_time(Utc::now()).format("%Y-%m-%d %H:%M:%S %:z"),
        max_text_length = run.pipeline.composer.max_text_length,
        "delivery window configured (fixed UTC offset, no DST)"
    );

    // --- Question source ---
    let source: Arc<dyn QuestionSource> = match &run.source {
        SourceConfig::Http { url } => {
            info!("question source: HTTP endpoint");
            Arc::new(AppsScriptSource::new(url.clone(), run.http_timeout)?)
        }
        SourceConfig::CsvFile { path } => {
            info!(path = %path.display(), "question source: CSV file");
            Arc::new(CsvFileSource::new(path))
        }
    };

    // --- Message sink ---
    let sink: Arc<dyn MessageSink> = match &run.sink {
        SinkConfig::Telegram {
            api_base_url,
            bot_token,
            channel_id,
            anonymous_polls,
        } => {
            info!(channel = %channel_id, "sink: Telegram Bot API");
            Arc::new(TelegramBotSink::new(
                api_base_url.clone(),
                bot_token.clone(),
                channel_id.clone(),
                *anonymous_polls,
                run.http_timeout,
            )?)
        }
        SinkConfig::DryRun => {
            warn!("QUIZ_DRY_RUN set, payloads will be logged and not sent");
            Arc::new(DryRunSink::new())
        }
    };

    // --- Run ---
    let pipeline = DeliveryPipeline::new(source, sink);
    let outcome = pipeline.run_once(Utc::now(), &run.pipeline).await;

    match &outcome {
        DeliveryOutcome::Failed { stage, .. } => {
            error!(stage = %stage, "run failed: {}", outcome)
        }
        _ => info!("run finished: {}", outcome),
    }

    Ok(if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
