//! Delivery pipeline: gate -> fetch -> compose -> dispatch.
//!
//! One call to `run_once` is one run: a linear traversal that always ends in
//! exactly one `DeliveryOutcome`. No state is carried between runs, and there
//! is no mutual exclusion between overlapping runs started by the scheduler.

use crate::domain::{DeliveryOutcome, Stage};
use crate::ports::{MessageSink, QuestionSource};
use crate::shared::config::PipelineConfig;
use crate::usecases::composer::MessageComposer;
use crate::usecases::dispatcher::Dispatcher;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

pub const OUTSIDE_WINDOW: &str = "outside window";

pub struct DeliveryPipeline {
    source: Arc<dyn QuestionSource>,
    dispatcher: Dispatcher,
}

impl DeliveryPipeline {
    pub fn new(source: Arc<dyn QuestionSource>, sink: Arc<dyn MessageSink>) -> Self {
        Self {
            source,
            dispatcher: Dispatcher::new(sink),
        }
    }

    pub async fn run_once(&self, now: DateTime<Utc>, config: &PipelineConfig) -> DeliveryOutcome {
        let window = &config.window;
        let local = window.local_time(now);
        if !window.is_eligible(now) {
            info!(
                local_time = %local.format("%Y-%m-%d %H:%M:%S %:z"),
                start_hour = window.start_hour(),
                end_hour = window.end_hour(),
                "outside delivery window, skipping"
            );
            return DeliveryOutcome::Skipped {
                reason: OUTSIDE_WINDOW.to_string(),
            };
        }
        info!(local_time = %local.format("%Y-%m-%d %H:%M:%S %:z"), "within delivery window");

        let record = match self.source.fetch().await {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "fetch failed");
                return failed(Stage::Fetch, e.to_string(), 0);
            }
        };
        info!(question_id = %record.id, "fetched question");

        let payloads = match MessageComposer::new(config.composer).compose(&record) {
            Ok(payloads) => payloads,
            Err(e) => {
                warn!(question_id = %record.id, error = %e, "malformed question record");
                return failed(Stage::Compose, e.to_string(), 0);
            }
        };
        let layout = if payloads.len() == 1 { "single" } else { "split" };
        info!(
            question_id = %record.id,
            payloads = payloads.len(),
            layout,
            "composed question"
        );

        match self.dispatcher.send(&payloads).await {
            Ok(count) => DeliveryOutcome::Delivered {
                payload_count: count,
            },
            Err(e) => {
                let sent = e.sent;
                failed(Stage::Dispatch, e.to_string(), sent)
            }
        }
    }
}

fn failed(stage: Stage, detail: String, partial_count: usize) -> DeliveryOutcome {
    DeliveryOutcome::Failed {
        stage,
        detail,
        partial_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OutboundPayload, TimeWindow};
    use crate::usecases::ComposerConfig;
    use crate::usecases::fakes::{RecordingSink, StaticSource, sample_record};
    use chrono::{FixedOffset, TimeZone};

    fn config() -> PipelineConfig {
        PipelineConfig {
            window: TimeWindow::new(11, 22, 330).unwrap(),
            composer: ComposerConfig::default(),
        }
    }

    /// UTC instant at `hour`:00 local time in +05:30.
    fn local_hour(hour: u32) -> DateTime<Utc> {
        FixedOffset::east_opt(330 * 60)
            .unwrap()
            .with_ymd_and_hms(2026, 10, 19, hour, 0, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[tokio::test]
    async fn test_outside_window_skips_without_fetching() {
        let source = Arc::new(StaticSource::new(sample_record()));
        let sink = Arc::new(RecordingSink::default());
        let pipeline = DeliveryPipeline::new(source.clone(), sink.clone());

        for hour in [10, 22] {
            let outcome = pipeline.run_once(local_hour(hour), &config()).await;
            assert_eq!(
                outcome,
                DeliveryOutcome::Skipped {
                    reason: OUTSIDE_WINDOW.into()
                }
            );
            assert!(outcome.is_success());
        }
        assert_eq!(source.calls(), 0);
        assert!(sink.attempts().is_empty());
    }

    #[tokio::test]
    async fn test_short_question_delivered_as_one_message() {
        let source = Arc::new(StaticSource::new(sample_record()));
        let sink = Arc::new(RecordingSink::default());
        let pipeline = DeliveryPipeline::new(source, sink.clone());

        let outcome = pipeline.run_once(local_hour(11), &config()).await;

        assert_eq!(outcome, DeliveryOutcome::Delivered { payload_count: 1 });
        assert!(matches!(sink.attempts()[0], OutboundPayload::Text(_)));
    }

    #[tokio::test]
    async fn test_long_question_delivered_as_text_then_poll() {
        let mut record = sample_record();
        record.question.push_str(&"x".repeat(5000));
        let sink = Arc::new(RecordingSink::default());
        let pipeline = DeliveryPipeline::new(Arc::new(StaticSource::new(record)), sink.clone());

        let outcome = pipeline.run_once(local_hour(15), &config()).await;

        assert_eq!(outcome, DeliveryOutcome::Delivered { payload_count: 2 });
        let attempts = sink.attempts();
        assert!(matches!(attempts[0], OutboundPayload::Text(_)));
        assert!(matches!(attempts[1], OutboundPayload::Poll(_)));
    }

    #[tokio::test]
    async fn test_fetch_error_never_dispatches() {
        let sink = Arc::new(RecordingSink::default());
        let pipeline =
            DeliveryPipeline::new(Arc::new(StaticSource::failing("no rows")), sink.clone());

        let outcome = pipeline.run_once(local_hour(12), &config()).await;

        match outcome {
            DeliveryOutcome::Failed {
                stage,
                detail,
                partial_count,
            } => {
                assert_eq!(stage, Stage::Fetch);
                assert!(detail.contains("no rows"));
                assert_eq!(partial_count, 0);
            }
            other => panic!("expected fetch failure, got {other:?}"),
        }
        assert!(sink.attempts().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_record_fails_at_compose() {
        let mut record = sample_record();
        record.correct = "E".into();
        let sink = Arc::new(RecordingSink::default());
        let pipeline = DeliveryPipeline::new(Arc::new(StaticSource::new(record)), sink.clone());

        let outcome = pipeline.run_once(local_hour(12), &config()).await;

        assert!(matches!(
            outcome,
            DeliveryOutcome::Failed {
                stage: Stage::Compose,
                ..
            }
        ));
        assert!(sink.attempts().is_empty());
    }

    #[tokio::test]
    async fn test_poll_rejection_reports_partial_dispatch() {
        let mut record = sample_record();
        record.question.push_str(&"x".repeat(5000));
        let sink = Arc::new(RecordingSink::failing_at(1));
        let pipeline = DeliveryPipeline::new(Arc::new(StaticSource::new(record)), sink);

        let outcome = pipeline.run_once(local_hour(20), &config()).await;

        assert!(!outcome.is_success());
        assert!(matches!(
            outcome,
            DeliveryOutcome::Failed {
                stage: Stage::Dispatch,
                partial_count: 1,
                ..
            }
        ));
    }
}
