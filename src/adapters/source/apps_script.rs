//! HTTP question source. Implements QuestionSource against a spreadsheet web app
//! (e.g. Google Apps Script) that returns one random row per GET.
//!
//! Response envelope: `{"success": true, "data": {...}}` or `{"error": "..."}`.

use crate::domain::{FetchError, QuestionRecord};
use crate::ports::QuestionSource;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

pub struct AppsScriptSource {
    client: reqwest::Client,
    url: String,
}

impl AppsScriptSource {
    /// `timeout` bounds the whole request; expiry is a `FetchError::Network`.
    pub fn new(url: String, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network(format!("build HTTP client: {}", e)))?;
        Ok(Self { client, url })
    }

    /// Decode the JSON envelope. Explicit errors win over `data`; `data` is read only
    /// under `"success": true`, and a missing `data` there means no rows.
    fn parse_response(body: &str) -> Result<QuestionRecord, FetchError> {
        let envelope: Envelope = serde_json::from_str(body)
            .map_err(|e| FetchError::Malformed(format!("invalid JSON: {}", e)))?;

        if let Some(error) = envelope.error {
            return Err(FetchError::Remote(error));
        }
        match envelope.success {
            Some(true) => {}
            Some(false) => return Err(FetchError::Remote("unknown error".to_string())),
            None => {
                return Err(FetchError::Malformed(
                    "response has neither success flag nor error".to_string(),
                ));
            }
        }
        match envelope.data {
            None | Some(serde_json::Value::Null) => Err(FetchError::Empty),
            Some(data) => serde_json::from_value(data)
                .map_err(|e| FetchError::Malformed(format!("invalid question record: {}", e))),
        }
    }
}

#[derive(Deserialize)]
struct Envelope {
    success: Option<bool>,
    data: Option<serde_json::Value>,
    error: Option<String>,
}

#[async_trait::async_trait]
impl QuestionSource for AppsScriptSource {
    async fn fetch(&self) -> Result<QuestionRecord, FetchError> {
        info!("fetching random question");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.without_url().to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| FetchError::Network(format!("read body: {}", e.without_url())))?;

        if !status.is_success() {
            warn!(status = %status, "question source returned error status");
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: text.chars().take(200).collect(),
            });
        }

        debug!(body_len = text.len(), "received question source response");
        let record = Self::parse_response(&text)?;
        info!(question_id = %record.id, "question source returned record");
        Ok(record)
    }
}
