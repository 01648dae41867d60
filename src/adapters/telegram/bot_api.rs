//! Telegram Bot API sink. Implements MessageSink with `sendMessage` and `sendPoll`.
//!
//! Text goes out with `parse_mode=HTML`; polls are quizzes with `correct_option_id`.
//! A call succeeds only on a 2xx status with `"ok": true`; anything else keeps
//! the status and body for the dispatch error.

use crate::domain::{PollMessage, SinkError, TextMessage};
use crate::ports::MessageSink;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

pub struct TelegramBotSink {
    client: reqwest::Client,
    api_base_url: String,
    bot_token: String,
    channel_id: String,
    anonymous_polls: bool,
}

impl TelegramBotSink {
    pub fn new(
        api_base_url: String,
        bot_token: String,
        channel_id: String,
        anonymous_polls: bool,
        timeout: Duration,
    ) -> Result<Self, SinkError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("quiz-courier/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| SinkError::Network(format!("build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            bot_token,
            channel_id,
            anonymous_polls,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base_url, self.bot_token, method)
    }

    fn text_request<'a>(&'a self, message: &'a TextMessage) -> SendMessageRequest<'a> {
        SendMessageRequest {
            chat_id: &self.channel_id,
            text: &message.body,
            parse_mode: "HTML",
            link_preview_options: LinkPreviewOptions { is_disabled: true },
        }
    }

    fn poll_request<'a>(&'a self, poll: &'a PollMessage) -> SendPollRequest<'a> {
        SendPollRequest {
            chat_id: &self.channel_id,
            question: &poll.question,
            options: poll
                .options
                .iter()
                .map(|text| InputPollOption { text })
                .collect(),
            poll_type: "quiz",
            correct_option_id: poll.correct_index,
            is_anonymous: self.anonymous_polls,
        }
    }

    /// POST one Bot API method. The token is part of the URL, so reqwest errors are stripped of it.
    async fn call<T: Serialize + Sync>(&self, method: &str, body: &T) -> Result<(), SinkError> {
        let response = self
            .client
            .post(self.method_url(method))
            .json(body)
            .send()
            .await
            .map_err(|e| SinkError::Network(e.without_url().to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| SinkError::Network(format!("read body: {}", e.without_url())))?;

        let result = check_response(status, &text);
        match &result {
            Ok(()) => debug!(method, status, "telegram acknowledged"),
            Err(e) => warn!(method, error = %e, "telegram rejected request"),
        }
        result
    }
}

/// Success iff 2xx and the body decodes with `ok: true`.
fn check_response(status: u16, body: &str) -> Result<(), SinkError> {
    if !(200..300).contains(&status) {
        return Err(SinkError::Rejected {
            status,
            body: body.to_string(),
        });
    }
    let parsed: ApiResponse = serde_json::from_str(body)
        .map_err(|e| SinkError::Malformed(format!("{}: {}", e, body)))?;
    if parsed.ok {
        Ok(())
    } else {
        Err(SinkError::Rejected {
            status,
            body: body.to_string(),
        })
    }
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
    link_preview_options: LinkPreviewOptions,
}

#[derive(Serialize)]
struct LinkPreviewOptions {
    is_disabled: bool,
}

#[derive(Serialize)]
struct SendPollRequest<'a> {
    chat_id: &'a str,
    question: &'a str,
    options: Vec<InputPollOption<'a>>,
    #[serde(rename = "type")]
    poll_type: &'static str,
    correct_option_id: usize,
    is_anonymous: bool,
}

#[derive(Serialize)]
struct InputPollOption<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
}

#[async_trait::async_trait]
impl MessageSink for TelegramBotSink {
    async fn send_text(&self, message: &TextMessage) -> Result<(), SinkError> {
        self.call("sendMessage", &self.text_request(message)).await
    }

    async fn send_poll(&self, poll: &PollMessage) -> Result<(), SinkError> {
        self.call("sendPoll", &self.poll_request(poll)).await
    }
}
