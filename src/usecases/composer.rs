//! Message composer: question record -> ordered outbound payloads.
//!
//! Single layout: one HTML text message with question, options A-D, correct
//! answer and explanation. When that exceeds `max_text_length`, split layout:
//! a text message with question and explanation only, followed by a quiz poll
//! carrying the options and the correct index.
//!
//! Lengths are counted in characters after HTML escaping.

use crate::domain::{
    ComposeError, OptionLabel, OutboundPayload, PollMessage, QuestionRecord, TextMessage,
};
use crate::shared::config::{DEFAULT_MAX_TEXT_LENGTH, DEFAULT_POLL_QUESTION_LIMIT};

const QUESTION_HEADER: &str = "❓ <b>Question:</b>";
const CORRECT_HEADER: &str = "✅ <b>Correct answer:</b>";
const EXPLANATION_HEADER: &str = "📘 <b>Explanation:</b>";
const TRUNCATION_NOTICE: &str = "\n\n… (truncated)";
/// Poll prompt when the question itself is too long for a poll; the preceding text carries it.
pub const POLL_FALLBACK_PROMPT: &str = "Choose the correct option:";
/// Smallest `max_text_length` that still fits every header with its closing tag.
pub const MIN_TEXT_LENGTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComposerConfig {
    /// Ceiling for every text message body.
    pub max_text_length: usize,
    /// Longest question accepted by the platform's poll API.
    pub poll_question_limit: usize,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            max_text_length: DEFAULT_MAX_TEXT_LENGTH,
            poll_question_limit: DEFAULT_POLL_QUESTION_LIMIT,
        }
    }
}

/// Pure formatter. Same record in, same payloads out.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageComposer {
    config: ComposerConfig,
}

impl MessageComposer {
    pub fn new(config: ComposerConfig) -> Self {
        Self { config }
    }

    /// Returns one or two payloads, never zero. Fails only on a record that breaks the invariants.
    pub fn compose(&self, q: &QuestionRecord) -> Result<Vec<OutboundPayload>, ComposeError> {
        let correct = q.validate()?;
        let full = render_full(q, correct);
        if char_len(&full) <= self.config.max_text_length {
            return Ok(vec![OutboundPayload::Text(TextMessage { body: full })]);
        }

        let text = self.render_split_text(q);
        let poll = self.build_poll(q, correct);
        Ok(vec![
            OutboundPayload::Text(TextMessage { body: text }),
            OutboundPayload::Poll(poll),
        ])
    }

    /// Question header, question and explanation, cut down only when they overflow
    /// `max_text_length`. Then the explanation keeps whatever the untouched question
    /// leaves, but never less than half the budget; the question gets the rest.
    fn render_split_text(&self, q: &QuestionRecord) -> String {
        let max = self.config.max_text_length;
        let head = format!("{QUESTION_HEADER}\n");
        let question = escape_html(q.question.trim());
        let explanation = explanation_text(q).map(escape_html);

        let untruncated = format!(
            "{head}{question}{}",
            explanation
                .as_deref()
                .map(explanation_block)
                .unwrap_or_default()
        );
        if char_len(&untruncated) <= max {
            return untruncated;
        }

        let explanation_cap =
            (max / 2).max(max.saturating_sub(char_len(&head) + char_len(&question)));
        let framing = char_len(&explanation_block(""));
        let block = explanation
            .as_deref()
            .map(|text| {
                explanation_block(&truncate_html(
                    text,
                    explanation_cap.saturating_sub(framing),
                ))
            })
            .unwrap_or_default();

        let question_budget = max
            .saturating_sub(char_len(&head))
            .saturating_sub(char_len(&block));
        let question = truncate_html(&question, question_budget);

        let body = format!("{head}{question}{block}");
        // Only reachable with a max_text_length below MIN_TEXT_LENGTH
        truncate_html(&body, max)
    }

    fn build_poll(&self, q: &QuestionRecord, correct: OptionLabel) -> PollMessage {
        let question = q.question.trim();
        let prompt = if char_len(question) <= self.config.poll_question_limit {
            question.to_string()
        } else {
            POLL_FALLBACK_PROMPT.to_string()
        };
        let options = OptionLabel::ALL
            .iter()
            .zip(q.options())
            .map(|(label, text)| {
                let text = text.trim();
                if text.is_empty() {
                    format!("Option {label}")
                } else {
                    text.to_string()
                }
            })
            .collect();
        PollMessage {
            question: prompt,
            options,
            correct_index: correct.index(),
        }
    }
}

/// Full single-message rendering: header, question, options, correct marker, explanation.
pub fn render_full(q: &QuestionRecord, correct: OptionLabel) -> String {
    let mut out = format!("{QUESTION_HEADER}\n{}\n\n", escape_html(q.question.trim()));
    for (label, text) in OptionLabel::ALL.iter().zip(q.options()) {
        out.push_str(&format!("{label}) {}\n", escape_html(text.trim())));
    }
    out.push_str(&format!("\n{CORRECT_HEADER} {correct}"));
    if let Some(text) = explanation_text(q) {
        out.push_str(&explanation_block(&escape_html(text)));
    }
    out
}

fn explanation_block(escaped: &str) -> String {
    format!("\n\n{EXPLANATION_HEADER}\n{escaped}")
}

fn explanation_text(q: &QuestionRecord) -> Option<&str> {
    let text = q.explanation.trim();
    (!text.is_empty()).then_some(text)
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Escape the characters Telegram's HTML parse mode treats as markup.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Cut HTML text to at most `max_chars` characters, appending the truncation notice
/// when room allows. Never leaves a dangling entity (`&am`) or tag (`<b`).
fn truncate_html(text: &str, max_chars: usize) -> String {
    if char_len(text) <= max_chars {
        return text.to_string();
    }
    let notice_len = char_len(TRUNCATION_NOTICE);
    let (keep, notice) = if max_chars > notice_len {
        (max_chars - notice_len, TRUNCATION_NOTICE)
    } else {
        (max_chars, "")
    };
    let mut cut: String = text.chars().take(keep).collect();
    if let Some(amp) = cut.rfind('&') {
        if !cut[amp..].contains(';') {
            cut.truncate(amp);
        }
    }
    if let Some(lt) = cut.rfind('<') {
        if !cut[lt..].contains('>') {
            cut.truncate(lt);
        }
    }
    cut.push_str(notice);
    cut
}
