//! Domain entities. Pure data structures for the core business.
//!
//! No HTTP/Telegram types here — adapters map their wire formats into these.

use crate::domain::errors::ComposeError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// One multiple-choice question as returned by the question source.
///
/// Spreadsheet cells may arrive as numbers (`"id": 17`, `"option_a": 3`); every
/// field decodes to text, and `null` or a missing cell becomes an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    #[serde(default, deserialize_with = "cell_text")]
    pub id: String,
    #[serde(default, deserialize_with = "cell_text")]
    pub question: String,
    #[serde(default, deserialize_with = "cell_text")]
    pub option_a: String,
    #[serde(default, deserialize_with = "cell_text")]
    pub option_b: String,
    #[serde(default, deserialize_with = "cell_text")]
    pub option_c: String,
    #[serde(default, deserialize_with = "cell_text")]
    pub option_d: String,
    #[serde(default, deserialize_with = "cell_text")]
    pub correct: String,
    #[serde(default, deserialize_with = "cell_text")]
    pub explanation: String,
}

impl QuestionRecord {
    /// Option texts in fixed A-D order.
    pub fn options(&self) -> [&str; 4] {
        [
            &self.option_a,
            &self.option_b,
            &self.option_c,
            &self.option_d,
        ]
    }

    /// Check the record invariants and return the parsed correct label.
    pub fn validate(&self) -> Result<OptionLabel, ComposeError> {
        if self.id.trim().is_empty() {
            return Err(ComposeError::MissingId);
        }
        if self.question.trim().is_empty() {
            return Err(ComposeError::MissingQuestion {
                id: self.id.clone(),
            });
        }
        OptionLabel::parse(&self.correct).ok_or_else(|| ComposeError::InvalidCorrect {
            id: self.id.clone(),
            value: self.correct.clone(),
        })
    }
}

/// Option label A-D. Index order matches poll option order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionLabel {
    A,
    B,
    C,
    D,
}

impl OptionLabel {
    pub const ALL: [OptionLabel; 4] = [Self::A, Self::B, Self::C, Self::D];

    /// Case-insensitive, surrounding whitespace ignored.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "A" | "a" => Some(Self::A),
            "B" | "b" => Some(Self::B),
            "C" | "c" => Some(Self::C),
            "D" | "d" => Some(Self::D),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
            Self::C => 2,
            Self::D => 3,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::D => 'D',
        }
    }
}

impl fmt::Display for OptionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// One unit of outbound content, ready for the message sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundPayload {
    Text(TextMessage),
    Poll(PollMessage),
}

impl OutboundPayload {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Poll(_) => "poll",
        }
    }
}

/// HTML-formatted text message. `body` never exceeds the configured max length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMessage {
    pub body: String,
}

/// Quiz poll: prompt, options in A-D order, index of the correct option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollMessage {
    pub question: String,
    pub options: Vec<String>,
    pub correct_index: usize,
}

/// Pipeline stage that produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Compose,
    Dispatch,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Fetch => "fetch",
            Self::Compose => "compose",
            Self::Dispatch => "dispatch",
        };
        f.write_str(s)
    }
}

/// Terminal result of one run. Reported, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Skipped {
        reason: String,
    },
    Delivered {
        payload_count: usize,
    },
    Failed {
        stage: Stage,
        detail: String,
        /// Payloads delivered before the failure (non-zero only for dispatch).
        partial_count: usize,
    },
}

impl DeliveryOutcome {
    /// Skipped counts as success: outside the window is an expected no-op.
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }
}

impl fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skipped { reason } => write!(f, "skipped ({reason})"),
            Self::Delivered { payload_count } => write!(f, "delivered {payload_count} payload(s)"),
            Self::Failed {
                stage,
                detail,
                partial_count,
            } => write!(
                f,
                "failed at {stage} after {partial_count} payload(s): {detail}"
            ),
        }
    }
}

/// Accepts string, number, bool or null and yields text.
fn cell_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct CellVisitor;

    impl serde::de::Visitor<'_> for CellVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string, number, bool or null")
        }

        fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_string<E: serde::de::Error>(self, v: String) -> Result<String, E> {
            Ok(v)
        }

        fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<String, E> {
            // Sheets exports whole numbers as floats
            if v.fract() == 0.0 && v.abs() < 1e15 {
                Ok(format!("{}", v as i64))
            } else {
                Ok(v.to_string())
            }
        }

        fn visit_bool<E: serde::de::Error>(self, v: bool) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_unit<E: serde::de::Error>(self) -> Result<String, E> {
            Ok(String::new())
        }

        fn visit_none<E: serde::de::Error>(self) -> Result<String, E> {
            Ok(String::new())
        }
    }

    deserializer.deserialize_any(CellVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> QuestionRecord {
        QuestionRecord {
            id: "1".into(),
            question: "2+2=?".into(),
            option_a: "3".into(),
            option_b: "4".into(),
            option_c: "5".into(),
            option_d: "6".into(),
            correct: "B".into(),
            explanation: "Basic addition".into(),
        }
    }

    #[test]
    fn test_validate_accepts_lowercase_correct() {
        let mut q = record();
        q.correct = " c ".into();
        assert_eq!(q.validate(), Ok(OptionLabel::C));
        assert_eq!(OptionLabel::C.index(), 2);
    }

    #[test]
    fn test_validate_rejects_bad_records() {
        let mut q = record();
        q.id = "  ".into();
        assert_eq!(q.validate(), Err(ComposeError::MissingId));

        let mut q = record();
        q.question = String::new();
        assert!(matches!(
            q.validate(),
            Err(ComposeError::MissingQuestion { .. })
        ));

        let mut q = record();
        q.correct = "E".into();
        assert!(matches!(
            q.validate(),
            Err(ComposeError::InvalidCorrect { .. })
        ));
    }

    #[test]
    fn test_decode_numeric_cells() {
        let json = r#"{"id": 17, "question": "2+2=?", "option_a": 3, "option_b": 4.0,
            "option_c": "5", "option_d": 6, "correct": "B", "explanation": null}"#;
        let q: QuestionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(q.id, "17");
        assert_eq!(q.options(), ["3", "4", "5", "6"]);
        assert_eq!(q.explanation, "");
    }

    #[test]
    fn test_decode_missing_fields_default_empty() {
        let q: QuestionRecord = serde_json::from_str(r#"{"id": "x"}"#).unwrap();
        assert_eq!(q.id, "x");
        assert!(q.question.is_empty());
        assert!(q.validate().is_err());
    }

    #[test]
    fn test_skipped_is_success() {
        let skipped = DeliveryOutcome::Skipped {
            reason: "outside window".into(),
        };
        let failed = DeliveryOutcome::Failed {
            stage: Stage::Fetch,
            detail: "boom".into(),
            partial_count: 0,
        };
        assert!(skipped.is_success());
        assert!(!failed.is_success());
        assert_eq!(Stage::Dispatch.to_string(), "dispatch");
    }
}
