//! Local CSV question source. Implements QuestionSource over a file exported
//! from the question sheet.
//!
//! Header: `id,question,option_a,option_b,option_c,option_d,correct,explanation`.
//! The whole file is read on every fetch; one row is picked uniformly at random
//! among rows that pass record validation.

use crate::domain::{FetchError, QuestionRecord};
use crate::ports::QuestionSource;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

/// Raw row; cells stay text so ids like `007` keep their leading zeros.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CsvRow {
    id: String,
    question: String,
    option_a: String,
    option_b: String,
    option_c: String,
    option_d: String,
    correct: String,
    explanation: String,
}

impl From<CsvRow> for QuestionRecord {
    fn from(row: CsvRow) -> Self {
        Self {
            id: row.id,
            question: row.question,
            option_a: row.option_a,
            option_b: row.option_b,
            option_c: row.option_c,
            option_d: row.option_d,
            correct: row.correct,
            explanation: row.explanation,
        }
    }
}

/// Parse all rows, keeping only those that satisfy the record invariants.
fn parse_valid_rows(content: &str) -> Result<Vec<QuestionRecord>, FetchError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut valid = Vec::new();
    for (line, row) in reader.deserialize::<CsvRow>().enumerate() {
        let record = QuestionRecord::from(
            row.map_err(|e| FetchError::Malformed(format!("CSV row {}: {}", line + 1, e)))?,
        );
        match record.validate() {
            Ok(_) => valid.push(record),
            Err(e) => warn!(row = line + 1, error = %e, "skipping invalid question row"),
        }
    }
    Ok(valid)
}

fn pick<R: Rng + ?Sized>(
    records: Vec<QuestionRecord>,
    rng: &mut R,
) -> Result<QuestionRecord, FetchError> {
    records.choose(rng).cloned().ok_or(FetchError::Empty)
}

#[async_trait::async_trait]
impl QuestionSource for CsvFileSource {
    async fn fetch(&self) -> Result<QuestionRecord, FetchError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| FetchError::Io(format!("{}: {}", self.path.display(), e)))?;

        let rows = parse_valid_rows(&content)?;
        info!(path = %self.path.display(), eligible = rows.len(), "loaded question file");
        pick(rows, &mut rand::thread_rng())
    }
}
