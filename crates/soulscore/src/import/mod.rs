//! Quiz attempt history exported from the results database as CSV.

mod answers;
mod parser;

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use crate::profile::AttemptRecord;

pub use answers::{read_answers, AnswersFileError};

#[derive(Debug, thiserror::Error)]
pub enum AttemptImportError {
    #[error("failed to read attempt export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid attempt CSV data at row {row}: {source}")]
    Csv {
        row: usize,
        #[source]
        source: csv::Error,
    },
    #[error("row {row}: unrecognized created_at timestamp `{value}`")]
    Timestamp { row: usize, value: String },
    #[error("row {row}: result_totals is not a JSON object of numbers: {source}")]
    Totals {
        row: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Reads `attempt_id,user_id,quiz_slug,created_at,result_key,result_totals` rows.
pub struct AttemptImporter;

impl AttemptImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<AttemptRecord>, AttemptImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<AttemptRecord>, AttemptImportError> {
        parser::parse_records(reader)
    }

    /// Attempts belonging to `user_id`, in file order.
    pub fn for_user(attempts: &[AttemptRecord], user_id: &str) -> Vec<AttemptRecord> {
        let user_id = user_id.trim();
        attempts
            .iter()
            .filter(|attempt| attempt.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn by_user(attempts: Vec<AttemptRecord>) -> BTreeMap<String, Vec<AttemptRecord>> {
        let mut grouped: BTreeMap<String, Vec<AttemptRecord>> = BTreeMap::new();
        for attempt in attempts {
            grouped
                .entry(attempt.user_id.clone())
                .or_default()
                .push(attempt);
        }
        grouped
    }
}
