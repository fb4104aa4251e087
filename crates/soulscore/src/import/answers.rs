use std::path::{Path, PathBuf};

use crate::scoring::AnswerSet;

#[derive(Debug, thiserror::Error)]
pub enum AnswersFileError {
    #[error("failed to read answers file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("answers file {path} must map question ids to option keys: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Read a JSON object of `question id -> option key` from disk.
pub fn read_answers(path: impl AsRef<Path>) -> Result<AnswerSet, AnswersFileError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| AnswersFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&raw).map_err(|source| AnswersFileError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
