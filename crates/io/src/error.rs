use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: {message}")]
    Csv { path: PathBuf, message: String },

    #[error(transparent)]
    Table(#[from] lishe_recommend::RecommendError),

    /// Goal label that cannot name a log file inside the history directory.
    #[error("goal '{0}' cannot be used as a history file name")]
    InvalidGoal(String),

    /// Rating outside the 0..=4 scale.
    #[error("rating must be between 0 and 4, got {0}")]
    InvalidRating(u8),
}
