use crate::validate::ValidationFailure;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationFailure),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
