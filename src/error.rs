use std::path::PathBuf;

use thiserror::Error;

/// Failures of the CSV → document import. Any of these stops the batch.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("CSV not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Slug not found in CSV: {0}")]
    SlugNotFound(String),

    #[error("--limit must be > 0 (got {0})")]
    InvalidLimit(i64),

    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Unparseable date in {field}: {value:?}")]
    InvalidDate {
        field: &'static str,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Refusing to overwrite existing file: {}", .0.display())]
    AlreadyExists(PathBuf),
}
