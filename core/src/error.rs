use thiserror::Error;

#[derive(Error, Debug)]
pub enum RoiError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Schema error: row {row} is missing required field '{field}'")]
    MissingField { row: usize, field: &'static str },

    #[error("Invalid date in row {row}, field '{field}': {value}")]
    InvalidDate {
        row: usize,
        field: &'static str,
        value: String,
    },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Result table '{name}' not found")]
    TableNotFound { name: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type RoiResult<T> = Result<T, RoiError>;
