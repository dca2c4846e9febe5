use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Missing required columns {missing:?}. Available columns: {available:?}")]
    MissingColumns {
        missing:   Vec<String>,
        available: Vec<String>,
    },

    #[error("Column '{column}' row {row}: cannot read {value:?} as a number")]
    InvalidNumber {
        column: String,
        row:    usize,
        value:  String,
    },

    #[error("Unknown theme '{name}' (expected one of: compact, spacious)")]
    UnknownTheme { name: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type DashResult<T> = Result<T, DashError>;
