use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReshapeError {
    #[error("invalid argument: allow-list must name at least one location")]
    EmptyAllowList,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("row {row}: cannot parse date {value:?} (expected YYYY-MM-DD)")]
    InvalidDate { row: usize, value: String },

    #[error("row {row}: location is missing")]
    MissingLocation { row: usize },

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

pub type Result<T> = std::result::Result<T, ReshapeError>;
