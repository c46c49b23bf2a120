use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised by the exploration pipeline.
///
/// Every variant reaches the caller unchanged; nothing in the pipeline retries
/// or falls back silently, except highlight-target resolution which has a
/// defined fallback and therefore never produces an error of its own.
#[derive(Error, Debug)]
pub enum ExploreError {
    /// Content is not a spreadsheet calamine can open, or the upload could not be read.
    #[error("Unreadable spreadsheet: {0}")]
    UnreadableFile(String),

    #[error("Sheet '{sheet}' not found. Available sheets: {}", available.join(", "))]
    SheetNotFound {
        sheet: String,
        available: Vec<String>,
    },

    /// Neither identifier column exists.
    #[error("Unsupported worksheet: expected a '{player}' or '{team}' column")]
    UnsupportedSchema { player: String, team: String },

    #[error("Missing column '{column}' ({context})")]
    MissingColumn { column: String, context: String },

    /// The column exists but cannot serve the requested role.
    #[error("Column '{column}' cannot be used: {reason}")]
    UnusableColumn { column: String, reason: String },

    #[error("Invalid range: minimum {min} is greater than maximum {max}")]
    InvalidRange { min: f64, max: f64 },

    #[error("No rows left after filtering; the mean is undefined")]
    EmptyDataset,

    #[error("Column '{column}' has no numeric values; the mean is undefined")]
    NoNumericValues { column: String },

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

impl ExploreError {
    pub(crate) fn missing_column(column: &str, context: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.to_string(),
            context: context.into(),
        }
    }
}

impl From<calamine::Error> for ExploreError {
    fn from(err: calamine::Error) -> Self {
        Self::UnreadableFile(err.to_string())
    }
}

/// Result type for pipeline operations.
pub type Result<T, E = ExploreError> = std::result::Result<T, E>;
