use std::io;
use thiserror::Error;

/// Everything that can stop a pipeline run. Each stage fails with its own variant.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Ingestion: the uploaded table lacks a required column.
    #[error("schema error: missing column '{column}' (available: {})", available.join(", "))]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    /// Ingestion: no header or no data rows.
    #[error("input contains no rows")]
    EmptyInput,

    /// Word cloud: nothing left to draw after cleaning and stopword removal.
    #[error("word cloud: corpus is empty after cleaning")]
    EmptyCorpus,

    #[error("sentiment: need at least {required} rows to fit a classifier, found {found}")]
    TooFewRows { found: usize, required: usize },

    #[error("sentiment: cleaned corpus yields an empty vocabulary")]
    EmptyVocabulary,

    #[error("sentiment: training labels contain a single class")]
    SingleClass,

    #[error("sentiment: got {labels} labels for {rows} rows")]
    LabelMismatch { labels: usize, rows: usize },

    #[error("sentiment: row {row} has label '{value}', expected 0 or 1")]
    InvalidLabel { row: usize, value: String },

    /// Derived columns were added out of order.
    #[error("column order violated: {0}")]
    ColumnOrder(&'static str),

    #[error("font error: {0}")]
    Font(String),

    #[error("render error: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wraps any plotters drawing error.
    pub(crate) fn render<E: std::fmt::Display>(err: E) -> Self {
        Error::Render(err.to_string())
    }
}
