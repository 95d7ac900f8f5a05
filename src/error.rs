use thiserror::Error;

/// Errors raised while extracting, building or rendering the college graph.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required header is absent from the CSV.
    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Could not open browser: {0}")]
    Browser(String),
}

pub type Result<T> = std::result::Result<T, GraphError>;
