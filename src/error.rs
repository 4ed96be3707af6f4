//! Error taxonomy for building and persisting traffic models.

/// Everything that can abort a model build or a save/load of its records.
///
/// A single failing row aborts the whole build; nothing is skipped.
#[derive(thiserror::Error, Debug)]
pub enum ModelError {
    /// The requested setup cannot work: unknown model, bad time slot,
    /// an edge with no lanes, and similar.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// The input data does not match what the model expects.
    #[error("data error: {0}")]
    Data(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ModelError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        ModelError::Configuration(msg.into())
    }

    pub fn data(msg: impl Into<String>) -> Self {
        ModelError::Data(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, ModelError>;
