//! Error handling for the resume tailor

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResumeTailorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The résumé (or job description) lacks the structure the parser needs.
    #[error("Structural parse error: {0}")]
    StructuralParse(String),

    #[error("Input not found: {0}")]
    InputNotFound(String),

    /// A malformed edit request. `index` is the zero-based entry position.
    #[error("Schema error in edit #{index}: {reason}")]
    Schema { index: usize, reason: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Output formatting error: {0}")]
    OutputFormatting(String),
}

pub type Result<T> = std::result::Result<T, ResumeTailorError>;

/// Convert anyhow errors to our custom error type
impl From<anyhow::Error> for ResumeTailorError {
    fn from(err: anyhow::Error) -> Self {
        ResumeTailorError::Processing(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_names_index() {
        let err = ResumeTailorError::Schema {
            index: 2,
            reason: "missing field `proposed`".to_string(),
        };
        assert_eq!(err.to_string(), "Schema error in edit #2: missing field `proposed`");
    }

    #[test]
    fn test_anyhow_conversion() {
        let err: ResumeTailorError = anyhow::anyhow!("boom").into();
        assert!(matches!(err, ResumeTailorError::Processing(ref m) if m == "boom"));
    }
}
