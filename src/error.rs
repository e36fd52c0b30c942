//! Error types for the cropcast prediction pipeline

use thiserror::Error;

/// Result type alias for cropcast operations
pub type Result<T> = std::result::Result<T, PredictError>;

/// Main error type for the prediction pipeline
#[derive(Error, Debug)]
pub enum PredictError {
    #[error("Model load error: {0}")]
    ModelLoad(String),

    #[error("Unknown {field}: {value}. Available options: {}", valid_values.join(", "))]
    UnknownCategory {
        field: String,
        value: String,
        valid_values: Vec<String>,
    },

    #[error("Invalid value for {field}: {value}")]
    FeatureParse { field: String, value: String },

    #[error("Scaling error: {0}")]
    Scaling(String),

    #[error("Estimator error: {0}")]
    Estimator(String),

    #[error("Missing columns: {}", missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    #[error("Data error: {0}")]
    Data(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<polars::error::PolarsError> for PredictError {
    fn from(err: polars::error::PolarsError) -> Self {
        PredictError::Data(err.to_string())
    }
}

impl From<serde_json::Error> for PredictError {
    fn from(err: serde_json::Error) -> Self {
        PredictError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PredictError::FeatureParse {
            field: "month".to_string(),
            value: "13".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid value for month: 13");
    }

    #[test]
    fn test_unknown_category_lists_valid_values() {
        let err = PredictError::UnknownCategory {
            field: "District".to_string(),
            value: "Atlantis".to_string(),
            valid_values: vec!["Gadag".to_string(), "Haveri".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Unknown District: Atlantis. Available options: Gadag, Haveri"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PredictError = io_err.into();
        assert!(matches!(err, PredictError::Io(_)));
    }
}
