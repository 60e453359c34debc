use thiserror::Error;

#[derive(Error, Debug)]
pub enum TreasuryError {
    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Validation failed: {details}")]
    Validation { details: String },

    #[error("Persistence failure on {sink}: {reason}")]
    Persistence { sink: String, reason: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TreasuryError {
    pub fn missing_fields(fields: &[&str]) -> Self {
        TreasuryError::Validation {
            details: format!("required fields missing: {}", fields.join(", ")),
        }
    }
}

pub type Result<T> = std::result::Result<T, TreasuryError>;
