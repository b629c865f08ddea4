use thiserror::Error;

/// Core error types for slcheck
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed address-prefix expression or port value
    #[error("Parse error in '{input}': {message}")]
    Parse { input: String, message: String },

    /// Missing or unrecognized field value (direction, query parameters)
    #[error("Validation error in {field}: {message}")]
    Validation { field: String, message: String },

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Inventory snapshot is inconsistent or unreadable
    #[error("Inventory error: {0}")]
    Inventory(String),
}

impl Error {
    pub fn parse(input: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            input: input.into(),
            message: message.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// True for errors caused by a single malformed rule, as opposed to I/O
    /// or inventory failures that affect the whole run.
    pub fn is_rule_error(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::Validation { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
