use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Structural decode error at line {line}: {message}")]
    DecodeError { line: usize, message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Unexpected collaborator response: {message}")]
    UnexpectedResponseError { message: String },
}

impl CatalogError {
    pub fn decode(line: usize, message: impl Into<String>) -> Self {
        CatalogError::DecodeError {
            line,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        CatalogError::ValidationError {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
