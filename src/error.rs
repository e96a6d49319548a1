use std::fmt;

#[derive(Debug)]
pub enum DecorError {
    ConfigError(String),
    ValidationError(String),
    UploadError(String),
    ProviderError(String),
    CompressionError(String),
    SizeLimitError(String),
    SerializationError(String),
}

impl fmt::Display for DecorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecorError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            DecorError::ValidationError(msg) => write!(f, "{}", msg),
            DecorError::UploadError(msg) => write!(f, "File upload error: {}", msg),
            DecorError::ProviderError(msg) => write!(f, "Provider error: {}", msg),
            DecorError::CompressionError(msg) => write!(f, "Compression error: {}", msg),
            DecorError::SizeLimitError(msg) => write!(f, "{}", msg),
            DecorError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for DecorError {}

pub type Result<T> = std::result::Result<T, DecorError>;
