//! Error types for bgmix operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for bgmix operations.
pub type Result<T> = std::result::Result<T, MixError>;

/// Errors that can occur while decoding, mixing, or encoding audio.
#[derive(Error, Debug)]
pub enum MixError {
    // Input Errors
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("Background buffer contains no frames")]
    EmptyBgmBuffer,

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    // Session Errors
    #[error("A mix operation is already in progress")]
    Busy,

    #[error("Mix operation was cancelled")]
    Cancelled,

    // Encoding Errors
    #[error("Encoding invariant violated: {reason}")]
    InternalEncodingError { reason: String },

    // File Errors
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Invalid audio file: {reason}")]
    InvalidAudio { reason: String },

    // Serialization Errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // I/O Errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MixError {
    /// Get the error code for this error type.
    pub fn error_code(&self) -> &'static str {
        match self {
            MixError::InvalidInput { .. } => "INVALID_INPUT",
            MixError::EmptyBgmBuffer => "EMPTY_BGM_BUFFER",
            MixError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            MixError::Busy => "BUSY",
            MixError::Cancelled => "CANCELLED",
            MixError::InternalEncodingError { .. } => "INTERNAL_ENCODING_ERROR",
            MixError::FileNotFound { .. } => "FILE_NOT_FOUND",
            MixError::InvalidAudio { .. } => "INVALID_AUDIO",
            MixError::Json(_) => "JSON_ERROR",
            MixError::Io(_) => "IO_ERROR",
        }
    }

    /// Returns true if this error indicates the operation can be retried
    /// without changing the inputs.
    pub fn is_retryable(&self) -> bool {
        matches!(self, MixError::Busy | MixError::Cancelled)
    }
}
