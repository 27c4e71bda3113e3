//! Error types for image operations.

use thiserror::Error;

/// Result type for image operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while decoding or encoding images.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Image data is empty")]
    EmptyData,

    #[error("Failed to decode image: {0}")]
    DecodeFailed(String),

    #[error("Failed to encode image: {0}")]
    EncodeFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<image::ImageError> for MediaError {
    fn from(e: image::ImageError) -> Self {
        match e {
            image::ImageError::Encoding(_) => MediaError::EncodeFailed(e.to_string()),
            image::ImageError::IoError(io) => MediaError::Io(io),
            other => MediaError::DecodeFailed(other.to_string()),
        }
    }
}
