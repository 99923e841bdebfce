use thiserror::Error;

/// Share-card errors
#[derive(Error, Debug)]
pub enum CardError {
    #[error("Font Error: {0}")]
    FontError(String),

    #[error("Encoding Error: {0}")]
    EncodingError(#[from] image::ImageError),

    #[error(transparent)]
    IoError(#[from] std::io::Error),
}

/// Result type for share-card operations
pub type CardResult<T> = Result<T, CardError>;
