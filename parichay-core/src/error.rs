use thiserror::Error;

#[derive(Error, Debug)]
pub enum QrError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Decode failed: {0}")]
    DecodeFailure(String),

    #[error("Decompression failed: {0}")]
    DecompressionFailure(String),

    #[error("Unsupported image data: {0}")]
    UnsupportedImage(String),
}

pub type Result<T> = std::result::Result<T, QrError>;
