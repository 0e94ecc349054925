//! API error handling module
//!
//! Provides a unified error type for all API endpoints with structured error
//! variants and a consistent JSON error body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// API error type with structured variants for different error categories
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad request - client provided invalid input
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error - unexpected server-side failure
    #[error("Internal error: {0}")]
    Internal(String),

    /// Parichay core error - error from the decoding pipeline
    #[error("Decode error: {0}")]
    Qr(#[from] parichay_core::QrError),
}

impl ApiError {
    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Create an internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Qr(ref e) => match e {
                // Client-provided invalid input → 400
                parichay_core::QrError::InvalidInput(_) => StatusCode::BAD_REQUEST,

                // Undecodable payloads → 422 Unprocessable Entity
                parichay_core::QrError::DecodeFailure(_)
                | parichay_core::QrError::DecompressionFailure(_) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }

                // Image conversion issues are absorbed by the pipeline; if
                // one surfaces here it is a server-side defect
                parichay_core::QrError::UnsupportedImage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Get the error code for programmatic error handling
    fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "INVALID_INPUT",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Qr(ref e) => match e {
                parichay_core::QrError::InvalidInput(_) => "INVALID_INPUT",
                parichay_core::QrError::DecodeFailure(_) => "DECODE_FAILED",
                parichay_core::QrError::DecompressionFailure(_) => "DECOMPRESSION_FAILED",
                parichay_core::QrError::UnsupportedImage(_) => "UNSUPPORTED_IMAGE",
            },
        }
    }

    /// Get the error category for logging
    fn error_category(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::Internal(_) => "internal",
            Self::Qr(_) => "pipeline",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let category = self.error_category();
        let code = self.error_code();
        let message = self.to_string();

        match &self {
            Self::BadRequest(_) | Self::Qr(_) => {
                tracing::warn!(
                    status = %status,
                    category = category,
                    code = code,
                    error = %message,
                    "Client error"
                );
            }
            Self::Internal(_) => {
                tracing::error!(
                    status = %status,
                    category = category,
                    code = code,
                    error = %message,
                    "Server error"
                );
            }
        }

        // All error responses include a `code` field for programmatic handling
        let body = serde_json::json!({
            "error": message,
            "code": code,
        });

        (status, Json(body)).into_response()
    }
}
