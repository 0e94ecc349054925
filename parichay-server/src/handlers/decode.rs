//! QR string decoding handler
//!
//! Handles POST /decode-qr-string requests carrying a raw scanned QR string.

use axum::{extract::State, Json};
use parichay_core::{DecodeOutcome, QrFormat};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for decoding
#[derive(Deserialize)]
pub struct DecodeRequest {
    /// Raw QR string from the scanner
    pub qr_string: String,
}

/// Response for a successful decode
#[derive(Serialize)]
pub struct DecodeResponse {
    /// Which payload format was recognized
    pub qr_format: QrFormat,
    /// The decode outcome (structured fields or raw-parsed fallback)
    pub data: DecodeOutcome,
    /// The trimmed input string, echoed for client-side correlation
    pub qr_string: String,
}

/// Decode a scanned QR string
///
/// Accepts JSON with:
/// - **qr_string** (required): the raw string read from the QR code
///
/// Returns the decoded fields, the recognized format and, for secure
/// payloads, the embedded portrait when one could be extracted. Undecodable
/// payloads yield 422 with a machine-readable error code; empty input is 400.
pub async fn decode_qr_string_handler(
    State(state): State<AppState>,
    Json(request): Json<DecodeRequest>,
) -> Result<Json<DecodeResponse>, ApiError> {
    let qr_string = request.qr_string.trim().to_string();
    if qr_string.is_empty() {
        return Err(ApiError::bad_request("qr_string is required"));
    }

    debug!(len = qr_string.len(), "decode request received");
    let outcome = state.pipeline.decode(&qr_string)?;

    Ok(Json(DecodeResponse {
        qr_format: outcome.format(),
        data: outcome,
        qr_string,
    }))
}
