//! QR verification handlers
//!
//! Handles POST /verify-qr requests combining a decode with optional
//! identity checks, plus the dedicated single-check endpoints
//! POST /verify-email and POST /verify-mobile.

use axum::{extract::State, Json};
use parichay_core::VerificationReport;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for verification
#[derive(Deserialize)]
pub struct VerifyRequest {
    /// Raw QR string from the scanner
    pub qr_string: String,
    /// Optional email to check against the secure payload's records
    #[serde(default)]
    pub email: Option<String>,
    /// Optional mobile number to check against the secure payload's records
    #[serde(default)]
    pub mobile: Option<u64>,
}

/// Verify a QR code using available checks
///
/// Accepts JSON with:
/// - **qr_string** (required)
/// - **email** (optional): verified against secure-format payloads
/// - **mobile** (optional): verified against secure-format payloads
///
/// Always returns 200 with a [`VerificationReport`]; decode failures are
/// reported inside the body (`ok: false` plus a message), never as an HTTP
/// error. Only a missing or empty `qr_string` is a 400.
pub async fn verify_qr_handler(
    State(state): State<AppState>,
    Json(request): Json<VerifyRequest>,
) -> Result<Json<VerificationReport>, ApiError> {
    if request.qr_string.trim().is_empty() {
        return Err(ApiError::bad_request("qr_string is required"));
    }

    debug!(
        has_email = request.email.is_some(),
        has_mobile = request.mobile.is_some(),
        "verify request received"
    );

    let report = state.pipeline.verify(
        &request.qr_string,
        request.email.as_deref(),
        request.mobile,
    );

    Ok(Json(report))
}

/// Request body for the dedicated email check
#[derive(Deserialize)]
pub struct VerifyEmailRequest {
    /// Raw QR string from the scanner
    pub qr_string: String,
    /// Email to check against the secure payload's records
    pub email: String,
}

/// Request body for the dedicated mobile check
#[derive(Deserialize)]
pub struct VerifyMobileRequest {
    /// Raw QR string from the scanner
    pub qr_string: String,
    /// Mobile number to check against the secure payload's records
    pub mobile: u64,
}

/// Response for the single-check endpoints
#[derive(Serialize)]
pub struct MatchResponse {
    /// Whether the value matched the payload's records
    pub verified: bool,
}

/// Check one email against a QR payload
///
/// Returns 200 with `{ verified: bool }`; any decode or capability failure
/// answers `verified: false`. Only a missing or empty `qr_string` is a 400.
pub async fn verify_email_handler(
    State(state): State<AppState>,
    Json(request): Json<VerifyEmailRequest>,
) -> Result<Json<MatchResponse>, ApiError> {
    if request.qr_string.trim().is_empty() {
        return Err(ApiError::bad_request("qr_string is required"));
    }

    let verified = state
        .pipeline
        .email_verified(&request.qr_string, &request.email);
    debug!(verified, "email check completed");

    Ok(Json(MatchResponse { verified }))
}

/// Check one mobile number against a QR payload
///
/// Same contract as the email check.
pub async fn verify_mobile_handler(
    State(state): State<AppState>,
    Json(request): Json<VerifyMobileRequest>,
) -> Result<Json<MatchResponse>, ApiError> {
    if request.qr_string.trim().is_empty() {
        return Err(ApiError::bad_request("qr_string is required"));
    }

    let verified = state
        .pipeline
        .mobile_verified(&request.qr_string, request.mobile);
    debug!(verified, "mobile check completed");

    Ok(Json(MatchResponse { verified }))
}
