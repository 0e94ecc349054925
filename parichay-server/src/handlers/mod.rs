//! HTTP request handlers
//!
//! This module contains all the request handlers for the API endpoints.

pub mod decode;
pub mod health;
pub mod verify;

pub use crate::state::AppState;
pub use decode::{decode_qr_string_handler, DecodeRequest, DecodeResponse};
pub use health::{health, ready, HealthResponse, ReadyResponse};
pub use verify::{
    verify_email_handler, verify_mobile_handler, verify_qr_handler, MatchResponse,
    VerifyEmailRequest, VerifyMobileRequest, VerifyRequest,
};
