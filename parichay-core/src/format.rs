//! QR payload format classification.
//!
//! Two historical Aadhaar QR formats exist: the "secure" format, where the
//! whole payload is one arbitrary-precision decimal integer rendered as text,
//! and the legacy "old" plain-text format. The literal shape of the string is
//! the only classification signal.

use serde::{Deserialize, Serialize};

use crate::error::{QrError, Result};

/// Identifies which QR payload format an input string carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QrFormat {
    /// Compressed numeric payload (digits only).
    Secure,
    /// Legacy plain-text payload.
    Old,
}

impl std::fmt::Display for QrFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Secure => write!(f, "secure"),
            Self::Old => write!(f, "old"),
        }
    }
}

/// Classify a trimmed QR string as [`QrFormat::Secure`] or [`QrFormat::Old`].
///
/// A string is Secure iff it consists entirely of decimal digits after
/// trimming surrounding whitespace. Empty input is rejected with
/// [`QrError::InvalidInput`] before classification.
pub fn classify(qr_string: &str) -> Result<QrFormat> {
    let trimmed = qr_string.trim();
    if trimmed.is_empty() {
        return Err(QrError::InvalidInput("empty QR string".into()));
    }

    if trimmed.bytes().all(|b| b.is_ascii_digit()) {
        Ok(QrFormat::Secure)
    } else {
        Ok(QrFormat::Old)
    }
}
