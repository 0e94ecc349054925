//! The external structured-decoder capability and its retry adapter.
//!
//! The authoritative field layout of both QR formats lives in proprietary
//! decoder implementations outside this crate. The pipeline talks to them
//! through [`StructuredDecoder`], one implementation per format, registered
//! in a [`DecoderRegistry`]. Optional capabilities (portrait bytes, identity
//! checks) are explicit trait methods with failing defaults, so an
//! implementation either provides one or visibly does not.
//!
//! Single-candidate decode failures are routine, not exceptional: the
//! adapter walks the byte-candidate list and keeps only the last error.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::candidates::byte_candidates;
use crate::error::{QrError, Result};

/// Field mapping produced by a structured decoder.
pub type FieldMap = BTreeMap<String, String>;

/// External decoding capability for one QR format.
///
/// `decode` is mandatory; everything else is an optional capability that
/// defaults to "not supported". Implementations must be thread-safe
/// (`Send + Sync`) since decode calls run concurrently across requests.
pub trait StructuredDecoder: Send + Sync {
    /// Decode one byte interpretation of the payload into named fields.
    fn decode(&self, input: &[u8]) -> Result<FieldMap>;

    /// Raw embedded portrait bytes, if this decoder can extract them.
    fn photo(&self, _input: &[u8]) -> Option<Vec<u8>> {
        None
    }

    /// Whether the payload carries an embedded portrait, if this decoder
    /// can tell without extracting it.
    fn has_photo(&self, _input: &[u8]) -> Option<bool> {
        None
    }

    /// Check a plaintext email against the payload's hashed email record.
    fn email_matches(&self, _input: &[u8], _email: &str) -> Result<bool> {
        Err(QrError::DecodeFailure("email check not supported".into()))
    }

    /// Check a mobile number against the payload's hashed mobile record.
    fn mobile_matches(&self, _input: &[u8], _mobile: u64) -> Result<bool> {
        Err(QrError::DecodeFailure("mobile check not supported".into()))
    }
}

/// Placeholder decoder for formats without a registered implementation.
///
/// Always fails with [`QrError::DecodeFailure`], which routes secure
/// payloads into the decompression fallback.
#[derive(Debug, Default)]
pub struct UnsupportedDecoder {
    format_name: &'static str,
}

impl UnsupportedDecoder {
    pub fn new(format_name: &'static str) -> Self {
        Self { format_name }
    }
}

impl StructuredDecoder for UnsupportedDecoder {
    fn decode(&self, _input: &[u8]) -> Result<FieldMap> {
        Err(QrError::DecodeFailure(format!(
            "no {} decoder registered",
            self.format_name
        )))
    }
}

/// Holds the decoder implementation for each format.
#[derive(Clone)]
pub struct DecoderRegistry {
    secure: Arc<dyn StructuredDecoder>,
    old: Arc<dyn StructuredDecoder>,
}

impl DecoderRegistry {
    pub fn new(secure: Arc<dyn StructuredDecoder>, old: Arc<dyn StructuredDecoder>) -> Self {
        Self { secure, old }
    }

    pub fn secure(&self) -> &dyn StructuredDecoder {
        self.secure.as_ref()
    }

    pub fn old(&self) -> &dyn StructuredDecoder {
        self.old.as_ref()
    }
}

impl Default for DecoderRegistry {
    /// Registry with no real decoders: every structured decode fails, so
    /// the pipeline exercises its fallback paths.
    fn default() -> Self {
        Self::new(
            Arc::new(UnsupportedDecoder::new("secure")),
            Arc::new(UnsupportedDecoder::new("old")),
        )
    }
}

/// A structured decode that succeeded for one byte candidate.
#[derive(Debug)]
pub(crate) struct AdapterSuccess {
    /// The byte interpretation the decoder accepted; optional capability
    /// calls must reuse it.
    pub input: Vec<u8>,
    pub fields: FieldMap,
}

/// Try every byte candidate against a decoder, in priority order.
///
/// A success must yield a non-empty field mapping; an empty mapping counts
/// as a failure and the next candidate is tried. When all candidates are
/// exhausted the last error is surfaced.
pub(crate) fn decode_with(
    decoder: &dyn StructuredDecoder,
    qr_string: &str,
) -> Result<AdapterSuccess> {
    let mut last_err: Option<QrError> = None;

    for (idx, candidate) in byte_candidates(qr_string).into_iter().enumerate() {
        match decoder.decode(&candidate) {
            Ok(fields) if !fields.is_empty() => {
                debug!(candidate = idx, fields = fields.len(), "structured decode succeeded");
                return Ok(AdapterSuccess {
                    input: candidate,
                    fields,
                });
            }
            Ok(_) => {
                last_err = Some(QrError::DecodeFailure(
                    "decoder returned an empty field mapping".into(),
                ));
            }
            Err(e) => last_err = Some(e),
        }
    }

    Err(last_err.unwrap_or_else(|| {
        QrError::DecodeFailure("decoder failed for every byte candidate".into())
    }))
}
