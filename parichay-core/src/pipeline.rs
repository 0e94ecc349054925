//! Decode orchestration and verification reporting.
//!
//! [`QrPipeline`] wires the classifier, the structured-decoder adapter, the
//! decompression ladder, the heuristic parser and the portrait extractor
//! into the two public operations: [`QrPipeline::decode`] and
//! [`QrPipeline::verify`]. Every invocation is a fresh run over per-call
//! data; the pipeline holds only immutable configuration and is safe to
//! share across threads.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::decoder::{decode_with, DecoderRegistry, FieldMap, StructuredDecoder};
use crate::error::Result;
use crate::fields::{parse_raw_text, ParsedFields, ParserConfig};
use crate::format::{classify, QrFormat};
use crate::ladder::{decompress_secure_payload, recover_text};
use crate::photo::{extract_codestream, normalize_image, ImageAsset};

/// Result of a decode run. Exactly one variant is produced per call.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DecodeOutcome {
    /// The registered decoder fully recognized the payload.
    Structured {
        format: QrFormat,
        fields: FieldMap,
        has_image: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        photo: Option<ImageAsset>,
    },
    /// Fallback path: the payload decompressed but only heuristic parsing
    /// applied. Secure format by construction.
    RawParsed {
        raw_text: String,
        fields: ParsedFields,
        has_image: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        photo: Option<ImageAsset>,
    },
}

impl DecodeOutcome {
    pub fn format(&self) -> QrFormat {
        match self {
            Self::Structured { format, .. } => *format,
            Self::RawParsed { .. } => QrFormat::Secure,
        }
    }

    /// Minimal field subset for verification reports and UI summaries.
    pub fn minimal_data(&self) -> BTreeMap<String, String> {
        const MINIMAL_KEYS: &[&str] = &["name", "dob", "gender", "reference_id", "pincode", "state"];

        match self {
            Self::Structured { fields, .. } => fields
                .iter()
                .filter(|(k, _)| MINIMAL_KEYS.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            Self::RawParsed { fields, .. } => {
                let mut out = BTreeMap::new();
                let pairs = [
                    ("name", &fields.name),
                    ("dob", &fields.dob),
                    ("gender", &fields.gender),
                    ("reference_id", &fields.reference_id),
                    ("pincode", &fields.pincode),
                    ("state", &fields.state),
                ];
                for (key, value) in pairs {
                    if let Some(v) = value {
                        out.insert(key.to_string(), v.clone());
                    }
                }
                out
            }
        }
    }
}

/// Aggregated verification result. Never constructed from a panic path;
/// internal failures land in `message` with `ok = false`.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    pub ok: bool,
    #[serde(serialize_with = "serialize_format")]
    pub qr_format: Option<QrFormat>,
    /// Check name → outcome. `None` means "recorded but not evaluated"
    /// (signature verification is always recorded as unknown).
    pub checks: BTreeMap<String, Option<bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<BTreeMap<String, String>>,
    pub message: String,
}

/// Unknown formats serialize as the literal string "unknown" rather than
/// null, matching what downstream UIs key on.
fn serialize_format<S>(format: &Option<QrFormat>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match format {
        Some(f) => f.serialize(serializer),
        None => serializer.serialize_str("unknown"),
    }
}

/// The decode and verification pipeline.
///
/// Construction takes the external decoder registry and the parser
/// configuration; both are immutable for the pipeline's lifetime.
#[derive(Clone, Default)]
pub struct QrPipeline {
    registry: DecoderRegistry,
    parser: ParserConfig,
}

impl QrPipeline {
    pub fn new(registry: DecoderRegistry, parser: ParserConfig) -> Self {
        Self { registry, parser }
    }

    /// Decode a QR string into a [`DecodeOutcome`].
    ///
    /// Fails with [`crate::QrError::InvalidInput`] for empty input. Secure
    /// payloads fall back from the structured decoder to the decompression
    /// ladder, and as a last resort to the old-format decoder (historical
    /// payloads have been seen misclassified); the ladder's error is the
    /// one surfaced when everything fails.
    pub fn decode(&self, qr_string: &str) -> Result<DecodeOutcome> {
        let trimmed = qr_string.trim();
        let format = classify(trimmed)?;
        debug!(%format, len = trimmed.len(), "decoding QR payload");

        match format {
            QrFormat::Secure => self.decode_secure(trimmed),
            QrFormat::Old => self.decode_old(trimmed),
        }
    }

    fn decode_secure(&self, qr_string: &str) -> Result<DecodeOutcome> {
        let structured_err = match decode_with(self.registry.secure(), qr_string) {
            Ok(success) => {
                let decoder = self.registry.secure();
                let capability_flag = decoder.has_photo(&success.input);
                let photo = decoder
                    .photo(&success.input)
                    .map(|bytes| normalize_image(&bytes))
                    .or_else(|| self.photo_via_ladder(qr_string));
                let has_image = capability_flag.unwrap_or(false) || photo.is_some();

                return Ok(DecodeOutcome::Structured {
                    format: QrFormat::Secure,
                    fields: success.fields,
                    has_image,
                    photo,
                });
            }
            Err(e) => e,
        };
        debug!(error = %structured_err, "structured secure decode failed, trying decompression ladder");

        let ladder_err = match decompress_secure_payload(qr_string) {
            Ok(raw) => {
                let raw_text = recover_text(&raw);
                let fields = parse_raw_text(&raw_text, &self.parser);
                let photo = extract_codestream(&raw).map(normalize_image);
                let has_image = photo.is_some();

                return Ok(DecodeOutcome::RawParsed {
                    raw_text,
                    fields,
                    has_image,
                    photo,
                });
            }
            Err(e) => e,
        };
        warn!(error = %ladder_err, "decompression ladder exhausted, trying old-format decoder");

        // Some historical payloads are numeric yet old-format.
        if let Ok(success) = decode_with(self.registry.old(), qr_string) {
            return Ok(DecodeOutcome::Structured {
                format: QrFormat::Old,
                fields: success.fields,
                has_image: false,
                photo: None,
            });
        }

        Err(ladder_err)
    }

    fn decode_old(&self, qr_string: &str) -> Result<DecodeOutcome> {
        // No reverse fallback into the secure path: an Old-classified
        // string contains a non-digit, which the ladder's integer parse
        // rejects up front.
        let success = decode_with(self.registry.old(), qr_string)?;
        Ok(DecodeOutcome::Structured {
            format: QrFormat::Old,
            fields: success.fields,
            has_image: false,
            photo: None,
        })
    }

    /// Best-effort portrait recovery when the decoder has no photo
    /// capability: decompress the payload and look for a codestream.
    /// All failures are absorbed.
    fn photo_via_ladder(&self, qr_string: &str) -> Option<ImageAsset> {
        let raw = decompress_secure_payload(qr_string).ok()?;
        extract_codestream(&raw).map(normalize_image)
    }

    /// Check a plaintext email against the payload's records.
    ///
    /// Single-boolean form of the report-level email check: any failure
    /// along the way (undecodable payload, non-secure or non-structured
    /// result, missing capability) answers `false`, never an error.
    pub fn email_verified(&self, qr_string: &str, email: &str) -> bool {
        self.secure_check(qr_string, |decoder, input| {
            decoder.email_matches(input, email)
        })
    }

    /// Check a mobile number against the payload's records. Same failure
    /// semantics as [`QrPipeline::email_verified`].
    pub fn mobile_verified(&self, qr_string: &str, mobile: u64) -> bool {
        self.secure_check(qr_string, |decoder, input| {
            decoder.mobile_matches(input, mobile)
        })
    }

    fn secure_check<F>(&self, qr_string: &str, check: F) -> bool
    where
        F: FnOnce(&dyn StructuredDecoder, &[u8]) -> Result<bool>,
    {
        let structured_secure = matches!(
            self.decode(qr_string),
            Ok(DecodeOutcome::Structured {
                format: QrFormat::Secure,
                ..
            })
        );
        if !structured_secure {
            return false;
        }

        match decode_with(self.registry.secure(), qr_string) {
            Ok(success) => check(self.registry.secure(), &success.input).unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Run the decode pipeline plus any requested identity checks and
    /// reduce everything into one report. Never fails: internal errors are
    /// captured into `message` with `ok = false`.
    pub fn verify(
        &self,
        qr_string: &str,
        email: Option<&str>,
        mobile: Option<u64>,
    ) -> VerificationReport {
        let outcome = match self.decode(qr_string) {
            Ok(outcome) => outcome,
            Err(e) => {
                let mut checks = BTreeMap::new();
                checks.insert("parsed".to_string(), Some(false));
                return VerificationReport {
                    ok: false,
                    qr_format: None,
                    checks,
                    data: None,
                    message: e.to_string(),
                };
            }
        };

        let mut checks: BTreeMap<String, Option<bool>> = BTreeMap::new();
        checks.insert("parsed".to_string(), Some(true));

        // Identity checks apply only to structured secure results, and only
        // when requested. A capability failure records a mismatch rather
        // than aborting the report.
        if let DecodeOutcome::Structured {
            format: QrFormat::Secure,
            ..
        } = &outcome
        {
            if email.is_some() || mobile.is_some() {
                if let Ok(success) = decode_with(self.registry.secure(), qr_string) {
                    let decoder = self.registry.secure();
                    if let Some(email) = email {
                        let matched = decoder
                            .email_matches(&success.input, email)
                            .unwrap_or(false);
                        checks.insert("email_match".to_string(), Some(matched));
                    }
                    if let Some(mobile) = mobile {
                        let matched = decoder
                            .mobile_matches(&success.input, mobile)
                            .unwrap_or(false);
                        checks.insert("mobile_match".to_string(), Some(matched));
                    }
                }
            }
        }

        // No cryptographic verification is performed; the check is recorded
        // as unknown so consumers see it was considered, not skipped.
        checks.insert("signature_verified".to_string(), None);

        let ok = checks.values().flatten().all(|&b| b);
        let data = {
            let minimal = outcome.minimal_data();
            (!minimal.is_empty()).then_some(minimal)
        };

        VerificationReport {
            ok,
            qr_format: Some(outcome.format()),
            checks,
            data,
            message: if ok {
                "Verified".to_string()
            } else {
                "Parsed with warnings or mismatches".to_string()
            },
        }
    }
}
