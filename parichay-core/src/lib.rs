//! Parichay Core - Identity QR decoding and verification pipeline
//!
//! This crate decodes Aadhaar-style identity QR payloads in two historical
//! formats - the compressed numeric "secure" format and the legacy
//! plain-text "old" format - and aggregates verification checks over the
//! result.
//!
//! # Design
//!
//! - Format classification from the literal shape of the input
//! - Explicit byte-candidate generation (no string/bytes guessing)
//! - A decompression ladder tolerant of historical encoding variants
//! - Heuristic, best-effort field extraction for undocumented revisions
//! - Embedded JPEG2000 portrait extraction and browser-format conversion
//! - Pluggable proprietary decoders behind the [`StructuredDecoder`] trait
//!
//! The pipeline is synchronous and stateless per call: every invocation
//! owns its buffers and no state crosses requests.
//!
//! # Example
//!
//! ```
//! use parichay_core::QrPipeline;
//!
//! let pipeline = QrPipeline::default();
//! let report = pipeline.verify("not-a-real-qr", None, None);
//! assert!(!report.ok);
//! assert!(!report.message.is_empty());
//! ```

pub mod candidates;
pub mod decoder;
pub mod error;
pub mod fields;
pub mod format;
pub mod ladder;
pub mod photo;
pub mod pipeline;

// Re-export main types for convenience
pub use candidates::byte_candidates;
pub use decoder::{DecoderRegistry, FieldMap, StructuredDecoder, UnsupportedDecoder};
pub use error::{QrError, Result};
pub use fields::{ParsedFields, ParserConfig};
pub use format::{classify, QrFormat};
pub use photo::{extract_codestream, normalize_image, ImageAsset};
pub use pipeline::{DecodeOutcome, QrPipeline, VerificationReport};
