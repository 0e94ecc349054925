//! Decompression ladder for secure QR payloads.
//!
//! A secure QR encodes a zlib-compressed byte stream as one huge decimal
//! integer. The byte representation of that integer is not consistent across
//! historical encoder versions: some wrote big-endian, some little-endian,
//! and some miscomputed the payload length so an extra leading zero byte (or
//! several) appears. The ladder enumerates the known variants and tries each
//! against the known compression containers until one accepts the bytes.

use std::io::Read;

use flate2::read::{DeflateDecoder, GzDecoder, ZlibDecoder};
use num_bigint::BigUint;
use num_bigint::ParseBigIntError;
use tracing::debug;

use crate::error::{QrError, Result};

/// Parse the payload string as a non-negative arbitrary-precision integer.
///
/// Rejects empty, non-numeric and zero values with [`QrError::InvalidInput`].
pub fn parse_payload_integer(qr_string: &str) -> Result<BigUint> {
    let trimmed = qr_string.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(QrError::InvalidInput(
            "secure QR payload must be a decimal digit string".into(),
        ));
    }

    let value: BigUint = trimmed
        .parse()
        .map_err(|e: ParseBigIntError| QrError::InvalidInput(e.to_string()))?;

    if value.bits() == 0 {
        return Err(QrError::InvalidInput(
            "secure QR payload must be a positive integer".into(),
        ));
    }

    Ok(value)
}

/// Enumerate candidate byte buffers for the payload integer, in the order
/// they should be attempted:
///
/// 1. big-endian minimal
/// 2. big-endian with 1..=4 leading zero bytes
/// 3. little-endian minimal
/// 4. little-endian with 1..=2 leading zero bytes
///
/// Leading zero pads account for encoders that wrote a length-prefixed
/// buffer with a miscomputed length.
fn payload_candidates(value: &BigUint) -> Vec<Vec<u8>> {
    let big = value.to_bytes_be();
    let little = value.to_bytes_le();

    let mut candidates = Vec::with_capacity(9);
    candidates.push(big.clone());
    for pad in 1..=4usize {
        candidates.push(prepend_zeros(&big, pad));
    }
    candidates.push(little.clone());
    for pad in 1..=2usize {
        candidates.push(prepend_zeros(&little, pad));
    }
    candidates
}

fn prepend_zeros(bytes: &[u8], pad: usize) -> Vec<u8> {
    let mut out = vec![0u8; pad];
    out.extend_from_slice(bytes);
    out
}

/// Try zlib (with header), raw DEFLATE, then gzip against one candidate.
fn try_decompress(data: &[u8]) -> Option<Vec<u8>> {
    let mut out = Vec::new();
    if ZlibDecoder::new(data).read_to_end(&mut out).is_ok() {
        return Some(out);
    }

    let mut out = Vec::new();
    if DeflateDecoder::new(data).read_to_end(&mut out).is_ok() {
        return Some(out);
    }

    let mut out = Vec::new();
    if GzDecoder::new(data).read_to_end(&mut out).is_ok() {
        return Some(out);
    }

    None
}

/// Recover the raw decompressed bytes of a secure QR payload.
///
/// Walks the candidate/algorithm grid in fixed order and stops at the first
/// pair that decompresses cleanly. The result is not validated as text; see
/// [`recover_text`] for the follow-up decoding step.
pub fn decompress_secure_payload(qr_string: &str) -> Result<Vec<u8>> {
    let value = parse_payload_integer(qr_string)?;
    let candidates = payload_candidates(&value);

    for (idx, cand) in candidates.iter().enumerate() {
        if let Some(raw) = try_decompress(cand) {
            debug!(candidate = idx, raw_len = raw.len(), "payload decompressed");
            return Ok(raw);
        }
    }

    Err(QrError::DecompressionFailure(
        "no payload byte variant decompressed with zlib, raw DEFLATE or gzip".into(),
    ))
}

/// Decode decompressed payload bytes to text.
///
/// Tries UTF-8, then UTF-16 (BOM-aware, little-endian default), then falls
/// back to Latin-1, which maps every byte to a scalar value and cannot fail.
/// Field boundaries (0xFF delimiters) survive the Latin-1 path as U+00FF.
pub fn recover_text(raw: &[u8]) -> String {
    if let Ok(s) = std::str::from_utf8(raw) {
        return s.to_string();
    }

    if let Some(s) = decode_utf16(raw) {
        return s;
    }

    raw.iter().map(|&b| b as char).collect()
}

fn decode_utf16(raw: &[u8]) -> Option<String> {
    if raw.len() < 2 || raw.len() % 2 != 0 {
        return None;
    }

    let (body, big_endian) = match (raw[0], raw[1]) {
        (0xFF, 0xFE) => (&raw[2..], false),
        (0xFE, 0xFF) => (&raw[2..], true),
        _ => (raw, false),
    };

    let units: Vec<u16> = body
        .chunks_exact(2)
        .map(|pair| {
            if big_endian {
                u16::from_be_bytes([pair[0], pair[1]])
            } else {
                u16::from_le_bytes([pair[0], pair[1]])
            }
        })
        .collect();

    String::from_utf16(&units).ok()
}
