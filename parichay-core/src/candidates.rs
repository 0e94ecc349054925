//! Byte candidate generation.
//!
//! Scanner libraries disagree about what a QR payload "is": some hand back
//! text that was really Latin-1 bytes, some re-encode to UTF-8, some base64
//! the raw buffer. Rather than guess, every downstream consumer receives an
//! ordered list of explicit byte buffers and tries them until one yields
//! usable data. The order reflects empirical reliability for the two
//! supported formats and must not be changed.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

/// Produce the ordered, deduplicated byte interpretations of a QR string.
///
/// Priority order:
/// 1. Latin-1 strict (code points 0–255 map one-to-one to bytes)
/// 2. UTF-8 strict
/// 3. Strict standard base64 decode, when the string is valid base64
/// 4. The raw string bytes as a last resort
///
/// Steps whose encoding fails are skipped. The result is never empty: the
/// raw-bytes step cannot fail, and for pure-ASCII input all string-derived
/// steps collapse into a single candidate via deduplication.
pub fn byte_candidates(qr_string: &str) -> Vec<Vec<u8>> {
    let mut candidates: Vec<Vec<u8>> = Vec::with_capacity(4);

    if let Some(latin1) = encode_latin1(qr_string) {
        candidates.push(latin1);
    }

    candidates.push(qr_string.as_bytes().to_vec());

    if let Ok(decoded) = BASE64.decode(qr_string) {
        candidates.push(decoded);
    }

    // Raw string reinterpreted as bytes. In Rust the native string form is
    // already UTF-8, so this only survives dedup when base64 reordered things.
    candidates.push(qr_string.as_bytes().to_vec());

    dedup_preserving_order(candidates)
}

/// Strict Latin-1 encoding: succeeds only when every scalar value fits in a
/// single byte.
fn encode_latin1(s: &str) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(s.len());
    for ch in s.chars() {
        let cp = ch as u32;
        if cp > 0xFF {
            return None;
        }
        out.push(cp as u8);
    }
    Some(out)
}

fn dedup_preserving_order(candidates: Vec<Vec<u8>>) -> Vec<Vec<u8>> {
    let mut seen: Vec<Vec<u8>> = Vec::with_capacity(candidates.len());
    for cand in candidates {
        if !seen.contains(&cand) {
            seen.push(cand);
        }
    }
    seen
}
