//! Embedded portrait extraction and normalization.
//!
//! Secure QR payloads may carry the holder's photograph as a JPEG2000
//! codestream appended after the text fields. The codestream is delimited by
//! the start-of-codestream marker (`FF 4F`) and the end-of-image marker
//! (`FF D9`); the coding-style marker (`FF 52`) doubles as a sanity check
//! against random `FF 4F` byte pairs in compressed data.
//!
//! Browsers do not render JPEG2000, so normalization attempts a best-effort
//! conversion to PNG. Failure to convert is not an error: the caller gets
//! the original codestream tagged `image/jp2` and can decide what to do.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// JPEG2000 start-of-codestream marker.
const SOC: [u8; 2] = [0xFF, 0x4F];
/// JPEG2000 coding-style-default marker.
const COD: [u8; 2] = [0xFF, 0x52];
/// End-of-image marker shared with JPEG.
const EOI: [u8; 2] = [0xFF, 0xD9];

/// A browser-deliverable image payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAsset {
    /// Base64 of the (possibly converted) image bytes.
    pub base64: String,
    /// Mime type matching `base64`: `image/png` after a successful
    /// conversion, `image/jp2` for codestream passthrough.
    pub mime: String,
}

/// Locate an embedded JPEG2000 codestream inside raw payload bytes.
///
/// Returns the slice from the first `FF 4F` through the last `FF D9`
/// inclusive, or `None` when the markers are absent or inconsistent.
pub fn extract_codestream(raw: &[u8]) -> Option<&[u8]> {
    let start = find(raw, &SOC)?;
    // Sanity check: a real codestream carries a coding-style marker.
    find(raw, &COD)?;
    let eoi = rfind(raw, &EOI)?;
    if eoi < start {
        return None;
    }
    Some(&raw[start..eoi + EOI.len()])
}

/// Convert image bytes into something a browser can display.
///
/// JPEG2000-looking input goes through the converter ladder; the first
/// converter that decodes wins and the result is re-encoded as PNG. If none
/// succeeds the original bytes pass through as `image/jp2`. Bytes without a
/// JPEG2000 signature pass through unchanged with a generic mime.
pub fn normalize_image(bytes: &[u8]) -> ImageAsset {
    if !is_jpeg2000(bytes) {
        return ImageAsset {
            base64: BASE64.encode(bytes),
            mime: "application/octet-stream".to_string(),
        };
    }

    if let Some(png) = convert_to_png(bytes) {
        return ImageAsset {
            base64: BASE64.encode(&png),
            mime: "image/png".to_string(),
        };
    }

    debug!(len = bytes.len(), "portrait conversion failed, passing through as jp2");
    ImageAsset {
        base64: BASE64.encode(bytes),
        mime: "image/jp2".to_string(),
    }
}

/// Raw codestream (`FF 4F FF 51`) or JP2 container signature box.
fn is_jpeg2000(bytes: &[u8]) -> bool {
    if bytes.starts_with(&[0xFF, 0x4F, 0xFF, 0x51]) {
        return true;
    }
    let head = &bytes[..bytes.len().min(16)];
    find(head, b"jP  \r\n\x87\n").is_some()
}

/// Run the converter ladder; each entry returns PNG bytes on success.
#[cfg(feature = "photo")]
fn convert_to_png(bytes: &[u8]) -> Option<Vec<u8>> {
    type Converter = fn(&[u8]) -> Option<image::DynamicImage>;
    // Ordered ladder; a JPEG2000-capable converter slots in here if one
    // becomes available in the ecosystem.
    const CONVERTERS: &[Converter] = &[decode_sniffed, decode_guessed_reader];

    for convert in CONVERTERS {
        if let Some(img) = convert(bytes) {
            let mut png = Vec::new();
            let mut cursor = std::io::Cursor::new(&mut png);
            if img.write_to(&mut cursor, image::ImageFormat::Png).is_ok() {
                return Some(png);
            }
        }
    }
    None
}

#[cfg(not(feature = "photo"))]
fn convert_to_png(_bytes: &[u8]) -> Option<Vec<u8>> {
    None
}

#[cfg(feature = "photo")]
fn decode_sniffed(bytes: &[u8]) -> Option<image::DynamicImage> {
    image::load_from_memory(bytes).ok()
}

#[cfg(feature = "photo")]
fn decode_guessed_reader(bytes: &[u8]) -> Option<image::DynamicImage> {
    image::ImageReader::new(std::io::Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .decode()
        .ok()
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .rposition(|window| window == needle)
}
