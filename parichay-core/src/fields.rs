//! Heuristic field extraction from recovered secure QR text.
//!
//! Newer secure QR revisions are not publicly documented; when the
//! structured decoder rejects a payload, all we have is the decompressed
//! byte stream. Observed payloads separate fields with 0xFF and follow a
//! loose positional layout (version, type code, reference id, name, date of
//! birth, gender, then address material), with the masked mobile number and
//! embedded portrait toward the end. Every extraction here is independent
//! and optional: a miss on one field never blocks another, and the parser
//! never fails.

use serde::{Deserialize, Serialize};

/// Field delimiter observed in secure QR payloads, as recovered by the
/// Latin-1 text path (byte 0xFF maps to U+00FF).
const FIELD_DELIMITER: char = '\u{00FF}';

/// Injected parser data: region names and address keyword lists.
///
/// These sets change on administrative timescales, not code timescales, so
/// they are configuration rather than logic.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Exact region (state / union territory) names recognized in tokens.
    pub states: Vec<String>,
    /// Case-insensitive substrings that mark a token as a locality hint.
    pub locality_keywords: Vec<String>,
    /// Substrings identifying binary/image segments to drop before parsing.
    pub binary_markers: Vec<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        let states = [
            "Andhra Pradesh",
            "Arunachal Pradesh",
            "Assam",
            "Bihar",
            "Chhattisgarh",
            "Goa",
            "Gujarat",
            "Haryana",
            "Himachal Pradesh",
            "Jharkhand",
            "Karnataka",
            "Kerala",
            "Madhya Pradesh",
            "Maharashtra",
            "Manipur",
            "Meghalaya",
            "Mizoram",
            "Nagaland",
            "Odisha",
            "Punjab",
            "Rajasthan",
            "Sikkim",
            "Tamil Nadu",
            "Telangana",
            "Tripura",
            "Uttar Pradesh",
            "Uttarakhand",
            "West Bengal",
            "Andaman and Nicobar Islands",
            "Chandigarh",
            "Dadra and Nagar Haveli and Daman and Diu",
            "Delhi",
            "Jammu and Kashmir",
            "Ladakh",
            "Lakshadweep",
            "Puducherry",
        ];

        let locality_keywords = [
            "HOUSING", "MISSION", "NAGAR", "COLONY", "APARTMENT", "ENCLAVE", "BLOCK", "SECTOR",
            "LAYOUT", "PHASE", "ROAD", "STREET", "LANE", "MARG", "BAZAR", "CHOWK", "MARKET",
            "COMPLEX",
        ];

        Self {
            states: states.iter().map(|s| s.to_string()).collect(),
            locality_keywords: locality_keywords.iter().map(|s| s.to_string()).collect(),
            // JJ2000 encoder comment marks the embedded portrait segment.
            binary_markers: vec!["Created by: JJ2000".to_string()],
        }
    }
}

/// Fields recovered from a secure QR payload, all best-effort.
///
/// Absence means "not recoverable", never a placeholder. `address` is a
/// projection of `address_lines` (comma-joined), not independent state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile_masked: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pincode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vtc: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub address_lines: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub locality_hints: Vec<String>,
}

impl ParsedFields {
    /// True when no field at all could be recovered.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Extract whatever fields the recovered text yields.
pub fn parse_raw_text(raw_text: &str, config: &ParserConfig) -> ParsedFields {
    let tokens = tokenize(raw_text, config);
    let mut fields = ParsedFields::default();
    if tokens.is_empty() {
        return fields;
    }

    extract_positional(&tokens, &mut fields);
    extract_searched(&tokens, config, &mut fields);
    extract_address(&tokens, config, &mut fields);

    fields
}

/// Split on the 0xFF delimiter, drop binary segments, strip non-printable
/// characters and discard what's left empty.
fn tokenize(raw_text: &str, config: &ParserConfig) -> Vec<String> {
    raw_text
        .split(FIELD_DELIMITER)
        .filter(|segment| !config.binary_markers.iter().any(|m| segment.contains(m)))
        .filter_map(|segment| {
            let cleaned: String = segment
                .chars()
                .filter(|ch| !ch.is_control() && *ch != '\u{0}')
                .collect();
            let cleaned = cleaned.trim().to_string();
            (!cleaned.is_empty()).then_some(cleaned)
        })
        .collect()
}

/// Positional heuristics over the first six tokens. Each check stands alone.
fn extract_positional(tokens: &[String], fields: &mut ParsedFields) {
    if let Some(t) = tokens.first() {
        if t.to_uppercase().starts_with('V') {
            fields.version = Some(t.clone());
        }
    }
    if let Some(t) = tokens.get(1) {
        if is_digit_run(t) {
            fields.type_code = Some(t.clone());
        }
    }
    if let Some(t) = tokens.get(2) {
        if is_digit_run(t) && t.len() >= 10 {
            fields.reference_id = Some(t.clone());
        }
    }
    if let Some(t) = tokens.get(3) {
        fields.name = Some(t.clone());
    }
    if let Some(t) = tokens.get(4) {
        if is_dob(t) {
            fields.dob = Some(t.clone());
        }
    }
    if let Some(t) = tokens.get(5) {
        if matches!(t.to_uppercase().as_str(), "M" | "F" | "T") {
            fields.gender = Some(t.to_uppercase());
        }
    }
}

/// Pattern search across all tokens for masked mobile, pincode and state.
fn extract_searched(tokens: &[String], config: &ParserConfig, fields: &mut ParsedFields) {
    fields.mobile_masked = tokens.iter().find(|t| is_masked_mobile(t)).cloned();
    fields.pincode = tokens
        .iter()
        .find(|t| t.len() == 6 && is_digit_run(t))
        .cloned();
    fields.state = tokens
        .iter()
        .find(|t| config.states.iter().any(|s| s == *t))
        .cloned();
}

/// Address derivation from tokens after the fixed positions.
///
/// The working set runs from index 6 up to the masked mobile token when one
/// was found, with single-letter stray tokens removed. That pre-filtered set
/// also feeds the vtc/district/locality derivations; the state/pincode and
/// consecutive-duplicate removals apply only to the joined address.
fn extract_address(tokens: &[String], config: &ParserConfig, fields: &mut ParsedFields) {
    let start = 6usize.min(tokens.len());
    let end = fields
        .mobile_masked
        .as_ref()
        .and_then(|m| tokens.iter().position(|t| t == m))
        .unwrap_or(tokens.len())
        .max(start);

    let prefiltered: Vec<&String> = tokens[start..end]
        .iter()
        .filter(|t| !(t.len() == 1 && t.chars().all(|c| c.is_alphabetic())))
        .collect();

    let mut lines: Vec<String> = Vec::new();
    for token in &prefiltered {
        if fields.state.as_deref() == Some(token.as_str()) {
            continue;
        }
        if fields.pincode.as_deref() == Some(token.as_str()) {
            continue;
        }
        if lines.last().map(|l| l == *token).unwrap_or(false) {
            continue;
        }
        lines.push((*token).clone());
    }

    if !lines.is_empty() {
        fields.address = Some(lines.join(", "));
        fields.address_lines = lines;
    }

    // VTC tokens carry a parenthesized designator; the district, when
    // present, immediately precedes the VTC.
    if let Some(vtc_idx) = prefiltered
        .iter()
        .rposition(|t| t.contains('(') && t.contains(')'))
    {
        fields.vtc = Some(prefiltered[vtc_idx].clone());
        if vtc_idx > 0 {
            let cand = prefiltered[vtc_idx - 1];
            if fields.state.as_deref() != Some(cand.as_str())
                && fields.pincode.as_deref() != Some(cand.as_str())
            {
                fields.district = Some(cand.clone());
            }
        }
    }

    let mut hints: Vec<String> = Vec::new();
    for token in &prefiltered {
        let upper = token.to_uppercase();
        if config.locality_keywords.iter().any(|k| upper.contains(k))
            && !hints.contains(token)
        {
            hints.push((*token).clone());
        }
    }
    fields.locality_hints = hints;
}

fn is_digit_run(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// DD-MM-YYYY
fn is_dob(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 10
        && b[2] == b'-'
        && b[5] == b'-'
        && [0, 1, 3, 4, 6, 7, 8, 9]
            .iter()
            .all(|&i| b[i].is_ascii_digit())
}

/// Two or more `X` characters followed by two or more digits, nothing else.
fn is_masked_mobile(s: &str) -> bool {
    let x_run = s.bytes().take_while(|&b| b == b'X').count();
    if x_run < 2 {
        return false;
    }
    let rest = &s.as_bytes()[x_run..];
    rest.len() >= 2 && rest.iter().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> ParsedFields {
        parse_raw_text(raw, &ParserConfig::default())
    }

    #[test]
    fn test_reference_layout_extracts_all_fixed_fields() {
        let raw = "V2\u{ff}255\u{ff}9876543210\u{ff}Asha\u{ff}01-01-1990\u{ff}F\
                   \u{ff}XXXXXX1234\u{ff}123456\u{ff}Karnataka";
        let fields = parse(raw);
        assert_eq!(fields.version.as_deref(), Some("V2"));
        assert_eq!(fields.type_code.as_deref(), Some("255"));
        assert_eq!(fields.reference_id.as_deref(), Some("9876543210"));
        assert_eq!(fields.name.as_deref(), Some("Asha"));
        assert_eq!(fields.dob.as_deref(), Some("01-01-1990"));
        assert_eq!(fields.gender.as_deref(), Some("F"));
        assert_eq!(fields.mobile_masked.as_deref(), Some("XXXXXX1234"));
        assert_eq!(fields.pincode.as_deref(), Some("123456"));
        assert_eq!(fields.state.as_deref(), Some("Karnataka"));
    }

    #[test]
    fn test_positional_misses_are_independent() {
        // Wrong shapes at positions 0/1/2/4/5 are skipped; name still lands.
        let raw = "A1\u{ff}abc\u{ff}123\u{ff}Ravi\u{ff}1990-01-01\u{ff}X";
        let fields = parse(raw);
        assert!(fields.version.is_none());
        assert!(fields.type_code.is_none());
        assert!(fields.reference_id.is_none());
        assert_eq!(fields.name.as_deref(), Some("Ravi"));
        assert!(fields.dob.is_none());
        assert!(fields.gender.is_none());
    }

    #[test]
    fn test_address_derivation_and_projection() {
        let raw = "V2\u{ff}2\u{ff}1234567890\u{ff}Asha\u{ff}01-01-1990\u{ff}F\
                   \u{ff}D/O Gopal\u{ff}MG ROAD\u{ff}MG ROAD\u{ff}O\u{ff}Bengaluru (City)\
                   \u{ff}Karnataka\u{ff}560001\u{ff}XXXXXX1234\u{ff}trailing";
        let fields = parse(raw);
        // Consecutive duplicate, single-letter stray, state and pincode all
        // drop out of the joined address.
        assert_eq!(
            fields.address_lines,
            vec!["D/O Gopal", "MG ROAD", "Bengaluru (City)"]
        );
        assert_eq!(
            fields.address.as_deref(),
            Some("D/O Gopal, MG ROAD, Bengaluru (City)")
        );
        // Address stops before the masked mobile token.
        assert!(!fields.address_lines.iter().any(|l| l == "trailing"));
    }

    #[test]
    fn test_address_is_comma_join_of_lines() {
        let raw = "V2\u{ff}2\u{ff}1234567890\u{ff}Asha\u{ff}01-01-1990\u{ff}F\
                   \u{ff}Line one\u{ff}Line two\u{ff}Line three";
        let fields = parse(raw);
        assert_eq!(
            fields.address.as_deref(),
            Some(fields.address_lines.join(", ").as_str())
        );
    }

    #[test]
    fn test_vtc_district_and_locality_hints() {
        let raw = "V2\u{ff}2\u{ff}1234567890\u{ff}Asha\u{ff}01-01-1990\u{ff}F\
                   \u{ff}Shanti NAGAR\u{ff}SECTOR 12\u{ff}Mysuru\u{ff}Mysuru (Rural)\
                   \u{ff}Karnataka\u{ff}570001";
        let fields = parse(raw);
        assert_eq!(fields.vtc.as_deref(), Some("Mysuru (Rural)"));
        assert_eq!(fields.district.as_deref(), Some("Mysuru"));
        assert_eq!(fields.locality_hints, vec!["Shanti NAGAR", "SECTOR 12"]);
    }

    #[test]
    fn test_binary_marker_segments_are_dropped() {
        let raw = "V2\u{ff}2\u{ff}1234567890\u{ff}Asha\
                   \u{ff}Created by: JJ2000 version 5.1\u{ff}01-01-1990";
        let fields = parse(raw);
        assert_eq!(fields.name.as_deref(), Some("Asha"));
        // The marker segment is removed, so the date slides into position 4.
        assert_eq!(fields.dob.as_deref(), Some("01-01-1990"));
    }

    #[test]
    fn test_control_characters_are_stripped() {
        let raw = "V2\u{ff}\u{1}\u{2}\u{ff}12\u{0}34567890\u{ff}  Asha  ";
        let fields = parse(raw);
        // The all-control segment disappears entirely, shifting positions.
        assert_eq!(fields.version.as_deref(), Some("V2"));
        assert_eq!(fields.type_code.as_deref(), Some("1234567890"));
        assert_eq!(fields.name.as_deref(), None);
    }

    #[test]
    fn test_garbage_yields_empty_fields_without_error() {
        assert!(parse("").is_empty());
        assert!(parse("\u{ff}\u{ff}\u{ff}").is_empty());
        let fields = parse("no delimiters at all");
        // Token 0 is not V-prefixed; nothing else exists.
        assert!(fields.is_empty());
    }

    #[test]
    fn test_masked_mobile_shape() {
        assert!(is_masked_mobile("XXXXXX1234"));
        assert!(is_masked_mobile("XX99"));
        assert!(!is_masked_mobile("X1234"));
        assert!(!is_masked_mobile("XXXX1"));
        assert!(!is_masked_mobile("XXXX12ab"));
        assert!(!is_masked_mobile("1234567890"));
    }
}
