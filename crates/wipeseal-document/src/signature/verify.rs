// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document signature verification from the signed bytes alone.
//
// Works on raw bytes rather than a parsed object graph, so a corrupted file
// still yields a verdict instead of a parse failure wherever possible. The
// signature dictionary is found by its `/ByteRange` name token; mentions of
// that key inside strings, comments or streams do not count.

use chrono::{DateTime, Utc};
use tracing::{debug, instrument, warn};
use wipeseal_core::error::{Result, WipesealError};
use wipeseal_security::{PublicKey, sha256_digest};

use super::cms::parse_signed_data;

/// Outcome of checking the last signature in a PDF.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentVerification {
    /// `[offset1, length1, offset2, length2]` as declared.
    pub byte_range: [usize; 4],
    /// The ranges start at 0 and end at the last byte of the file.
    pub covers_whole_file: bool,
    /// The recomputed digest equals the signed `messageDigest`.
    pub digest_matches: bool,
    /// The RSA signature over the signed attributes checks out.
    pub signature_valid: bool,
    pub signer_subject: String,
    pub signing_time: Option<DateTime<Utc>>,
    /// Hex SHA-256 over the declared ranges.
    pub document_digest: String,
    /// DER size of the CMS blob.
    pub signature_len: usize,
}

impl DocumentVerification {
    pub fn is_valid(&self) -> bool {
        self.covers_whole_file && self.digest_matches && self.signature_valid
    }
}

/// Verify the most recent signature of a signed PDF.
///
/// Errors mean no signature could be located or decoded; a located but
/// failing signature is reported through the returned flags.
#[instrument(skip_all, fields(len = bytes.len()))]
pub fn verify_document(bytes: &[u8]) -> Result<DocumentVerification> {
    let byte_range = last_byte_range(bytes)?;
    let [start, first_len, second_start, second_len] = byte_range;

    let second_end = second_start
        .checked_add(second_len)
        .filter(|&end| end <= bytes.len())
        .ok_or_else(|| invalid("byte range extends past the end of the file"))?;
    if start != 0 || first_len > second_start {
        return Err(invalid("byte ranges are not ordered from offset 0"));
    }
    let covers_whole_file = second_end == bytes.len();

    let gap = &bytes[first_len..second_start];
    let hex_text = gap
        .strip_prefix(b"<")
        .and_then(|rest| rest.strip_suffix(b">"))
        .ok_or_else(|| invalid("excluded range is not a hex string"))?;
    let cms = hex::decode(hex_text).map_err(|e| invalid(&format!("signature hex: {e}")))?;

    let parsed = parse_signed_data(&cms)?;
    let certificate = parsed.certificate()?;
    let public_key = PublicKey::from_certificate(&certificate)
        .map_err(|e| invalid(&format!("signer certificate: {e}")))?;

    let digest = sha256_digest(&[&bytes[..first_len], &bytes[second_start..second_end]]);
    let digest_matches = parsed.message_digest == digest;
    let signature_valid = public_key.verify(&parsed.signed_attributes, &parsed.signature);

    let report = DocumentVerification {
        byte_range,
        covers_whole_file,
        digest_matches,
        signature_valid,
        signer_subject: certificate.tbs_certificate.subject.to_string(),
        signing_time: parsed.signing_time,
        document_digest: hex::encode(digest),
        signature_len: der_length(&cms),
    };

    if report.is_valid() {
        debug!(subject = %report.signer_subject, "document signature valid");
    } else {
        warn!(
            covers_whole_file,
            digest_matches, signature_valid, "document signature invalid"
        );
    }
    Ok(report)
}

/// Parse the array of the last `/ByteRange` key in the file.
fn last_byte_range(bytes: &[u8]) -> Result<[usize; 4]> {
    let position = byte_range_keys(bytes)
        .last()
        .copied()
        .ok_or_else(|| invalid("no signature dictionary found"))?;

    let rest = &bytes[position + BYTE_RANGE_KEY.len()..];
    let open = rest
        .iter()
        .position(|&b| !b.is_ascii_whitespace())
        .filter(|&i| rest[i] == b'[')
        .ok_or_else(|| invalid("/ByteRange is not an array"))?;
    let close = rest[open..]
        .iter()
        .position(|&b| b == b']')
        .ok_or_else(|| invalid("unterminated /ByteRange"))?;

    let inner = std::str::from_utf8(&rest[open + 1..open + close])
        .map_err(|_| invalid("/ByteRange is not ASCII"))?;
    let values: Vec<usize> = inner
        .split_ascii_whitespace()
        .map(str::parse::<usize>)
        .collect::<std::result::Result<_, _>>()
        .map_err(|_| invalid("/ByteRange holds a non-integer"))?;

    <[usize; 4]>::try_from(values).map_err(|_| invalid("/ByteRange must hold four integers"))
}

const BYTE_RANGE_KEY: &[u8] = b"/ByteRange";

/// Offsets of every `/ByteRange` name token, in file order.
///
/// A light PDF lexer: text inside literal strings, hex strings, comments and
/// stream bodies is skipped, so a signer name or reason that merely mentions
/// `/ByteRange` is never mistaken for the key.
fn byte_range_keys(bytes: &[u8]) -> Vec<usize> {
    let mut keys = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                i = bytes[i..]
                    .iter()
                    .position(|&b| b == b'\r' || b == b'\n')
                    .map_or(bytes.len(), |end| i + end);
            }
            b'(' => i = skip_literal_string(bytes, i),
            b'<' if bytes.get(i + 1) == Some(&b'<') => i += 2,
            b'<' => {
                i = bytes[i..]
                    .iter()
                    .position(|&b| b == b'>')
                    .map_or(bytes.len(), |end| i + end + 1);
            }
            b'/' => {
                let end = bytes[i + 1..]
                    .iter()
                    .position(|&b| is_delimiter(b))
                    .map_or(bytes.len(), |len| i + 1 + len);
                if &bytes[i..end] == BYTE_RANGE_KEY {
                    keys.push(i);
                }
                i = end;
            }
            b's' if starts_stream(bytes, i) => {
                const END: &[u8] = b"endstream";
                i = bytes[i..]
                    .windows(END.len())
                    .position(|window| window == END)
                    .map_or(bytes.len(), |end| i + end + END.len());
            }
            _ => i += 1,
        }
    }
    keys
}

/// Index just past the literal string opening at `open`.
fn skip_literal_string(bytes: &[u8], open: usize) -> usize {
    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 1,
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return i + 1;
                }
            }
            _ => {}
        }
        i += 1;
    }
    bytes.len()
}

/// `stream` keyword followed by an end of line and preceded by a delimiter.
fn starts_stream(bytes: &[u8], i: usize) -> bool {
    const KEYWORD: &[u8] = b"stream";
    bytes[i..].starts_with(KEYWORD)
        && matches!(bytes.get(i + KEYWORD.len()), Some(b'\r' | b'\n'))
        && i.checked_sub(1).is_none_or(|prev| is_delimiter(bytes[prev]))
}

fn is_delimiter(byte: u8) -> bool {
    byte.is_ascii_whitespace()
        || byte == 0
        || matches!(byte, b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%')
}

/// Length of the first DER element (the placeholder is zero padded).
fn der_length(cms: &[u8]) -> usize {
    super::asn1::DerReader::new(cms)
        .read()
        .map(|tlv| tlv.raw.len())
        .unwrap_or(cms.len())
}

fn invalid(detail: &str) -> WipesealError {
    WipesealError::Render(format!("cannot verify document signature: {detail}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wipeseal_core::ErrorKind;

    #[test]
    fn unsigned_pdf_is_an_error() {
        let err = verify_document(b"%PDF-1.7\n1 0 obj\n<<>>\nendobj\n%%EOF\n")
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::RenderError);
    }

    #[test]
    fn byte_range_parsing() {
        let data = b"<</ByteRange [0 10 20 5]>> <</ByteRange  [0 1 2 3   ] /Contents <00>>>";
        assert_eq!(last_byte_range(data).unwrap(), [0, 1, 2, 3]);
        assert!(last_byte_range(b"/ByteRange [0 1 2]").is_err());
        assert!(last_byte_range(b"/ByteRange (0 1 2 3)").is_err());
        assert!(last_byte_range(b"/ByteRange [0 1 x 3]").is_err());
    }

    #[test]
    fn byte_range_inside_strings_is_ignored() {
        let data = b"<</ByteRange [0 1 2 3]/Reason (per /ByteRange [9 9 9 9] \\) (policy))\
/Location <2F42797465> /Name (a (nested /ByteRange) b)>>\n% /ByteRange [5 5 5 5]\n";
        assert_eq!(last_byte_range(data).unwrap(), [0, 1, 2, 3]);
        assert!(last_byte_range(b"(only /ByteRange [0 1 2 3] in a string)").is_err());
        assert!(last_byte_range(b"/ByteRangeX [0 1 2 3]").is_err());
    }

    #[test]
    fn byte_range_inside_a_stream_is_ignored() {
        let data = b"<</ByteRange [0 1 2 3]>>\n<</Length 20>>stream\n/ByteRange [4 4 4 4]\nendstream\n";
        assert_eq!(last_byte_range(data).unwrap(), [0, 1, 2, 3]);
    }

    #[test]
    fn range_past_end_is_rejected() {
        let data = b"%PDF-1.7 /ByteRange [0 30 40 500] <00>";
        assert!(verify_document(data).is_err());
    }
}
