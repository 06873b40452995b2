// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Minimal DER writer/reader for the CMS container.
//
// Only what the PDF signature needs: definite lengths, single-byte tags,
// SEQUENCE / SET OF / context tags assembled from pre-encoded parts.

use wipeseal_core::error::{Result, WipesealError};

// === Tags ===

pub const TAG_INTEGER: u8 = 0x02;
pub const TAG_OCTET_STRING: u8 = 0x04;
pub const TAG_NULL: u8 = 0x05;
pub const TAG_OID: u8 = 0x06;
pub const TAG_UTC_TIME: u8 = 0x17;
pub const TAG_GENERALIZED_TIME: u8 = 0x18;
pub const TAG_SEQUENCE: u8 = 0x30;
pub const TAG_SET: u8 = 0x31;
/// `[0]` constructed, used both EXPLICIT and IMPLICIT.
pub const TAG_CONTEXT_0: u8 = 0xA0;
pub const TAG_CONTEXT_1: u8 = 0xA1;

// === OID contents (without tag/length) ===

/// 1.2.840.113549.1.7.1 id-data
pub const OID_DATA: &[u8] = &[0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x07, 0x01];
/// 1.2.840.113549.1.7.2 id-signedData
pub const OID_SIGNED_DATA: &[u8] = &[0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x07, 0x02];
/// 1.2.840.113549.1.9.3 contentType attribute
pub const OID_CONTENT_TYPE: &[u8] = &[0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x09, 0x03];
/// 1.2.840.113549.1.9.4 messageDigest attribute
pub const OID_MESSAGE_DIGEST: &[u8] = &[0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x09, 0x04];
/// 1.2.840.113549.1.9.5 signingTime attribute
pub const OID_SIGNING_TIME: &[u8] = &[0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x09, 0x05];
/// 2.16.840.1.101.3.4.2.1 id-sha256
pub const OID_SHA256: &[u8] = &[0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x01];
/// 1.2.840.113549.1.1.1 rsaEncryption
pub const OID_RSA_ENCRYPTION: &[u8] = &[0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x01, 0x01];

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Encode a DER length (short form below 128, long form otherwise).
fn encode_length(length: usize) -> Vec<u8> {
    if length < 0x80 {
        return vec![length as u8];
    }
    let bytes = length.to_be_bytes();
    let first = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len() - 1);
    let significant = &bytes[first..];
    let mut out = Vec::with_capacity(1 + significant.len());
    out.push(0x80 | significant.len() as u8);
    out.extend_from_slice(significant);
    out
}

/// Tag-length-value.
pub fn tlv(tag: u8, content: &[u8]) -> Vec<u8> {
    let length = encode_length(content.len());
    let mut out = Vec::with_capacity(1 + length.len() + content.len());
    out.push(tag);
    out.extend_from_slice(&length);
    out.extend_from_slice(content);
    out
}

/// Constructed value whose content is the concatenation of `parts`.
pub fn constructed(tag: u8, parts: &[&[u8]]) -> Vec<u8> {
    tlv(tag, &parts.concat())
}

pub fn sequence(parts: &[&[u8]]) -> Vec<u8> {
    constructed(TAG_SEQUENCE, parts)
}

/// `SET OF` with elements in DER order (ascending by encoding).
pub fn set_of(mut elements: Vec<Vec<u8>>) -> Vec<u8> {
    elements.sort();
    tlv(TAG_SET, &elements.concat())
}

/// The same encoding under `[n] IMPLICIT` tag `tag`.
pub fn implicit(tag: u8, encoded: &[u8]) -> Vec<u8> {
    let mut retagged = encoded.to_vec();
    if let Some(first) = retagged.first_mut() {
        *first = tag;
    }
    retagged
}

pub fn oid(content: &[u8]) -> Vec<u8> {
    tlv(TAG_OID, content)
}

pub fn octet_string(content: &[u8]) -> Vec<u8> {
    tlv(TAG_OCTET_STRING, content)
}

/// Small non-negative INTEGER (CMS version numbers).
pub fn small_integer(value: u8) -> Vec<u8> {
    debug_assert!(value < 0x80);
    tlv(TAG_INTEGER, &[value])
}

/// `AlgorithmIdentifier` with NULL parameters.
pub fn algorithm_identifier(oid_content: &[u8]) -> Vec<u8> {
    sequence(&[&oid(oid_content), &[TAG_NULL, 0x00]])
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// One decoded element.
#[derive(Debug, Clone, Copy)]
pub struct Tlv<'a> {
    pub tag: u8,
    pub content: &'a [u8],
    /// Full encoding including tag and length.
    pub raw: &'a [u8],
}

impl<'a> Tlv<'a> {
    /// Reader over this element's content.
    pub fn reader(&self) -> DerReader<'a> {
        DerReader::new(self.content)
    }

    /// Fail unless the element carries `tag`.
    pub fn expect(self, tag: u8, what: &str) -> Result<Self> {
        if self.tag == tag {
            Ok(self)
        } else {
            Err(malformed(&format!(
                "{what}: expected tag {tag:#04x}, found {:#04x}",
                self.tag
            )))
        }
    }
}

/// Sequential reader over concatenated DER elements.
///
/// Reading stops at the end of the first top-level element the caller asks
/// for, so zero padding after a CMS blob is ignored.
#[derive(Debug, Clone)]
pub struct DerReader<'a> {
    data: &'a [u8],
}

impl<'a> DerReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Tag of the next element without consuming it.
    pub fn peek_tag(&self) -> Option<u8> {
        self.data.first().copied()
    }

    /// Decode the next element.
    pub fn read(&mut self) -> Result<Tlv<'a>> {
        let data = self.data;
        let (&tag, rest) = data
            .split_first()
            .ok_or_else(|| malformed("unexpected end of data"))?;
        if tag & 0x1f == 0x1f {
            return Err(malformed("multi-byte tags are not supported"));
        }

        let (&first, rest) = rest
            .split_first()
            .ok_or_else(|| malformed("missing length"))?;
        let (length, header_len) = if first < 0x80 {
            (first as usize, 2)
        } else {
            let count = (first & 0x7f) as usize;
            if count == 0 || count > 4 || rest.len() < count {
                return Err(malformed("unsupported length encoding"));
            }
            let length = rest[..count]
                .iter()
                .fold(0usize, |acc, &b| (acc << 8) | b as usize);
            (length, 2 + count)
        };

        let end = header_len
            .checked_add(length)
            .filter(|&end| end <= data.len())
            .ok_or_else(|| malformed("element overruns its container"))?;

        self.data = &data[end..];
        Ok(Tlv {
            tag,
            content: &data[header_len..end],
            raw: &data[..end],
        })
    }

    /// Decode the next element and require `tag`.
    pub fn read_expected(&mut self, tag: u8, what: &str) -> Result<Tlv<'a>> {
        self.read()?.expect(tag, what)
    }
}

fn malformed(detail: &str) -> WipesealError {
    WipesealError::Render(format!("malformed CMS signature: {detail}"))
}
