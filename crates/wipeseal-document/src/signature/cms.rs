// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// CMS SignedData (RFC 5652) for detached PDF signatures.
//
// ContentInfo {
//   contentType  id-signedData
//   content [0]  SignedData {
//     version 1, digestAlgorithms { sha256 }, encapContentInfo { id-data },
//     certificates [0] { signer certificate },
//     signerInfos { SignerInfo {
//       version 1, sid issuerAndSerialNumber, digestAlgorithm sha256,
//       signedAttrs [0] { contentType, signingTime, messageDigest },
//       signatureAlgorithm rsaEncryption, signature
//     } }
//   }
// }
//
// The RSA signature covers the DER `SET OF` encoding of the signed
// attributes, not the `[0]` form embedded in the SignerInfo.

use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use der::{Decode, Encode};
use tracing::{debug, instrument};
use wipeseal_core::error::{Result, WipesealError};
use wipeseal_security::SigningIdentity;
use x509_cert::Certificate;

use super::asn1::{
    self, DerReader, TAG_CONTEXT_0, TAG_CONTEXT_1, TAG_OCTET_STRING, TAG_SEQUENCE, TAG_SET,
};

/// Build a DER `ContentInfo(SignedData)` over a precomputed SHA-256 digest.
#[instrument(skip_all, fields(signing_time = %signing_time))]
pub fn build_signed_data(
    digest: &[u8; 32],
    signing_time: DateTime<Utc>,
    identity: &SigningIdentity,
) -> Result<Vec<u8>> {
    let attributes = signed_attributes(digest, signing_time);
    let signature = identity.key().sign(&attributes)?;

    let tbs = &identity.certificate().tbs_certificate;
    let issuer = tbs.issuer.to_der().map_err(encode_err)?;
    let serial = tbs.serial_number.to_der().map_err(encode_err)?;

    let sha256 = asn1::algorithm_identifier(asn1::OID_SHA256);
    let signer_info = asn1::sequence(&[
        &asn1::small_integer(1),
        &asn1::sequence(&[&issuer, &serial]),
        &sha256,
        &asn1::implicit(TAG_CONTEXT_0, &attributes),
        &asn1::algorithm_identifier(asn1::OID_RSA_ENCRYPTION),
        &asn1::octet_string(&signature),
    ]);

    let signed_data = asn1::sequence(&[
        &asn1::small_integer(1),
        &asn1::tlv(TAG_SET, &sha256),
        &asn1::sequence(&[&asn1::oid(asn1::OID_DATA)]),
        &asn1::tlv(TAG_CONTEXT_0, identity.certificate_der()),
        &asn1::tlv(TAG_SET, &signer_info),
    ]);

    let content_info = asn1::sequence(&[
        &asn1::oid(asn1::OID_SIGNED_DATA),
        &asn1::tlv(TAG_CONTEXT_0, &signed_data),
    ]);

    debug!(cms_len = content_info.len(), "CMS SignedData built");
    Ok(content_info)
}

/// The signed attributes as a DER `SET OF`.
fn signed_attributes(digest: &[u8; 32], signing_time: DateTime<Utc>) -> Vec<u8> {
    asn1::set_of(vec![
        attribute(asn1::OID_CONTENT_TYPE, &asn1::oid(asn1::OID_DATA)),
        attribute(asn1::OID_SIGNING_TIME, &encode_time(signing_time)),
        attribute(asn1::OID_MESSAGE_DIGEST, &asn1::octet_string(digest)),
    ])
}

fn attribute(oid_content: &[u8], value: &[u8]) -> Vec<u8> {
    asn1::sequence(&[&asn1::oid(oid_content), &asn1::tlv(TAG_SET, value)])
}

/// UTCTime through 2049, GeneralizedTime afterwards (RFC 5280 §4.1.2.5).
fn encode_time(time: DateTime<Utc>) -> Vec<u8> {
    if (1950..2050).contains(&time.year()) {
        asn1::tlv(
            asn1::TAG_UTC_TIME,
            time.format("%y%m%d%H%M%SZ").to_string().as_bytes(),
        )
    } else {
        asn1::tlv(
            asn1::TAG_GENERALIZED_TIME,
            time.format("%Y%m%d%H%M%SZ").to_string().as_bytes(),
        )
    }
}

fn encode_err(err: der::Error) -> WipesealError {
    WipesealError::Crypto(format!("cannot encode signer identifier: {err}"))
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// The parts of a SignedData a verifier needs.
#[derive(Debug, Clone)]
pub struct ParsedSignedData {
    /// DER of the certificate matching the signer identifier.
    pub certificate_der: Vec<u8>,
    pub message_digest: Vec<u8>,
    pub signing_time: Option<DateTime<Utc>>,
    /// Signed attributes re-tagged as `SET OF`: the bytes the signature covers.
    pub signed_attributes: Vec<u8>,
    pub signature: Vec<u8>,
}

impl ParsedSignedData {
    pub fn certificate(&self) -> Result<Certificate> {
        Certificate::from_der(&self.certificate_der)
            .map_err(|e| malformed(&format!("embedded certificate: {e}")))
    }
}

/// Decode a `ContentInfo(SignedData)`. Bytes after the first element (the
/// zero padding of a PDF `/Contents` placeholder) are ignored.
pub fn parse_signed_data(data: &[u8]) -> Result<ParsedSignedData> {
    let content_info = DerReader::new(data).read_expected(TAG_SEQUENCE, "ContentInfo")?;
    let mut fields = content_info.reader();
    let content_type = fields.read_expected(asn1::TAG_OID, "contentType")?;
    if content_type.content != asn1::OID_SIGNED_DATA {
        return Err(malformed("content type is not signedData"));
    }
    let explicit = fields.read_expected(TAG_CONTEXT_0, "content")?;
    let signed_data = explicit.reader().read_expected(TAG_SEQUENCE, "SignedData")?;

    let mut fields = signed_data.reader();
    fields.read_expected(asn1::TAG_INTEGER, "version")?;
    fields.read_expected(TAG_SET, "digestAlgorithms")?;
    let encap = fields.read_expected(TAG_SEQUENCE, "encapContentInfo")?;
    let mut encap_fields = encap.reader();
    encap_fields.read_expected(asn1::TAG_OID, "eContentType")?;
    if !encap_fields.is_empty() {
        return Err(malformed("signature is not detached"));
    }

    let mut certificates = Vec::new();
    if fields.peek_tag() == Some(TAG_CONTEXT_0) {
        let mut certs = fields.read()?.reader();
        while !certs.is_empty() {
            certificates.push(certs.read()?.raw);
        }
    }
    if fields.peek_tag() == Some(TAG_CONTEXT_1) {
        fields.read()?;
    }

    let signer_infos = fields.read_expected(TAG_SET, "signerInfos")?;
    let signer_info = signer_infos
        .reader()
        .read_expected(TAG_SEQUENCE, "SignerInfo")?;
    let mut fields = signer_info.reader();
    fields.read_expected(asn1::TAG_INTEGER, "SignerInfo version")?;
    let sid = fields.read_expected(TAG_SEQUENCE, "issuerAndSerialNumber")?;

    let digest_algorithm = fields.read_expected(TAG_SEQUENCE, "digestAlgorithm")?;
    let digest_oid = digest_algorithm.reader().read_expected(asn1::TAG_OID, "digest OID")?;
    if digest_oid.content != asn1::OID_SHA256 {
        return Err(malformed("digest algorithm is not SHA-256"));
    }

    let attributes = fields.read_expected(TAG_CONTEXT_0, "signedAttrs")?;
    fields.read_expected(TAG_SEQUENCE, "signatureAlgorithm")?;
    let signature = fields.read_expected(TAG_OCTET_STRING, "signature")?;

    let (message_digest, signing_time) = read_attributes(attributes.content)?;
    let certificate_der = matching_certificate(&certificates, sid.content)?;

    debug!(
        certificates = certificates.len(),
        signature_len = signature.content.len(),
        "CMS SignedData parsed"
    );

    Ok(ParsedSignedData {
        certificate_der,
        message_digest,
        signing_time,
        signed_attributes: asn1::tlv(TAG_SET, attributes.content),
        signature: signature.content.to_vec(),
    })
}

fn read_attributes(content: &[u8]) -> Result<(Vec<u8>, Option<DateTime<Utc>>)> {
    let mut message_digest = None;
    let mut signing_time = None;

    let mut attributes = DerReader::new(content);
    while !attributes.is_empty() {
        let attribute = attributes.read_expected(TAG_SEQUENCE, "Attribute")?;
        let mut parts = attribute.reader();
        let oid = parts.read_expected(asn1::TAG_OID, "attribute type")?;
        let values = parts.read_expected(TAG_SET, "attribute values")?;
        let value = values.reader().read()?;

        if oid.content == asn1::OID_MESSAGE_DIGEST {
            message_digest = Some(value.expect(TAG_OCTET_STRING, "messageDigest")?.content.to_vec());
        } else if oid.content == asn1::OID_SIGNING_TIME {
            signing_time = Some(decode_time(value.tag, value.content)?);
        }
    }

    let message_digest = message_digest.ok_or_else(|| malformed("no messageDigest attribute"))?;
    Ok((message_digest, signing_time))
}

fn decode_time(tag: u8, content: &[u8]) -> Result<DateTime<Utc>> {
    let text = std::str::from_utf8(content).map_err(|_| malformed("signing time is not ASCII"))?;
    let full = match tag {
        asn1::TAG_UTC_TIME => {
            let year: u32 = text
                .get(..2)
                .and_then(|yy| yy.parse().ok())
                .ok_or_else(|| malformed("bad UTCTime"))?;
            let century = if year >= 50 { "19" } else { "20" };
            format!("{century}{text}")
        }
        asn1::TAG_GENERALIZED_TIME => text.to_string(),
        other => return Err(malformed(&format!("signing time has tag {other:#04x}"))),
    };
    NaiveDateTime::parse_from_str(&full, "%Y%m%d%H%M%SZ")
        .map(|naive| naive.and_utc())
        .map_err(|e| malformed(&format!("bad signing time {text}: {e}")))
}

/// The certificate whose issuer and serial number equal the signer identifier.
fn matching_certificate(certificates: &[&[u8]], sid: &[u8]) -> Result<Vec<u8>> {
    for candidate in certificates {
        let Ok(certificate) = Certificate::from_der(candidate) else {
            continue;
        };
        let tbs = &certificate.tbs_certificate;
        let (Ok(issuer), Ok(serial)) = (tbs.issuer.to_der(), tbs.serial_number.to_der()) else {
            continue;
        };
        if [issuer, serial].concat() == sid {
            return Ok(candidate.to_vec());
        }
    }
    Err(malformed("no embedded certificate matches the signer"))
}

fn malformed(detail: &str) -> WipesealError {
    WipesealError::Render(format!("malformed CMS signature: {detail}"))
}
