// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Record signer — RS256 compact JWS over the canonical record bytes.
//
// The token is `b64url(header) "." b64url(canonical) "." b64url(signature)`.
// Because the canonical bytes null the signature slot, the token can be stored
// inside the very record it signs: re-canonicalizing the signed record yields
// the payload again.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;
use tracing::{debug, info, instrument};
use wipeseal_core::AttestationRecord;
use wipeseal_core::error::{Result, WipesealError};

use crate::canonical::canonicalize;
use crate::keys::{KeyMaterialProvider, PublicKey, SigningKey};

/// Protected header of every record signature.
const JWS_HEADER: &str = r#"{"alg":"RS256","typ":"JWT"}"#;

/// Sign `record` with the provider's private key.
///
/// Returns a new record whose `audit.digital_signature` holds the JWS; the
/// input is left untouched.
#[instrument(skip_all)]
pub fn sign_record(
    record: &AttestationRecord,
    keys: &impl KeyMaterialProvider,
) -> Result<AttestationRecord> {
    // Structure first: a record without a signature slot never reaches the key.
    let canonical = canonicalize(record)?;
    let key = keys.load_private_key()?;
    embed_signature(record, &canonical, &key)
}

/// Sign `record` with an already loaded key.
pub fn sign_record_with_key(
    record: &AttestationRecord,
    key: &SigningKey,
) -> Result<AttestationRecord> {
    let canonical = canonicalize(record)?;
    embed_signature(record, &canonical, key)
}

fn embed_signature(
    record: &AttestationRecord,
    canonical: &[u8],
    key: &SigningKey,
) -> Result<AttestationRecord> {
    let token = encode_jws(canonical, key)?;
    info!(
        payload_len = canonical.len(),
        token_len = token.len(),
        "attestation record signed"
    );
    record.with_signature(Some(token))
}

/// Check the embedded signature of `signed` against `public_key`.
///
/// The payload carried in the token must equal the canonical bytes recomputed
/// from the record itself, so editing any field other than the signature slot
/// invalidates it.
#[instrument(skip_all)]
pub fn verify_record(signed: &AttestationRecord, public_key: &PublicKey) -> bool {
    let Some(token) = signed.signature() else {
        debug!("record carries no signature");
        return false;
    };
    let Ok(canonical) = canonicalize(signed) else {
        return false;
    };
    match RecordSignature::parse(token) {
        Ok(parsed) => parsed.payload == canonical && parsed.verify(public_key),
        Err(err) => {
            debug!(%err, "malformed record signature");
            false
        }
    }
}

fn encode_jws(payload: &[u8], key: &SigningKey) -> Result<String> {
    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(JWS_HEADER),
        URL_SAFE_NO_PAD.encode(payload)
    );
    let signature = key.sign(signing_input.as_bytes())?;
    Ok(format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(signature)))
}

#[derive(Deserialize)]
struct JwsHeader {
    alg: String,
}

/// A decoded compact JWS record signature.
#[derive(Debug, Clone)]
pub struct RecordSignature {
    signing_input: String,
    /// The canonical record bytes the signature was computed over.
    pub payload: Vec<u8>,
    pub signature: Vec<u8>,
}

impl RecordSignature {
    /// Split and decode a compact token. Only RS256 is accepted.
    pub fn parse(token: &str) -> Result<Self> {
        let mut parts = token.split('.');
        let (Some(header_b64), Some(payload_b64), Some(signature_b64), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(WipesealError::Schema(
                "record signature is not a three-part compact JWS".into(),
            ));
        };

        let header: JwsHeader = serde_json::from_slice(&decode_segment(header_b64)?)?;
        if header.alg != "RS256" {
            return Err(WipesealError::Schema(format!(
                "unsupported record signature algorithm {}",
                header.alg
            )));
        }

        Ok(Self {
            signing_input: format!("{header_b64}.{payload_b64}"),
            payload: decode_segment(payload_b64)?,
            signature: decode_segment(signature_b64)?,
        })
    }

    /// Check the RSA signature over the token's signing input.
    pub fn verify(&self, public_key: &PublicKey) -> bool {
        public_key.verify(self.signing_input.as_bytes(), &self.signature)
    }
}

fn decode_segment(segment: &str) -> Result<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| WipesealError::Schema(format!("invalid base64url in record signature: {e}")))
}
