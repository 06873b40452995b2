// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// wipeseal-security — Key material and record signing for Wipeseal.
//
// Provides the key material provider (RSA keys and signer certificates from
// PEM), the canonical record serializer, the RS256 record signer/verifier,
// SHA-256 integrity helpers, and the SQLite issuance log.

pub mod audit;
pub mod canonical;
#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;
pub mod integrity;
pub mod keys;
pub mod record_signer;

// Re-export the primary API so callers can use `wipeseal_security::sign_record` etc.
pub use audit::{IssuanceEntry, IssuanceEvent, IssuanceLog};
pub use canonical::canonicalize;
pub use integrity::{hash_bytes, sha256_digest};
pub use keys::{
    InMemoryKeyStore, KeyMaterialProvider, PemKeyStore, PublicKey, SigningIdentity, SigningKey,
};
pub use record_signer::{RecordSignature, sign_record, sign_record_with_key, verify_record};
