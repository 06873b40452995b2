// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Committed RSA-2048 test key material. Never use outside tests.

use crate::keys::InMemoryKeyStore;

/// PKCS#8 private key matching [`CERT_PEM`].
pub const KEY_PEM: &str = include_str!("../tests/fixtures/key.pem");

/// The same private key in PKCS#1 (`RSA PRIVATE KEY`) form.
pub const KEY_PKCS1_PEM: &str = include_str!("../tests/fixtures/key-pkcs1.pem");

/// Self-signed certificate, subject `CN=Wipeseal Test Signer, O=Wipeseal, C=DE`.
pub const CERT_PEM: &str = include_str!("../tests/fixtures/cert.pem");

/// An unrelated private key, for mismatch tests.
pub const OTHER_KEY_PEM: &str = include_str!("../tests/fixtures/other-key.pem");

/// Key store holding the fixture key and certificate.
pub fn key_store() -> InMemoryKeyStore {
    InMemoryKeyStore::new(KEY_PEM, Some(CERT_PEM.as_bytes().to_vec()))
}
