// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Integrity helpers — SHA-256 fingerprints and multi-part digests.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash of `data` and return it as a lowercase hex string.
///
/// Used for the record-signature fingerprint printed on the certificate and
/// for the document hash stored in the issuance log.
pub fn hash_bytes(data: &[u8]) -> String {
    hex::encode(sha256_digest(&[data]))
}

/// SHA-256 over the concatenation of `parts`, without copying them together.
///
/// The document signer feeds the two halves of a PDF byte range through this.
pub fn sha256_digest(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// SHA-256 of the empty byte slice (well-known constant).
    const EMPTY_SHA256: &str =
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    #[test]
    fn hash_empty_input() {
        assert_eq!(hash_bytes(b""), EMPTY_SHA256);
    }

    #[test]
    fn hash_known_value() {
        // SHA-256("hello"), as printed by coreutils sha256sum.
        let expected = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";
        assert_eq!(hash_bytes(b"hello"), expected);
    }

    #[test]
    fn split_input_hashes_like_contiguous_input() {
        let whole = sha256_digest(&[b"hello world"]);
        let split = sha256_digest(&[b"hello", b" ", b"world"]);
        assert_eq!(whole, split);
        assert_eq!(
            hex::encode(whole),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }
}
