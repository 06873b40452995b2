// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Key material provider — RSA signing keys and X.509 signer certificates.
//
// Record signing needs only a private key; document signing additionally needs
// the certificate so a verifier can recover the signer's public identity from
// the signed PDF alone. Where the PEM files live is a detail of the provider;
// the pipeline only sees `load_private_key` / `load_signing_identity`.
//
// PEM parsing goes through `rustls::pki_types`, RSA signing through `ring`,
// certificate decoding through `x509-cert`.

use std::path::{Path, PathBuf};

use der::Decode;
use ring::rand::SystemRandom;
use ring::signature::{
    KeyPair, RSA_PKCS1_2048_8192_SHA256, RSA_PKCS1_SHA256, RsaKeyPair, UnparsedPublicKey,
};
use rustls::pki_types::pem::PemObject;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use tracing::{debug, instrument};
use wipeseal_core::SealConfig;
use wipeseal_core::error::{Result, WipesealError};
use x509_cert::Certificate;

/// Dotted form of the `rsaEncryption` algorithm OID.
const RSA_ENCRYPTION_OID: &str = "1.2.840.113549.1.1.1";

/// Source of signing key material.
///
/// Implementations are read-only: loading never mutates the backing store.
pub trait KeyMaterialProvider {
    /// Load the RSA private key used for record signing.
    fn load_private_key(&self) -> Result<SigningKey>;

    /// Load the private key together with the matching signer certificate.
    fn load_signing_identity(&self) -> Result<SigningIdentity>;
}

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// An RSA private key that signs with RSASSA-PKCS1-v1_5 / SHA-256 (RS256).
pub struct SigningKey {
    key_pair: RsaKeyPair,
}

impl SigningKey {
    /// Parse a PEM private key (`PRIVATE KEY` or `RSA PRIVATE KEY`).
    pub fn from_pem(pem: &[u8]) -> Result<Self> {
        let der = PrivateKeyDer::from_pem_slice(pem).map_err(|e| {
            WipesealError::KeyUnavailable(format!("cannot parse private key PEM: {e}"))
        })?;

        let parsed = match &der {
            PrivateKeyDer::Pkcs8(key) => RsaKeyPair::from_pkcs8(key.secret_pkcs8_der()),
            PrivateKeyDer::Pkcs1(key) => RsaKeyPair::from_der(key.secret_pkcs1_der()),
            _ => {
                return Err(WipesealError::KeyUnavailable(
                    "only RSA private keys are supported".into(),
                ));
            }
        };

        let key_pair = parsed
            .map_err(|e| WipesealError::KeyUnavailable(format!("RSA key rejected: {e}")))?;

        debug!(
            modulus_bytes = key_pair.public().modulus_len(),
            "RSA private key loaded"
        );
        Ok(Self { key_pair })
    }

    /// Sign `message` (RSASSA-PKCS1-v1_5 with SHA-256).
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        let rng = SystemRandom::new();
        let mut signature = vec![0u8; self.key_pair.public().modulus_len()];
        self.key_pair
            .sign(&RSA_PKCS1_SHA256, &rng, message, &mut signature)
            .map_err(|e| WipesealError::Crypto(format!("RSA signing failed: {e}")))?;
        Ok(signature)
    }

    /// The matching public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.key_pair.public_key().as_ref().to_vec())
    }

    /// Signature length in bytes (the modulus length).
    pub fn signature_len(&self) -> usize {
        self.key_pair.public().modulus_len()
    }
}

/// An RSA public key as a DER `RSAPublicKey` (PKCS#1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey(Vec<u8>);

impl PublicKey {
    /// Extract the RSA public key from a DER certificate.
    pub fn from_certificate(certificate: &Certificate) -> Result<Self> {
        let spki = &certificate.tbs_certificate.subject_public_key_info;
        if spki.algorithm.oid.to_string() != RSA_ENCRYPTION_OID {
            return Err(WipesealError::KeyUnavailable(format!(
                "certificate key algorithm {} is not RSA",
                spki.algorithm.oid
            )));
        }
        Ok(Self(spki.subject_public_key.raw_bytes().to_vec()))
    }

    /// Parse a PEM certificate and extract its RSA public key.
    pub fn from_certificate_pem(pem: &[u8]) -> Result<Self> {
        let (_, certificate) = parse_certificate_pem(pem)?;
        Self::from_certificate(&certificate)
    }

    /// Check an RS256 signature over `message`.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        UnparsedPublicKey::new(&RSA_PKCS1_2048_8192_SHA256, &self.0)
            .verify(message, signature)
            .is_ok()
    }
}

// ---------------------------------------------------------------------------
// Signing identity
// ---------------------------------------------------------------------------

/// A private key plus the certificate that vouches for it.
pub struct SigningIdentity {
    key: SigningKey,
    certificate: Certificate,
    certificate_der: Vec<u8>,
}

impl SigningIdentity {
    /// Pair a key with a certificate, checking that they belong together.
    pub fn new(key: SigningKey, certificate_der: Vec<u8>) -> Result<Self> {
        let certificate = Certificate::from_der(&certificate_der).map_err(|e| {
            WipesealError::KeyUnavailable(format!("cannot decode signer certificate: {e}"))
        })?;

        if PublicKey::from_certificate(&certificate)? != key.public_key() {
            return Err(WipesealError::KeyUnavailable(
                "certificate does not match the private key".into(),
            ));
        }

        Ok(Self {
            key,
            certificate,
            certificate_der,
        })
    }

    pub fn key(&self) -> &SigningKey {
        &self.key
    }

    pub fn certificate(&self) -> &Certificate {
        &self.certificate
    }

    /// The certificate exactly as loaded (DER).
    pub fn certificate_der(&self) -> &[u8] {
        &self.certificate_der
    }

    /// Subject distinguished name in RFC 4514 form.
    pub fn subject(&self) -> String {
        self.certificate.tbs_certificate.subject.to_string()
    }
}

fn parse_certificate_pem(pem: &[u8]) -> Result<(Vec<u8>, Certificate)> {
    let der = CertificateDer::from_pem_slice(pem).map_err(|e| {
        WipesealError::KeyUnavailable(format!("cannot parse certificate PEM: {e}"))
    })?;
    let certificate = Certificate::from_der(der.as_ref()).map_err(|e| {
        WipesealError::KeyUnavailable(format!("cannot decode signer certificate: {e}"))
    })?;
    Ok((der.as_ref().to_vec(), certificate))
}

// ---------------------------------------------------------------------------
// Providers
// ---------------------------------------------------------------------------

/// Loads key and certificate from PEM files on every call.
#[derive(Debug, Clone)]
pub struct PemKeyStore {
    key_path: PathBuf,
    certificate_path: PathBuf,
}

impl PemKeyStore {
    pub fn new(key_path: impl Into<PathBuf>, certificate_path: impl Into<PathBuf>) -> Self {
        Self {
            key_path: key_path.into(),
            certificate_path: certificate_path.into(),
        }
    }

    /// Use the key and certificate paths from a [`SealConfig`].
    pub fn from_config(config: &SealConfig) -> Self {
        Self::new(&config.private_key_path, &config.certificate_path)
    }
}

/// Read a key file, turning any I/O failure into `KeyUnavailable`.
fn read_key_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path)
        .map_err(|e| WipesealError::KeyUnavailable(format!("{}: {e}", path.display())))
}

impl KeyMaterialProvider for PemKeyStore {
    #[instrument(skip(self), fields(key = %self.key_path.display()))]
    fn load_private_key(&self) -> Result<SigningKey> {
        SigningKey::from_pem(&read_key_file(&self.key_path)?)
    }

    #[instrument(skip(self), fields(key = %self.key_path.display(), cert = %self.certificate_path.display()))]
    fn load_signing_identity(&self) -> Result<SigningIdentity> {
        let key = self.load_private_key()?;
        let (der, _) = parse_certificate_pem(&read_key_file(&self.certificate_path)?)?;
        SigningIdentity::new(key, der)
    }
}

/// Key material held in memory, e.g. fetched from a secrets manager.
#[derive(Clone)]
pub struct InMemoryKeyStore {
    key_pem: Vec<u8>,
    certificate_pem: Option<Vec<u8>>,
}

impl InMemoryKeyStore {
    pub fn new(key_pem: impl Into<Vec<u8>>, certificate_pem: Option<Vec<u8>>) -> Self {
        Self {
            key_pem: key_pem.into(),
            certificate_pem,
        }
    }
}

impl KeyMaterialProvider for InMemoryKeyStore {
    fn load_private_key(&self) -> Result<SigningKey> {
        SigningKey::from_pem(&self.key_pem)
    }

    fn load_signing_identity(&self) -> Result<SigningIdentity> {
        let pem = self.certificate_pem.as_deref().ok_or_else(|| {
            WipesealError::KeyUnavailable("no signer certificate configured".into())
        })?;
        let key = self.load_private_key()?;
        let (der, _) = parse_certificate_pem(pem)?;
        SigningIdentity::new(key, der)
    }
}
