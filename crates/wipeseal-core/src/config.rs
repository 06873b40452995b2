// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Seal configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Settings for a sealing run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SealConfig {
    /// PEM file holding the RSA private key (PKCS#8 or PKCS#1).
    pub private_key_path: PathBuf,
    /// PEM file holding the signer's X.509 certificate.
    pub certificate_path: PathBuf,
    /// Name of the AcroForm signature field added to the document.
    pub signature_field_name: String,
    /// Bytes reserved for the CMS blob inside the document's `/Contents`
    /// placeholder. The hex placeholder is twice this size.
    pub signature_reserve_bytes: usize,
    /// Optional `/Reason` entry of the signature dictionary.
    pub signer_reason: Option<String>,
    /// Optional `/Location` entry of the signature dictionary.
    pub signer_location: Option<String>,
    /// Page size of the rendered certificate.
    pub paper_size: crate::PaperSize,
    /// SQLite issuance log; disabled when `None`.
    pub audit_log_path: Option<PathBuf>,
}

impl Default for SealConfig {
    fn default() -> Self {
        Self {
            private_key_path: PathBuf::from("key.pem"),
            certificate_path: PathBuf::from("cert.pem"),
            signature_field_name: "Signature1".to_string(),
            signature_reserve_bytes: 8192,
            signer_reason: None,
            signer_location: None,
            paper_size: crate::PaperSize::A4,
            audit_log_path: None,
        }
    }
}

impl SealConfig {
    /// Load settings from a JSON file, falling back to defaults when the file
    /// does not exist. A file that exists but does not parse is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Write settings as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = SealConfig::load(dir.path().join("absent.json")).unwrap();
        assert_eq!(config, SealConfig::default());
        assert_eq!(config.signature_field_name, "Signature1");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wipeseal.json");
        std::fs::write(&path, r#"{"signer_reason":"Erasure attested"}"#).unwrap();

        let config = SealConfig::load(&path).unwrap();
        assert_eq!(config.signer_reason.as_deref(), Some("Erasure attested"));
        assert_eq!(config.signature_reserve_bytes, 8192);
        assert_eq!(config.private_key_path, PathBuf::from("key.pem"));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wipeseal.json");
        let config = SealConfig {
            signature_field_name: "EraseSig".into(),
            audit_log_path: Some(dir.path().join("audit.db")),
            ..SealConfig::default()
        };
        config.save(&path).unwrap();
        assert_eq!(SealConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wipeseal.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(SealConfig::load(&path).is_err());
    }
}
