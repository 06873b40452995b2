// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Subcommand implementations. Each returns the text to print on success.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, instrument};
use wipeseal_core::{AttestationRecord, SealConfig, WipesealError};
use wipeseal_document::{DocumentVerification, PdfReader};
use wipeseal_pipeline::{OutputPaths, Pipeline, PipelineFailure};
use wipeseal_security::{PemKeyStore, PublicKey, RecordSignature};

/// Anything a subcommand can report as failure.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Wipeseal(#[from] WipesealError),

    #[error(transparent)]
    Pipeline(#[from] PipelineFailure),

    /// The input was read fine but its signature does not hold.
    #[error("{0}")]
    Invalid(String),
}

/// Arguments of `wipeseal seal`.
#[derive(Debug, Clone)]
pub struct SealArgs {
    pub record: PathBuf,
    pub output: PathBuf,
    pub key: Option<PathBuf>,
    pub cert: Option<PathBuf>,
    pub reason: Option<String>,
    pub location: Option<String>,
}

/// Configuration file plus command-line overrides.
fn effective_config(config_path: &Path, args: &SealArgs) -> Result<SealConfig, CliError> {
    let mut config = SealConfig::load(config_path)?;
    if let Some(key) = &args.key {
        config.private_key_path = key.clone();
    }
    if let Some(cert) = &args.cert {
        config.certificate_path = cert.clone();
    }
    if args.reason.is_some() {
        config.signer_reason = args.reason.clone();
    }
    if args.location.is_some() {
        config.signer_location = args.location.clone();
    }
    Ok(config)
}

#[instrument(skip_all, fields(record = %args.record.display()))]
pub fn seal(config_path: &Path, args: &SealArgs) -> Result<String, CliError> {
    let config = effective_config(config_path, args)?;
    let record = AttestationRecord::from_json(
        &std::fs::read_to_string(&args.record).map_err(WipesealError::from)?,
    )?;

    let paths = OutputPaths::for_document(&args.output)?;
    let pipeline = Pipeline::from_config(PemKeyStore::from_config(&config), &config)?;
    let outcome = pipeline.run(&record, &paths)?;

    let mut report = String::from("Files created:\n");
    let _ = writeln!(report, "  1. {}", outcome.record_path.display());
    let _ = write!(report, "  2. {}", outcome.document_path.display());
    for warning in &outcome.warnings {
        let _ = write!(report, "\nwarning: {warning}");
    }
    info!(run_id = %outcome.run_id, "seal complete");
    Ok(report)
}

#[instrument(skip_all, fields(record = %record_path.display()))]
pub fn verify_record(
    config_path: &Path,
    record_path: &Path,
    cert: Option<&Path>,
) -> Result<String, CliError> {
    let cert_path = match cert {
        Some(path) => path.to_path_buf(),
        None => SealConfig::load(config_path)?.certificate_path,
    };
    let cert_pem = std::fs::read(&cert_path).map_err(|e| {
        WipesealError::KeyUnavailable(format!("{}: {e}", cert_path.display()))
    })?;
    let public_key = PublicKey::from_certificate_pem(&cert_pem)?;

    let record = AttestationRecord::from_json(
        &std::fs::read_to_string(record_path).map_err(WipesealError::from)?,
    )?;
    let token = record.signature().ok_or_else(|| {
        CliError::Invalid(format!("{} carries no signature", record_path.display()))
    })?;
    let parsed = RecordSignature::parse(token)?;

    if wipeseal_security::verify_record(&record, &public_key) {
        Ok(format!(
            "record signature valid ({} signed bytes)",
            parsed.payload.len()
        ))
    } else {
        Err(CliError::Invalid(format!(
            "record signature INVALID: {} was altered or signed by another key",
            record_path.display()
        )))
    }
}

#[instrument(skip_all, fields(document = %path.display()))]
pub fn verify_document(path: &Path) -> Result<String, CliError> {
    let bytes = std::fs::read(path).map_err(WipesealError::from)?;
    let report = wipeseal_document::verify_document(&bytes)?;

    if report.is_valid() {
        Ok(format!(
            "document signature valid\n  signer: {}\n  signed: {}",
            report.signer_subject,
            signing_time(&report)
        ))
    } else {
        Err(CliError::Invalid(format!(
            "document signature INVALID: {}",
            failure_reasons(&report).join(", ")
        )))
    }
}

#[instrument(skip_all, fields(document = %path.display()))]
pub fn inspect(path: &Path) -> Result<String, CliError> {
    let bytes = std::fs::read(path).map_err(WipesealError::from)?;
    let reader = PdfReader::from_bytes(&bytes)?;
    let report = wipeseal_document::verify_document(&bytes)?;
    let [a, b, c, d] = report.byte_range;

    let mut out = String::new();
    let _ = writeln!(out, "file:             {} ({} bytes)", path.display(), bytes.len());
    let _ = writeln!(out, "pages:            {}", reader.page_count());
    let _ = writeln!(out, "byte range:       [{a} {b} {c} {d}]");
    let _ = writeln!(out, "covers file:      {}", yes_no(report.covers_whole_file));
    let _ = writeln!(out, "signer:           {}", report.signer_subject);
    let _ = writeln!(out, "signing time:     {}", signing_time(&report));
    let _ = writeln!(out, "document sha256:  {}", report.document_digest);
    let _ = writeln!(out, "digest matches:   {}", yes_no(report.digest_matches));
    let _ = writeln!(out, "signature valid:  {}", yes_no(report.signature_valid));
    let _ = write!(
        out,
        "cms size:         {} of {} reserved bytes",
        report.signature_len,
        (c - b).saturating_sub(2) / 2
    );
    Ok(out)
}

fn failure_reasons(report: &DocumentVerification) -> Vec<&'static str> {
    let mut reasons = Vec::new();
    if !report.covers_whole_file {
        reasons.push("bytes were appended after signing");
    }
    if !report.digest_matches {
        reasons.push("signed content was modified");
    }
    if !report.signature_valid {
        reasons.push("signature does not match the embedded certificate");
    }
    reasons
}

fn signing_time(report: &DocumentVerification) -> String {
    report
        .signing_time
        .map(|time| time.to_rfc3339())
        .unwrap_or_else(|| "unknown".to_string())
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
