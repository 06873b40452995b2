// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline orchestrator — one synchronous signing run per call.
//
// Atomicity rules:
//   * the unsigned document lives in a uniquely named temporary file next to
//     the final document and is removed on success and on failure;
//   * both final artifacts are first written to temporary files in their
//     destination directories and only renamed into place once the document
//     signature is complete, the record first, the document second;
//   * a record already at the destination is moved aside first; if the
//     document rename fails the new record is withdrawn and the old one put
//     back, so a run publishes either both artifacts or neither.
//
// Cancellation is checked between transitions, never inside a stage.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tempfile::{Builder, NamedTempFile, TempPath};
use thiserror::Error;
use tracing::{debug, info, info_span, instrument, warn};
use uuid::Uuid;
use wipeseal_core::error::{Result, WipesealError};
use wipeseal_core::{AttestationRecord, SealConfig, value_text};
use wipeseal_document::{
    CertificateRenderer, DocumentRenderer, DocumentSigner, IncrementalPdfSigner, SignatureOptions,
};
use wipeseal_security::{
    IssuanceEvent, IssuanceLog, KeyMaterialProvider, canonicalize, hash_bytes,
    sign_record_with_key,
};

use crate::paths::OutputPaths;
use crate::reporter::{StatusReporter, TracingReporter};
use crate::state::PipelineState;

/// A run that stopped before `Finalized`.
#[derive(Debug, Error)]
#[error("pipeline failed while {stage}: {error}")]
pub struct PipelineFailure {
    /// The stage that was active when the error occurred.
    pub stage: PipelineState,
    #[source]
    pub error: WipesealError,
}

/// Everything a successful run produced.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub run_id: Uuid,
    /// The record as persisted, signature embedded.
    pub signed_record: AttestationRecord,
    pub record_path: PathBuf,
    pub document_path: PathBuf,
    /// Hex SHA-256 of the signed document.
    pub document_sha256: String,
    /// Non-fatal problems, e.g. a temporary file that could not be removed.
    pub warnings: Vec<String>,
}

/// The signing pipeline with its collaborators.
pub struct Pipeline<K, R = CertificateRenderer, S = IncrementalPdfSigner> {
    keys: K,
    renderer: R,
    signer: S,
    reporter: Box<dyn StatusReporter>,
    cancelled: Arc<AtomicBool>,
    issuance_log: Option<IssuanceLog>,
}

impl<K: KeyMaterialProvider> Pipeline<K> {
    /// Default renderer and signer, status via `tracing`.
    pub fn new(keys: K) -> Self {
        Self {
            keys,
            renderer: CertificateRenderer::default(),
            signer: IncrementalPdfSigner::default(),
            reporter: Box::new(TracingReporter),
            cancelled: Arc::new(AtomicBool::new(false)),
            issuance_log: None,
        }
    }

    /// Collaborators configured from `config`, including the issuance log
    /// when `audit_log_path` is set.
    pub fn from_config(keys: K, config: &SealConfig) -> Result<Self> {
        let mut pipeline = Self::new(keys)
            .with_renderer(CertificateRenderer::new(config.paper_size))
            .with_signer(IncrementalPdfSigner::new(SignatureOptions::from_config(
                config,
            )));
        if let Some(path) = &config.audit_log_path {
            pipeline.issuance_log = Some(IssuanceLog::open(path)?);
        }
        Ok(pipeline)
    }
}

impl<K, R, S> Pipeline<K, R, S>
where
    K: KeyMaterialProvider,
    R: DocumentRenderer,
    S: DocumentSigner,
{
    pub fn with_renderer<R2: DocumentRenderer>(self, renderer: R2) -> Pipeline<K, R2, S> {
        Pipeline {
            keys: self.keys,
            renderer,
            signer: self.signer,
            reporter: self.reporter,
            cancelled: self.cancelled,
            issuance_log: self.issuance_log,
        }
    }

    pub fn with_signer<S2: DocumentSigner>(self, signer: S2) -> Pipeline<K, R, S2> {
        Pipeline {
            keys: self.keys,
            renderer: self.renderer,
            signer,
            reporter: self.reporter,
            cancelled: self.cancelled,
            issuance_log: self.issuance_log,
        }
    }

    pub fn with_reporter(mut self, reporter: impl StatusReporter + 'static) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    pub fn with_issuance_log(mut self, log: IssuanceLog) -> Self {
        self.issuance_log = Some(log);
        self
    }

    /// Flag that, once raised, stops the run at its next transition.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    /// Run the whole pipeline for `record`. The caller's record is never
    /// modified.
    pub fn run(
        &self,
        record: &AttestationRecord,
        output: &OutputPaths,
    ) -> std::result::Result<PipelineOutcome, PipelineFailure> {
        let run_id = Uuid::new_v4();
        let span = info_span!("pipeline", %run_id, document = %output.document.display());
        let _guard = span.enter();

        let mut result = self.execute(run_id, record, output);
        if let Some(warning) = self.log_issuance(record, &result) {
            self.reporter.on_warning(&warning);
            if let Ok(outcome) = result.as_mut() {
                outcome.warnings.push(warning);
            }
        }
        result
    }

    fn execute(
        &self,
        run_id: Uuid,
        record: &AttestationRecord,
        output: &OutputPaths,
    ) -> std::result::Result<PipelineOutcome, PipelineFailure> {
        let mut run = Run::new(self.reporter.as_ref(), &self.cancelled);

        run.advance(PipelineState::Serializing)?;
        let canonical = canonicalize(record).map_err(|e| run.fail(e))?;
        debug!(canonical_len = canonical.len(), "record serialized");

        run.advance(PipelineState::Signing)?;
        let identity = self.keys.load_signing_identity().map_err(|e| run.fail(e))?;
        let signed_record = sign_record_with_key(record, identity.key()).map_err(|e| run.fail(e))?;
        let record_json = signed_record.to_pretty_json().map_err(|e| run.fail(e))?;

        run.advance(PipelineState::Rendering)?;
        let unsigned = self
            .render_to_temp(&signed_record, output, run_id)
            .map_err(|e| run.fail(e))?;

        run.advance(PipelineState::EmbeddingSignature)?;
        let signed_document = std::fs::read(unsigned.path())
            .map_err(WipesealError::from)
            .and_then(|rendered| self.signer.sign_document(&rendered, &identity))
            .map_err(|e| run.fail(e))?;
        publish(output, record_json.as_bytes(), &signed_document).map_err(|e| run.fail(e))?;

        // Artifacts are published: from here on the run can no longer fail.
        run.finish();
        let mut warnings = Vec::new();
        let temp_path = unsigned.path().to_path_buf();
        if let Err(err) = unsigned.close() {
            let warning = format!(
                "temporary document {} could not be removed: {err}",
                temp_path.display()
            );
            self.reporter.on_warning(&warning);
            warnings.push(warning);
        }

        let outcome = PipelineOutcome {
            run_id,
            signed_record,
            record_path: output.record.clone(),
            document_path: output.document.clone(),
            document_sha256: hash_bytes(&signed_document),
            warnings,
        };
        info!(
            record = %outcome.record_path.display(),
            document = %outcome.document_path.display(),
            "attestation sealed"
        );
        Ok(outcome)
    }

    /// Render into `X-unsigned-temp-<run id>.pdf`, deleted when dropped.
    #[instrument(skip_all)]
    fn render_to_temp(
        &self,
        signed_record: &AttestationRecord,
        output: &OutputPaths,
        run_id: Uuid,
    ) -> Result<NamedTempFile> {
        let rendered = self.renderer.render(signed_record)?;
        check_rendered(&rendered)?;

        let name = output.unsigned_temp_name(run_id)?;
        let mut temp = Builder::new()
            .prefix(&name)
            .rand_bytes(0)
            .tempfile_in(output.document_dir())?;
        temp.write_all(&rendered)?;
        temp.as_file().sync_all()?;
        debug!(path = %temp.path().display(), bytes = rendered.len(), "unsigned document written");
        Ok(temp)
    }

    /// Append this run to the issuance log. Returns a warning on log failure.
    fn log_issuance(
        &self,
        record: &AttestationRecord,
        result: &std::result::Result<PipelineOutcome, PipelineFailure>,
    ) -> Option<String> {
        let log = self.issuance_log.as_ref()?;

        let (artifact_hash, details) = match result {
            Ok(outcome) => (outcome.document_sha256.clone(), None),
            Err(failure) => (
                canonicalize(record)
                    .map(|bytes| hash_bytes(&bytes))
                    .unwrap_or_default(),
                Some(failure.to_string()),
            ),
        };
        let serial = value_text(record.device.serial_number.as_ref());
        let event = IssuanceEvent {
            action: "seal",
            device_serial: serial.as_deref(),
            artifact_hash: &artifact_hash,
            success: result.is_ok(),
            details: details.as_deref(),
        };
        log.record(&event)
            .err()
            .map(|err| format!("issuance log not updated: {err}"))
    }
}

/// Per-run state machine bookkeeping.
struct Run<'a> {
    state: PipelineState,
    reporter: &'a dyn StatusReporter,
    cancelled: &'a AtomicBool,
}

impl<'a> Run<'a> {
    fn new(reporter: &'a dyn StatusReporter, cancelled: &'a AtomicBool) -> Self {
        Self {
            state: PipelineState::Idle,
            reporter,
            cancelled,
        }
    }

    /// Move to `target`, unless cancellation was requested.
    fn advance(&mut self, target: PipelineState) -> std::result::Result<(), PipelineFailure> {
        if self.cancelled.load(Ordering::SeqCst) {
            return Err(self.fail(WipesealError::Cancelled));
        }
        debug_assert!(self.state.can_transition_to(target));
        self.reporter.on_transition(self.state, target);
        self.state = target;
        Ok(())
    }

    /// Enter `Finalized` without a cancellation check.
    fn finish(&mut self) {
        self.reporter.on_transition(self.state, PipelineState::Finalized);
        self.state = PipelineState::Finalized;
    }

    fn fail(&mut self, error: WipesealError) -> PipelineFailure {
        let stage = self.state;
        warn!(%stage, kind = ?error.kind(), %error, "pipeline stage failed");
        self.reporter.on_transition(stage, PipelineState::Failed);
        self.state = PipelineState::Failed;
        PipelineFailure { stage, error }
    }
}

/// Minimal sanity check on renderer output before it is signed.
fn check_rendered(rendered: &[u8]) -> Result<()> {
    if rendered.is_empty() {
        return Err(WipesealError::Render("renderer produced no document".into()));
    }
    if !rendered.starts_with(b"%PDF-") {
        return Err(WipesealError::Render(
            "renderer output is not a PDF document".into(),
        ));
    }
    Ok(())
}

/// Stage both artifacts beside their destinations, then rename them in.
fn publish(output: &OutputPaths, record_json: &[u8], document: &[u8]) -> Result<()> {
    let record_stage = stage_file(output.record_dir(), &output.record, record_json)?;
    let document_stage = stage_file(output.document_dir(), &output.document, document)?;
    let previous = set_aside(output.record_dir(), &output.record)?;

    if let Err(err) = record_stage.persist(&output.record) {
        if previous.is_some() {
            restore_record(&output.record, previous);
        }
        return Err(WipesealError::Io(err.error));
    }
    if let Err(err) = document_stage.persist(&output.document) {
        restore_record(&output.record, previous);
        return Err(WipesealError::Io(err.error));
    }
    debug!("artifacts published");
    Ok(())
}

/// Move an existing file to a hidden sibling. The returned path is deleted
/// when dropped.
fn set_aside(dir: &Path, path: &Path) -> Result<Option<TempPath>> {
    if !path.exists() {
        return Ok(None);
    }
    let backup = Builder::new()
        .prefix(&format!(".{}.", file_name(path)))
        .suffix(".previous")
        .tempfile_in(dir)?
        .into_temp_path();
    std::fs::rename(path, &backup)?;
    debug!(backup = %backup.display(), "previous record set aside");
    Ok(Some(backup))
}

/// Withdraw the freshly published record, putting `previous` back if any.
fn restore_record(record: &Path, previous: Option<TempPath>) {
    let outcome = match &previous {
        Some(backup) => std::fs::rename(backup, record),
        None => std::fs::remove_file(record),
    };
    if let Err(cleanup) = outcome {
        warn!(%cleanup, record = %record.display(), "could not withdraw the signed record");
    }
}

fn stage_file(dir: &Path, destination: &Path, contents: &[u8]) -> Result<NamedTempFile> {
    let mut staged = Builder::new()
        .prefix(&format!(".{}.", file_name(destination)))
        .suffix(".partial")
        .tempfile_in(dir)?;
    staged.write_all(contents)?;
    staged.as_file().sync_all()?;
    Ok(staged)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use wipeseal_core::ErrorKind;
    use wipeseal_document::verify_document;
    use wipeseal_security::{InMemoryKeyStore, SigningIdentity, fixtures, verify_record};

    const SCENARIO: &str = r#"{"device":{"device_type":"SSD","model":"X1","serial_number":"S123","capacity_bytes":1000000000000},"wipe_process":{"wipe_method":"NIST-Clear","start_time":"2024-01-01T00:00:00","end_time":"2024-01-01T00:30:00","duration_seconds":1800},"verification":{"verification_status":"passed"},"audit":{"digital_signature":null}}"#;

    fn scenario() -> AttestationRecord {
        AttestationRecord::from_json(SCENARIO).unwrap()
    }

    fn dir_entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Records every transition.
    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<(PipelineState, PipelineState)>>>);

    impl StatusReporter for Recorder {
        fn on_transition(&self, from: PipelineState, to: PipelineState) {
            self.0.lock().unwrap().push((from, to));
        }
    }

    /// Raises the cancel flag on entering `at`.
    struct CancelOn {
        at: PipelineState,
        flag: Arc<AtomicBool>,
    }

    impl StatusReporter for CancelOn {
        fn on_transition(&self, _from: PipelineState, to: PipelineState) {
            if to == self.at {
                self.flag.store(true, Ordering::SeqCst);
            }
        }
    }

    /// A document signer whose disk "fills up".
    struct FailingSigner;

    impl DocumentSigner for FailingSigner {
        fn sign_document(&self, _rendered: &[u8], _identity: &SigningIdentity) -> Result<Vec<u8>> {
            Err(WipesealError::Io(std::io::Error::other("no space left on device")))
        }
    }

    struct GarbageRenderer;

    impl DocumentRenderer for GarbageRenderer {
        fn render(&self, _record: &AttestationRecord) -> Result<Vec<u8>> {
            Ok(b"<html>not a pdf</html>".to_vec())
        }
    }

    #[test]
    fn scenario_produces_both_verifiable_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let paths = OutputPaths::for_document(dir.path().join("cert.pdf")).unwrap();
        let recorder = Recorder::default();
        let pipeline = Pipeline::new(fixtures::key_store()).with_reporter(recorder.clone());

        let record = scenario();
        let outcome = pipeline.run(&record, &paths).unwrap();

        assert_eq!(dir_entries(dir.path()), vec!["cert-signed.json", "cert.pdf"]);
        assert!(outcome.warnings.is_empty());
        assert_eq!(record, scenario());

        // The persisted record re-canonicalizes to the signed bytes.
        let persisted =
            AttestationRecord::from_json(&std::fs::read_to_string(&paths.record).unwrap())
                .unwrap();
        assert_eq!(persisted, outcome.signed_record);
        let public_key = fixtures::key_store()
            .load_private_key()
            .unwrap()
            .public_key();
        assert!(verify_record(&persisted, &public_key));
        assert_eq!(canonicalize(&persisted).unwrap(), SCENARIO.as_bytes());

        let pdf = std::fs::read(&paths.document).unwrap();
        assert!(verify_document(&pdf).unwrap().is_valid());
        assert_eq!(outcome.document_sha256, hash_bytes(&pdf));

        let transitions = recorder.0.lock().unwrap().clone();
        let targets: Vec<PipelineState> = transitions.iter().map(|(_, to)| *to).collect();
        assert_eq!(
            targets,
            vec![
                PipelineState::Serializing,
                PipelineState::Signing,
                PipelineState::Rendering,
                PipelineState::EmbeddingSignature,
                PipelineState::Finalized,
            ]
        );
    }

    #[test]
    fn embedder_failure_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let paths = OutputPaths::for_document(dir.path().join("cert.pdf")).unwrap();
        let pipeline = Pipeline::new(fixtures::key_store()).with_signer(FailingSigner);

        let failure = pipeline.run(&scenario(), &paths).unwrap_err();
        assert_eq!(failure.stage, PipelineState::EmbeddingSignature);
        assert_eq!(failure.error.kind(), ErrorKind::IoError);
        assert!(!paths.document.exists());
        assert!(!paths.record.exists());
        assert!(dir_entries(dir.path()).is_empty());
    }

    #[test]
    fn missing_key_fails_before_any_output() {
        let dir = tempfile::tempdir().unwrap();
        let paths = OutputPaths::for_document(dir.path().join("cert.pdf")).unwrap();
        let pipeline = Pipeline::new(InMemoryKeyStore::new("no key here", None));

        let failure = pipeline.run(&scenario(), &paths).unwrap_err();
        assert_eq!(failure.stage, PipelineState::Signing);
        assert_eq!(failure.error.kind(), ErrorKind::KeyUnavailable);
        assert!(dir_entries(dir.path()).is_empty());
    }

    #[test]
    fn record_without_audit_is_a_schema_error() {
        let dir = tempfile::tempdir().unwrap();
        let paths = OutputPaths::for_document(dir.path().join("cert.pdf")).unwrap();
        let mut record = scenario();
        record.audit = None;

        let failure = Pipeline::new(fixtures::key_store())
            .run(&record, &paths)
            .unwrap_err();
        assert_eq!(failure.stage, PipelineState::Serializing);
        assert_eq!(failure.error.kind(), ErrorKind::SchemaError);
    }

    #[test]
    fn malformed_render_is_a_render_error() {
        let dir = tempfile::tempdir().unwrap();
        let paths = OutputPaths::for_document(dir.path().join("cert.pdf")).unwrap();
        let pipeline = Pipeline::new(fixtures::key_store()).with_renderer(GarbageRenderer);

        let failure = pipeline.run(&scenario(), &paths).unwrap_err();
        assert_eq!(failure.stage, PipelineState::Rendering);
        assert_eq!(failure.error.kind(), ErrorKind::RenderError);
        assert!(dir_entries(dir.path()).is_empty());
    }

    #[test]
    fn cancellation_between_stages_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let paths = OutputPaths::for_document(dir.path().join("cert.pdf")).unwrap();
        let pipeline = Pipeline::new(fixtures::key_store());
        let flag = pipeline.cancel_handle();
        let pipeline = pipeline.with_reporter(CancelOn {
            at: PipelineState::Rendering,
            flag,
        });

        let failure = pipeline.run(&scenario(), &paths).unwrap_err();
        assert_eq!(failure.stage, PipelineState::Rendering);
        assert_eq!(failure.error.kind(), ErrorKind::Cancelled);
        assert!(dir_entries(dir.path()).is_empty());
    }

    #[test]
    fn existing_output_is_replaced_only_on_success() {
        let dir = tempfile::tempdir().unwrap();
        let paths = OutputPaths::for_document(dir.path().join("cert.pdf")).unwrap();
        std::fs::write(&paths.document, b"previous certificate").unwrap();

        let failing = Pipeline::new(fixtures::key_store()).with_signer(FailingSigner);
        assert!(failing.run(&scenario(), &paths).is_err());
        assert_eq!(std::fs::read(&paths.document).unwrap(), b"previous certificate");

        Pipeline::new(fixtures::key_store())
            .run(&scenario(), &paths)
            .unwrap();
        assert!(std::fs::read(&paths.document).unwrap().starts_with(b"%PDF-"));
    }

    #[test]
    fn failed_document_publish_keeps_the_previous_record() {
        let dir = tempfile::tempdir().unwrap();
        let paths = OutputPaths::for_document(dir.path().join("cert.pdf")).unwrap();
        std::fs::write(&paths.record, b"{\"previous\":true}").unwrap();
        // A directory in the document's place makes the final rename fail.
        std::fs::create_dir(&paths.document).unwrap();

        let failure = Pipeline::new(fixtures::key_store())
            .run(&scenario(), &paths)
            .unwrap_err();
        assert_eq!(failure.stage, PipelineState::EmbeddingSignature);
        assert_eq!(failure.error.kind(), ErrorKind::IoError);
        assert_eq!(std::fs::read(&paths.record).unwrap(), b"{\"previous\":true}");
        assert_eq!(dir_entries(dir.path()), vec!["cert-signed.json", "cert.pdf"]);
    }

    #[test]
    fn successful_run_replaces_the_previous_record() {
        let dir = tempfile::tempdir().unwrap();
        let paths = OutputPaths::for_document(dir.path().join("cert.pdf")).unwrap();
        std::fs::write(&paths.record, b"{}").unwrap();

        let outcome = Pipeline::new(fixtures::key_store())
            .run(&scenario(), &paths)
            .unwrap();
        let persisted =
            AttestationRecord::from_json(&std::fs::read_to_string(&paths.record).unwrap())
                .unwrap();
        assert_eq!(persisted, outcome.signed_record);
        assert_eq!(dir_entries(dir.path()), vec!["cert-signed.json", "cert.pdf"]);
    }

    #[test]
    fn numeric_serial_is_logged_as_text() {
        let dir = tempfile::tempdir().unwrap();
        let paths = OutputPaths::for_document(dir.path().join("cert.pdf")).unwrap();
        let log_path = dir.path().join("issuance.db");
        let record = AttestationRecord::from_json(&SCENARIO.replace(r#""S123""#, "4711")).unwrap();

        Pipeline::new(fixtures::key_store())
            .with_issuance_log(IssuanceLog::open(&log_path).unwrap())
            .run(&record, &paths)
            .unwrap();
        let entries = IssuanceLog::open(&log_path)
            .unwrap()
            .entries_for_device("4711")
            .unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn runs_are_logged_to_the_issuance_log() {
        let dir = tempfile::tempdir().unwrap();
        let paths = OutputPaths::for_document(dir.path().join("cert.pdf")).unwrap();
        let log_path = dir.path().join("issuance.db");

        let pipeline = Pipeline::new(fixtures::key_store())
            .with_issuance_log(IssuanceLog::open(&log_path).unwrap());
        let outcome = pipeline.run(&scenario(), &paths).unwrap();

        let failing = Pipeline::new(fixtures::key_store())
            .with_signer(FailingSigner)
            .with_issuance_log(IssuanceLog::open(&log_path).unwrap());
        assert!(failing.run(&scenario(), &paths).is_err());

        let entries = IssuanceLog::open(&log_path)
            .unwrap()
            .entries_for_device("S123")
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].success);
        assert_eq!(entries[0].artifact_hash, outcome.document_sha256);
        assert!(!entries[1].success);
        assert!(entries[1].details.as_deref().unwrap().contains("embedding signature"));
    }

    #[test]
    fn config_drives_collaborators() {
        let dir = tempfile::tempdir().unwrap();
        let config = SealConfig {
            signature_field_name: "WipeSeal".into(),
            audit_log_path: Some(dir.path().join("log.db")),
            ..SealConfig::default()
        };
        let pipeline = Pipeline::from_config(fixtures::key_store(), &config).unwrap();
        let paths = OutputPaths::for_document(dir.path().join("cert.pdf")).unwrap();
        pipeline.run(&scenario(), &paths).unwrap();

        let pdf = std::fs::read(&paths.document).unwrap();
        assert!(String::from_utf8_lossy(&pdf).contains("/T (WipeSeal)"));
        assert_eq!(IssuanceLog::open(dir.path().join("log.db")).unwrap().count().unwrap(), 1);
    }
}
