// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for certificate rendering and the incremental PDF
// signature in the wipeseal-document crate.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use wipeseal_core::AttestationRecord;
use wipeseal_document::{
    CertificateRenderer, DocumentRenderer, DocumentSigner, IncrementalPdfSigner,
    SignatureOptions, verify_document,
};
use wipeseal_security::{KeyMaterialProvider, fixtures};

const RECORD: &str = r#"{"device":{"device_type":"SSD","model":"X1","serial_number":"S123","capacity_bytes":1000000000000},"wipe_process":{"wipe_method":"NIST-Clear","start_time":"2024-01-01T00:00:00","end_time":"2024-01-01T00:30:00","duration_seconds":1800},"verification":{"verification_status":"passed"},"audit":{"digital_signature":null}}"#;

fn rendered() -> Vec<u8> {
    let record = AttestationRecord::from_json(RECORD).expect("record");
    CertificateRenderer::default().render(&record).expect("render")
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_render(c: &mut Criterion) {
    let record = AttestationRecord::from_json(RECORD).expect("record");
    let renderer = CertificateRenderer::default();
    c.bench_function("render certificate", |b| {
        b.iter(|| black_box(renderer.render(black_box(&record)).expect("render")));
    });
}

/// Incremental update plus CMS signing (one RSA-2048 operation).
fn bench_sign_document(c: &mut Criterion) {
    let pdf = rendered();
    let identity = fixtures::key_store()
        .load_signing_identity()
        .expect("identity");
    let signer = IncrementalPdfSigner::new(SignatureOptions::default());
    c.bench_function("sign_document (RSA-2048)", |b| {
        b.iter(|| black_box(signer.sign_document(black_box(&pdf), &identity).expect("sign")));
    });
}

fn bench_verify_document(c: &mut Criterion) {
    let identity = fixtures::key_store()
        .load_signing_identity()
        .expect("identity");
    let signed = IncrementalPdfSigner::default()
        .sign_document(&rendered(), &identity)
        .expect("sign");
    c.bench_function("verify_document", |b| {
        b.iter(|| assert!(verify_document(black_box(&signed)).expect("verify").is_valid()));
    });
}

criterion_group!(
    benches,
    bench_render,
    bench_sign_document,
    bench_verify_document,
);
criterion_main!(benches);
