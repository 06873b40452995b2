// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for canonicalization, record signing and verification
// in the wipeseal-security crate.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use serde_json::json;
use wipeseal_core::AttestationRecord;
use wipeseal_security::{
    InMemoryKeyStore, KeyMaterialProvider, canonicalize, sign_record, verify_record,
};

const KEY_PEM: &str = include_str!("../tests/fixtures/key.pem");

fn sample_record() -> AttestationRecord {
    AttestationRecord::from_value(json!({
        "device": {
            "device_type": "SSD",
            "model": "X1",
            "serial_number": "S123",
            "capacity_bytes": 1000000000000u64
        },
        "wipe_process": {
            "wipe_method": "NIST-Clear",
            "start_time": "2024-01-01T00:00:00",
            "end_time": "2024-01-01T00:30:00",
            "duration_seconds": 1800
        },
        "verification": {"verification_status": "passed"},
        "audit": {"digital_signature": null}
    }))
    .expect("sample record")
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Canonical serialization of a typical record.
fn bench_canonicalize(c: &mut Criterion) {
    let record = sample_record();
    c.bench_function("canonicalize", |b| {
        b.iter(|| black_box(canonicalize(black_box(&record)).expect("canonicalize")));
    });
}

/// Full RS256 record signing, including PEM key parsing on each iteration
/// (the pipeline loads key material once per run).
fn bench_sign_record(c: &mut Criterion) {
    let record = sample_record();
    let keys = InMemoryKeyStore::new(KEY_PEM, None);
    c.bench_function("sign_record (RSA-2048)", |b| {
        b.iter(|| black_box(sign_record(black_box(&record), &keys).expect("sign")));
    });
}

/// Verification of a signed record.
fn bench_verify_record(c: &mut Criterion) {
    let keys = InMemoryKeyStore::new(KEY_PEM, None);
    let signed = sign_record(&sample_record(), &keys).expect("sign");
    let public_key = keys.load_private_key().expect("key").public_key();
    c.bench_function("verify_record (RSA-2048)", |b| {
        b.iter(|| assert!(verify_record(black_box(&signed), &public_key)));
    });
}

criterion_group!(
    benches,
    bench_canonicalize,
    bench_sign_record,
    bench_verify_record,
);
criterion_main!(benches);
