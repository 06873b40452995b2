// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Canonical record serialization — the exact bytes the record signature covers.
//
// Rules:
//   * `audit.digital_signature` is forced to `null`, so the bytes never contain
//     the signature they are about to receive.
//   * Known fields are emitted in schema order (`device`, `wipe_process`,
//     `verification`, `audit`, then each section's declared fields), followed
//     by any additional fields sorted by key, recursively.
//   * Compact `,` / `:` separators, no whitespace.
//
// Field insertion order in the source JSON therefore has no influence.

use serde_json::{Map, Value};
use tracing::{debug, instrument};
use wipeseal_core::error::Result;
use wipeseal_core::{AttestationRecord, ExtraFields};

/// Serialize `record` into its canonical signing bytes.
///
/// Fails with `Schema` if the record has no `audit` section.
#[instrument(skip_all)]
pub fn canonicalize(record: &AttestationRecord) -> Result<Vec<u8>> {
    let mut unsigned = record.with_signature(None)?;

    normalize_extras(&mut unsigned.extra);
    normalize_extras(&mut unsigned.device.extra);
    normalize_extras(&mut unsigned.wipe_process.extra);
    normalize_extras(&mut unsigned.verification.extra);
    if let Some(audit) = unsigned.audit.as_mut() {
        normalize_extras(&mut audit.extra);
    }

    let bytes = serde_json::to_vec(&unsigned)?;
    debug!(canonical_len = bytes.len(), "record canonicalized");
    Ok(bytes)
}

/// Sort object keys inside extra-field values.
///
/// `ExtraFields` itself is a `BTreeMap`; nested objects are `serde_json::Map`,
/// whose iteration order depends on serde_json's feature set, so they are
/// rebuilt with keys inserted in sorted order.
fn normalize_extras(extra: &mut ExtraFields) {
    for value in extra.values_mut() {
        *value = sorted_value(value);
    }
}

fn sorted_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                sorted.insert(key.clone(), sorted_value(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sorted_value).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wipeseal_core::{ErrorKind, WipesealError};

    const SCENARIO: &str = r#"{"device":{"device_type":"SSD","model":"X1","serial_number":"S123","capacity_bytes":1000000000000},"wipe_process":{"wipe_method":"NIST-Clear","start_time":"2024-01-01T00:00:00","end_time":"2024-01-01T00:30:00","duration_seconds":1800},"verification":{"verification_status":"passed"},"audit":{"digital_signature":null}}"#;

    #[test]
    fn scenario_record_is_already_canonical() {
        let record = AttestationRecord::from_json(SCENARIO).unwrap();
        let bytes = canonicalize(&record).unwrap();
        assert_eq!(std::str::from_utf8(&bytes).unwrap(), SCENARIO);
    }

    #[test]
    fn insertion_order_does_not_matter() {
        let shuffled = r#"{
            "audit": {"digital_signature": null},
            "verification": {"verification_status": "passed"},
            "wipe_process": {"duration_seconds": 1800, "end_time": "2024-01-01T00:30:00",
                             "start_time": "2024-01-01T00:00:00", "wipe_method": "NIST-Clear"},
            "device": {"capacity_bytes": 1000000000000, "serial_number": "S123",
                       "model": "X1", "device_type": "SSD"}
        }"#;
        let a = AttestationRecord::from_json(SCENARIO).unwrap();
        let b = AttestationRecord::from_json(shuffled).unwrap();
        assert_eq!(canonicalize(&a).unwrap(), canonicalize(&b).unwrap());
    }

    #[test]
    fn prior_signature_is_excluded() {
        let record = AttestationRecord::from_json(SCENARIO).unwrap();
        let signed = record
            .with_signature(Some("eyJhbGciOiJSUzI1NiJ9.e30.c2ln".into()))
            .unwrap();
        assert_eq!(canonicalize(&record).unwrap(), canonicalize(&signed).unwrap());
    }

    #[test]
    fn any_value_change_changes_bytes() {
        let record = AttestationRecord::from_json(SCENARIO).unwrap();
        let mut altered = record.clone();
        altered.device.serial_number = Some(json!("S124"));
        assert_ne!(canonicalize(&record).unwrap(), canonicalize(&altered).unwrap());

        let mut altered = record.clone();
        altered.verification.verification_status = Some(json!("failed"));
        assert_ne!(canonicalize(&record).unwrap(), canonicalize(&altered).unwrap());
    }

    #[test]
    fn known_fields_keep_their_json_type() {
        let record = AttestationRecord::from_json(
            r#"{"device":{"capacity_bytes":"1000000000000","serial_number":4711},"audit":{}}"#,
        )
        .unwrap();
        let text = String::from_utf8(canonicalize(&record).unwrap()).unwrap();
        assert!(text.starts_with(
            r#"{"device":{"device_type":null,"model":null,"serial_number":4711,"capacity_bytes":"1000000000000"}"#
        ));
    }

    #[test]
    fn canonicalization_is_idempotent() {
        let record = AttestationRecord::from_json(SCENARIO).unwrap();
        let once = canonicalize(&record).unwrap();
        let reparsed = AttestationRecord::from_json(std::str::from_utf8(&once).unwrap()).unwrap();
        assert_eq!(canonicalize(&reparsed).unwrap(), once);
    }

    #[test]
    fn extra_fields_are_sorted_recursively() {
        let a = AttestationRecord::from_value(json!({
            "audit": {"digital_signature": null, "operator": {"z": 1, "a": 2}},
            "tool": {"version": "2.0", "name": "eraser"},
        }))
        .unwrap();
        let b = AttestationRecord::from_value(json!({
            "tool": {"name": "eraser", "version": "2.0"},
            "audit": {"operator": {"a": 2, "z": 1}, "digital_signature": "old"},
        }))
        .unwrap();

        let bytes = canonicalize(&a).unwrap();
        assert_eq!(bytes, canonicalize(&b).unwrap());
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains(r#""tool":{"name":"eraser","version":"2.0"}"#));
        assert!(text.contains(r#""audit":{"digital_signature":null,"operator":{"a":2,"z":1}}"#));
    }

    #[test]
    fn missing_optional_fields_serialize_as_null() {
        let record = AttestationRecord::from_json(r#"{"audit":{}}"#).unwrap();
        let text = String::from_utf8(canonicalize(&record).unwrap()).unwrap();
        assert!(text.starts_with(r#"{"device":{"device_type":null"#));
        assert!(text.ends_with(r#""audit":{"digital_signature":null}}"#));
    }

    #[test]
    fn missing_audit_is_a_schema_error() {
        let record = AttestationRecord::from_json(r#"{"device":{"model":"X1"}}"#).unwrap();
        let err = canonicalize(&record).unwrap_err();
        assert!(matches!(err, WipesealError::Schema(_)));
        assert_eq!(err.kind(), ErrorKind::SchemaError);
    }
}
