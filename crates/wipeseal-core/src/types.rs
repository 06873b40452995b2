// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Wipeseal attestation pipeline.
//
// The attestation record is a nested JSON mapping with four sections. Each
// section has a fixed set of known fields (declared in schema order) and keeps
// any additional fields in a sorted map so nothing supplied by the wipe tool is
// lost when the record is signed and re-emitted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, WipesealError};

/// Extra fields not covered by the schema, kept in sorted order.
pub type ExtraFields = BTreeMap<String, Value>;

/// A device erasure attestation as produced by the wipe tool.
///
/// The `audit.digital_signature` slot is the only field the signing pipeline
/// ever writes, and it always does so on a copy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttestationRecord {
    #[serde(default)]
    pub device: DeviceInfo,
    #[serde(default)]
    pub wipe_process: WipeProcess,
    #[serde(default)]
    pub verification: Verification,
    /// `None` when the section is absent (or `null`): such a record has no
    /// signature slot and cannot be signed.
    #[serde(default)]
    pub audit: Option<AuditSection>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// Identity of the erased storage device.
///
/// Known fields hold whatever JSON value the wipe tool wrote (a serial may be
/// a number, a capacity a string) and are re-emitted unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceInfo {
    pub device_type: Option<Value>,
    pub model: Option<Value>,
    pub serial_number: Option<Value>,
    /// Raw capacity in bytes.
    pub capacity_bytes: Option<Value>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// How and when the erasure ran.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WipeProcess {
    pub wipe_method: Option<Value>,
    pub start_time: Option<Value>,
    pub end_time: Option<Value>,
    pub duration_seconds: Option<Value>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// Post-erasure verification outcome.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Verification {
    pub verification_status: Option<Value>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// The audit section holding the record's signature slot.
///
/// A prior value of any JSON type is accepted; signing replaces it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditSection {
    pub digital_signature: Option<Value>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl AttestationRecord {
    /// Build a record from its three content sections with an empty
    /// signature slot.
    pub fn new(device: DeviceInfo, wipe_process: WipeProcess, verification: Verification) -> Self {
        Self {
            device,
            wipe_process,
            verification,
            audit: Some(AuditSection::default()),
            extra: ExtraFields::new(),
        }
    }

    /// Parse a record from its JSON text form.
    pub fn from_json(json: &str) -> Result<Self> {
        let record = serde_json::from_str(json)?;
        Ok(record)
    }

    /// Parse a record from a JSON value already in memory.
    pub fn from_value(value: Value) -> Result<Self> {
        let record = serde_json::from_value(value)?;
        Ok(record)
    }

    /// Pretty JSON (2-space indent) used for the signed record artifact.
    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The embedded signature, if the slot holds a string.
    pub fn signature(&self) -> Option<&str> {
        self.audit
            .as_ref()
            .and_then(|audit| audit.digital_signature.as_ref())
            .and_then(Value::as_str)
    }

    /// Return a copy with `audit.digital_signature` replaced by `signature`.
    ///
    /// Fails with `Schema` when the record has no audit section to hold it.
    pub fn with_signature(&self, signature: Option<String>) -> Result<Self> {
        let mut copy = self.clone();
        let audit = copy.audit.as_mut().ok_or_else(|| {
            WipesealError::Schema("record has no `audit` section for the signature".into())
        })?;
        audit.digital_signature = signature.map(Value::String);
        Ok(copy)
    }
}

/// Plain text of a field value: strings without quotes, anything else as
/// compact JSON. `None` for missing and `null` values.
pub fn value_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

/// Numeric reading of a field value, accepting numbers and numeric strings.
pub fn value_f64(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Paper sizes the certificate renderer can lay out on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaperSize {
    #[default]
    A4,
    A5,
    Letter,
    Legal,
    Custom { width_mm: u32, height_mm: u32 },
}

impl PaperSize {
    /// Dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (u32, u32) {
        match self {
            Self::A4 => (210, 297),
            Self::A5 => (148, 210),
            Self::Letter => (216, 279),
            Self::Legal => (216, 356),
            Self::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }
}
