// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for operators issuing erasure certificates.
//
// Every technical error is mapped to plain English with a clear suggestion.

use crate::error::WipesealError;

/// Severity of an error from the operator's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Disk hiccup or similar; running the whole seal again may work.
    Transient,
    /// The operator must fix something (provide a key, fix the record).
    ActionRequired,
    /// Cannot be fixed by retrying.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary.
    pub message: String,
    /// What the operator should try.
    pub suggestion: String,
    /// Whether re-running the whole pipeline from the original record may help.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `WipesealError` into a `HumanError`.
pub fn humanize_error(err: &WipesealError) -> HumanError {
    match err {
        WipesealError::KeyUnavailable(detail) => HumanError {
            message: "No usable signing key or certificate was found.".into(),
            suggestion: format!(
                "Check that the key and certificate PEM files exist, are readable and belong together. ({detail})"
            ),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        WipesealError::Crypto(detail) => HumanError {
            message: "The signing key could not produce a signature.".into(),
            suggestion: format!("Use a 2048-bit or larger RSA key. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        WipesealError::Schema(detail) => HumanError {
            message: "The wipe record is missing required information.".into(),
            suggestion: format!(
                "Make sure the record contains an `audit` section, then load it again. ({detail})"
            ),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        WipesealError::Serialization(_) => HumanError {
            message: "The wipe record isn't valid JSON for this tool.".into(),
            suggestion: "Re-export the record from the wipe tool and try again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        WipesealError::Render(_) => HumanError {
            message: "The certificate document couldn't be produced.".into(),
            suggestion: "Nothing was written. Try again; if this keeps happening, please report it."
                .into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        WipesealError::Database(_) => HumanError {
            message: "The issuance log had a problem.".into(),
            suggestion: "Check that the audit log file is writable.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        WipesealError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => HumanError {
                message: "A file or folder couldn't be found.".into(),
                suggestion: "Check the input path and that the output folder exists.".into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            std::io::ErrorKind::PermissionDenied => HumanError {
                message: "Wipeseal doesn't have permission to use that location.".into(),
                suggestion: "Check the folder permissions, or choose a different output folder."
                    .into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            _ => HumanError {
                message: "There was a problem reading or writing a file.".into(),
                suggestion: "Run the seal again. If this keeps happening, the disk may be full."
                    .into(),
                retriable: true,
                severity: Severity::Transient,
            },
        },

        WipesealError::Cancelled => HumanError {
            message: "Sealing was cancelled.".into(),
            suggestion: "No certificate files were written. Start again when ready.".into(),
            retriable: true,
            severity: Severity::Transient,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_needs_action() {
        let human = humanize_error(&WipesealError::KeyUnavailable("key.pem: not found".into()));
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(!human.retriable);
        assert!(human.suggestion.contains("key.pem"));
    }

    #[test]
    fn disk_full_is_transient() {
        let err = WipesealError::Io(std::io::Error::new(
            std::io::ErrorKind::StorageFull,
            "no space left on device",
        ));
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::Transient);
        assert!(human.retriable);
    }

    #[test]
    fn missing_file_is_distinct_from_disk_full() {
        let err = WipesealError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::ActionRequired);
    }

    #[test]
    fn schema_error_mentions_audit() {
        let human = humanize_error(&WipesealError::Schema("no audit".into()));
        assert!(human.suggestion.contains("audit"));
    }
}
