// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Artifact path planning.
//
// For a final document `X.pdf` the signed record lands at `X-signed.json`
// and the unsigned intermediate at `X-unsigned-temp-<run id>.pdf`, all in
// the document's directory.

use std::path::{Path, PathBuf};

use uuid::Uuid;
use wipeseal_core::error::{Result, WipesealError};

/// Where a run writes its artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    /// Final signed document.
    pub document: PathBuf,
    /// Signed record JSON.
    pub record: PathBuf,
}

impl OutputPaths {
    /// Derive the record path from the chosen document path.
    pub fn for_document(document: impl Into<PathBuf>) -> Result<Self> {
        let document = document.into();
        let stem = file_stem(&document)?;
        let record = document.with_file_name(format!("{stem}-signed.json"));
        Ok(Self { document, record })
    }

    /// Use explicit paths for both artifacts.
    pub fn new(document: impl Into<PathBuf>, record: impl Into<PathBuf>) -> Self {
        Self {
            document: document.into(),
            record: record.into(),
        }
    }

    /// Directory that holds the document (and its temporary siblings).
    pub fn document_dir(&self) -> &Path {
        parent_dir(&self.document)
    }

    pub fn record_dir(&self) -> &Path {
        parent_dir(&self.record)
    }

    /// File name of the unsigned intermediate for one run.
    pub fn unsigned_temp_name(&self, run_id: Uuid) -> Result<String> {
        Ok(format!("{}-unsigned-temp-{run_id}.pdf", file_stem(&self.document)?))
    }
}

fn file_stem(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            WipesealError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("output path {} has no usable file name", path.display()),
            ))
        })
}

/// Parent directory, `.` for bare file names.
fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
