// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — certificate rendering, inspection, and object syntax.

pub mod reader;
pub mod syntax;
pub mod writer;

pub use reader::PdfReader;
pub use writer::{CertificateRenderer, DocumentRenderer};
