// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// wipeseal-document — The visual half of a Wipeseal attestation.
//
// Renders the signed record as a PDF certificate, then signs the rendered
// bytes with a PDF incremental update carrying a detached CMS signature, and
// verifies such signatures from the signed file alone.

pub mod pdf;
pub mod signature;

// Re-export the primary API so callers can use `wipeseal_document::sign_document` etc.
pub use pdf::reader::PdfReader;
pub use pdf::writer::{CertificateRenderer, DocumentRenderer};
pub use signature::{
    DocumentSigner, DocumentVerification, IncrementalPdfSigner, SignatureOptions, sign_document,
    verify_document,
};
