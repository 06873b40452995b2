// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document signatures — CMS containers, incremental signing, verification.

pub mod asn1;
pub mod cms;
pub mod incremental;
pub mod verify;

pub use incremental::{DocumentSigner, IncrementalPdfSigner, SignatureOptions, sign_document};
pub use verify::{DocumentVerification, verify_document};
