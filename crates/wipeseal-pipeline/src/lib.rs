// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// wipeseal-pipeline — Orchestrates a complete Wipeseal signing run.
//
// Serialize → sign the record → render the certificate → embed the document
// signature → persist both artifacts, with the guarantee that a failure at
// any stage leaves nothing at the final output paths and no temporary files
// behind.

pub mod orchestrator;
pub mod paths;
pub mod reporter;
pub mod state;

pub use orchestrator::{Pipeline, PipelineFailure, PipelineOutcome};
pub use paths::OutputPaths;
pub use reporter::{StatusReporter, TracingReporter};
pub use state::PipelineState;
