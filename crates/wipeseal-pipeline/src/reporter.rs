// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Status reporting — fire-and-forget notifications of pipeline progress.

use tracing::{info, warn};

use crate::state::PipelineState;

/// Receives state transitions. Implementations must not fail or block.
pub trait StatusReporter {
    fn on_transition(&self, from: PipelineState, to: PipelineState);

    /// Non-fatal problems such as a temporary file that could not be removed.
    fn on_warning(&self, _message: &str) {}
}

/// Logs every transition through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl StatusReporter for TracingReporter {
    fn on_transition(&self, from: PipelineState, to: PipelineState) {
        info!(%from, %to, status = to.label(), "pipeline transition");
    }

    fn on_warning(&self, message: &str) {
        warn!(message, "pipeline warning");
    }
}
