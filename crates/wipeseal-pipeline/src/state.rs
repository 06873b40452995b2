// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline state machine.
//
//   Idle → Serializing → Signing → Rendering → EmbeddingSignature → Finalized
//
// `Failed` is reachable from every non-terminal state.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a signing run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PipelineState {
    Idle,
    /// Canonical bytes of the input record are being produced.
    Serializing,
    /// Key material is loaded and the record signature embedded.
    Signing,
    /// The signed record is being rendered to a temporary document.
    Rendering,
    /// The document signature is appended and the artifacts persisted.
    EmbeddingSignature,
    Finalized,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finalized | Self::Failed)
    }

    /// Successor on the success path.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Idle => Some(Self::Serializing),
            Self::Serializing => Some(Self::Signing),
            Self::Signing => Some(Self::Rendering),
            Self::Rendering => Some(Self::EmbeddingSignature),
            Self::EmbeddingSignature => Some(Self::Finalized),
            Self::Finalized | Self::Failed => None,
        }
    }

    pub fn can_transition_to(self, target: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        target == Self::Failed || self.next() == Some(target)
    }

    /// Status line shown to the user.
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Ready",
            Self::Serializing => "Serializing record...",
            Self::Signing => "Signing record...",
            Self::Rendering => "Creating PDF...",
            Self::EmbeddingSignature => "Signing PDF...",
            Self::Finalized => "Files created",
            Self::Failed => "Error",
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Serializing => "serializing",
            Self::Signing => "signing",
            Self::Rendering => "rendering",
            Self::EmbeddingSignature => "embedding signature",
            Self::Finalized => "finalized",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}
