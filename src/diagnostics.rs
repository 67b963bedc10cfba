//! Non-fatal events raised while laying out a graph.
//!
//! The pipeline never fails on odd input. Cycles, traversal faults and line
//! collisions are reported through a [`DiagnosticSink`] instead, so hosts can
//! log them and tests can assert on them.

use std::fmt;

use thiserror::Error;

use crate::ir::NodeId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    #[error("circular dependency detected: traversal from {start} returned to {node}")]
    CycleDetected { node: NodeId, start: NodeId },

    #[error("circular dependency detected: branch count {count} at {node} exceeds {limit} nodes")]
    DepthGuardExceeded {
        node: NodeId,
        count: usize,
        limit: usize,
    },

    #[error("path tracing failed at {node}: {reason}")]
    TraversalFault { node: NodeId, reason: String },

    #[error("line collision detected between {from} and {to} ({kind})")]
    LineCollision {
        from: NodeId,
        to: NodeId,
        kind: Collision,
    },
}

impl Diagnostic {
    pub fn is_cycle(&self) -> bool {
        matches!(
            self,
            Self::CycleDetected { .. } | Self::DepthGuardExceeded { .. }
        )
    }
}

/// Which straight line would cross an intermediate grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collision {
    Horizontal,
    Vertical,
    Diagonal,
}

impl fmt::Display for Collision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
            Self::Diagonal => "diagonal",
        };
        f.write_str(name)
    }
}

pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Forwards diagnostics to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::LineCollision { from, to, kind } => {
                tracing::debug!(%from, %to, %kind, "{diagnostic}");
            }
            Diagnostic::CycleDetected { node, .. }
            | Diagnostic::DepthGuardExceeded { node, .. }
            | Diagnostic::TraversalFault { node, .. } => {
                tracing::warn!(%node, "{diagnostic}");
            }
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn report(&mut self, _diagnostic: Diagnostic) {}
}
