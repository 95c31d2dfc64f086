//! Advisory notifications about relationship misses.
//!
//! Diagnostics are observational only; they never change what a resolver
//! returns.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::relationship::RelationshipKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// The node carries no relationship of the queried kind.
    AbsentRelationship,
    /// A referenced node is missing from the candidates.
    TargetNotFound,
    /// The referenced source document is missing from the candidates.
    DocumentNotFound,
}

/// A structured notification about one failed lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// The node whose relationship was queried.
    pub node_id: String,
    /// The queried relationship.
    pub relationship_kind: RelationshipKind,
    /// The unresolved target id, for `TargetNotFound` and `DocumentNotFound`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.kind, &self.target_id) {
            (DiagnosticKind::AbsentRelationship, _) => {
                write!(f, "node '{}' has no {} relationship", self.node_id, self.relationship_kind)
            }
            (DiagnosticKind::TargetNotFound, Some(target)) => write!(
                f,
                "{} target '{target}' of node '{}' not found in candidates",
                self.relationship_kind, self.node_id
            ),
            (DiagnosticKind::DocumentNotFound, Some(target)) => {
                write!(f, "source document '{target}' of node '{}' not found", self.node_id)
            }
            (kind, None) => write!(
                f,
                "{kind:?} for {} relationship of node '{}'",
                self.relationship_kind, self.node_id
            ),
        }
    }
}

/// Receives diagnostics from a [`Resolver`](crate::resolver::Resolver).
pub trait DiagnosticSink: Send + Sync {
    /// Called once per miss. Must not panic.
    fn notify(&self, diagnostic: &Diagnostic);
}

/// Forwards diagnostics to `tracing` at `WARN` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn notify(&self, diagnostic: &Diagnostic) {
        warn!(
            kind = ?diagnostic.kind,
            node.id = %diagnostic.node_id,
            relationship = %diagnostic.relationship_kind,
            target.id = diagnostic.target_id.as_deref().unwrap_or(""),
            "{diagnostic}"
        );
    }
}

/// Keeps every diagnostic in memory for later inspection.
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    diagnostics: Arc<Mutex<Vec<Diagnostic>>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of everything collected so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.lock().clone()
    }

    /// Remove and return everything collected so far.
    pub fn drain(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.diagnostics.lock())
    }

    pub fn len(&self) -> usize {
        self.diagnostics.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.lock().is_empty()
    }
}

impl DiagnosticSink for CollectingSink {
    fn notify(&self, diagnostic: &Diagnostic) {
        self.diagnostics.lock().push(diagnostic.clone());
    }
}
