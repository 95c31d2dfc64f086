//! Single-hop relationship resolution.
//!
//! A [`Resolver`] turns one relationship of a [`Node`] into the concrete
//! entities it references, searching a caller-supplied candidate collection.
//! Misses are ordinary outcomes: the resolver returns a [`Resolution`]
//! variant describing them and, when enabled, notifies a
//! [`DiagnosticSink`].

use std::fmt;
use std::sync::Arc;

use crate::config::ChunkGraphConfig;
use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink, TracingSink};
use crate::document::Node;
use crate::lookup::Lookup;
use crate::relationship::{RelatedNodes, RelationshipKind};

/// Outcome of resolving one relationship kind on a node.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<'a, T> {
    /// A single-valued reference matched a candidate.
    Found(&'a T),
    /// A multi-valued (`CHILD`) reference list, resolved best-effort.
    Children {
        /// Matches, in reference order.
        resolved: Vec<&'a T>,
        /// Referenced ids with no matching candidate, in reference order.
        unresolved: Vec<String>,
    },
    /// The node has no relationship of this kind.
    RelationshipAbsent { kind: RelationshipKind },
    /// A single-valued reference matched no candidate.
    TargetNotFound { kind: RelationshipKind, target_id: String },
}

impl<'a, T> Resolution<'a, T> {
    /// The single match, if this is [`Resolution::Found`].
    pub fn found(&self) -> Option<&'a T> {
        match self {
            Resolution::Found(target) => Some(*target),
            _ => None,
        }
    }

    /// Every resolved entity: one for `Found`, the matches for `Children`,
    /// none otherwise.
    pub fn into_resolved(self) -> Vec<&'a T> {
        match self {
            Resolution::Found(target) => vec![target],
            Resolution::Children { resolved, .. } => resolved,
            _ => Vec::new(),
        }
    }
}

/// Resolves node relationships against candidate collections.
///
/// The default resolver is silent. With `on_missing` enabled, every absent
/// relationship and unresolved reference is also reported as a
/// [`Diagnostic`], to the attached sink or else to [`TracingSink`].
#[derive(Clone, Default)]
pub struct Resolver {
    sink: Option<Arc<dyn DiagnosticSink>>,
    on_missing: bool,
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("sink", &self.sink.is_some())
            .field("on_missing", &self.on_missing)
            .finish()
    }
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// A resolver reporting misses to `tracing` when `config.on_missing` is set.
    pub fn from_config(config: &ChunkGraphConfig) -> Self {
        Self::new().on_missing(config.on_missing)
    }

    /// A resolver reporting misses to `sink`.
    pub fn with_sink(sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { sink: Some(sink), on_missing: true }
    }

    /// Toggle miss reporting without detaching the sink.
    pub fn on_missing(mut self, enabled: bool) -> Self {
        self.on_missing = enabled;
        self
    }

    /// Resolve `node.relationships[kind]` against `candidates`.
    ///
    /// Pass documents as candidates for [`RelationshipKind::Source`] and
    /// nodes for every other kind. Single-valued kinds return the first
    /// candidate whose id matches; `CHILD` returns every match and lists the
    /// ids that matched nothing.
    pub fn resolve<'c, T, C>(
        &self,
        node: &Node,
        kind: RelationshipKind,
        candidates: &'c C,
    ) -> Resolution<'c, T>
    where
        C: Lookup<T> + ?Sized,
    {
        let Some(related) = node.relationships().get(kind) else {
            self.report(node, kind, DiagnosticKind::AbsentRelationship, None);
            return Resolution::RelationshipAbsent { kind };
        };

        match related {
            RelatedNodes::One(reference) => match candidates.find(&reference.target_id) {
                Some(target) => Resolution::Found(target),
                None => {
                    self.report(node, kind, miss_kind(kind), Some(&reference.target_id));
                    Resolution::TargetNotFound { kind, target_id: reference.target_id.clone() }
                }
            },
            RelatedNodes::Many(references) => {
                let mut resolved = Vec::with_capacity(references.len());
                let mut unresolved = Vec::new();
                for reference in references {
                    match candidates.find(&reference.target_id) {
                        Some(target) => resolved.push(target),
                        None => {
                            self.report(node, kind, miss_kind(kind), Some(&reference.target_id));
                            unresolved.push(reference.target_id.clone());
                        }
                    }
                }
                Resolution::Children { resolved, unresolved }
            }
        }
    }

    fn report(
        &self,
        node: &Node,
        relationship_kind: RelationshipKind,
        kind: DiagnosticKind,
        target_id: Option<&str>,
    ) {
        if !self.on_missing {
            return;
        }
        let diagnostic = Diagnostic {
            kind,
            node_id: node.id().to_string(),
            relationship_kind,
            target_id: target_id.map(str::to_string),
        };
        match &self.sink {
            Some(sink) => sink.notify(&diagnostic),
            None => TracingSink.notify(&diagnostic),
        }
    }
}

fn miss_kind(kind: RelationshipKind) -> DiagnosticKind {
    match kind {
        RelationshipKind::Source => DiagnosticKind::DocumentNotFound,
        _ => DiagnosticKind::TargetNotFound,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingSink;
    use crate::document::{Document, Metadata};
    use crate::relationship::Relationships;

    fn node(id: &str, build: impl FnOnce(&mut Relationships)) -> Node {
        let mut rels = Relationships::new();
        build(&mut rels);
        Node::new(id, id, Metadata::new(), rels).unwrap()
    }

    #[test]
    fn absent_relationship_is_a_variant() {
        let leaf = node("leaf", |_| {});
        let nodes: Vec<Node> = Vec::new();
        let resolution: Resolution<'_, Node> =
            Resolver::new().resolve(&leaf, RelationshipKind::Child, &nodes);
        assert_eq!(resolution, Resolution::RelationshipAbsent { kind: RelationshipKind::Child });
    }

    #[test]
    fn missing_target_is_a_variant() {
        let orphan = node("orphan", |r| {
            r.set(RelationshipKind::Parent, "gone");
        });
        let nodes = vec![node("other", |_| {})];
        let resolution: Resolution<'_, Node> =
            Resolver::new().resolve(&orphan, RelationshipKind::Parent, &nodes);
        assert_eq!(
            resolution,
            Resolution::TargetNotFound {
                kind: RelationshipKind::Parent,
                target_id: "gone".to_string()
            }
        );
    }

    #[test]
    fn duplicate_candidates_resolve_to_first() {
        let child = node("c", |r| {
            r.set(RelationshipKind::Parent, "p");
        });
        let first = node("p", |_| {});
        let second = Node::new("p", "second copy", Metadata::new(), Relationships::new()).unwrap();
        let nodes = vec![first, second];
        let parent: Option<&Node> =
            Resolver::new().resolve(&child, RelationshipKind::Parent, &nodes).found();
        assert_eq!(parent.map(Node::text), Some("p"));
    }

    #[test]
    fn partial_child_miss_keeps_matches_and_reports_the_rest() {
        let root = node("root", |r| {
            r.push_child("a").push_child("missing").push_child("b");
        });
        let nodes = vec![node("b", |_| {}), node("a", |_| {})];
        let sink = CollectingSink::new();
        let resolver = Resolver::with_sink(Arc::new(sink.clone()));

        let resolution: Resolution<'_, Node> =
            resolver.resolve(&root, RelationshipKind::Child, &nodes);
        let Resolution::Children { resolved, unresolved } = resolution else {
            panic!("expected children, got {resolution:?}");
        };
        let ids: Vec<&str> = resolved.iter().map(|n| n.id()).collect();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(unresolved, ["missing"]);

        let diagnostics = sink.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::TargetNotFound);
        assert_eq!(diagnostics[0].target_id.as_deref(), Some("missing"));
    }

    #[test]
    fn source_miss_reports_document_not_found() {
        let chunk = node("n", |r| {
            r.set(RelationshipKind::Source, "doc2");
        });
        let docs = vec![Document::new("doc1", "text", Metadata::new())];
        let sink = CollectingSink::new();
        let resolver = Resolver::with_sink(Arc::new(sink.clone()));

        let resolution: Resolution<'_, Document> =
            resolver.resolve(&chunk, RelationshipKind::Source, &docs);
        assert!(matches!(resolution, Resolution::TargetNotFound { .. }));
        assert_eq!(sink.diagnostics()[0].kind, DiagnosticKind::DocumentNotFound);
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<parking_lot::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn captured(f: impl FnOnce()) -> String {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = logs.0.lock().clone();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    #[test]
    fn on_missing_without_sink_logs_through_tracing() {
        let leaf = node("leaf", |_| {});
        let nodes: Vec<Node> = Vec::new();

        let config = ChunkGraphConfig::default();
        assert!(config.on_missing);
        let logs = captured(|| {
            let resolution: Resolution<'_, Node> =
                Resolver::from_config(&config).resolve(&leaf, RelationshipKind::Parent, &nodes);
            assert_eq!(
                resolution,
                Resolution::RelationshipAbsent { kind: RelationshipKind::Parent }
            );
        });
        assert!(logs.contains("WARN"), "{logs}");
        assert!(logs.contains("node 'leaf' has no PARENT relationship"), "{logs}");

        let silent = ChunkGraphConfig { on_missing: false, ..ChunkGraphConfig::default() };
        let logs = captured(|| {
            let _: Resolution<'_, Node> =
                Resolver::from_config(&silent).resolve(&leaf, RelationshipKind::Parent, &nodes);
        });
        assert!(logs.is_empty(), "{logs}");
    }

    #[test]
    fn disabled_reporting_keeps_sink_quiet_but_results_identical() {
        let leaf = node("leaf", |_| {});
        let nodes: Vec<Node> = Vec::new();
        let sink = CollectingSink::new();
        let quiet = Resolver::with_sink(Arc::new(sink.clone())).on_missing(false);
        let loud = Resolver::with_sink(Arc::new(sink.clone()));

        let a: Resolution<'_, Node> = quiet.resolve(&leaf, RelationshipKind::Next, &nodes);
        assert!(sink.is_empty());
        let b = loud.resolve(&leaf, RelationshipKind::Next, &nodes);
        assert_eq!(a, b);
        assert_eq!(sink.len(), 1);
    }
}
