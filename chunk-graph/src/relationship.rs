//! Typed links between nodes and documents.
//!
//! Relationships hold only target ids. Resolving a reference to the entity it
//! names always goes through a caller-supplied candidate collection, see
//! [`Resolver`](crate::resolver::Resolver).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};

/// The closed set of relationship kinds a node may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipKind {
    /// The originating document.
    Source,
    /// The enclosing node one level up in a hierarchy.
    Parent,
    /// Nodes one level down in a hierarchy.
    Child,
    /// The following node in document order.
    Next,
    /// The preceding node in document order.
    Previous,
}

impl RelationshipKind {
    /// All kinds, in declaration order.
    pub const ALL: [RelationshipKind; 5] = [
        RelationshipKind::Source,
        RelationshipKind::Parent,
        RelationshipKind::Child,
        RelationshipKind::Next,
        RelationshipKind::Previous,
    ];

    /// Whether the kind holds zero-or-more references rather than exactly one.
    pub fn is_multi_valued(self) -> bool {
        matches!(self, RelationshipKind::Child)
    }

    /// Wire name, as used in serialized relationship maps.
    pub fn as_str(self) -> &'static str {
        match self {
            RelationshipKind::Source => "SOURCE",
            RelationshipKind::Parent => "PARENT",
            RelationshipKind::Child => "CHILD",
            RelationshipKind::Next => "NEXT",
            RelationshipKind::Previous => "PREVIOUS",
        }
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A weak, lookup-only reference to a document or node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationshipRef {
    /// Id of the referenced document or node.
    pub target_id: String,
}

impl RelationshipRef {
    pub fn new(target_id: impl Into<String>) -> Self {
        Self { target_id: target_id.into() }
    }
}

/// The references stored under one relationship kind.
///
/// Single-valued kinds use [`RelatedNodes::One`]; `CHILD` uses
/// [`RelatedNodes::Many`] with at least one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelatedNodes {
    /// A single reference, for every kind except `CHILD`.
    One(RelationshipRef),
    /// A non-empty reference list, for `CHILD`.
    Many(Vec<RelationshipRef>),
}

/// Relationship map of a node, keyed by kind.
///
/// Entries are checked by [`Relationships::validate`]; deserialization runs
/// the same check, so a malformed map never reaches a [`Node`](crate::Node).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<RelationshipKind, RelatedNodes>",
    into = "BTreeMap<RelationshipKind, RelatedNodes>"
)]
pub struct Relationships {
    entries: BTreeMap<RelationshipKind, RelatedNodes>,
}

impl Relationships {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `related` under `kind`, replacing any previous entry.
    ///
    /// No validation happens here; call [`Relationships::validate`] or build
    /// a [`Node`](crate::Node), which validates on construction.
    pub fn insert(&mut self, kind: RelationshipKind, related: RelatedNodes) -> &mut Self {
        self.entries.insert(kind, related);
        self
    }

    /// Set a single-valued reference.
    pub fn set(&mut self, kind: RelationshipKind, target_id: impl Into<String>) -> &mut Self {
        self.insert(kind, RelatedNodes::One(RelationshipRef::new(target_id)))
    }

    /// Append a `CHILD` reference, creating the list on first use.
    pub fn push_child(&mut self, target_id: impl Into<String>) -> &mut Self {
        let child = RelationshipRef::new(target_id);
        match self.entries.get_mut(&RelationshipKind::Child) {
            Some(RelatedNodes::Many(children)) => children.push(child),
            _ => {
                self.entries.insert(RelationshipKind::Child, RelatedNodes::Many(vec![child]));
            }
        }
        self
    }

    /// The entry stored under `kind`, if any.
    pub fn get(&self, kind: RelationshipKind) -> Option<&RelatedNodes> {
        self.entries.get(&kind)
    }

    /// The reference stored under a single-valued kind, if any.
    pub fn single(&self, kind: RelationshipKind) -> Option<&RelationshipRef> {
        match self.entries.get(&kind) {
            Some(RelatedNodes::One(r)) => Some(r),
            _ => None,
        }
    }

    /// `CHILD` references, empty when the node has none.
    pub fn children(&self) -> &[RelationshipRef] {
        match self.entries.get(&RelationshipKind::Child) {
            Some(RelatedNodes::Many(children)) => children,
            _ => &[],
        }
    }

    pub fn contains(&self, kind: RelationshipKind) -> bool {
        self.entries.contains_key(&kind)
    }

    /// Entries in kind order.
    pub fn iter(&self) -> impl Iterator<Item = (RelationshipKind, &RelatedNodes)> {
        self.entries.iter().map(|(kind, related)| (*kind, related))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check that every entry has the shape its kind requires.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidRelationship`] if:
    /// - `CHILD` is present with zero entries or as a single reference
    /// - any other kind is stored as a list
    pub fn validate(&self) -> Result<()> {
        for (kind, related) in &self.entries {
            match (kind.is_multi_valued(), related) {
                (true, RelatedNodes::Many(refs)) if refs.is_empty() => {
                    return Err(GraphError::InvalidRelationship {
                        kind: *kind,
                        message: "child list must not be empty when present".to_string(),
                    });
                }
                (true, RelatedNodes::One(_)) => {
                    return Err(GraphError::InvalidRelationship {
                        kind: *kind,
                        message: "expected a list of references".to_string(),
                    });
                }
                (false, RelatedNodes::Many(_)) => {
                    return Err(GraphError::InvalidRelationship {
                        kind: *kind,
                        message: "expected exactly one reference".to_string(),
                    });
                }
                _ => {}
            }
        }
        Ok(())
    }
}

impl TryFrom<BTreeMap<RelationshipKind, RelatedNodes>> for Relationships {
    type Error = GraphError;

    fn try_from(entries: BTreeMap<RelationshipKind, RelatedNodes>) -> Result<Self> {
        let relationships = Self { entries };
        relationships.validate()?;
        Ok(relationships)
    }
}

impl From<Relationships> for BTreeMap<RelationshipKind, RelatedNodes> {
    fn from(relationships: Relationships) -> Self {
        relationships.entries
    }
}
