//! Data types for documents and the nodes derived from them.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::relationship::{RelationshipKind, Relationships};

/// A scalar metadata value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    /// JSON `null`.
    Null,
    Bool(bool),
    /// Whole numbers that fit in an `i64`.
    Int(i64),
    /// Any other number.
    Float(f64),
    Text(String),
}

impl MetadataValue {
    /// The string payload, if this is [`MetadataValue::Text`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Null => f.write_str("null"),
            MetadataValue::Bool(b) => write!(f, "{b}"),
            MetadataValue::Int(i) => write!(f, "{i}"),
            MetadataValue::Float(x) => write!(f, "{x}"),
            MetadataValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::Text(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::Text(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        MetadataValue::Int(value)
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        MetadataValue::Float(value)
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        MetadataValue::Bool(value)
    }
}

/// Key-value metadata. Lookup ignores order; iteration and serialization
/// keep insertion order.
pub type Metadata = IndexMap<String, MetadataValue>;

/// Anything addressable by a stable string id.
pub trait Identified {
    fn id(&self) -> &str;
}

/// An original, unsplit unit of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    id: String,
    text: String,
    #[serde(default)]
    metadata: Metadata,
}

impl Document {
    /// Create a document. The id must be unique across documents and nodes.
    pub fn new(id: impl Into<String>, text: impl Into<String>, metadata: Metadata) -> Self {
        Self { id: id.into(), text: text.into(), metadata }
    }

    /// Unique identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Full text, unchanged by splitting.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Metadata in insertion order.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

impl Identified for Document {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A chunk of a document with typed links to related chunks and its source.
///
/// Nodes are immutable once built; every accessor is read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    id: String,
    text: String,
    #[serde(default)]
    metadata: Metadata,
    #[serde(default)]
    relationships: Relationships,
}

impl Node {
    /// Build a node after validating its relationships.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidRelationship`](crate::GraphError::InvalidRelationship)
    /// if a `CHILD` entry is empty or any entry has the wrong shape for its kind.
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        metadata: Metadata,
        relationships: Relationships,
    ) -> Result<Self> {
        relationships.validate()?;
        Ok(Self { id: id.into(), text: text.into(), metadata, relationships })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Typed references to related nodes and the source document.
    pub fn relationships(&self) -> &Relationships {
        &self.relationships
    }

    /// Text metadata stored under `key`, if present and textual.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(MetadataValue::as_str)
    }

    /// Id of the originating document.
    pub fn source_id(&self) -> Option<&str> {
        self.single_target(RelationshipKind::Source)
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.single_target(RelationshipKind::Parent)
    }

    pub fn next_id(&self) -> Option<&str> {
        self.single_target(RelationshipKind::Next)
    }

    pub fn previous_id(&self) -> Option<&str> {
        self.single_target(RelationshipKind::Previous)
    }

    /// `CHILD` target ids in stored order.
    pub fn child_ids(&self) -> impl Iterator<Item = &str> {
        self.relationships.children().iter().map(|r| r.target_id.as_str())
    }

    fn single_target(&self, kind: RelationshipKind) -> Option<&str> {
        self.relationships.single(kind).map(|r| r.target_id.as_str())
    }
}

impl Identified for Node {
    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GraphError;
    use crate::relationship::RelatedNodes;

    #[test]
    fn node_with_empty_child_list_is_rejected() {
        let mut rels = Relationships::new();
        rels.insert(RelationshipKind::Child, RelatedNodes::Many(Vec::new()));
        let err = Node::new("n1", "text", Metadata::new(), rels).unwrap_err();
        assert!(matches!(err, GraphError::InvalidRelationship { .. }));
    }

    #[test]
    fn node_accessors_expose_targets() {
        let mut rels = Relationships::new();
        rels.set(RelationshipKind::Source, "doc1")
            .set(RelationshipKind::Parent, "p")
            .push_child("c1")
            .push_child("c2");
        let node = Node::new("n1", "text", Metadata::new(), rels).unwrap();
        assert_eq!(node.source_id(), Some("doc1"));
        assert_eq!(node.parent_id(), Some("p"));
        assert_eq!(node.next_id(), None);
        assert_eq!(node.child_ids().collect::<Vec<_>>(), ["c1", "c2"]);
    }

    #[test]
    fn metadata_keeps_insertion_order_through_serde() {
        let mut metadata = Metadata::new();
        metadata.insert("zeta".to_string(), "z".into());
        metadata.insert("alpha".to_string(), 1i64.into());
        metadata.insert("mid".to_string(), true.into());
        let doc = Document::new("d", "body", metadata);

        let json = serde_json::to_string(&doc).unwrap();
        let back: Document = serde_json::from_str(&json).unwrap();
        let keys: Vec<&str> = back.metadata().keys().map(String::as_str).collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
        assert_eq!(back.metadata()["alpha"], MetadataValue::Int(1));
    }
}
