//! A serializable snapshot of documents and the nodes split from them.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::document::{Document, Node};
use crate::error::{GraphError, Result};
use crate::lookup::Lookup;

/// Documents and nodes stored side by side, as handed to retrieval.
///
/// Only ids and relationship references are needed to rebuild the graph, so
/// a collection survives a JSON round-trip unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeCollection {
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default)]
    pub nodes: Vec<Node>,
}

impl NodeCollection {
    pub fn new(documents: Vec<Document>, nodes: Vec<Node>) -> Self {
        Self { documents, nodes }
    }

    /// Check that no id repeats across documents and nodes.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.documents.len() + self.nodes.len());
        let ids = self.documents.iter().map(Document::id).chain(self.nodes.iter().map(Node::id));
        for id in ids {
            if !seen.insert(id) {
                return Err(GraphError::DuplicateId(id.to_string()));
            }
        }
        Ok(())
    }

    /// Node with this id, scanning in order.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.find(id)
    }

    /// Document with this id, scanning in order.
    pub fn document(&self, id: &str) -> Option<&Document> {
        self.documents.find(id)
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse JSON written by [`NodeCollection::to_json`].
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Serialization`] on malformed input, including
    /// relationship maps that fail validation.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Metadata;
    use crate::relationship::Relationships;

    #[test]
    fn duplicate_ids_across_kinds_are_rejected() {
        let collection = NodeCollection::new(
            vec![Document::new("x", "doc", Metadata::new())],
            vec![Node::new("x", "node", Metadata::new(), Relationships::new()).unwrap()],
        );
        assert!(matches!(collection.validate(), Err(GraphError::DuplicateId(id)) if id == "x"));
    }

    #[test]
    fn malformed_relationships_fail_to_load() {
        let json = r#"{ "nodes": [{ "id": "n", "text": "t", "relationships": { "CHILD": [] } }] }"#;
        assert!(NodeCollection::from_json(json).is_err());
    }
}
