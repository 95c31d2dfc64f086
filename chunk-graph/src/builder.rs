//! Chunk builder: documents in, linked nodes out.
//!
//! [`ChunkBuilder`] drives a [`TextSplitter`] over each document and wires
//! relationship references between the nodes it creates:
//!
//! - [`ChunkBuilder::split_flat`]: `SOURCE` only
//! - [`ChunkBuilder::split_windowed`]: `SOURCE`, `PREVIOUS`, `NEXT`, plus
//!   window metadata
//! - [`ChunkBuilder::split_hierarchical`]: `SOURCE`, `PARENT`, `CHILD`, and
//!   `PREVIOUS`/`NEXT` between siblings
//!
//! # Example
//!
//! ```rust,ignore
//! use chunk_graph::{ChunkBuilder, HierarchyConfig};
//!
//! let builder = ChunkBuilder::new();
//! let nodes = builder.split_hierarchical(&documents, &HierarchyConfig::default())?;
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::{HierarchyConfig, NodeIdStrategy, SplitConfig, WindowConfig};
use crate::document::{Document, Metadata, MetadataValue, Node};
use crate::error::Result;
use crate::relationship::{RelationshipKind, Relationships};
use crate::splitter::{RecursiveSplitter, SentenceSplitter, Span, TextSplitter};

/// Splits documents into relationship-linked nodes.
#[derive(Clone)]
pub struct ChunkBuilder {
    splitter: Arc<dyn TextSplitter>,
    sentence_splitter: Arc<dyn TextSplitter>,
    id_strategy: NodeIdStrategy,
}

impl Default for ChunkBuilder {
    fn default() -> Self {
        Self {
            splitter: Arc::new(RecursiveSplitter),
            sentence_splitter: Arc::new(SentenceSplitter),
            id_strategy: NodeIdStrategy::default(),
        }
    }
}

impl fmt::Debug for ChunkBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkBuilder").field("id_strategy", &self.id_strategy).finish_non_exhaustive()
    }
}

impl ChunkBuilder {
    /// A builder using [`RecursiveSplitter`] for chunks, [`SentenceSplitter`]
    /// for window units, and random node ids.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the splitter used for flat, hierarchical, and presplit window units.
    pub fn with_splitter(mut self, splitter: Arc<dyn TextSplitter>) -> Self {
        self.splitter = splitter;
        self
    }

    /// Replace the splitter producing sentence units for windows.
    pub fn with_sentence_splitter(mut self, splitter: Arc<dyn TextSplitter>) -> Self {
        self.sentence_splitter = splitter;
        self
    }

    pub fn with_id_strategy(mut self, id_strategy: NodeIdStrategy) -> Self {
        self.id_strategy = id_strategy;
        self
    }

    /// Split each document into chunks linked only to their source.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidSplitConfig`](crate::GraphError::InvalidSplitConfig)
    /// if `config` is malformed. An empty `documents` slice yields no nodes.
    pub fn split_flat(&self, documents: &[Document], config: &SplitConfig) -> Result<Vec<Node>> {
        config.validate()?;

        let mut nodes = Vec::new();
        for document in documents {
            let spans = non_empty(self.splitter.split(document.text(), config));
            debug!(document.id = %document.id(), node_count = spans.len(), "split document (flat)");

            for (index, span) in spans.into_iter().enumerate() {
                let mut relationships = Relationships::new();
                relationships.set(RelationshipKind::Source, document.id());
                nodes.push(Node::new(
                    self.node_id(document, "flat", 0, index),
                    span.text,
                    inherit_metadata(document, span.metadata),
                    relationships,
                )?);
            }
        }

        info!(document_count = documents.len(), node_count = nodes.len(), "flat split complete");
        Ok(nodes)
    }

    /// Split each document into atomic units and attach a context window to each.
    ///
    /// Every node's metadata gains the window text (units within
    /// `window_size` on either side, joined by spaces) and the unit itself.
    /// Nodes link to their source and to their neighbours within the document.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidSplitConfig`](crate::GraphError::InvalidSplitConfig)
    /// if `config` is malformed.
    pub fn split_windowed(&self, documents: &[Document], config: &WindowConfig) -> Result<Vec<Node>> {
        config.validate()?;

        let splitter =
            if config.use_chunk_presplit { &self.splitter } else { &self.sentence_splitter };

        let mut nodes = Vec::new();
        for document in documents {
            let units = non_empty(splitter.split(document.text(), &config.presplit));
            debug!(document.id = %document.id(), node_count = units.len(), "split document (windowed)");

            let ids: Vec<String> =
                (0..units.len()).map(|i| self.node_id(document, "window", 0, i)).collect();
            let texts: Vec<&str> = units.iter().map(|u| u.text.as_str()).collect();

            for (index, unit) in units.iter().enumerate() {
                let lo = index.saturating_sub(config.window_size);
                let hi = index.saturating_add(config.window_size).min(units.len() - 1);
                let window = texts[lo..=hi].join(" ");

                let mut metadata = inherit_metadata(document, unit.metadata.clone());
                metadata.insert(config.window_metadata_key.clone(), MetadataValue::Text(window));
                metadata.insert(
                    config.original_text_metadata_key.clone(),
                    MetadataValue::Text(unit.text.clone()),
                );

                let mut relationships = Relationships::new();
                relationships.set(RelationshipKind::Source, document.id());
                link_siblings(&mut relationships, &ids, index);

                nodes.push(Node::new(ids[index].clone(), unit.text.clone(), metadata, relationships)?);
            }
        }

        info!(
            document_count = documents.len(),
            node_count = nodes.len(),
            window_size = config.window_size,
            "windowed split complete"
        );
        Ok(nodes)
    }

    /// Split each document recursively, one level per entry of `chunk_sizes`.
    ///
    /// Level-0 nodes are split from the document and carry no `PARENT`; their
    /// `SOURCE` is the document. Each deeper node is split from one node of
    /// the level above, links to it through `PARENT`, and is listed in that
    /// node's `CHILD` references. Siblings under the same parent are chained
    /// with `PREVIOUS`/`NEXT`. The result is every tree of every document,
    /// flattened level by level within each document.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidSplitConfig`](crate::GraphError::InvalidSplitConfig)
    /// if `config` is malformed.
    pub fn split_hierarchical(
        &self,
        documents: &[Document],
        config: &HierarchyConfig,
    ) -> Result<Vec<Node>> {
        config.validate()?;

        let mut nodes = Vec::new();
        for document in documents {
            let pending = self.build_tree(document, config);
            debug!(
                document.id = %document.id(),
                node_count = pending.len(),
                levels = config.chunk_sizes.len(),
                "split document (hierarchical)"
            );
            for node in pending {
                nodes.push(Node::new(node.id, node.text, node.metadata, node.relationships)?);
            }
        }

        info!(
            document_count = documents.len(),
            node_count = nodes.len(),
            chunk_sizes = ?config.chunk_sizes,
            "hierarchical split complete"
        );
        Ok(nodes)
    }

    /// Nodes of one document before their relationships are frozen.
    fn build_tree(&self, document: &Document, config: &HierarchyConfig) -> Vec<PendingNode> {
        let mut pending: Vec<PendingNode> = Vec::new();
        // indices into `pending` of the previous level
        let mut frontier: Vec<usize> = Vec::new();

        let levels = (0..).map_while(|level| config.level(level));
        for (level, split) in levels.enumerate() {
            let mut next_frontier = Vec::new();
            let mut level_index = 0;

            let parents: Vec<Option<usize>> =
                if level == 0 { vec![None] } else { frontier.iter().copied().map(Some).collect() };

            for parent in parents {
                let text = match parent {
                    Some(p) => pending[p].text.as_str(),
                    None => document.text(),
                };
                let spans = non_empty(self.splitter.split(text, &split));

                let ids: Vec<String> = (0..spans.len())
                    .map(|i| self.node_id(document, "tree", level, level_index + i))
                    .collect();
                level_index += spans.len();

                for (i, span) in spans.into_iter().enumerate() {
                    let mut relationships = Relationships::new();
                    relationships.set(RelationshipKind::Source, document.id());
                    if let Some(p) = parent {
                        relationships.set(RelationshipKind::Parent, pending[p].id.clone());
                    }
                    link_siblings(&mut relationships, &ids, i);

                    if let Some(p) = parent {
                        pending[p].relationships.push_child(ids[i].clone());
                    }
                    next_frontier.push(pending.len());
                    pending.push(PendingNode {
                        id: ids[i].clone(),
                        text: span.text,
                        metadata: inherit_metadata(document, span.metadata),
                        relationships,
                    });
                }
            }

            frontier = next_frontier;
        }

        pending
    }

    fn node_id(&self, document: &Document, mode: &str, level: usize, index: usize) -> String {
        match self.id_strategy {
            NodeIdStrategy::Uuid => uuid::Uuid::new_v4().to_string(),
            NodeIdStrategy::Deterministic => format!("{}:{mode}:{level}:{index}", document.id()),
        }
    }
}

struct PendingNode {
    id: String,
    text: String,
    metadata: Metadata,
    relationships: Relationships,
}

/// Document metadata first, then the span's own keys.
fn inherit_metadata(document: &Document, span_metadata: Metadata) -> Metadata {
    let mut metadata = document.metadata().clone();
    metadata.extend(span_metadata);
    metadata
}

fn link_siblings(relationships: &mut Relationships, ids: &[String], index: usize) {
    if index > 0 {
        relationships.set(RelationshipKind::Previous, ids[index - 1].clone());
    }
    if let Some(next) = ids.get(index + 1) {
        relationships.set(RelationshipKind::Next, next.clone());
    }
}

fn non_empty(spans: Vec<Span>) -> Vec<Span> {
    spans.into_iter().filter(|span| !span.text.is_empty()).collect()
}
