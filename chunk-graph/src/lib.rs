//! Chunk graphs for retrieval over long documents.
//!
//! Documents are split into nodes at several granularities, and every node
//! carries typed, id-only references to related nodes and to its source
//! document:
//!
//! - [`ChunkBuilder`]: flat, sentence-window, and hierarchical splitting
//! - [`Resolver`]: resolve one relationship against a candidate collection
//! - [`GraphNavigator`]: ancestor chains, subtrees, sequence windows, and
//!   small-to-big source lookup
//!
//! References are weak: nothing in the graph owns another entity, so nodes
//! serialize independently and every lookup takes the collection to search.
//!
//! # Example
//!
//! ```rust,ignore
//! use chunk_graph::{ChunkBuilder, GraphNavigator, HierarchyConfig};
//!
//! let nodes = ChunkBuilder::new().split_hierarchical(&documents, &HierarchyConfig::default())?;
//! let navigator = GraphNavigator::default();
//! let leaf = nodes.last().unwrap();
//! let ancestors = navigator.ancestor_chain(leaf, &nodes);
//! let source = navigator.source_document(leaf, &documents);
//! ```

pub mod builder;
pub mod collection;
pub mod config;
pub mod diagnostics;
pub mod document;
pub mod error;
pub mod lookup;
pub mod navigator;
pub mod records;
pub mod relationship;
pub mod resolver;
pub mod splitter;

pub use builder::ChunkBuilder;
pub use collection::NodeCollection;
pub use config::{
    ChunkGraphConfig, HierarchyConfig, NodeIdStrategy, SplitConfig, WindowConfig,
    WindowConfigBuilder,
};
pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticKind, DiagnosticSink, TracingSink};
pub use document::{Document, Identified, Metadata, MetadataValue, Node};
pub use error::{GraphError, Result};
pub use lookup::{IdIndex, Lookup};
pub use navigator::GraphNavigator;
pub use records::{Record, RecordSchema, documents_from_records, read_json_lines};
pub use relationship::{RelatedNodes, RelationshipKind, RelationshipRef, Relationships};
pub use resolver::{Resolution, Resolver};
pub use splitter::{RecursiveSplitter, SentenceSplitter, Span, TextSplitter, count_tokens};
