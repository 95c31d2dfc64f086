//! `split` and `navigate` command logic, kept free of argument parsing.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use chunk_graph::{
    ChunkBuilder, ChunkGraphConfig, GraphNavigator, IdIndex, Node, NodeCollection, RecordSchema,
    Resolver, documents_from_records, read_json_lines,
};
use clap::{Subcommand, ValueEnum};
use serde_json::{Value, json};
use tracing::info;

/// Which chunk builder operation `split` runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SplitMode {
    Flat,
    Windowed,
    Hierarchical,
}

/// A traversal requested by `navigate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum NavigateOp {
    /// Ancestors of the node, root first
    Ancestors,
    /// Every descendant, breadth first
    Subtree,
    /// The node with its neighbours, in document order
    Window {
        /// Preceding nodes to include
        #[arg(long, default_value_t = 1)]
        before: usize,
        /// Following nodes to include
        #[arg(long, default_value_t = 1)]
        after: usize,
    },
    /// The document the node was split from
    Source,
}

/// Load a TOML config, or the defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<ChunkGraphConfig> {
    let config = match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            toml::from_str::<ChunkGraphConfig>(&raw)
                .with_context(|| format!("failed to parse config {}", path.display()))?
        }
        None => ChunkGraphConfig::default(),
    };
    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// Read JSON Lines records from `input` and split them into a collection.
pub fn split(
    input: &Path,
    schema: &RecordSchema,
    mode: SplitMode,
    config: &ChunkGraphConfig,
) -> Result<NodeCollection> {
    let file = File::open(input).with_context(|| format!("failed to open {}", input.display()))?;
    let records = read_json_lines(BufReader::new(file))
        .with_context(|| format!("failed to read records from {}", input.display()))?;
    let documents = documents_from_records(&records, schema)?;

    let builder = ChunkBuilder::new().with_id_strategy(config.id_strategy);
    let nodes = match mode {
        SplitMode::Flat => builder.split_flat(&documents, &config.split)?,
        SplitMode::Windowed => builder.split_windowed(&documents, &config.window)?,
        SplitMode::Hierarchical => builder.split_hierarchical(&documents, &config.hierarchy)?,
    };

    info!(
        input = %input.display(),
        mode = ?mode,
        document_count = documents.len(),
        node_count = nodes.len(),
        "split records"
    );
    Ok(NodeCollection::new(documents, nodes))
}

/// Load a collection previously written by `split`.
pub fn read_collection(path: &Path) -> Result<NodeCollection> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let collection = NodeCollection::from_json(&raw)
        .with_context(|| format!("failed to parse collection {}", path.display()))?;
    collection.validate()?;
    Ok(collection)
}

/// Run one traversal from `node_id` and render the result as JSON.
///
/// Misses are not errors: the result is an empty list (or `null` for
/// `Source`), and with `config.on_missing` set they are logged as warnings.
pub fn navigate(
    collection: &NodeCollection,
    node_id: &str,
    op: NavigateOp,
    config: &ChunkGraphConfig,
) -> Result<Value> {
    let nodes = IdIndex::new(&collection.nodes);
    let node =
        nodes.get(node_id).ok_or_else(|| anyhow!("node '{node_id}' not found in collection"))?;

    let navigator = GraphNavigator::new(Resolver::from_config(config));

    let value = match op {
        NavigateOp::Ancestors => nodes_json(&navigator.ancestor_chain(node, &nodes))?,
        NavigateOp::Subtree => nodes_json(&navigator.subtree(node, &nodes))?,
        NavigateOp::Window { before, after } => {
            nodes_json(&navigator.sequence_window(node, &nodes, before, after))?
        }
        NavigateOp::Source => match navigator.source_document(node, &collection.documents) {
            Some(document) => serde_json::to_value(document)?,
            None => Value::Null,
        },
    };
    Ok(value)
}

fn nodes_json(nodes: &[&Node]) -> Result<Value> {
    let items = nodes.iter().map(serde_json::to_value).collect::<serde_json::Result<Vec<_>>>()?;
    Ok(json!(items))
}
