//! Property tests for node graph construction and traversal.

use std::collections::HashSet;

use chunk_graph::{
    ChunkBuilder, Document, GraphNavigator, HierarchyConfig, IdIndex, Metadata, Node,
    RelationshipKind, Resolution, Resolver, SplitConfig, WindowConfig,
};
use proptest::prelude::*;

/// Plain lowercase prose.
fn arb_words(max: usize) -> impl Strategy<Value = String> {
    proptest::collection::vec("[a-z]{1,8}", 0..max).prop_map(|words| words.join(" "))
}

/// Sentences that always start with a capital, so each one is its own unit.
fn arb_sentences(max: usize) -> impl Strategy<Value = String> {
    proptest::collection::vec("[A-Z][a-z]{0,6}( [a-z]{1,6}){0,4}\\.", 0..max)
        .prop_map(|sentences| sentences.join(" "))
}

fn documents(texts: Vec<String>) -> Vec<Document> {
    texts
        .into_iter()
        .enumerate()
        .map(|(i, text)| Document::new(format!("doc{i}"), text, Metadata::new()))
        .collect()
}

/// Descending, distinct level sizes with an overlap below the smallest.
fn arb_hierarchy() -> impl Strategy<Value = HierarchyConfig> {
    (proptest::collection::vec(4usize..48, 1..4), 0usize..4).prop_map(|(mut sizes, overlap)| {
        sizes.sort_unstable_by(|a, b| b.cmp(a));
        sizes.dedup();
        HierarchyConfig { chunk_sizes: sizes, chunk_overlap: overlap }
    })
}

/// **Property: flat nodes resolve back to their own document**
/// *For any* documents split flat, `source_document` of every node is the
/// document whose text the node was cut from.
mod prop_flat_source {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn every_flat_node_resolves_to_its_document(
            texts in proptest::collection::vec(arb_words(120), 0..5),
            chunk_size in 2usize..40,
        ) {
            let docs = documents(texts);
            let config = SplitConfig::new(chunk_size, chunk_size / 3).unwrap();
            let nodes = ChunkBuilder::new().split_flat(&docs, &config).unwrap();
            let nav = GraphNavigator::default();

            for node in &nodes {
                let doc = nav.source_document(node, &docs);
                prop_assert!(doc.is_some());
                let doc = doc.unwrap();
                prop_assert!(doc.text().contains(node.text()));
                prop_assert_eq!(node.relationships().iter().count(), 1);
            }
        }
    }
}

/// **Property: parent and child links agree**
/// *For any* hierarchical split, each non-root node's `PARENT` resolves to a
/// node one level up that lists it among its children, and every ancestor
/// chain is shorter than the number of levels and never repeats a node.
mod prop_hierarchy_consistency {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn parent_child_links_are_mutual_and_chains_bounded(
            texts in proptest::collection::vec(arb_words(200), 1..4),
            config in arb_hierarchy(),
        ) {
            let docs = documents(texts);
            let nodes = ChunkBuilder::new().split_hierarchical(&docs, &config).unwrap();
            let index = IdIndex::new(&nodes);
            prop_assert_eq!(index.len(), nodes.len());
            let nav = GraphNavigator::default();

            for node in &nodes {
                prop_assert!(nav.source_document(node, &docs).is_some());

                if let Some(parent) = nav.parent(node, &index) {
                    prop_assert!(parent.child_ids().any(|id| id == node.id()));
                    prop_assert_eq!(parent.source_id(), node.source_id());
                }
                for child in nav.children(node, &index) {
                    prop_assert_eq!(child.parent_id(), Some(node.id()));
                }

                let chain = nav.ancestor_chain(node, &index);
                prop_assert!(chain.len() < config.chunk_sizes.len());
                let distinct: HashSet<&str> = chain.iter().map(|n| n.id()).collect();
                prop_assert_eq!(distinct.len(), chain.len());
                if let Some(root) = chain.first() {
                    prop_assert!(root.parent_id().is_none());
                }
            }
        }
    }
}

/// **Property: sequence windows truncate at document boundaries**
/// *For any* windowed split with window size `w`, the sequence window of the
/// node at position `i` of `n` holds `min(i, w) + 1 + min(n - 1 - i, w)` nodes
/// in document order.
mod prop_sequence_window {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn window_size_matches_position(
            texts in proptest::collection::vec(arb_sentences(10), 1..4),
            w in 0usize..4,
        ) {
            let docs = documents(texts);
            let config = WindowConfig::builder().window_size(w).build().unwrap();
            let nodes = ChunkBuilder::new().split_windowed(&docs, &config).unwrap();
            let nav = GraphNavigator::default();

            for doc in &docs {
                let in_doc: Vec<&Node> =
                    nodes.iter().filter(|n| n.source_id() == Some(doc.id())).collect();
                let n = in_doc.len();
                for (i, node) in in_doc.iter().enumerate() {
                    let window = nav.sequence_window(node, &nodes, w, w);
                    prop_assert_eq!(window.len(), i.min(w) + 1 + (n - 1 - i).min(w));

                    let start = i - i.min(w);
                    let expected: Vec<&str> =
                        in_doc[start..start + window.len()].iter().map(|n| n.id()).collect();
                    let actual: Vec<&str> = window.iter().map(|n| n.id()).collect();
                    prop_assert_eq!(actual, expected);
                }
            }
        }
    }
}

/// **Property: misses are values, never panics**
/// *For any* node and any relationship kind, resolving against an empty
/// collection yields `RelationshipAbsent`, `TargetNotFound`, or an empty
/// child list.
mod prop_resolution_misses {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn resolving_against_nothing_reports_absence(
            text in arb_words(200),
        ) {
            let docs = documents(vec![text]);
            let config = HierarchyConfig::with_overlap(vec![32, 8], 2).unwrap();
            let nodes = ChunkBuilder::new().split_hierarchical(&docs, &config).unwrap();
            let resolver = Resolver::new();
            let no_nodes: Vec<Node> = Vec::new();

            for node in &nodes {
                for kind in RelationshipKind::ALL {
                    let resolution: Resolution<'_, Node> = resolver.resolve(node, kind, &no_nodes);
                    match resolution {
                        Resolution::RelationshipAbsent { kind: absent } => {
                            prop_assert_eq!(absent, kind);
                            prop_assert!(!node.relationships().contains(kind));
                        }
                        Resolution::TargetNotFound { kind: missing, .. } => {
                            prop_assert_eq!(missing, kind);
                            prop_assert!(!kind.is_multi_valued());
                        }
                        Resolution::Children { resolved, unresolved } => {
                            prop_assert!(resolved.is_empty());
                            prop_assert_eq!(unresolved.len(), node.child_ids().count());
                        }
                        Resolution::Found(_) => {
                            prop_assert!(false, "nothing to find");
                        }
                    }
                }
            }
        }
    }
}
