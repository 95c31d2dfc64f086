//! Multi-step traversals over a node graph.
//!
//! [`GraphNavigator`] composes [`Resolver`] calls into the walks retrieval
//! code needs: up the hierarchy, down a subtree, sideways through a
//! sentence window, and back to the source document ("small-to-big").
//! Every walk stops quietly at the first absent relationship or missing
//! target, and never visits a node twice.

use std::collections::{HashSet, VecDeque};

use crate::document::{Document, Node};
use crate::lookup::Lookup;
use crate::relationship::RelationshipKind;
use crate::resolver::Resolver;

/// Composite traversals built on one [`Resolver`].
#[derive(Debug, Clone, Default)]
pub struct GraphNavigator {
    resolver: Resolver,
}

impl GraphNavigator {
    pub fn new(resolver: Resolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// The node referenced by `PARENT`.
    pub fn parent<'c, C>(&self, node: &Node, nodes: &'c C) -> Option<&'c Node>
    where
        C: Lookup<Node> + ?Sized,
    {
        self.resolver.resolve(node, RelationshipKind::Parent, nodes).found()
    }

    /// Resolved children in reference order; unresolved references are skipped.
    pub fn children<'c, C>(&self, node: &Node, nodes: &'c C) -> Vec<&'c Node>
    where
        C: Lookup<Node> + ?Sized,
    {
        self.resolver.resolve(node, RelationshipKind::Child, nodes).into_resolved()
    }

    /// The following node in sequence.
    pub fn next<'c, C>(&self, node: &Node, nodes: &'c C) -> Option<&'c Node>
    where
        C: Lookup<Node> + ?Sized,
    {
        self.resolver.resolve(node, RelationshipKind::Next, nodes).found()
    }

    /// The preceding node in sequence.
    pub fn previous<'c, C>(&self, node: &Node, nodes: &'c C) -> Option<&'c Node>
    where
        C: Lookup<Node> + ?Sized,
    {
        self.resolver.resolve(node, RelationshipKind::Previous, nodes).found()
    }

    /// Ancestors of `node`, root first and immediate parent last.
    ///
    /// Empty when the node has no resolvable parent.
    pub fn ancestor_chain<'c, C>(&self, node: &'c Node, nodes: &'c C) -> Vec<&'c Node>
    where
        C: Lookup<Node> + ?Sized,
    {
        let mut chain = Vec::new();
        let mut visited = HashSet::from([node.id()]);
        let mut current = node;

        while let Some(parent) = self.parent(current, nodes) {
            if !visited.insert(parent.id()) {
                break;
            }
            chain.push(parent);
            current = parent;
        }

        chain.reverse();
        chain
    }

    /// Every descendant of `node`, breadth first.
    pub fn subtree<'c, C>(&self, node: &'c Node, nodes: &'c C) -> Vec<&'c Node>
    where
        C: Lookup<Node> + ?Sized,
    {
        let mut descendants = Vec::new();
        let mut visited = HashSet::from([node.id()]);
        let mut queue = VecDeque::from([node]);

        while let Some(current) = queue.pop_front() {
            for child in self.children(current, nodes) {
                if visited.insert(child.id()) {
                    descendants.push(child);
                    queue.push_back(child);
                }
            }
        }

        descendants
    }

    /// Up to `before` preceding and `after` following nodes around `node`,
    /// in document order with `node` included.
    pub fn sequence_window<'c, C>(
        &self,
        node: &'c Node,
        nodes: &'c C,
        before: usize,
        after: usize,
    ) -> Vec<&'c Node>
    where
        C: Lookup<Node> + ?Sized,
    {
        let mut visited = HashSet::from([node.id()]);

        let mut preceding = Vec::with_capacity(before);
        let mut current = node;
        while preceding.len() < before {
            match self.previous(current, nodes) {
                Some(prev) if visited.insert(prev.id()) => {
                    preceding.push(prev);
                    current = prev;
                }
                _ => break,
            }
        }

        let mut window: Vec<&Node> = preceding.into_iter().rev().collect();
        window.push(node);

        let mut current = node;
        let mut taken = 0;
        while taken < after {
            match self.next(current, nodes) {
                Some(next) if visited.insert(next.id()) => {
                    window.push(next);
                    current = next;
                    taken += 1;
                }
                _ => break,
            }
        }

        window
    }

    /// The document `node` was split from.
    pub fn source_document<'c, C>(&self, node: &Node, documents: &'c C) -> Option<&'c Document>
    where
        C: Lookup<Document> + ?Sized,
    {
        self.resolver.resolve(node, RelationshipKind::Source, documents).found()
    }
}
