//! Dependency graph model and node naming modes.
//!
//! The graph is a directed graph of display names with deduplicated edges:
//! adding the same (from, to) pair twice leaves a single edge. Edge iteration
//! order is whatever petgraph yields; the DOT format downstream does not
//! require determinism.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

/// How library names are rendered as graph nodes.
///
/// Fixed for a whole run: tracing a binary keeps full names including the
/// version suffix, tracing a process truncates at the first `.so`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameMode {
    /// Keep the full name, e.g. `libfoo.so.1`.
    KeepSuffix,
    /// Truncate at the first `.so`, e.g. `libfoo`.
    StripSuffix,
}

impl NameMode {
    /// Render a library name under this mode.
    #[must_use]
    pub fn display<'a>(&self, name: &'a str) -> &'a str {
        match self {
            Self::KeepSuffix => name,
            Self::StripSuffix => name.split(".so").next().unwrap_or(name),
        }
    }
}

/// Directed graph of "depends-on" edges between library display names.
///
/// Nodes are interned by name, so the same name always maps to the same
/// node regardless of how many edges reach it.
#[derive(Debug, Default)]
pub struct DepGraph {
    graph: DiGraph<String, ()>,
    nodes: HashMap<String, NodeIndex>,
}

impl DepGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn intern(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.nodes.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(name.to_string());
        self.nodes.insert(name.to_string(), idx);
        idx
    }

    /// Add a depends-on edge. Duplicate edges collapse to one.
    pub fn add_edge(&mut self, from: &str, to: &str) {
        let a = self.intern(from);
        let b = self.intern(to);
        self.graph.update_edge(a, b, ());
    }

    /// Iterate over edges as (from, to) name pairs.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.graph.edge_references().map(|e| {
            (
                self.graph[e.source()].as_str(),
                self.graph[e.target()].as_str(),
            )
        })
    }

    /// Number of distinct edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Number of distinct nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Whether the given edge is present.
    #[must_use]
    pub fn contains_edge(&self, from: &str, to: &str) -> bool {
        match (self.nodes.get(from), self.nodes.get(to)) {
            (Some(&a), Some(&b)) => self.graph.contains_edge(a, b),
            _ => false,
        }
    }

    /// Whether the graph has no edges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.edge_count() == 0
    }
}
