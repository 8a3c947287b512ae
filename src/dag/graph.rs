// src/dag/graph.rs

use std::collections::HashMap;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::errors::{BuildError, Result};

/// A cycle reported by [`DependencyGraph::cycles`], as the list of task
/// names taking part in it.
pub type Cycle = Vec<String>;

/// Ordered adjacency mapping keyed by task name.
///
/// Edge direction follows the dependency declaration: for `b` depending on
/// `a` the mapping holds `b -> [a]`. Insertion order is kept so that cycle
/// reports are stable for a stable registration order.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    edges: Vec<(String, Vec<String>)>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from `(node, out-neighbours)` pairs.
    pub fn from_edges<I, S>(edges: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<S>)>,
        S: Into<String>,
    {
        let mut graph = Self::new();
        for (node, neighbours) in edges {
            graph.add_node(node, neighbours);
        }
        graph
    }

    /// Add a node together with its out-neighbours.
    ///
    /// Adding the same node twice appends to its neighbour list.
    pub fn add_node<S: Into<String>>(&mut self, node: S, neighbours: Vec<S>) {
        let node = node.into();
        let neighbours: Vec<String> = neighbours.into_iter().map(Into::into).collect();
        match self.edges.iter_mut().find(|(name, _)| *name == node) {
            Some((_, existing)) => existing.extend(neighbours),
            None => self.edges.push((node, neighbours)),
        }
    }

    /// Number of nodes that were added explicitly.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Return `None` when the graph is acyclic, otherwise every cycle.
    ///
    /// Strongly connected components with more than one node are reported
    /// as cycles; a single node is reported only when it has an edge to
    /// itself.
    pub fn cycles(&self) -> Option<Vec<Cycle>> {
        let mut graph: DiGraph<&str, ()> = DiGraph::new();
        let mut index: HashMap<&str, NodeIndex> = HashMap::new();

        for (node, neighbours) in &self.edges {
            let from = intern(&mut graph, &mut index, node);
            for neighbour in neighbours {
                let to = intern(&mut graph, &mut index, neighbour);
                graph.add_edge(from, to, ());
            }
        }

        let cycles: Vec<Cycle> = tarjan_scc(&graph)
            .into_iter()
            .filter(|component| {
                component.len() > 1
                    || component
                        .first()
                        .is_some_and(|node| graph.contains_edge(*node, *node))
            })
            .map(|component| {
                component
                    .into_iter()
                    .map(|node| graph[node].to_string())
                    .collect()
            })
            .collect();

        if cycles.is_empty() {
            None
        } else {
            Some(cycles)
        }
    }

    /// Fail with a circular dependency error carrying every detected cycle.
    pub fn assert_no_cycles_present(&self) -> Result<()> {
        match self.cycles() {
            None => Ok(()),
            Some(cycles) => Err(BuildError::circular(cycles)),
        }
    }
}

fn intern<'a>(
    graph: &mut DiGraph<&'a str, ()>,
    index: &mut HashMap<&'a str, NodeIndex>,
    name: &'a str,
) -> NodeIndex {
    *index.entry(name).or_insert_with(|| graph.add_node(name))
}
