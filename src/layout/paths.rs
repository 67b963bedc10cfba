use std::cmp::Reverse;
use std::collections::HashMap;

use crate::config::LayoutConfig;
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::ir::{Graph, NodeId};

use super::{Path, PathSet};

#[derive(Debug)]
struct MemoEntry {
    node: NodeId,
    paths: Vec<Path>,
    usage: usize,
}

/// Memoized walk of every path from a node down to its sinks.
///
/// Entries live in an arena in first-memoization order; `index` maps a node to
/// its slot so a re-memoized node keeps its original position.
struct PathTracer<'a, S: DiagnosticSink + ?Sized> {
    graph: &'a Graph,
    depth_limit: usize,
    sink: &'a mut S,
    entries: Vec<MemoEntry>,
    index: HashMap<NodeId, usize>,
}

/// A node whose children are still being traced.
struct Frame {
    node: NodeId,
    start: NodeId,
    count: usize,
    depth: usize,
    next: usize,
    output: Vec<Path>,
}

enum Step {
    Done(Vec<Path>),
    Descend(Frame),
}

impl<'a, S: DiagnosticSink + ?Sized> PathTracer<'a, S> {
    fn new(graph: &'a Graph, config: &LayoutConfig, sink: &'a mut S) -> Self {
        Self {
            graph,
            // A walk deeper than the node count repeats a node, so only
            // cyclic branches are ever cut.
            depth_limit: config.max_traversal_depth.max(graph.node_count()),
            sink,
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Trace `node` with an explicit frame stack so long chains cannot
    /// overflow the thread stack.
    fn trace(&mut self, node: &str) -> Vec<Path> {
        let mut stack = match self.enter(node, None, 0, 0) {
            Step::Done(paths) => return paths,
            Step::Descend(frame) => vec![frame],
        };
        let graph = self.graph;
        let mut finished: Option<Vec<Path>> = None;

        while let Some(frame) = stack.last_mut() {
            if let Some(tails) = finished.take() {
                for tail in tails {
                    let mut path = Vec::with_capacity(tail.len() + 1);
                    path.push(frame.node.clone());
                    path.extend(tail);
                    frame.output.push(path);
                }
            }

            let child = graph
                .neighbors(&frame.node)
                .and_then(|next_nodes| next_nodes.get(frame.next));
            match child {
                Some(next) => {
                    let count = frame.count + frame.next;
                    let depth = frame.depth + 1;
                    let start = frame.start.clone();
                    frame.next += 1;
                    match self.enter(next, Some(&start), count, depth) {
                        Step::Done(paths) => finished = Some(paths),
                        Step::Descend(deeper) => stack.push(deeper),
                    }
                }
                None => {
                    let Some(frame) = stack.pop() else { break };
                    self.memoize(&frame.node, frame.output.clone());
                    finished = Some(frame.output);
                }
            }
        }
        finished.unwrap_or_default()
    }

    // `count` is the branch counter: child `i` of a call receives `count + i`,
    // so it grows with sibling position rather than with call depth.
    fn enter(&mut self, node: &str, start: Option<&str>, count: usize, depth: usize) -> Step {
        let limit = self.graph.node_count();
        if count > limit {
            self.sink.report(Diagnostic::DepthGuardExceeded {
                node: node.to_string(),
                count,
                limit,
            });
            return Step::Done(Vec::new());
        }

        if let Some(start) = start {
            if start == node {
                self.sink.report(Diagnostic::CycleDetected {
                    node: node.to_string(),
                    start: start.to_string(),
                });
                return Step::Done(Vec::new());
            }
        }
        let start = start.unwrap_or(node);

        if let Some(&slot) = self.index.get(node) {
            if let Some(entry) = self.entries.get_mut(slot) {
                entry.usage += 1;
                return Step::Done(entry.paths.clone());
            }
        }

        if depth > self.depth_limit {
            self.sink.report(Diagnostic::TraversalFault {
                node: node.to_string(),
                reason: format!("traversal depth exceeds {}", self.depth_limit),
            });
            return Step::Done(Vec::new());
        }

        let Some(next_nodes) = self.graph.neighbors(node) else {
            self.sink.report(Diagnostic::TraversalFault {
                node: node.to_string(),
                reason: "node has no adjacency entry".to_string(),
            });
            return Step::Done(Vec::new());
        };

        if next_nodes.is_empty() {
            let output = vec![vec![node.to_string()]];
            self.memoize(node, output.clone());
            return Step::Done(output);
        }

        Step::Descend(Frame {
            node: node.to_string(),
            start: start.to_string(),
            count,
            depth,
            next: 0,
            output: Vec::new(),
        })
    }

    fn memoize(&mut self, node: &str, paths: Vec<Path>) {
        let entry = MemoEntry {
            node: node.to_string(),
            paths,
            usage: 0,
        };
        match self.index.get(node).copied() {
            Some(slot) if slot < self.entries.len() => self.entries[slot] = entry,
            _ => {
                self.index.insert(node.to_string(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    fn finish(self) -> PathSet {
        let usage = self
            .entries
            .iter()
            .map(|entry| (entry.node.clone(), entry.usage))
            .collect();
        let mut root_paths: Vec<Path> = self
            .entries
            .into_iter()
            .filter(|entry| entry.usage == 0)
            .flat_map(|entry| entry.paths)
            .collect();
        root_paths.sort_by_key(|path| Reverse(path.len()));
        PathSet { root_paths, usage }
    }
}

/// Trace every node of `graph` and return the paths that were never reused as
/// a tail of another traversal, longest first.
pub fn enumerate_paths<S: DiagnosticSink + ?Sized>(
    graph: &Graph,
    config: &LayoutConfig,
    sink: &mut S,
) -> PathSet {
    let _span = tracing::debug_span!("enumerate_paths", nodes = graph.node_count()).entered();
    let mut tracer = PathTracer::new(graph, config, sink);
    for node in graph.nodes() {
        tracer.trace(node);
    }
    let paths = tracer.finish();
    tracing::debug!(root_paths = paths.root_paths.len(), "path enumeration finished");
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Connection;

    fn graph_of(pairs: &[(&str, &str)]) -> Graph {
        let connections: Vec<Connection> = pairs
            .iter()
            .map(|(from, to)| Connection::new(*from, *to))
            .collect();
        Graph::from_connections(&connections)
    }

    fn path(ids: &[&str]) -> Path {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn two_node_graph_has_single_root_path() {
        let graph = graph_of(&[("A", "B")]);
        let mut sink: Vec<Diagnostic> = Vec::new();
        let paths = enumerate_paths(&graph, &LayoutConfig::default(), &mut sink);
        assert_eq!(paths.root_paths, vec![path(&["A", "B"])]);
        assert_eq!(paths.usage_of("A"), Some(0));
        assert!(paths.usage_of("B").unwrap() > 0);
        assert!(sink.is_empty());
    }

    #[test]
    fn diamond_yields_both_branches_from_source() {
        let graph = graph_of(&[("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")]);
        let mut sink: Vec<Diagnostic> = Vec::new();
        let paths = enumerate_paths(&graph, &LayoutConfig::default(), &mut sink);
        assert_eq!(
            paths.root_paths,
            vec![path(&["A", "B", "D"]), path(&["A", "C", "D"])]
        );
        assert_eq!(paths.usage_of("A"), Some(0));
        assert!(paths.usage_of("D").unwrap() >= 2);
    }

    #[test]
    fn self_loop_is_truncated_and_reported() {
        let graph = graph_of(&[("A", "A")]);
        let mut sink: Vec<Diagnostic> = Vec::new();
        let paths = enumerate_paths(&graph, &LayoutConfig::default(), &mut sink);
        assert!(paths.root_paths.is_empty());
        assert_eq!(paths.usage_of("A"), Some(0));
        assert_eq!(
            sink,
            vec![Diagnostic::CycleDetected {
                node: "A".to_string(),
                start: "A".to_string(),
            }]
        );
    }

    #[test]
    fn cycle_back_to_start_truncates_branch() {
        let graph = graph_of(&[("A", "B"), ("B", "A"), ("B", "C")]);
        let mut sink: Vec<Diagnostic> = Vec::new();
        let paths = enumerate_paths(&graph, &LayoutConfig::default(), &mut sink);
        assert_eq!(paths.root_paths, vec![path(&["A", "B", "C"])]);
        assert!(sink.iter().any(Diagnostic::is_cycle));
    }

    #[test]
    fn cycle_away_from_start_hits_depth_fault() {
        // B and C loop without ever returning to A.
        let graph = graph_of(&[("A", "B"), ("B", "C"), ("C", "B")]);
        let config = LayoutConfig {
            max_traversal_depth: 16,
            ..LayoutConfig::default()
        };
        let mut sink: Vec<Diagnostic> = Vec::new();
        let paths = enumerate_paths(&graph, &config, &mut sink);
        assert!(paths.root_paths.is_empty());
        assert!(
            sink.iter()
                .any(|d| matches!(d, Diagnostic::TraversalFault { .. }))
        );
    }

    #[test]
    fn chain_longer_than_depth_limit_keeps_its_source() {
        let names: Vec<String> = (0..=1100).map(|i| format!("N{i}")).collect();
        let connections: Vec<Connection> = names
            .windows(2)
            .map(|pair| Connection::new(pair[0].as_str(), pair[1].as_str()))
            .collect();
        let graph = Graph::from_connections(&connections);
        let mut sink: Vec<Diagnostic> = Vec::new();
        let paths = enumerate_paths(&graph, &LayoutConfig::default(), &mut sink);
        assert!(sink.is_empty(), "unexpected diagnostics: {sink:?}");
        assert_eq!(paths.root_paths.len(), 1);
        assert_eq!(paths.root_paths[0], names);
    }

    #[test]
    fn small_depth_limit_never_cuts_acyclic_graph() {
        let graph = graph_of(&[("A", "B"), ("B", "C"), ("C", "D"), ("D", "E")]);
        let config = LayoutConfig {
            max_traversal_depth: 1,
            ..LayoutConfig::default()
        };
        let mut sink: Vec<Diagnostic> = Vec::new();
        let paths = enumerate_paths(&graph, &config, &mut sink);
        assert!(sink.is_empty());
        assert_eq!(paths.root_paths, vec![path(&["A", "B", "C", "D", "E"])]);
    }

    #[test]
    fn branch_guard_bounds_cycle_with_side_exits() {
        // B and C loop through their second children, so the branch counter
        // climbs by one per hop until it passes the node total.
        let graph = graph_of(&[("A", "B"), ("B", "X"), ("B", "C"), ("C", "Y"), ("C", "B")]);
        let mut sink: Vec<Diagnostic> = Vec::new();
        let paths = enumerate_paths(&graph, &LayoutConfig::default(), &mut sink);
        assert!(
            sink.iter()
                .any(|d| matches!(d, Diagnostic::DepthGuardExceeded { limit: 5, .. }))
        );
        assert!(!paths.root_paths.is_empty());
        assert!(
            paths
                .root_paths
                .iter()
                .all(|p| p.first().map(String::as_str) == Some("A"))
        );
    }

    #[test]
    fn roots_sorted_longest_first_and_stable() {
        let graph = graph_of(&[("X", "Y"), ("P", "Q"), ("Q", "R"), ("S", "T")]);
        let mut sink: Vec<Diagnostic> = Vec::new();
        let paths = enumerate_paths(&graph, &LayoutConfig::default(), &mut sink);
        assert_eq!(
            paths.root_paths,
            vec![path(&["P", "Q", "R"]), path(&["X", "Y"]), path(&["S", "T"])]
        );
    }

    #[test]
    fn acyclic_graph_has_root_path_per_source() {
        let graph = graph_of(&[("A", "C"), ("B", "C"), ("C", "D"), ("E", "F")]);
        let mut sink: Vec<Diagnostic> = Vec::new();
        let paths = enumerate_paths(&graph, &LayoutConfig::default(), &mut sink);
        for source in ["A", "B", "E"] {
            assert!(
                paths
                    .root_paths
                    .iter()
                    .any(|p| p.first().map(String::as_str) == Some(source)),
                "missing root path from {source}"
            );
        }
    }

    #[test]
    fn empty_graph_yields_nothing() {
        let graph = Graph::new();
        let mut sink: Vec<Diagnostic> = Vec::new();
        let paths = enumerate_paths(&graph, &LayoutConfig::default(), &mut sink);
        assert!(paths.root_paths.is_empty());
        assert!(paths.usage.is_empty());
    }
}
