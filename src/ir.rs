use std::collections::HashMap;

pub type NodeId = String;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub from: NodeId,
    pub to: NodeId,
}

impl Connection {
    pub fn new(from: impl Into<NodeId>, to: impl Into<NodeId>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Adjacency mapping with first-seen node order.
///
/// Every neighbor listed for a node is itself a key, so sinks show up with an
/// empty neighbor list.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    order: Vec<NodeId>,
    neighbors: HashMap<NodeId, Vec<NodeId>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_connections(connections: &[Connection]) -> Self {
        let mut graph = Self::new();
        for connection in connections {
            graph.add_edge(&connection.from, &connection.to);
        }
        graph
    }

    pub fn ensure_node(&mut self, id: &str) {
        if !self.neighbors.contains_key(id) {
            self.neighbors.insert(id.to_string(), Vec::new());
            self.order.push(id.to_string());
        }
    }

    pub fn add_edge(&mut self, from: &str, to: &str) {
        self.ensure_node(from);
        self.ensure_node(to);
        if let Some(list) = self.neighbors.get_mut(from) {
            if !list.iter().any(|existing| existing == to) {
                list.push(to.to_string());
            }
        }
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeId> {
        self.order.iter()
    }

    pub fn neighbors(&self, id: &str) -> Option<&[NodeId]> {
        self.neighbors.get(id).map(Vec::as_slice)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.neighbors.contains_key(id)
    }

    pub fn is_sink(&self, id: &str) -> bool {
        self.neighbors(id).is_some_and(|list| list.is_empty())
    }

    pub fn node_count(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbors_keep_first_seen_order_without_duplicates() {
        let mut graph = Graph::new();
        graph.add_edge("A", "C");
        graph.add_edge("A", "B");
        graph.add_edge("A", "C");
        assert_eq!(
            graph.neighbors("A").unwrap(),
            &["C".to_string(), "B".to_string()]
        );
        let order: Vec<&str> = graph.nodes().map(String::as_str).collect();
        assert_eq!(order, vec!["A", "C", "B"]);
    }

    #[test]
    fn neighbors_are_registered_as_sinks() {
        let graph = Graph::from_connections(&[Connection::new("A", "B")]);
        assert!(graph.contains("B"));
        assert!(graph.is_sink("B"));
        assert!(!graph.is_sink("A"));
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn self_loop_is_kept_as_edge() {
        let graph = Graph::from_connections(&[Connection::new("A", "A")]);
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.neighbors("A").unwrap(), &["A".to_string()]);
    }
}
