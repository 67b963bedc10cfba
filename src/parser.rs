use crate::ir::{Connection, Graph};
use once_cell::sync::Lazy;
use regex::Regex;

static SEPARATOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*,\s*").unwrap());

#[derive(Debug, Default)]
pub struct ParseOutput {
    pub connections: Vec<Connection>,
    pub graph: Graph,
}

/// Parse connection text and build the adjacency mapping from it.
pub fn parse_input(input: &str) -> ParseOutput {
    let connections = parse_connections(input);
    let graph = Graph::from_connections(&connections);
    ParseOutput { connections, graph }
}

/// Turn lines such as `a, b, c` into the ordered pairs `(A, B), (B, C)`.
///
/// Identifiers are upper-cased and trimmed. Lines with fewer than two tokens
/// contribute nothing.
pub fn parse_connections(input: &str) -> Vec<Connection> {
    let normalized = input.to_uppercase();
    let mut connections = Vec::new();
    for raw_line in normalized.lines() {
        let line = raw_line.trim();
        if line.is_empty() || is_comment(line) {
            continue;
        }
        let tokens: Vec<&str> = SEPARATOR_RE
            .split(line)
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .collect();
        for pair in tokens.windows(2) {
            if let [from, to] = pair {
                connections.push(Connection::new(*from, *to));
            }
        }
    }
    connections
}

fn is_comment(line: &str) -> bool {
    line.starts_with("%%") || line.starts_with('#')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_chain_into_pairs() {
        let connections = parse_connections("a,b,c");
        assert_eq!(
            connections,
            vec![Connection::new("A", "B"), Connection::new("B", "C")]
        );
    }

    #[test]
    fn parse_trims_and_normalizes_case() {
        let connections = parse_connections("  start ,  Middle\nmiddle,end  ");
        assert_eq!(
            connections,
            vec![
                Connection::new("START", "MIDDLE"),
                Connection::new("MIDDLE", "END"),
            ]
        );
    }

    #[test]
    fn parse_ignores_short_lines_and_comments() {
        let input = "lonely\n\n%% a comment\n# another\nx,y\n,\n";
        let connections = parse_connections(input);
        assert_eq!(connections, vec![Connection::new("X", "Y")]);
    }

    #[test]
    fn parse_drops_empty_tokens() {
        let connections = parse_connections("a,,b");
        assert_eq!(connections, vec![Connection::new("A", "B")]);
    }

    #[test]
    fn parse_input_builds_graph() {
        let parsed = parse_input("a,b\na,c\nb,d\nc,d\na,b");
        assert_eq!(parsed.connections.len(), 5);
        assert_eq!(parsed.graph.node_count(), 4);
        assert_eq!(
            parsed.graph.neighbors("A").unwrap(),
            &["B".to_string(), "C".to_string()]
        );
        assert!(parsed.graph.is_sink("D"));
    }
}
