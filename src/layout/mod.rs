mod grid;
mod paths;
mod routing;
pub(crate) mod types;
pub use grid::{GridPlacement, node_positions, place_paths};
pub use paths::enumerate_paths;
pub use routing::{classify_collision, route_connectors};
pub use types::*;

use crate::config::LayoutConfig;
use crate::diagnostics::DiagnosticSink;
use crate::ir::{Connection, Graph};
use crate::parser::parse_input;

/// Run path enumeration, grid placement and connector routing.
///
/// `connections` is the original pair list; duplicates produce duplicate
/// connectors and pairs with an unplaced endpoint are skipped.
pub fn compute_layout<S: DiagnosticSink + ?Sized>(
    graph: &Graph,
    connections: &[Connection],
    config: &LayoutConfig,
    sink: &mut S,
) -> Layout {
    let path_set = enumerate_paths(graph, config, sink);
    let GridPlacement { matrix, positions } = place_paths(&path_set.root_paths);
    let connectors = route_connectors(connections, &positions, config, sink);
    tracing::debug!(
        rows = matrix.height(),
        columns = matrix.width(),
        connectors = connectors.len(),
        "layout computed"
    );
    Layout {
        root_paths: path_set.root_paths,
        matrix,
        positions,
        connectors,
    }
}

pub fn layout_from_text<S: DiagnosticSink + ?Sized>(
    input: &str,
    config: &LayoutConfig,
    sink: &mut S,
) -> Layout {
    let parsed = parse_input(input);
    compute_layout(&parsed.graph, &parsed.connections, config, sink)
}
