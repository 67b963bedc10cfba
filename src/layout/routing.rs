use crate::config::LayoutConfig;
use crate::diagnostics::{Collision, Diagnostic, DiagnosticSink};
use crate::ir::Connection;

use super::{Connector, ConnectorKind, NodePositions, Position};

/// Minimum cell distance at which a straight line crosses another cell.
const COLLISION_GAP: usize = 1;

/// Detect whether a straight line between two cells passes over a third one.
///
/// Checks run horizontal, vertical, then diagonal; the first hit is returned.
pub fn classify_collision(from: Position, to: Position) -> Option<Collision> {
    let dx = from.x.abs_diff(to.x);
    let dy = from.y.abs_diff(to.y);
    if from.y == to.y && dx > COLLISION_GAP {
        return Some(Collision::Horizontal);
    }
    if from.x == to.x && dy > COLLISION_GAP {
        return Some(Collision::Vertical);
    }
    if dx == dy && dx > COLLISION_GAP {
        return Some(Collision::Diagonal);
    }
    None
}

fn control_point(from: Position, to: Position, bow: f64) -> (f64, f64) {
    let cx = (from.x + to.x) as f64 / 2.0;
    let row = if from.y == to.y {
        from.y as f64
    } else {
        (from.y + to.y) as f64 / 2.0
    };
    (cx, row * bow)
}

/// Build one connector per connection whose endpoints were both placed.
pub fn route_connectors<S: DiagnosticSink + ?Sized>(
    connections: &[Connection],
    positions: &NodePositions,
    config: &LayoutConfig,
    sink: &mut S,
) -> Vec<Connector> {
    let mut connectors = Vec::with_capacity(connections.len());
    for connection in connections {
        let (Some(&from), Some(&to)) = (
            positions.get(&connection.from),
            positions.get(&connection.to),
        ) else {
            continue;
        };

        let kind = match classify_collision(from, to) {
            Some(collision) => {
                sink.report(Diagnostic::LineCollision {
                    from: connection.from.clone(),
                    to: connection.to.clone(),
                    kind: collision,
                });
                let (cx, cy) = control_point(from, to, config.curve_bow);
                ConnectorKind::Curved { cx, cy }
            }
            None => ConnectorKind::Straight,
        };

        connectors.push(Connector {
            from: connection.from.clone(),
            to: connection.to.clone(),
            x1: from.x,
            y1: from.y,
            x2: to.x,
            y2: to.y,
            kind,
        });
    }
    connectors
}
