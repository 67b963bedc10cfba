use std::collections::BTreeMap;

use crate::ir::NodeId;

pub type Path = Vec<NodeId>;

/// Output of path enumeration: root paths longest first, plus the final usage
/// count of every memoized node in memoization order.
#[derive(Debug, Clone, Default)]
pub struct PathSet {
    pub root_paths: Vec<Path>,
    pub usage: Vec<(NodeId, usize)>,
}

impl PathSet {
    pub fn usage_of(&self, node: &str) -> Option<usize> {
        self.usage
            .iter()
            .find(|(id, _)| id == node)
            .map(|(_, count)| *count)
    }
}

/// 1-indexed grid coordinate: `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

pub type NodePositions = BTreeMap<NodeId, Position>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutMatrix {
    pub rows: Vec<Vec<Option<NodeId>>>,
    /// Index into `rows` of the row holding the longest path.
    pub middle: usize,
}

impl LayoutMatrix {
    pub fn width(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn middle_row(&self) -> Option<&[Option<NodeId>]> {
        self.rows.get(self.middle).map(Vec::as_slice)
    }

    /// Cell lookup with the same 1-indexed coordinates as [`Position`].
    pub fn get(&self, position: Position) -> Option<&NodeId> {
        let row = self.rows.get(position.y.checked_sub(1)?)?;
        row.get(position.x.checked_sub(1)?)?.as_ref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConnectorKind {
    Straight,
    Curved { cx: f64, cy: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Connector {
    pub from: NodeId,
    pub to: NodeId,
    pub x1: usize,
    pub y1: usize,
    pub x2: usize,
    pub y2: usize,
    pub kind: ConnectorKind,
}

impl Connector {
    pub fn is_curved(&self) -> bool {
        matches!(self.kind, ConnectorKind::Curved { .. })
    }
}

#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub root_paths: Vec<Path>,
    pub matrix: LayoutMatrix,
    pub positions: NodePositions,
    pub connectors: Vec<Connector>,
}

impl Layout {
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
