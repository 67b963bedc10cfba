use std::collections::HashSet;

use crate::ir::NodeId;

use super::{LayoutMatrix, NodePositions, Path, Position};

type Row = Vec<Option<NodeId>>;

/// Rows growing away from the middle row; index 0 is the row nearest to it.
#[derive(Debug, Default)]
struct RowStack {
    rows: Vec<Row>,
}

impl RowStack {
    fn push_empty(&mut self, width: usize) {
        self.rows.push(vec![None; width]);
    }

    /// Shallowest row with a free cell in `column`.
    fn find_gap(&self, column: usize) -> Option<usize> {
        self.rows
            .iter()
            .position(|row| matches!(row.get(column), Some(None)))
    }

    fn set(&mut self, depth: usize, column: usize, node: &str) -> bool {
        match self.rows.get_mut(depth).and_then(|row| row.get_mut(column)) {
            Some(cell) => {
                *cell = Some(node.to_string());
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GridPlacement {
    pub matrix: LayoutMatrix,
    pub positions: NodePositions,
}

struct GridBuilder {
    width: usize,
    middle: Row,
    top: RowStack,
    bottom: RowStack,
    placed: HashSet<NodeId>,
}

impl GridBuilder {
    fn new(first: &[NodeId], width: usize) -> Self {
        let mut middle: Row = first.iter().cloned().map(Some).collect();
        middle.resize(width, None);
        let placed = first.iter().cloned().collect();
        let mut builder = Self {
            width,
            middle,
            top: RowStack::default(),
            bottom: RowStack::default(),
            placed,
        };
        builder.expand();
        builder
    }

    fn expand(&mut self) {
        self.top.push_empty(self.width);
        self.bottom.push_empty(self.width);
    }

    fn place(&mut self, node: &str, column: usize) {
        if self.placed.contains(node) {
            return;
        }
        let placed = match (self.bottom.find_gap(column), self.top.find_gap(column)) {
            (Some(bottom), Some(top)) if top < bottom => self.top.set(top, column, node),
            (Some(bottom), _) => self.bottom.set(bottom, column, node),
            (None, Some(top)) => self.top.set(top, column, node),
            (None, None) => {
                self.expand();
                let depth = self.bottom.rows.len().saturating_sub(1);
                self.bottom.set(depth, column, node)
            }
        };
        if placed {
            self.placed.insert(node.to_string());
        }
    }

    fn into_matrix(self) -> LayoutMatrix {
        let mut top = self.top.rows;
        if top
            .last()
            .is_some_and(|row| row.iter().all(Option::is_none))
        {
            top.pop();
        }
        let middle = top.len();
        let mut rows: Vec<Row> = top.into_iter().rev().collect();
        rows.push(self.middle);
        rows.extend(self.bottom.rows);
        LayoutMatrix { rows, middle }
    }
}

/// Place sorted root paths on a grid.
///
/// The first path fills the middle row column by column. Nodes of later paths
/// keep their path index as column and take the shallowest free cell below or
/// above the middle row, preferring below unless above is strictly shallower.
pub fn place_paths(paths: &[Path]) -> GridPlacement {
    let Some((first, rest)) = paths.split_first() else {
        return GridPlacement::default();
    };
    let width = paths.iter().map(Vec::len).max().unwrap_or(0);
    let mut builder = GridBuilder::new(first, width);
    for path in rest {
        for (column, node) in path.iter().enumerate() {
            builder.place(node, column);
        }
    }
    let matrix = builder.into_matrix();
    let positions = node_positions(&matrix);
    GridPlacement { matrix, positions }
}

pub fn node_positions(matrix: &LayoutMatrix) -> NodePositions {
    let mut positions = NodePositions::new();
    for (y, row) in matrix.rows.iter().enumerate() {
        for (x, cell) in row.iter().enumerate() {
            if let Some(node) = cell {
                positions.insert(node.clone(), Position::new(x + 1, y + 1));
            }
        }
    }
    positions
}
