use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::board::Board;
use crate::constraint::{Deduction, Status};
use crate::line::LineId;
use crate::location::Location;
use crate::shape::Axis;

/// Whether the loop uses a given unit segment.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum EdgeState {
    /// Not deduced yet.
    #[default]
    Unknown = 0,
    /// Known not to be part of the loop.
    Empty = 1,
    /// Known to be part of the loop.
    Filled = 2,
}

impl EdgeState {
    /// Whether this state is known.
    pub fn is_solved(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    pub(crate) fn from_filled(filled: bool) -> Self {
        if filled {
            Self::Filled
        } else {
            Self::Empty
        }
    }

    pub(crate) fn symbol(&self, axis: Axis) -> char {
        match (self, axis) {
            (Self::Unknown, _) => '?',
            (Self::Empty, _) => ' ',
            (Self::Filled, Axis::Horizontal) => '-',
            (Self::Filled, Axis::Vertical) => '|',
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Edge {
    pub(crate) axis: Axis,
    // left or top first
    pub(crate) vertices: (NodeIndex, NodeIndex),
    // padded; above then below for horizontal edges, left then right for vertical ones
    pub(crate) cells: (Location, Location),
    pub(crate) state: EdgeState,
    pub(crate) line: Option<LineId>,
    // halo edges are fixed empty at build time and never reported
    pub(crate) on_board: bool,
}

impl Edge {
    pub(crate) fn new(axis: Axis, vertices: (NodeIndex, NodeIndex), cells: (Location, Location), on_board: bool) -> Self {
        Self {
            axis,
            vertices,
            cells,
            state: EdgeState::Unknown,
            line: None,
            on_board,
        }
    }

    pub(crate) fn other_vertex(&self, vertex: NodeIndex) -> NodeIndex {
        if self.vertices.0 == vertex {
            self.vertices.1
        } else {
            self.vertices.0
        }
    }

    pub(crate) fn other_cell(&self, cell: Location) -> Location {
        if self.cells.0 == cell {
            self.cells.1
        } else {
            self.cells.0
        }
    }
}

impl Board {
    pub(crate) fn resolve_edge(&mut self, index: EdgeIndex) -> Deduction {
        let Edge { state, cells: (first, second), vertices: (start, end), .. } = *self.edge(index);
        if state.is_solved() {
            return Ok(Status::Resolved);
        }

        let sides = (self.cell_state(first), self.cell_state(second));
        if sides.0.is_solved() && sides.1.is_solved() {
            self.set_filled(index, sides.0 != sides.1)?;
            return Ok(Status::Resolved);
        }

        // joining two ends of the same unfinished line would close it early
        if self.shared_line(start, end).is_some_and(|line| self.closing_is_premature(line, 0)) {
            self.set_filled(index, false)?;
            return Ok(Status::Resolved);
        }

        Ok(Status::Unchanged)
    }
}
