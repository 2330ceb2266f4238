use petgraph::graph::EdgeIndex;

use crate::board::Board;
use crate::constraint::{Deduction, Status};
use crate::edge::EdgeState;
use crate::location::Location;

/// Which side of the loop a cell lies on.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum CellState {
    /// Not deduced yet.
    #[default]
    Unknown = 0,
    /// Enclosed by the loop.
    Innie = 1,
    /// Outside the loop.
    Outie = 2,
}

impl CellState {
    /// Whether this state is known.
    pub fn is_solved(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    pub(crate) fn inverse(&self) -> Self {
        match self {
            Self::Unknown => Self::Unknown,
            Self::Innie => Self::Outie,
            Self::Outie => Self::Innie,
        }
    }

    /// The state of the cell on the other side of an edge in the given state.
    pub(crate) fn across(&self, edge: EdgeState) -> Self {
        match edge {
            EdgeState::Unknown => Self::Unknown,
            EdgeState::Empty => *self,
            EdgeState::Filled => self.inverse(),
        }
    }

    pub(crate) fn symbol(&self) -> char {
        match self {
            Self::Innie => '#',
            Self::Unknown | Self::Outie => ' ',
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Cell {
    pub(crate) state: CellState,
    // indexed by Direction; a halo cell lacks the sides that would leave the arena
    pub(crate) edges: [Option<EdgeIndex>; 4],
}

impl Board {
    /// A cell takes its state from any neighbour across a solved edge.
    pub(crate) fn resolve_cell(&mut self, location: Location) -> Deduction {
        let cell = self.cells[location.as_index()];
        if cell.state.is_solved() {
            return Ok(Status::Resolved);
        }

        let inferred = cell.edges.iter().flatten().find_map(|index| {
            let edge = self.edge(*index);
            let neighbour = self.cell_state(edge.other_cell(location));
            (edge.state.is_solved() && neighbour.is_solved()).then(|| neighbour.across(edge.state))
        });

        match inferred {
            Some(state) => {
                self.set_cell(location, state)?;
                Ok(Status::Resolved)
            }
            None => Ok(Status::Unchanged),
        }
    }
}
