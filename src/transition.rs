use crate::cell::CellState;
use crate::edge::EdgeState;
use crate::location::Location;

/// A single observable step of the solve, for hosts that replay or animate it.
///
/// Only edges and cells on the board proper are reported, in board coordinates.
/// Rolling back a rejected hypothesis is reported too, as the edges and cells returning to their earlier states.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Transition {
    /// An edge changed state.
    Edge {
        /// The edge's vertices, left or top first.
        endpoints: (Location, Location),
        /// The state it changed to.
        state: EdgeState,
    },
    /// A cell changed state.
    Cell {
        /// The cell, named by its top left vertex.
        location: Location,
        /// The state it changed to.
        state: CellState,
    },
    /// The search moved through a hypothesis.
    Hypothesis(HypothesisPhase),
}

/// Where in its life a trial assignment is.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum HypothesisPhase {
    /// A trial assignment is about to be applied.
    Trying = 0,
    /// The trial led to a contradiction and is being rolled back.
    Rejected = 1,
    /// The trial was consistent but inconclusive and is being rolled back.
    Reverted = 2,
    /// The only consistent trial of its constraint is being committed.
    Kept = 3,
}
