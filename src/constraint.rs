use petgraph::graph::{EdgeIndex, NodeIndex};
use thiserror::Error;

use crate::board::Board;
use crate::location::Location;
use crate::pair::WhitePair;
use crate::vertex::VertexKind;

/// Ways a partial assignment can be shown impossible.
#[derive(Clone, Copy, Debug, Eq, Error, Hash, PartialEq)]
pub enum Violation {
    /// An edge or cell was asked to take the opposite of its known state.
    #[error("an edge was assigned both filled and empty")]
    Conflict,
    /// The cells on either side of an edge disagree with the edge.
    #[error("cell sides disagree with the loop")]
    Parity,
    /// A vertex would touch three loop edges.
    #[error("the loop would branch")]
    Branching,
    /// A vertex would touch exactly one or more than two loop edges once all its edges are known.
    #[error("a vertex has an invalid number of loop edges")]
    Degree,
    /// A line would close into a loop that misses pearls or leaves other lines behind.
    #[error("the loop would close before visiting every pearl")]
    PrematureLoop,
    /// The loop turns on a white pearl.
    #[error("the loop turns on a white pearl")]
    TurnOnWhite,
    /// The loop runs straight through a white pearl and both of its neighbours.
    #[error("the loop fails to turn next to a white pearl")]
    UnturnedWhite,
    /// A pearl has no loop edge at all.
    #[error("a pearl is not on the loop")]
    PearlOffLoop,
    /// The loop would leave the board.
    #[error("the loop would leave the board")]
    OutOfBounds,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Status {
    /// Nothing this constraint can say any more; drop it.
    Resolved,
    Unchanged,
}

pub(crate) type Deduction = Result<Status, Violation>;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Action {
    Fill(EdgeIndex),
    Clear(EdgeIndex),
}

/// A trial assignment, applied action by action.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Hypothesis(pub(crate) Vec<Action>);

/// One local rule still waiting to be satisfied.
#[derive(Clone, Eq, PartialEq)]
pub(crate) enum Constraint {
    Vertex(NodeIndex),
    Edge(EdgeIndex),
    Cell(Location),
    WhitePair(WhitePair),
}

impl Constraint {
    /// Deduce what this constraint can from the current state, writing through `board`.
    pub(crate) fn try_resolve(&mut self, board: &mut Board) -> Deduction {
        match self {
            Self::Vertex(vertex) => match board.vertex(*vertex).kind {
                VertexKind::Plain => board.resolve_plain_vertex(*vertex),
                VertexKind::White => board.resolve_white(*vertex),
                VertexKind::Black => board.resolve_black(*vertex),
            },
            Self::Edge(edge) => board.resolve_edge(*edge),
            Self::Cell(location) => board.resolve_cell(*location),
            Self::WhitePair(pair) => pair.try_resolve(board),
        }
    }

    /// Mutually exclusive trial assignments covering every way this constraint could still be satisfied.
    pub(crate) fn hypotheses(&self, board: &Board) -> Vec<Hypothesis> {
        match self {
            Self::Vertex(vertex) => match board.vertex(*vertex).kind {
                VertexKind::Plain => board.plain_hypotheses(*vertex),
                VertexKind::White => board.white_hypotheses(*vertex),
                VertexKind::Black => board.black_hypotheses(*vertex),
            },
            _ => Vec::new(),
        }
    }

    pub(crate) fn describe(&self, board: &Board) -> String {
        match self {
            Self::Vertex(vertex) => {
                let vertex = board.vertex(*vertex);
                format!("{:?} vertex {}", vertex.kind, vertex.location.unpadded())
            }
            Self::Edge(edge) => format!("edge {}", board.describe_edge(*edge)),
            Self::Cell(location) => format!("cell {}", location.unpadded()),
            Self::WhitePair(pair) => format!("white pair {}", board.describe_edge(pair.edge)),
        }
    }
}
