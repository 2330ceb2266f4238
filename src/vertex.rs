use itertools::Itertools;
use petgraph::graph::{EdgeIndex, NodeIndex};
use strum::VariantArray;

use crate::board::Board;
use crate::constraint::{Action, Deduction, Hypothesis, Status, Violation};
use crate::line::LineId;
use crate::location::Location;
use crate::shape::Direction;

/// What, if anything, is drawn on a grid point.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum VertexKind {
    /// No clue.
    #[default]
    Plain,
    /// A white pearl: the loop passes straight through and turns right before or right after.
    White,
    /// A black pearl: the loop turns here and runs straight through both neighbours.
    Black,
}

impl VertexKind {
    /// Whether this vertex carries a pearl the loop must visit.
    pub fn is_clue(&self) -> bool {
        !matches!(self, Self::Plain)
    }

    pub(crate) fn from_clue(clue: char) -> Option<Self> {
        match clue {
            '.' | '_' | '+' => Some(Self::Plain),
            'O' | 'o' => Some(Self::White),
            '@' | '*' => Some(Self::Black),
            _ => None,
        }
    }

    pub(crate) fn symbol(&self) -> char {
        match self {
            Self::Plain => '+',
            Self::White => 'O',
            Self::Black => '@',
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Vertex {
    // padded; see Location::padded
    pub(crate) location: Location,
    pub(crate) kind: VertexKind,
    // indexed by Direction
    pub(crate) edges: [Option<EdgeIndex>; 4],
    pub(crate) line: Option<LineId>,
}

impl Vertex {
    pub(crate) fn new(location: Location, kind: VertexKind) -> Self {
        Self {
            location,
            kind,
            edges: [None; 4],
            line: None,
        }
    }

    #[inline]
    pub(crate) fn edge(&self, direction: Direction) -> Option<EdgeIndex> {
        self.edges[direction.index()]
    }
}

impl Board {
    pub(crate) fn unknown_edges(&self, vertex: NodeIndex) -> Vec<EdgeIndex> {
        Direction::VARIANTS.iter()
            .filter_map(|direction| self.incident(vertex, *direction))
            .filter(|edge| !self.edge(*edge).state.is_solved())
            .collect_vec()
    }

    /// The loop rules every vertex obeys: zero or two loop edges, never a dead end or a branch.
    pub(crate) fn resolve_plain_vertex(&mut self, vertex: NodeIndex) -> Deduction {
        let unknown = self.unknown_edges(vertex);
        let filled = self.filled_degree(vertex);

        match (unknown.as_slice(), filled) {
            ([], 0 | 2) => Ok(Status::Resolved),
            ([], _) | ([_], 3) => Err(Violation::Degree),
            ([last], _) => {
                // a single loop edge must continue; otherwise nothing more may join
                self.set_filled(*last, filled == 1)?;
                Ok(Status::Resolved)
            }
            ([first, second], 2) => {
                self.set_filled(*first, false)?;
                self.set_filled(*second, false)?;
                Ok(Status::Resolved)
            }
            _ => Ok(Status::Unchanged),
        }
    }

    pub(crate) fn plain_hypotheses(&self, vertex: NodeIndex) -> Vec<Hypothesis> {
        if self.vertex(vertex).line.is_none() {
            return Vec::new();
        }

        // the loop already reaches this vertex, so exactly one unknown edge carries it onward
        let unknown = self.unknown_edges(vertex);
        match unknown.len() {
            2 | 3 => unknown.into_iter()
                .map(|edge| Hypothesis(vec![Action::Fill(edge)]))
                .collect_vec(),
            _ => Vec::new(),
        }
    }
}
