use petgraph::graph::{EdgeIndex, NodeIndex};
use unordered_pair::UnorderedPair;

use crate::board::Board;
use crate::constraint::{Deduction, Status};
use crate::edge::EdgeState;

/// Two adjacent white pearls in a row may not share their connecting edge when extending the line straight through
/// both would run into a third straight segment or close the loop too early.
#[derive(Clone, Eq, PartialEq)]
pub(crate) struct WhitePair {
    pub(crate) edge: EdgeIndex,
    watched: Option<Watched>,
}

// the vertex beyond each pearl, and the edge leading further away from the pair
#[derive(Clone, Copy, Eq, PartialEq)]
struct Watched {
    vertices: Option<UnorderedPair<NodeIndex>>,
    edges: [Option<EdgeIndex>; 2],
}

impl Watched {
    fn beyond(board: &Board, edge: EdgeIndex) -> Self {
        let (first, second) = board.edge(edge).vertices;
        let [back, forth] = board.edge(edge).axis.directions();
        let outer = [board.neighbor(first, back), board.neighbor(second, forth)];

        Self {
            vertices: outer[0].zip(outer[1]).map(UnorderedPair::from),
            edges: [
                outer[0].and_then(|vertex| board.incident(vertex, back)),
                outer[1].and_then(|vertex| board.incident(vertex, forth)),
            ],
        }
    }
}

impl WhitePair {
    pub(crate) fn new(edge: EdgeIndex) -> Self {
        Self { edge, watched: None }
    }

    pub(crate) fn try_resolve(&mut self, board: &mut Board) -> Deduction {
        let edge = self.edge;
        if board.edge(edge).state.is_solved() {
            return Ok(Status::Resolved);
        }

        let watched = *self.watched.get_or_insert_with(|| Watched::beyond(board, edge));
        // straight through both pearls picks up two more pearls before the outer vertices meet
        let closes = watched.vertices.is_some_and(|UnorderedPair(first, second)| {
            board.shared_line(first, second).is_some_and(|line| board.closing_is_premature(line, 2))
        });
        let states = watched.edges.map(|edge| board.edge_state(edge));

        if closes || states.contains(&EdgeState::Filled) {
            board.set_filled(edge, false)?;
            return Ok(Status::Resolved);
        }
        if states.iter().all(|state| *state == EdgeState::Empty) {
            return Ok(Status::Resolved);
        }
        Ok(Status::Unchanged)
    }

    #[cfg(test)]
    pub(crate) fn is_watching(&self) -> bool {
        self.watched.is_some()
    }
}
