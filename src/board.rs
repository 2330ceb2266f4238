use std::fmt::{Display, Formatter};

use itertools::Itertools;
use log::trace;
use ndarray::Array2;
use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use strum::VariantArray;

use crate::cell::{Cell, CellState};
use crate::constraint::{Action, Hypothesis, Violation};
use crate::edge::{Edge, EdgeState};
use crate::line::{LineId, Lines};
use crate::location::{Dimension, Location};
use crate::shape::{Axis, Direction};
use crate::transition::{HypothesisPhase, Transition};
use crate::vertex::Vertex;

/// The mutable state of a puzzle: every vertex, edge and cell, plus the lines formed so far.
///
/// All three arenas include a one-unit halo around the board proper whose edges are fixed [`EdgeState::Empty`] and
/// whose cells are fixed [`CellState::Outie`], so no rule needs a boundary special case.
pub(crate) struct Board {
    pub(crate) graph: UnGraph<Vertex, Edge>,
    // padded, indexed [[y, x]]
    pub(crate) vertices: Array2<NodeIndex>,
    pub(crate) cells: Array2<Cell>,
    pub(crate) lines: Lines,
    pub(crate) pearls: usize,
    // bumped on every edge or cell commit
    pub(crate) progress: usize,
    // width, height
    pub(crate) dims: (Dimension, Dimension),
    pub(crate) transitions: Vec<Transition>,
    pub(crate) recording: bool,
}

/// Everything a trial assignment may touch, captured by value.
#[derive(Clone, Eq, PartialEq)]
pub(crate) struct Snapshot {
    edges: Vec<(EdgeState, Option<LineId>)>,
    vertices: Vec<Option<LineId>>,
    cells: Array2<CellState>,
    lines: Lines,
    progress: usize,
}

impl Board {
    pub(crate) fn new(graph: UnGraph<Vertex, Edge>, vertices: Array2<NodeIndex>, dims: (Dimension, Dimension)) -> Self {
        let (width, height) = (dims.0.get(), dims.1.get());
        let pearls = graph.node_weights().filter(|vertex| vertex.kind.is_clue()).count();

        Self {
            graph,
            vertices,
            cells: Array2::from_shape_simple_fn((height + 2, width + 2), Cell::default),
            lines: Lines::default(),
            pearls,
            progress: 0,
            dims,
            transitions: Vec::new(),
            recording: true,
        }
    }

    #[inline]
    pub(crate) fn vertex(&self, index: NodeIndex) -> &Vertex {
        &self.graph[index]
    }

    #[inline]
    pub(crate) fn edge(&self, index: EdgeIndex) -> &Edge {
        &self.graph[index]
    }

    #[inline]
    pub(crate) fn incident(&self, vertex: NodeIndex, direction: Direction) -> Option<EdgeIndex> {
        self.vertex(vertex).edge(direction)
    }

    /// The vertex one step away, if the arena extends that far.
    pub(crate) fn neighbor(&self, vertex: NodeIndex, direction: Direction) -> Option<NodeIndex> {
        self.incident(vertex, direction).map(|edge| self.edge(edge).other_vertex(vertex))
    }

    /// The edge leaving the neighbor in `direction` along the same heading.
    pub(crate) fn continuation(&self, vertex: NodeIndex, direction: Direction) -> Option<EdgeIndex> {
        self.neighbor(vertex, direction).and_then(|next| self.incident(next, direction))
    }

    /// State of a possibly missing edge. Edges beyond the arena behave as if empty.
    pub(crate) fn edge_state(&self, edge: Option<EdgeIndex>) -> EdgeState {
        edge.map_or(EdgeState::Empty, |edge| self.edge(edge).state)
    }

    pub(crate) fn cell_state(&self, location: Location) -> CellState {
        self.cells.get(location.as_index()).map_or(CellState::Unknown, |cell| cell.state)
    }

    pub(crate) fn filled_degree(&self, vertex: NodeIndex) -> usize {
        Direction::VARIANTS.iter()
            .filter(|direction| self.edge_state(self.incident(vertex, **direction)) == EdgeState::Filled)
            .count()
    }

    pub(crate) fn filled_along(&self, vertex: NodeIndex, axis: Axis) -> usize {
        axis.directions().iter()
            .filter(|direction| self.edge_state(self.incident(vertex, **direction)) == EdgeState::Filled)
            .count()
    }

    /// Whether either edge of `vertex` perpendicular to `axis` is filled, i.e. the loop turns there.
    pub(crate) fn turns_across(&self, vertex: NodeIndex, axis: Axis) -> bool {
        self.filled_along(vertex, axis.perpendicular()) > 0
    }

    /// Look up the edge joining two adjacent board vertices, given in board coordinates.
    pub(crate) fn edge_between(&self, from: Location, to: Location) -> Option<EdgeIndex> {
        let (width, height) = (self.dims.0.get(), self.dims.1.get());
        if from.0 > width || from.1 > height || to.0 > width || to.1 > height {
            return None;
        }

        let origin = self.vertices[from.padded().as_index()];
        let direction = Direction::VARIANTS.iter().find(|direction| direction.attempt_from(from) == to)?;
        self.incident(origin, *direction)
    }

    /// Commit an edge, refusing any assignment that contradicts what is already known.
    ///
    /// Filling an edge also updates the line set and, when exactly one of its cells is known, fixes the other.
    pub(crate) fn set_filled(&mut self, index: EdgeIndex, filled: bool) -> Result<(), Violation> {
        let target = EdgeState::from_filled(filled);
        let Edge { state, cells: (first, second), vertices: (start, end), .. } = *self.edge(index);
        if state.is_solved() {
            return if state == target { Ok(()) } else { Err(Violation::Conflict) };
        }

        let sides = (self.cell_state(first), self.cell_state(second));
        if sides.0.is_solved() && sides.1.is_solved() && (sides.0 != sides.1) != filled {
            return Err(Violation::Parity);
        }
        if filled {
            if self.filled_degree(start) >= 2 || self.filled_degree(end) >= 2 {
                return Err(Violation::Branching);
            }
            if self.shared_line(start, end).is_some_and(|line| self.closing_is_premature(line, 0)) {
                return Err(Violation::PrematureLoop);
            }
        }

        self.graph[index].state = target;
        self.progress += 1;
        self.record_edge(index);
        if filled {
            self.track_filled(index);
        }

        match (sides.0.is_solved(), sides.1.is_solved()) {
            (true, false) => self.set_cell(second, sides.0.across(target)),
            (false, true) => self.set_cell(first, sides.1.across(target)),
            _ => Ok(()),
        }
    }

    /// As [`Self::set_filled`], where a missing edge may only ever be empty.
    pub(crate) fn set_filled_at(&mut self, index: Option<EdgeIndex>, filled: bool) -> Result<(), Violation> {
        match index {
            Some(index) => self.set_filled(index, filled),
            None if filled => Err(Violation::OutOfBounds),
            None => Ok(()),
        }
    }

    pub(crate) fn set_cell(&mut self, location: Location, state: CellState) -> Result<(), Violation> {
        debug_assert!(state.is_solved());
        let Some(cell) = self.cells.get_mut(location.as_index()) else {
            return Err(Violation::OutOfBounds);
        };
        if cell.state.is_solved() {
            return if cell.state == state { Ok(()) } else { Err(Violation::Parity) };
        }

        cell.state = state;
        self.progress += 1;
        self.record_cell(location);
        Ok(())
    }

    /// Initial knowledge derived while wiring the board, bypassing every guard.
    pub(crate) fn fix_edge(&mut self, index: EdgeIndex, state: EdgeState) {
        let edge = &mut self.graph[index];
        assert!(!edge.state.is_solved() || edge.state == state, "edge fixed twice with different states");
        edge.state = state;
        self.record_edge(index);
    }

    pub(crate) fn fix_cell(&mut self, location: Location, state: CellState) {
        self.cells[location.as_index()].state = state;
        self.record_cell(location);
    }

    pub(crate) fn apply(&mut self, hypothesis: &Hypothesis) -> Result<(), Violation> {
        for action in &hypothesis.0 {
            match *action {
                Action::Fill(edge) => self.set_filled(edge, true)?,
                Action::Clear(edge) => self.set_filled(edge, false)?,
            }
        }
        Ok(())
    }

    pub(crate) fn is_solved(&self) -> bool {
        self.lines.len() == 1 && self.lines.iter().all(|line| line.is_closed() && line.pearls == self.pearls)
    }

    pub(crate) fn snapshot(&self) -> Snapshot {
        Snapshot {
            edges: self.graph.edge_weights().map(|edge| (edge.state, edge.line)).collect_vec(),
            vertices: self.graph.node_weights().map(|vertex| vertex.line).collect_vec(),
            cells: self.cells.map(|cell| cell.state),
            lines: self.lines.clone(),
            progress: self.progress,
        }
    }

    /// Roll back to `snapshot`, reporting every edge and cell whose state changes on the way.
    pub(crate) fn restore(&mut self, snapshot: Snapshot) {
        for (index, (state, line)) in self.graph.edge_indices().zip(snapshot.edges) {
            let edge = &mut self.graph[index];
            let reverted = edge.state != state;
            edge.state = state;
            edge.line = line;
            if reverted {
                self.record_edge(index);
            }
        }

        for (index, line) in self.graph.node_indices().zip(snapshot.vertices) {
            self.graph[index].line = line;
        }

        let reverted = self.cells.indexed_iter_mut()
            .zip(snapshot.cells.iter())
            .filter_map(|((index, cell), state)| {
                let changed = cell.state != *state;
                cell.state = *state;
                changed.then(|| Location::from(index))
            })
            .collect_vec();
        for location in reverted {
            self.record_cell(location);
        }

        self.lines = snapshot.lines;
        self.progress = snapshot.progress;
    }

    fn record_edge(&mut self, index: EdgeIndex) {
        let Edge { vertices: (start, end), state, on_board, .. } = *self.edge(index);
        if !self.recording || !on_board {
            return;
        }

        let endpoints = (self.vertex(start).location.unpadded(), self.vertex(end).location.unpadded());
        self.transitions.push(Transition::Edge { endpoints, state });
    }

    fn record_cell(&mut self, location: Location) {
        if !self.recording || !location.within_padded((self.dims.0.get(), self.dims.1.get())) {
            return;
        }

        let state = self.cell_state(location);
        self.transitions.push(Transition::Cell { location: location.unpadded(), state });
    }

    pub(crate) fn mark(&mut self, phase: HypothesisPhase) {
        trace!("hypothesis {phase:?}");
        if self.recording {
            self.transitions.push(Transition::Hypothesis(phase));
        }
    }

    pub(crate) fn describe_edge(&self, index: EdgeIndex) -> String {
        let (start, end) = self.edge(index).vertices;
        format!("{}-{}", self.vertex(start).location.unpadded(), self.vertex(end).location.unpadded())
    }

    pub(crate) fn describe(&self, hypothesis: &Hypothesis) -> String {
        hypothesis.0.iter()
            .map(|action| match action {
                Action::Fill(edge) => format!("fill {}", self.describe_edge(*edge)),
                Action::Clear(edge) => format!("clear {}", self.describe_edge(*edge)),
            })
            .join(", ")
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let (width, height) = (self.dims.0.get(), self.dims.1.get());
        let mut out = String::with_capacity((2 * height + 1) * (2 * width + 2));

        for y in 1..=height + 1 {
            for x in 1..=width + 1 {
                let vertex = self.vertices[[y, x]];
                out.push(self.vertex(vertex).kind.symbol());
                if x <= width {
                    out.push(self.edge_state(self.incident(vertex, Direction::Right)).symbol(Axis::Horizontal));
                }
            }
            out.push('\n');

            if y > height {
                break;
            }
            for x in 1..=width + 1 {
                let vertex = self.vertices[[y, x]];
                out.push(self.edge_state(self.incident(vertex, Direction::Down)).symbol(Axis::Vertical));
                if x <= width {
                    out.push(self.cell_state(Location(x, y)).symbol());
                }
            }
            out.push('\n');
        }

        write!(f, "{out}")
    }
}
