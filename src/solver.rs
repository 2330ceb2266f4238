use std::fmt::{Display, Formatter};
use std::mem;

use itertools::Itertools;
use log::{debug, info, trace, warn};
use thiserror::Error;
use unordered_pair::UnorderedPair;

use crate::board::{Board, Snapshot};
use crate::cell::CellState;
use crate::constraint::{Constraint, Hypothesis, Status, Violation};
use crate::edge::EdgeState;
use crate::location::{Dimension, Location};
use crate::options::{SolverOptions, Statistics};
use crate::transition::{HypothesisPhase, Transition};
use crate::vertex::VertexKind;

/// Reasons [`Puzzle::solve`] may fail.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum SolverFailure {
    /// The clues contradict each other, i.e. the puzzle as stated is unsolvable.
    #[error("puzzle is inconsistent: {0}")]
    Inconsistent(#[from] Violation),
    /// Deduction ran out of steps before the loop was closed.
    /// The partial solution is left in place.
    #[error("deduction stalled before the loop was closed")]
    Stuck,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Propagation {
    Solved,
    Stalled,
}

// the outcome of one trial assignment
enum Trial {
    Solved,
    Survived,
    Rejected,
}

#[derive(Clone, Eq, PartialEq)]
pub(crate) struct Checkpoint {
    board: Snapshot,
    active: Vec<Constraint>,
}

/// A Masyu puzzle and everything deduced about it so far.
///
/// Build one with a [`PuzzleBuilder`](crate::PuzzleBuilder), then call [`solve()`](Self::solve).
/// Solving works in place: after it returns the puzzle holds the loop, or as much of it as could be deduced.
pub struct Puzzle {
    pub(crate) board: Board,
    // rules not yet satisfied, in the order they are swept
    pub(crate) active: Vec<Constraint>,
    statistics: Statistics,
}

impl Puzzle {
    pub(crate) fn new(board: Board, active: Vec<Constraint>) -> Self {
        Self {
            board,
            active,
            statistics: Statistics::default(),
        }
    }

    /// Solve with the default [`SolverOptions`].
    pub fn solve(&mut self) -> Result<(), SolverFailure> {
        self.solve_with(&SolverOptions::default())
    }

    /// Propagate every rule to a fixed point, then, unless disabled, test hypotheses until the puzzle is solved or no
    /// hypothesis makes progress.
    ///
    /// Returns [`SolverFailure::Inconsistent`] as soon as the clues are shown contradictory and [`SolverFailure::Stuck`]
    /// when deduction stalls short of a closed loop.
    pub fn solve_with(&mut self, options: &SolverOptions) -> Result<(), SolverFailure> {
        self.board.recording = options.record_transitions;
        info!("solving {}x{} puzzle with {} pearls", self.board.dims.0, self.board.dims.1, self.board.pearls);

        let mut outcome = self.propagate()?;
        if outcome == Propagation::Stalled && options.hypotheses {
            info!("propagation stalled with {} rules open, testing hypotheses", self.active.len());
            outcome = self.search()?;
        }

        match outcome {
            Propagation::Solved => {
                info!("solved with a loop of {} edges", self.loop_length());
                Ok(())
            }
            Propagation::Stalled => {
                info!("stuck with {} rules open", self.active.len());
                Err(SolverFailure::Stuck)
            }
        }
    }

    /// Sweep the active rules in order, dropping each one that resolves, until a full sweep changes nothing.
    pub(crate) fn propagate(&mut self) -> Result<Propagation, Violation> {
        let mut sweeps = 0;
        loop {
            let (open, progress) = (self.active.len(), self.board.progress);
            let board = &mut self.board;
            let mut violation = None;

            self.active.retain_mut(|constraint| {
                if violation.is_some() {
                    return true;
                }

                match constraint.try_resolve(board) {
                    Ok(Status::Resolved) => false,
                    Ok(Status::Unchanged) => true,
                    Err(reason) => {
                        trace!("{} violated: {reason}", constraint.describe(board));
                        violation = Some(reason);
                        true
                    }
                }
            });
            sweeps += 1;
            self.statistics.sweeps += 1;

            if let Some(reason) = violation {
                debug!("contradiction after {sweeps} sweeps: {reason}");
                return Err(reason);
            }
            if self.active.len() == open && self.board.progress == progress {
                break;
            }
        }

        debug!("fixed point after {sweeps} sweeps, {} rules open", self.active.len());
        if self.board.is_solved() {
            Ok(Propagation::Solved)
        } else {
            Ok(Propagation::Stalled)
        }
    }

    /// One-step lookahead: for each open rule in order, try each of its hypotheses in isolation.
    /// A rule with exactly one consistent hypothesis has it committed, after which the scan restarts.
    fn search(&mut self) -> Result<Propagation, Violation> {
        'scan: loop {
            let mut index = 0;
            while index < self.active.len() {
                let hypotheses = self.active[index].hypotheses(&self.board);
                let subject = self.active[index].describe(&self.board);
                index += 1;
                if hypotheses.is_empty() {
                    continue;
                }

                let mut survivors = Vec::with_capacity(hypotheses.len());
                for hypothesis in hypotheses {
                    match self.test(&hypothesis) {
                        Trial::Solved => return Ok(Propagation::Solved),
                        Trial::Survived => survivors.push(hypothesis),
                        Trial::Rejected => {}
                    }
                }

                match survivors.as_slice() {
                    [] => warn!("every hypothesis for {subject} fails; moving on"),
                    [only] => {
                        debug!("committing the only consistent hypothesis for {subject}: {}", self.board.describe(only));
                        if self.commit(only)? == Propagation::Solved {
                            return Ok(Propagation::Solved);
                        }
                        continue 'scan;
                    }
                    _ => trace!("{} hypotheses for {subject} survive", survivors.len()),
                }
            }

            return Ok(Propagation::Stalled);
        }
    }

    fn test(&mut self, hypothesis: &Hypothesis) -> Trial {
        self.statistics.hypotheses_tried += 1;
        trace!("trying {}", self.board.describe(hypothesis));
        self.board.mark(HypothesisPhase::Trying);

        let checkpoint = self.checkpoint();
        match self.board.apply(hypothesis).and_then(|()| self.propagate()) {
            Ok(Propagation::Solved) => Trial::Solved,
            Ok(Propagation::Stalled) => {
                self.board.mark(HypothesisPhase::Reverted);
                self.restore(checkpoint);
                Trial::Survived
            }
            Err(reason) => {
                trace!("rejected: {reason}");
                self.statistics.hypotheses_rejected += 1;
                self.board.mark(HypothesisPhase::Rejected);
                self.restore(checkpoint);
                Trial::Rejected
            }
        }
    }

    fn commit(&mut self, hypothesis: &Hypothesis) -> Result<Propagation, Violation> {
        self.statistics.hypotheses_kept += 1;
        self.board.mark(HypothesisPhase::Kept);
        self.board.apply(hypothesis)?;
        self.propagate()
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            board: self.board.snapshot(),
            active: self.active.clone(),
        }
    }

    pub(crate) fn restore(&mut self, checkpoint: Checkpoint) {
        self.board.restore(checkpoint.board);
        self.active = checkpoint.active;
    }

    /// Whether the loop is closed and passes every pearl.
    pub fn is_solved(&self) -> bool {
        self.board.is_solved()
    }

    /// The board's size in cells, `(width, height)`.
    pub fn dims(&self) -> (Dimension, Dimension) {
        self.board.dims
    }

    /// The state of the edge joining two adjacent vertices, or `None` if they are not adjacent vertices of this board.
    pub fn edge_state(&self, endpoints: UnorderedPair<Location>) -> Option<EdgeState> {
        let UnorderedPair(from, to) = endpoints;
        self.board.edge_between(from, to).map(|edge| self.board.edge(edge).state)
    }

    /// The state of the cell whose top left vertex is `location`, or `None` outside the board.
    pub fn cell_state(&self, location: Location) -> Option<CellState> {
        let (width, height) = (self.board.dims.0.get(), self.board.dims.1.get());
        (location.0 < width && location.1 < height).then(|| self.board.cell_state(location.padded()))
    }

    /// What is drawn at the vertex `location`, or `None` outside the board.
    pub fn vertex_kind(&self, location: Location) -> Option<VertexKind> {
        let (width, height) = (self.board.dims.0.get(), self.board.dims.1.get());
        (location.0 <= width && location.1 <= height)
            .then(|| self.board.vertex(self.board.vertices[location.padded().as_index()]).kind)
    }

    /// Every edge known to be on the loop, in creation order.
    pub fn loop_edges(&self) -> Vec<UnorderedPair<Location>> {
        self.board.graph.edge_weights()
            .filter(|edge| edge.on_board && edge.state == EdgeState::Filled)
            .map(|edge| {
                let (start, end) = edge.vertices;
                UnorderedPair(self.board.vertex(start).location.unpadded(), self.board.vertex(end).location.unpadded())
            })
            .collect_vec()
    }

    /// The number of edges known to be on the loop.
    pub fn loop_length(&self) -> usize {
        self.board.graph.edge_weights()
            .filter(|edge| edge.on_board && edge.state == EdgeState::Filled)
            .count()
    }

    /// Every state change recorded so far.
    pub fn transitions(&self) -> &[Transition] {
        &self.board.transitions
    }

    /// Drain the recorded state changes, leaving the log empty.
    pub fn take_transitions(&mut self) -> Vec<Transition> {
        mem::take(&mut self.board.transitions)
    }

    /// Work counters accumulated across every solve of this puzzle.
    pub fn statistics(&self) -> Statistics {
        self.statistics
    }
}

impl Display for Puzzle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.board)
    }
}
