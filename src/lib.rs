#![warn(missing_docs)]

//! # `nacre`
//!
//! A deductive solver for [Masyu](https://en.wikipedia.org/wiki/Masyu), the pearl-loop puzzle.
//! Begin by building a puzzle with a [`PuzzleBuilder`], either pearl by pearl or by parsing clue text, then call
//! [`solve()`](Puzzle::solve) on the result. The puzzle is solved in place and can be queried or printed afterwards.
//!
//! A solution is a single closed loop along the grid lines that never touches a vertex twice and
//!
//! 1. passes straight through every white pearl, turning on the vertex before it, after it, or both;
//! 2. turns on every black pearl and runs straight through both of the vertices next to it.
//!
//! # Internals
//! Rather than searching over loops, the solver keeps a three-valued state for every edge (unknown, empty, filled) and
//! every cell (unknown, inside, outside) and repeatedly applies local rules until none of them can say anything new.
//! Cells matter as much as edges: two cells sharing an edge are on the same side of the loop exactly when the edge is
//! empty, which lets the boundary of the board propagate inwards.
//!
//! Filled edges are grouped into lines, chains that grow, merge and finally close. A line may only close once it holds
//! every pearl and is the only line left, which rules out most small loops before they happen.
//!
//! When the rules stall, each remaining rule offers a handful of mutually exclusive trial assignments. Each is tried in
//! isolation and rolled back; if all but one lead to a contradiction, the survivor must hold and is committed. Every
//! state change is logged as a [`Transition`] so a host can replay the deduction step by step.

pub use builder::{BuilderInvalidReason, PuzzleBuilder};
pub use cell::CellState;
pub use constraint::Violation;
pub use edge::EdgeState;
pub use location::{Dimension, Location};
pub use options::{SolverOptions, Statistics};
pub use shape::{Axis, Direction};
pub use solver::{Puzzle, SolverFailure};
pub use transition::{HypothesisPhase, Transition};
pub use vertex::VertexKind;

pub(crate) mod board;
pub mod builder;
pub(crate) mod cell;
pub(crate) mod constraint;
pub(crate) mod edge;
pub(crate) mod line;
pub(crate) mod location;
pub(crate) mod options;
pub(crate) mod pair;
pub(crate) mod pearl;
pub mod shape;
pub(crate) mod solver;
mod tests;
pub(crate) mod transition;
pub(crate) mod vertex;
#[cfg(feature = "wasm")]
pub mod wasm;
