use std::num::{NonZero, TryFromIntError};

use itertools::Itertools;
use js_sys::Uint32Array;
use wasm_bindgen::prelude::*;

use crate::builder::{BuilderInvalidReason, PuzzleBuilder};
use crate::location::{Dimension, Location};
use crate::solver::SolverFailure;
use crate::transition::Transition;
use crate::vertex::VertexKind;

/// The outcome of [`solve`], handed to the host page.
#[wasm_bindgen]
pub struct Solution {
    solved: bool,
    steps: Vec<u32>,
}

#[wasm_bindgen]
impl Solution {
    /// Whether the loop was found.
    #[wasm_bindgen(getter)]
    pub fn solved(&self) -> bool {
        self.solved
    }

    /// Every recorded transition, flattened to six numbers each: kind, x1, y1, x2, y2, state.
    ///
    /// Kind 0 is an edge between two vertices, kind 1 a cell (whose second coordinate pair repeats the first) and kind
    /// 2 a hypothesis marker whose state is its phase.
    #[wasm_bindgen(getter)]
    pub fn steps(&self) -> Uint32Array {
        Uint32Array::from(self.steps.as_slice())
    }
}

/// Solve a `width` by `height` puzzle from the clues on its `(width + 1) * (height + 1)` vertices, one character each in
/// row-major order. Whitespace is ignored, so rows may be separated by line breaks.
#[wasm_bindgen]
pub fn solve(width: usize, height: usize, clues: &str) -> Result<Solution, JsError> {
    let (Some(width), Some(height)) = (NonZero::new(width), NonZero::new(height)) else {
        return Err(JsError::new(&BuilderInvalidReason::TooSmall.to_string()));
    };

    let builder = parse_clues((width, height), clues).map_err(|reason| JsError::new(&reason.to_string()))?;
    let mut puzzle = builder.build()
        .map_err(|reasons| JsError::new(&reasons.iter().join("; ")))?;

    let solved = match puzzle.solve() {
        Ok(()) => true,
        Err(SolverFailure::Stuck | SolverFailure::Inconsistent(_)) => false,
    };

    let steps = flatten(&puzzle.take_transitions()).map_err(|error| JsError::new(&error.to_string()))?;
    Ok(Solution { solved, steps })
}

fn parse_clues(dims: (Dimension, Dimension), clues: &str) -> Result<PuzzleBuilder, BuilderInvalidReason> {
    let clues = clues.chars()
        .filter(|clue| !clue.is_whitespace())
        .map(|clue| VertexKind::from_clue(clue).ok_or(BuilderInvalidReason::UnknownClue(clue)))
        .collect::<Result<Vec<_>, _>>()?;

    let columns = dims.0.get() + 1;
    if clues.len() != columns * (dims.1.get() + 1) {
        return Err(BuilderInvalidReason::RaggedRows);
    }

    Ok(PuzzleBuilder::from_clues(dims, |Location(x, y)| clues[x + columns * y]))
}

fn flatten(transitions: &[Transition]) -> Result<Vec<u32>, TryFromIntError> {
    let mut steps = Vec::with_capacity(6 * transitions.len());
    for transition in transitions {
        let step = match *transition {
            Transition::Edge { endpoints: (from, to), state } => {
                [0, u32::try_from(from.0)?, u32::try_from(from.1)?, u32::try_from(to.0)?, u32::try_from(to.1)?, state as u32]
            }
            Transition::Cell { location, state } => {
                let (x, y) = (u32::try_from(location.0)?, u32::try_from(location.1)?);
                [1, x, y, x, y, state as u32]
            }
            Transition::Hypothesis(phase) => [2, 0, 0, 0, 0, phase as u32],
        };
        steps.extend(step);
    }
    Ok(steps)
}
