use itertools::Itertools;
use petgraph::graph::NodeIndex;
use strum::VariantArray;

use crate::board::Board;
use crate::constraint::{Action, Deduction, Hypothesis, Status, Violation};
use crate::edge::EdgeState;
use crate::location::Location;
use crate::shape::{Axis, Direction};

impl Board {
    /// Rules for a white pearl: the loop passes straight through and turns on at least one side.
    pub(crate) fn resolve_white(&mut self, vertex: NodeIndex) -> Deduction {
        if self.resolve_plain_vertex(vertex)? == Status::Resolved {
            if self.filled_along(vertex, Axis::Horizontal) == 1 {
                return Err(Violation::TurnOnWhite);
            }
            if self.filled_degree(vertex) == 0 {
                return Err(Violation::PearlOffLoop);
            }
            return self.ensure_white_corner(vertex);
        }

        let known = Direction::VARIANTS.iter()
            .filter_map(|direction| {
                let state = self.edge_state(Some(self.incident(vertex, *direction)?));
                state.is_solved().then_some((*direction, state))
            })
            .collect_vec();

        if !known.is_empty() {
            // any known edge fixes its opposite, which fixes the axis
            for (direction, state) in &known {
                self.set_filled_at(self.incident(vertex, direction.invert()), *state == EdgeState::Filled)?;
            }
            let crossing = !known.iter().any(|(_, state)| *state == EdgeState::Filled);
            for edge in self.unknown_edges(vertex) {
                self.set_filled(edge, crossing)?;
            }
            return self.ensure_white_corner(vertex);
        }

        for axis in Axis::VARIANTS {
            if self.straight_forbidden(vertex, *axis) {
                for direction in axis.directions() {
                    self.set_filled_at(self.incident(vertex, direction), false)?;
                }
                for direction in axis.perpendicular().directions() {
                    self.set_filled_at(self.incident(vertex, direction), true)?;
                }
                return self.ensure_white_corner(vertex);
            }
        }

        self.mirror_diagonals(vertex)?;
        Ok(Status::Unchanged)
    }

    // going straight along `axis` would either run three in a row or close a loop too early
    fn straight_forbidden(&self, vertex: NodeIndex, axis: Axis) -> bool {
        let [back, forth] = axis.directions();
        let unturnable = self.edge_state(self.continuation(vertex, back)) == EdgeState::Filled
            && self.edge_state(self.continuation(vertex, forth)) == EdgeState::Filled;

        let closes = match (self.neighbor(vertex, back), self.neighbor(vertex, forth)) {
            (Some(first), Some(second)) => self.shared_line(first, second)
                .is_some_and(|line| self.closing_is_premature(line, 1)),
            _ => false,
        };

        unturnable || closes
    }

    /// Once the loop runs straight through a white pearl, make sure it can still turn on one side.
    fn ensure_white_corner(&mut self, vertex: NodeIndex) -> Deduction {
        let Some(axis) = Axis::VARIANTS.iter().copied().find(|axis| self.filled_along(vertex, *axis) == 2) else {
            return Ok(Status::Unchanged);
        };

        let [back, forth] = axis.directions();
        if self.turns_beyond(vertex, back) || self.turns_beyond(vertex, forth) {
            return Ok(Status::Resolved);
        }

        let continuations = [self.continuation(vertex, back), self.continuation(vertex, forth)];
        match continuations.map(|edge| self.edge_state(edge)) {
            [EdgeState::Filled, EdgeState::Filled] => Err(Violation::UnturnedWhite),
            [EdgeState::Filled, _] => {
                self.set_filled_at(continuations[1], false)?;
                Ok(Status::Resolved)
            }
            [_, EdgeState::Filled] => {
                self.set_filled_at(continuations[0], false)?;
                Ok(Status::Resolved)
            }
            _ => Ok(Status::Unchanged),
        }
    }

    fn turns_beyond(&self, vertex: NodeIndex, direction: Direction) -> bool {
        self.neighbor(vertex, direction).is_some_and(|next| {
            self.turns_across(next, direction.axis())
                || self.edge_state(self.incident(next, direction)) == EdgeState::Empty
        })
    }

    // a straight passage separates diagonally opposite cells whichever way it runs
    fn mirror_diagonals(&mut self, vertex: NodeIndex) -> Result<(), Violation> {
        let location = self.vertex(vertex).location;
        let corner = |dx: isize, dy: isize| location.offset_by((dx, dy));
        let diagonals: [(Location, Location); 2] = [(corner(-1, -1), corner(0, 0)), (corner(0, -1), corner(-1, 0))];

        for (first, second) in diagonals {
            let (a, b) = (self.cell_state(first), self.cell_state(second));
            if a.is_solved() {
                self.set_cell(second, a.inverse())?;
            } else if b.is_solved() {
                self.set_cell(first, b.inverse())?;
            }
        }
        Ok(())
    }

    pub(crate) fn white_hypotheses(&self, vertex: NodeIndex) -> Vec<Hypothesis> {
        let unknown = self.unknown_edges(vertex);
        if unknown.len() == 4 {
            return [Axis::Vertical, Axis::Horizontal].iter()
                .map(|axis| Hypothesis(axis.directions().iter()
                    .filter_map(|direction| self.incident(vertex, *direction))
                    .map(Action::Fill)
                    .collect_vec()))
                .collect_vec();
        }
        if !unknown.is_empty() {
            return Vec::new();
        }

        // straight through, but neither side has committed to a turn yet
        let Some(axis) = Axis::VARIANTS.iter().find(|axis| self.filled_along(vertex, **axis) == 2) else {
            return Vec::new();
        };
        let [back, forth] = axis.directions().map(|direction| self.continuation(vertex, direction));
        match (back, forth) {
            (Some(back), Some(forth))
            if !self.edge(back).state.is_solved() && !self.edge(forth).state.is_solved() => vec![
                Hypothesis(vec![Action::Clear(back)]),
                Hypothesis(vec![Action::Fill(back), Action::Clear(forth)]),
            ],
            _ => Vec::new(),
        }
    }

    /// Rules for a black pearl: the loop turns here and runs straight for two edges each way.
    pub(crate) fn resolve_black(&mut self, vertex: NodeIndex) -> Deduction {
        for direction in Direction::VARIANTS {
            let Some(edge) = self.incident(vertex, *direction) else { continue };
            if self.edge(edge).state.is_solved() {
                continue;
            }

            let cut_off = self.edge_state(self.continuation(vertex, *direction)) == EdgeState::Empty;
            let bent = self.neighbor(vertex, *direction).is_some_and(|next| self.turns_across(next, direction.axis()));
            if cut_off || bent {
                self.set_filled(edge, false)?;
            }
        }

        for direction in Direction::VARIANTS {
            let state = self.edge_state(self.incident(vertex, *direction));
            if !state.is_solved() {
                continue;
            }

            let filled = state == EdgeState::Filled;
            self.set_filled_at(self.incident(vertex, direction.invert()), !filled)?;
            let outward = if filled { *direction } else { direction.invert() };
            self.set_filled_at(self.continuation(vertex, outward), true)?;
        }

        if self.unknown_edges(vertex).is_empty() {
            Ok(Status::Resolved)
        } else {
            Ok(Status::Unchanged)
        }
    }

    pub(crate) fn black_hypotheses(&self, vertex: NodeIndex) -> Vec<Hypothesis> {
        let unknown = |axis: Axis| axis.directions().iter()
            .filter_map(|direction| self.incident(vertex, *direction))
            .filter(|edge| !self.edge(*edge).state.is_solved())
            .collect_vec();
        let (vertical, horizontal) = (unknown(Axis::Vertical), unknown(Axis::Horizontal));

        match (vertical.is_empty(), horizontal.is_empty()) {
            (false, false) => vertical.iter()
                .cartesian_product(horizontal.iter())
                .map(|(up_or_down, left_or_right)| Hypothesis(vec![Action::Fill(*up_or_down), Action::Fill(*left_or_right)]))
                .collect_vec(),
            (false, true) => vertical.into_iter().map(|edge| Hypothesis(vec![Action::Fill(edge)])).collect_vec(),
            (true, false) => horizontal.into_iter().map(|edge| Hypothesis(vec![Action::Fill(edge)])).collect_vec(),
            (true, true) => Vec::new(),
        }
    }
}
