#[cfg(test)]
mod tests {
    use std::num::NonZero;

    use unordered_pair::UnorderedPair;

    use crate::builder::{BuilderInvalidReason, PuzzleBuilder};
    use crate::cell::CellState;
    use crate::constraint::{Action, Constraint, Hypothesis, Status};
    use crate::edge::EdgeState;
    use crate::location::Location;
    use crate::options::SolverOptions;
    use crate::solver::{Puzzle, SolverFailure};
    use crate::transition::{HypothesisPhase, Transition};
    use crate::vertex::VertexKind;

    fn puzzle(text: &str) -> Puzzle {
        text.parse::<PuzzleBuilder>().unwrap().build().unwrap()
    }

    fn edge(puzzle: &Puzzle, from: (usize, usize), to: (usize, usize)) -> EdgeState {
        puzzle.edge_state(UnorderedPair(Location(from.0, from.1), Location(to.0, to.1))).unwrap()
    }

    fn without_search() -> SolverOptions {
        SolverOptions::default().with_hypotheses(false)
    }

    // outside the board counts as outside the loop
    fn side(puzzle: &Puzzle, x: isize, y: isize) -> CellState {
        if x < 0 || y < 0 {
            return CellState::Outie;
        }
        puzzle.cell_state(Location(x as usize, y as usize)).unwrap_or(CellState::Outie)
    }

    fn rows(rows: &[&str]) -> String {
        rows.iter().map(|row| format!("{row}\n")).collect()
    }

    fn assert_valid_loop(puzzle: &Puzzle) {
        let (width, height) = (puzzle.dims().0.get(), puzzle.dims().1.get());
        let filled = |x: usize, y: usize, dx: isize, dy: isize| {
            let (nx, ny) = (x.wrapping_add_signed(dx), y.wrapping_add_signed(dy));
            puzzle.edge_state(UnorderedPair(Location(x, y), Location(nx, ny))) == Some(EdgeState::Filled)
        };

        for y in 0..=height {
            for x in 0..=width {
                let (up, down, left, right) = (filled(x, y, 0, -1), filled(x, y, 0, 1), filled(x, y, -1, 0), filled(x, y, 1, 0));
                let degree = [up, down, left, right].iter().filter(|f| **f).count();
                assert!(degree == 0 || degree == 2, "vertex ({x}, {y}) has degree {degree}");

                match puzzle.vertex_kind(Location(x, y)).unwrap() {
                    VertexKind::Plain => {}
                    VertexKind::White => {
                        assert!((up && down) || (left && right), "white pearl ({x}, {y}) is not passed straight");
                        let turns = if up {
                            !(filled(x, y - 1, 0, -1) && filled(x, y + 1, 0, 1))
                        } else {
                            !(filled(x - 1, y, -1, 0) && filled(x + 1, y, 1, 0))
                        };
                        assert!(turns, "loop does not turn beside white pearl ({x}, {y})");
                    }
                    VertexKind::Black => {
                        assert!((up || down) && (left || right), "black pearl ({x}, {y}) is not turned on");
                        let (vertical, horizontal) = (if up { -1 } else { 1 }, if left { -1 } else { 1 });
                        let (ny, nx) = (y.wrapping_add_signed(vertical), x.wrapping_add_signed(horizontal));
                        assert!(filled(x, ny, 0, vertical) && filled(nx, y, horizontal, 0), "black pearl ({x}, {y}) is not extended");
                    }
                }

                // every edge separates known cells exactly when it is on the loop
                let (cx, cy) = (x as isize, y as isize);
                let separates = |a: CellState, b: CellState| (a.is_solved() && b.is_solved()).then_some(a != b);
                if x < width {
                    if let Some(separated) = separates(side(puzzle, cx, cy - 1), side(puzzle, cx, cy)) {
                        assert_eq!(right, separated, "parity across ({x}, {y}) going right");
                    }
                }
                if y < height {
                    if let Some(separated) = separates(side(puzzle, cx - 1, cy), side(puzzle, cx, cy)) {
                        assert_eq!(down, separated, "parity across ({x}, {y}) going down");
                    }
                }
            }
        }
    }

    #[test]
    fn display_unsolved() {
        let puzzle = puzzle("@.\n.O");
        assert_eq!(format!("{}", puzzle), "@?+
? ?
+?O
");
    }

    #[test]
    fn parse_rejects_bad_text() {
        assert_eq!("x.\n..".parse::<PuzzleBuilder>().unwrap_err(), BuilderInvalidReason::UnknownClue('x'));
        assert_eq!("..\n...".parse::<PuzzleBuilder>().unwrap_err(), BuilderInvalidReason::RaggedRows);
        assert_eq!("....".parse::<PuzzleBuilder>().unwrap_err(), BuilderInvalidReason::TooSmall);
        assert!("_o*\n.O@".parse::<PuzzleBuilder>().is_ok());
    }

    #[test]
    fn pearl_out_of_bounds() {
        let mut builder = PuzzleBuilder::default();
        builder.add_pearl(VertexKind::White, Location(5, 5));
        assert!(builder.is_valid().is_none());

        builder.add_pearl(VertexKind::Black, Location(6, 0));
        assert_eq!(builder.is_valid(), Some(&vec![BuilderInvalidReason::FeatureOutOfBounds]));
        assert!(builder.build().is_err());
    }

    #[test]
    fn remove_pearl() {
        let puzzle = PuzzleBuilder::with_dims((NonZero::new(1).unwrap(), NonZero::new(1).unwrap()))
            .add_pearls(VertexKind::White, [Location(0, 0), Location(1, 1)])
            .remove_pearl(Location(1, 1))
            .build()
            .unwrap();

        assert_eq!(puzzle.vertex_kind(Location(0, 0)), Some(VertexKind::White));
        assert_eq!(puzzle.vertex_kind(Location(1, 1)), Some(VertexKind::Plain));
        assert_eq!(puzzle.vertex_kind(Location(2, 1)), None);
    }

    #[test]
    fn adjacent_blacks_separated_at_build() {
        let puzzle = puzzle("....\n.@@.\n....");
        assert_eq!(edge(&puzzle, (1, 1), (2, 1)), EdgeState::Empty);
        assert_eq!(edge(&puzzle, (1, 1), (1, 0)), EdgeState::Unknown);
    }

    #[test]
    fn three_whites_in_a_row_separated_at_build() {
        let puzzle = puzzle(".....\n.OOO.\n.....");
        assert_eq!(edge(&puzzle, (1, 1), (2, 1)), EdgeState::Empty);
        assert_eq!(edge(&puzzle, (2, 1), (3, 1)), EdgeState::Empty);
        assert!(!puzzle.active.iter().any(|constraint| matches!(constraint, Constraint::WhitePair(_))));
    }

    #[test]
    fn white_pair_watches_beyond_both_pearls() {
        let mut puzzle = puzzle(".....\n.OO..\n.....");
        let mut pair = puzzle.active.iter()
            .find_map(|constraint| match constraint {
                Constraint::WhitePair(pair) => Some(pair.clone()),
                _ => None,
            })
            .unwrap();

        assert_eq!(pair.try_resolve(&mut puzzle.board), Ok(Status::Unchanged));
        assert!(pair.is_watching());
        assert_eq!(edge(&puzzle, (1, 1), (2, 1)), EdgeState::Unknown);

        let beyond = puzzle.board.edge_between(Location(3, 1), Location(4, 1)).unwrap();
        puzzle.board.set_filled(beyond, true).unwrap();
        assert_eq!(pair.try_resolve(&mut puzzle.board), Ok(Status::Resolved));
        assert_eq!(edge(&puzzle, (1, 1), (2, 1)), EdgeState::Empty);
    }

    #[test]
    fn border_white_without_search() {
        let mut puzzle = PuzzleBuilder::default()
            .add_pearl(VertexKind::White, Location(2, 0))
            .build()
            .unwrap();

        assert_eq!(puzzle.solve_with(&without_search()), Err(SolverFailure::Stuck));
        assert_eq!(edge(&puzzle, (1, 0), (2, 0)), EdgeState::Filled);
        assert_eq!(edge(&puzzle, (2, 0), (3, 0)), EdgeState::Filled);
        assert_eq!(edge(&puzzle, (2, 0), (2, 1)), EdgeState::Empty);
        assert_eq!(puzzle.cell_state(Location(1, 0)), Some(CellState::Innie));
        assert_eq!(puzzle.cell_state(Location(2, 0)), Some(CellState::Innie));
        assert_eq!(puzzle.board.lines.len(), 1);
        assert_eq!(puzzle.statistics().hypotheses_tried, 0);
    }

    #[test]
    fn restore_is_exact() {
        let mut puzzle = PuzzleBuilder::default()
            .add_pearl(VertexKind::White, Location(2, 0))
            .build()
            .unwrap();
        assert_eq!(puzzle.solve_with(&without_search()), Err(SolverFailure::Stuck));

        let before = puzzle.checkpoint();
        let corner = puzzle.board.edge_between(Location(0, 0), Location(1, 0)).unwrap();
        puzzle.board.apply(&Hypothesis(vec![Action::Fill(corner)])).unwrap();
        let _ = puzzle.propagate();
        assert!(puzzle.checkpoint() != before);

        puzzle.restore(before.clone());
        assert!(puzzle.checkpoint() == before);
        assert_eq!(edge(&puzzle, (0, 0), (1, 0)), EdgeState::Unknown);
        assert!(puzzle.transitions().contains(&Transition::Edge {
            endpoints: (Location(0, 0), Location(1, 0)),
            state: EdgeState::Unknown,
        }));
    }

    #[test]
    fn solve_without_search() {
        let mut puzzle = puzzle("@..\n..O\n...");
        assert_eq!(puzzle.solve_with(&without_search()), Ok(()));
        assert!(puzzle.is_solved());
        assert_eq!(format!("{}", puzzle), "@-+-+
|# #|
+ + O
|# #|
+-+-+
");
        assert_eq!(puzzle.loop_length(), 8);
        assert_eq!(puzzle.loop_edges().len(), 8);
        assert_valid_loop(&puzzle);

        let transitions = puzzle.transitions();
        assert_eq!(transitions[0], Transition::Edge { endpoints: (Location(0, 0), Location(0, 1)), state: EdgeState::Filled });
        assert_eq!(transitions[1], Transition::Cell { location: Location(0, 0), state: CellState::Innie });
        assert_eq!(transitions.iter().filter(|t| matches!(t, Transition::Edge { .. })).count(), 12);
        assert_eq!(transitions.iter().filter(|t| matches!(t, Transition::Cell { .. })).count(), 4);
        assert!(!transitions.iter().any(|t| matches!(t, Transition::Hypothesis(_))));
    }

    #[test]
    fn resolved_rules_stay_resolved() {
        let mut puzzle = puzzle("@..\n..O\n...");
        puzzle.solve().unwrap();

        let progress = puzzle.board.progress;
        let before = puzzle.checkpoint();
        let vertices = puzzle.board.vertices.iter()
            .filter(|vertex| puzzle.board.vertex(**vertex).location.within_padded((3, 3)))
            .copied()
            .collect::<Vec<_>>();
        assert_eq!(vertices.len(), 9);

        for vertex in vertices {
            assert_eq!(Constraint::Vertex(vertex).try_resolve(&mut puzzle.board), Ok(Status::Resolved));
        }
        assert_eq!(puzzle.board.progress, progress);
        assert!(puzzle.checkpoint() == before);
    }

    #[test]
    fn solve_with_search() {
        let mut stuck = puzzle("@..\n...\n...");
        assert_eq!(stuck.solve_with(&without_search()), Err(SolverFailure::Stuck));
        assert!(!stuck.is_solved());

        let mut puzzle = puzzle("@..\n...\n...");
        assert_eq!(puzzle.solve(), Ok(()));
        assert_eq!(format!("{}", puzzle), "@-+-+
|# #|
+ + +
|# #|
+-+-+
");
        assert_valid_loop(&puzzle);
        assert_eq!(puzzle.statistics().hypotheses_tried, 1);
        assert_eq!(puzzle.statistics().hypotheses_kept, 0);
        assert!(puzzle.transitions().contains(&Transition::Hypothesis(HypothesisPhase::Trying)));
    }

    #[test]
    fn search_commits_the_only_survivor() {
        let mut stuck = puzzle("+++++\n+++++\n@OO@+\nO++O+\n@O+++\n+++O+\n+++++");
        assert_eq!(stuck.solve_with(&without_search()), Err(SolverFailure::Stuck));

        let mut puzzle = puzzle("+++++\n+++++\n@OO@+\nO++O+\n@O+++\n+++O+\n+++++");
        assert_eq!(puzzle.solve(), Ok(()));
        assert_eq!(format!("{}", puzzle), rows(&[
            "+?+?+?+?+",
            "? ? ? ? ?",
            "+?+?+?+?+",
            "         ",
            "@-O-O-@ +",
            "|# # #|  ",
            "O + + O +",
            "|# # #|  ",
            "@-O-+ +-+",
            "    |# #|",
            "+?+ +-O-+",
            "? ?      ",
            "+?+ + + +",
        ]));
        assert_valid_loop(&puzzle);
        assert_eq!(puzzle.loop_length(), 14);

        let statistics = puzzle.statistics();
        assert_eq!(statistics.hypotheses_kept, 1);
        assert_eq!(statistics.hypotheses_rejected, 1);
        assert_eq!(statistics.hypotheses_tried, 4);

        // the scan starts over once a hypothesis is kept
        let phases = puzzle.transitions().iter()
            .filter_map(|transition| match transition {
                Transition::Hypothesis(phase) => Some(*phase),
                _ => None,
            })
            .collect::<Vec<_>>();
        let kept = phases.iter().position(|phase| *phase == HypothesisPhase::Kept).unwrap();
        assert_eq!(&phases[..kept], &[
            HypothesisPhase::Trying,
            HypothesisPhase::Rejected,
            HypothesisPhase::Trying,
            HypothesisPhase::Reverted,
        ]);
        assert_eq!(phases.get(kept + 1), Some(&HypothesisPhase::Trying));
    }

    #[test]
    fn solve_six_by_six() {
        let mut puzzle = puzzle("\
            .......
            .......
            ...@OO@
            ...O..O
            O.O@...
            O.....O
            @OO..O@");

        assert_eq!(puzzle.solve(), Ok(()));
        assert_eq!(format!("{}", puzzle), rows(&[
            "+?+?+?+?+?+?+",
            "? ? ? ? ? ? ?",
            "+?+?+?+?+?+?+",
            "? ? ?        ",
            "+?+?+ @-O-O-@",
            "      |# # #|",
            "+-+ + O +?+ O",
            "|#|   |#? ?#|",
            "O +-O-@ +?+ +",
            "|# # # # # #|",
            "O + + +-+ + O",
            "|# # #| |# #|",
            "@-O-O-+ +-O-@",
        ]));
        assert_valid_loop(&puzzle);
        assert_eq!(puzzle.loop_length(), 24);
        assert_eq!(puzzle.statistics().hypotheses_kept, 1);
        assert_eq!(puzzle.statistics().hypotheses_rejected, 2);
    }

    #[test]
    fn silent_solve() {
        let mut puzzle = puzzle("@..\n..O\n...");
        puzzle.solve_with(&SolverOptions::default().with_transitions(false)).unwrap();
        assert!(puzzle.transitions().is_empty());
        assert!(puzzle.take_transitions().is_empty());
    }

    #[test]
    fn take_transitions_drains() {
        let mut puzzle = puzzle("@..\n..O\n...");
        puzzle.solve().unwrap();
        assert!(!puzzle.take_transitions().is_empty());
        assert!(puzzle.transitions().is_empty());
    }

    #[test]
    fn inconsistent_puzzle() {
        let mut puzzle = puzzle("@.\n..");
        assert!(matches!(puzzle.solve(), Err(SolverFailure::Inconsistent(_))));
        assert!(!puzzle.is_solved());
    }

    #[test]
    fn queries_outside_board() {
        let puzzle = puzzle("@..\n..O\n...");
        assert_eq!(puzzle.cell_state(Location(2, 0)), None);
        assert_eq!(puzzle.cell_state(Location(1, 1)), Some(CellState::Unknown));
        assert_eq!(puzzle.edge_state(UnorderedPair(Location(2, 2), Location(3, 2))), None);
        assert_eq!(puzzle.edge_state(UnorderedPair(Location(0, 0), Location(1, 1))), None);
    }
}
