use std::collections::BTreeMap;
use std::ops::{Index, IndexMut};

use log::trace;
use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::board::Board;

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub(crate) struct LineId(usize);

/// A maximal chain of filled edges. Once `start == end` the chain is a closed loop.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Line {
    pub(crate) start: NodeIndex,
    pub(crate) end: NodeIndex,
    pub(crate) edges: Vec<EdgeIndex>,
    // pearls lying on this line, endpoints included
    pub(crate) pearls: usize,
}

impl Line {
    pub(crate) fn is_closed(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct Lines {
    lines: BTreeMap<LineId, Line>,
    next: usize,
}

impl Lines {
    fn create(&mut self, line: Line) -> LineId {
        let id = LineId(self.next);
        self.next += 1;
        self.lines.insert(id, line);
        id
    }

    fn remove(&mut self, id: LineId) -> Line {
        self.lines.remove(&id).unwrap_or_else(|| panic!("{id:?} is not a live line"))
    }

    pub(crate) fn len(&self) -> usize {
        self.lines.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Line> {
        self.lines.values()
    }
}

impl Index<LineId> for Lines {
    type Output = Line;

    fn index(&self, index: LineId) -> &Self::Output {
        &self.lines[&index]
    }
}

impl IndexMut<LineId> for Lines {
    fn index_mut(&mut self, index: LineId) -> &mut Self::Output {
        self.lines.get_mut(&index).unwrap_or_else(|| panic!("{index:?} is not a live line"))
    }
}

impl Board {
    /// Record a freshly filled edge in the line set.
    ///
    /// Depending on which of its endpoints already lie on a line this starts a new line, extends one, joins two, or
    /// closes one into a loop. Must be called exactly once per edge, after the edge has been marked filled.
    pub(crate) fn track_filled(&mut self, edge: EdgeIndex) {
        let (start, end) = self.edge(edge).vertices;

        match (self.vertex(start).line, self.vertex(end).line) {
            (None, None) => {
                let pearls = [start, end].iter().filter(|v| self.vertex(**v).kind.is_clue()).count();
                let id = self.lines.create(Line { start, end, edges: vec![edge], pearls });
                trace!("{id:?} started at {}", self.describe_edge(edge));
                self.paint(id, edge);
            }
            (Some(id), None) => self.extend_line(id, edge, end),
            (None, Some(id)) => self.extend_line(id, edge, start),
            (Some(first), Some(second)) if first == second => {
                let line = &mut self.lines[first];
                line.edges.push(edge);
                line.start = line.end;
                trace!("{first:?} closed into a loop of {}", line.edges.len());
                self.paint(first, edge);
            }
            (Some(kept), Some(absorbed)) => self.merge_lines(kept, absorbed, edge),
        }
    }

    fn extend_line(&mut self, id: LineId, edge: EdgeIndex, fresh: NodeIndex) {
        let anchor = self.edge(edge).other_vertex(fresh);
        let absorbs = self.vertex(fresh).kind.is_clue();
        let total = self.pearls;

        let line = &mut self.lines[id];
        line.edges.push(edge);
        if line.start == anchor {
            line.start = fresh;
        } else {
            line.end = fresh;
        }
        if absorbs {
            line.pearls += 1;
        }
        assert!(line.pearls <= total, "{id:?} holds more pearls than the board");

        self.paint(id, edge);
    }

    // `kept` owns the edge's first vertex and `absorbed` its second
    fn merge_lines(&mut self, kept: LineId, absorbed: LineId, edge: EdgeIndex) {
        let (joint, other_joint) = self.edge(edge).vertices;
        let other = self.lines.remove(absorbed);
        let far = if other.start == other_joint { other.end } else { other.start };
        let total = self.pearls;

        let line = &mut self.lines[kept];
        line.edges.push(edge);
        line.edges.extend_from_slice(&other.edges);
        line.pearls += other.pearls;
        if line.start == joint {
            line.start = far;
        } else {
            line.end = far;
        }
        assert!(line.pearls <= total, "{kept:?} holds more pearls than the board");
        trace!("{absorbed:?} merged into {kept:?}");

        self.paint(kept, edge);
        for moved in other.edges {
            self.paint(kept, moved);
        }
    }

    fn paint(&mut self, id: LineId, edge: EdgeIndex) {
        let (start, end) = self.edge(edge).vertices;
        self.graph[edge].line = Some(id);
        self.graph[start].line = Some(id);
        self.graph[end].line = Some(id);
    }

    /// The line both vertices already belong to, if they share one.
    pub(crate) fn shared_line(&self, first: NodeIndex, second: NodeIndex) -> Option<LineId> {
        match (self.vertex(first).line, self.vertex(second).line) {
            (Some(a), Some(b)) if a == b => Some(a),
            _ => None,
        }
    }

    /// Whether closing `line` into a loop, after it picks up `extra` more pearls on the way, would leave the puzzle
    /// unfinished.
    pub(crate) fn closing_is_premature(&self, line: LineId, extra: usize) -> bool {
        self.lines.len() > 1 || self.lines[line].pearls + extra < self.pearls
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::PuzzleBuilder;
    use crate::constraint::Violation;
    use crate::location::Location;
    use crate::solver::Puzzle;

    fn fill(puzzle: &mut Puzzle, from: (usize, usize), to: (usize, usize)) -> Result<(), Violation> {
        let edge = puzzle.board.edge_between(Location(from.0, from.1), Location(to.0, to.1)).unwrap();
        puzzle.board.set_filled(edge, true)
    }

    fn strip() -> Puzzle {
        "+O@++\n+++++".parse::<PuzzleBuilder>().unwrap().build().unwrap()
    }

    #[test]
    fn lines_merge_and_close() {
        let mut puzzle = strip();
        fill(&mut puzzle, (0, 0), (1, 0)).unwrap();
        fill(&mut puzzle, (2, 0), (3, 0)).unwrap();
        assert_eq!(puzzle.board.lines.len(), 2);

        fill(&mut puzzle, (1, 0), (2, 0)).unwrap();
        assert_eq!(puzzle.board.lines.len(), 1);
        let line = puzzle.board.lines.iter().next().unwrap();
        assert_eq!(line.edges.len(), 3);
        assert_eq!(line.pearls, 2);
        let ends = [line.start, line.end].map(|v| puzzle.board.vertex(v).location.unpadded());
        assert!(ends.contains(&Location(0, 0)) && ends.contains(&Location(3, 0)));

        fill(&mut puzzle, (3, 0), (3, 1)).unwrap();
        fill(&mut puzzle, (3, 1), (2, 1)).unwrap();
        fill(&mut puzzle, (2, 1), (1, 1)).unwrap();
        fill(&mut puzzle, (1, 1), (0, 1)).unwrap();
        assert!(!puzzle.board.is_solved());
        fill(&mut puzzle, (0, 1), (0, 0)).unwrap();
        assert!(puzzle.board.is_solved());
        assert_eq!(puzzle.board.lines.iter().next().unwrap().edges.len(), 8);
    }

    #[test]
    fn early_loop_is_refused() {
        let mut puzzle = strip();
        fill(&mut puzzle, (0, 0), (1, 0)).unwrap();
        fill(&mut puzzle, (1, 0), (1, 1)).unwrap();
        fill(&mut puzzle, (1, 1), (0, 1)).unwrap();
        assert_eq!(fill(&mut puzzle, (0, 1), (0, 0)), Err(Violation::PrematureLoop));
        assert_eq!(puzzle.board.lines.len(), 1);
    }

    #[test]
    fn branches_are_refused() {
        let mut puzzle = strip();
        fill(&mut puzzle, (1, 0), (1, 1)).unwrap();
        fill(&mut puzzle, (0, 0), (1, 0)).unwrap();
        assert_eq!(fill(&mut puzzle, (1, 0), (2, 0)), Err(Violation::Branching));
    }
}
