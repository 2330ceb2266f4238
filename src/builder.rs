use std::num::NonZero;
use std::ops::IndexMut;
use std::str::FromStr;

use itertools::Itertools;
use ndarray::{Array2, AssignElem};
use petgraph::graph::{EdgeIndex, UnGraph};
use thiserror::Error;

use crate::board::Board;
use crate::cell::CellState;
use crate::constraint::Constraint;
use crate::edge::{Edge, EdgeState};
use crate::location::{Dimension, Location};
use crate::pair::WhitePair;
use crate::shape::Axis;
use crate::solver::Puzzle;
use crate::vertex::{Vertex, VertexKind};

/// Reasons a builder may become invalid while building.
#[derive(Copy, Clone, Debug, Eq, Error, PartialEq)]
pub enum BuilderInvalidReason {
    /// A pearl was placed outside the vertex grid given by `dims` on a builder.
    #[error("pearl placed outside the board")]
    FeatureOutOfBounds,
    /// Puzzle text contained a character that is not a clue.
    #[error("unknown clue character {0:?}")]
    UnknownClue(char),
    /// Puzzle text rows have differing lengths.
    #[error("rows of puzzle text differ in length")]
    RaggedRows,
    /// Puzzle text describes fewer than two vertices along some side.
    #[error("a board needs at least one cell in each direction")]
    TooSmall,
}

/// A builder for Masyu puzzles of `width` by `height` cells, with pearls placed on the `(width + 1) * (height + 1)` vertices.
///
/// Builders mutate themselves while building but can be [`Clone`]d to save their state at some point.
/// [`PuzzleBuilder`] also implements [`FromStr`]: one line per vertex row, `.`, `_` or `+` for no clue, `O` or `o` for
/// a white pearl and `@` or `*` for a black one.
#[derive(Clone, Debug)]
pub struct PuzzleBuilder {
    // width, height in cells
    dims: (Dimension, Dimension),
    kinds: Array2<VertexKind>,
    invalid_reasons: Vec<BuilderInvalidReason>,
}

impl Default for PuzzleBuilder {
    fn default() -> Self {
        Self::with_dims((NonZero::new(5).unwrap(), NonZero::new(5).unwrap()))
    }
}

impl PuzzleBuilder {
    /// Construct a new [`Self`] with the specified dimensions in cells, specified in `(x, y)` order.
    pub fn with_dims(dims: (Dimension, Dimension)) -> Self {
        Self {
            dims,
            kinds: Array2::from_shape_simple_fn((dims.1.get() + 1, dims.0.get() + 1), VertexKind::default),
            invalid_reasons: Default::default(),
        }
    }

    /// Construct a builder by asking `clue` for the kind of every vertex.
    pub fn from_clues(dims: (Dimension, Dimension), clue: impl Fn(Location) -> VertexKind) -> Self {
        let mut builder = Self::with_dims(dims);
        builder.kinds = Array2::from_shape_fn(builder.kinds.raw_dim(), |index| clue(Location::from(index)));
        builder
    }

    /// Place a pearl, or clear one by passing [`VertexKind::Plain`].
    ///
    /// May cause the builder to enter a [`FeatureOutOfBounds`](BuilderInvalidReason::FeatureOutOfBounds) invalid state if `location` is out of bounds.
    /// If the builder is already in an invalid state, this function does nothing.
    pub fn add_pearl(&mut self, kind: VertexKind, location: Location) -> &mut Self {
        if !self.invalid_reasons.is_empty() {
            return self;
        }

        if location.0 > self.dims.0.get() || location.1 > self.dims.1.get() {
            self.invalid_reasons.push(BuilderInvalidReason::FeatureOutOfBounds);
            return self;
        }

        self.kinds.index_mut(location.as_index()).assign_elem(kind);
        self
    }

    /// Shorthand for multiple calls to [`Self::add_pearl`] with the same kind, with the same conditions.
    pub fn add_pearls(&mut self, kind: VertexKind, locations: impl IntoIterator<Item = Location>) -> &mut Self {
        for location in locations {
            self.add_pearl(kind, location);
        }

        self
    }

    /// Remove any pearl at `location`, with the same conditions as [`Self::add_pearl`].
    pub fn remove_pearl(&mut self, location: Location) -> &mut Self {
        self.add_pearl(VertexKind::Plain, location)
    }

    /// Check the validity of this builder, ensuring no [`BuilderInvalidReason`] condition has arisen.
    ///
    /// Returns `None` if the builder is valid, `Some(&Vec<BuilderInvalidReason>)` otherwise.
    pub fn is_valid(&self) -> Option<&Vec<BuilderInvalidReason>> {
        if self.invalid_reasons.is_empty() {
            None
        } else {
            Some(&self.invalid_reasons)
        }
    }

    /// Convert the state of this builder into a [`Puzzle`] ready to solve.
    /// If the builder is invalid for any reason, a reference to a [`Vec`] of [`BuilderInvalidReason`] will indicate why.
    ///
    /// Wiring the board already settles what the pearls alone imply: two adjacent black pearls never share an edge,
    /// nor do the middle pearls of three white ones in a row.
    pub fn build(&self) -> Result<Puzzle, &Vec<BuilderInvalidReason>> {
        if !self.invalid_reasons.is_empty() {
            return Err(&self.invalid_reasons);
        }

        let (width, height) = (self.dims.0.get(), self.dims.1.get());
        let mut graph = UnGraph::with_capacity(
            (width + 3) * (height + 3),
            // horizontal and vertical edges, halo included
            2 * (width + 2) * (height + 2),
        );

        let vertices = Array2::from_shape_fn((height + 3, width + 3), |index| {
            let location = Location::from(index);
            let kind = if location.within_padded((width + 1, height + 1)) {
                self.kinds[location.unpadded().as_index()]
            } else {
                VertexKind::Plain
            };
            graph.add_node(Vertex::new(location, kind))
        });

        let mut edges = Vec::new();
        for axis in [Axis::Horizontal, Axis::Vertical] {
            let [back, forth] = axis.directions();
            for (index, from) in vertices.indexed_iter() {
                let origin = Location::from(index);
                let Some(to) = vertices.get(forth.attempt_from(origin).as_index()) else { continue };

                // position along the edge's axis, and across it
                let (along, across, length, breadth) = match axis {
                    Axis::Horizontal => (origin.0, origin.1, width, height),
                    Axis::Vertical => (origin.1, origin.0, height, width),
                };
                if !(1..=breadth + 1).contains(&across) {
                    continue;
                }

                // the cell above or to the left shares the edge's origin row or column
                let [side, _] = axis.perpendicular().directions();
                let cells = (side.attempt_from(origin), origin);
                let on_board = (1..=length).contains(&along);
                let edge = graph.add_edge(*from, *to, Edge::new(axis, (*from, *to), cells, on_board));
                graph[*from].edges[forth.index()] = Some(edge);
                graph[*to].edges[back.index()] = Some(edge);

                edges.push((edge, along, length));
            }
        }

        let mut board = Board::new(graph, vertices, self.dims);
        let mut edge_constraints = Vec::with_capacity(edges.len());
        for (edge, along, length) in edges {
            self.wire_cells(&mut board, edge);

            if !board.edge(edge).on_board {
                board.fix_edge(edge, EdgeState::Empty);
                continue;
            }

            edge_constraints.push(Constraint::Edge(edge));
            match self.pearl_pair(&board, edge, along, length) {
                PearlPair::Separated => board.fix_edge(edge, EdgeState::Empty),
                PearlPair::Watched => edge_constraints.push(Constraint::WhitePair(WhitePair::new(edge))),
                PearlPair::Unrelated => {}
            }
        }

        let mut cell_constraints = Vec::with_capacity(width * height);
        let locations = board.cells.indexed_iter().map(|(index, _)| Location::from(index)).collect_vec();
        for location in locations {
            if location.within_padded((width, height)) {
                cell_constraints.push(Constraint::Cell(location));
            } else {
                board.fix_cell(location, CellState::Outie);
            }
        }

        let active = board.vertices.iter()
            .filter(|vertex| board.vertex(**vertex).location.within_padded((width + 1, height + 1)))
            .map(|vertex| Constraint::Vertex(*vertex))
            .chain(edge_constraints)
            .chain(cell_constraints)
            .collect_vec();

        Ok(Puzzle::new(board, active))
    }

    fn wire_cells(&self, board: &mut Board, edge: EdgeIndex) {
        let Edge { axis, cells: (first, second), .. } = *board.edge(edge);
        // a horizontal edge is the bottom side of the cell above it and the top side of the cell below
        let [back, forth] = axis.perpendicular().directions();
        board.cells[first.as_index()].edges[forth.index()] = Some(edge);
        board.cells[second.as_index()].edges[back.index()] = Some(edge);
    }

    fn pearl_pair(&self, board: &Board, edge: EdgeIndex, along: usize, length: usize) -> PearlPair {
        let Edge { axis, vertices: (first, second), .. } = *board.edge(edge);
        match (board.vertex(first).kind, board.vertex(second).kind) {
            // each black pearl would need this edge to run straight on through the other
            (VertexKind::Black, VertexKind::Black) => PearlPair::Separated,
            // only pairs with room for a vertex beyond each pearl
            (VertexKind::White, VertexKind::White) if (2..length).contains(&along) => {
                let [back, forth] = axis.directions();
                let beyond = [board.neighbor(first, back), board.neighbor(second, forth)];
                if beyond.iter().flatten().any(|vertex| board.vertex(*vertex).kind == VertexKind::White) {
                    PearlPair::Separated
                } else {
                    PearlPair::Watched
                }
            }
            _ => PearlPair::Unrelated,
        }
    }
}

enum PearlPair {
    Separated,
    Watched,
    Unrelated,
}

impl FromStr for PuzzleBuilder {
    type Err = BuilderInvalidReason;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows = s.lines()
            .map(str::trim)
            .filter(|row| !row.is_empty())
            .map(|row| row.chars()
                .map(|clue| VertexKind::from_clue(clue).ok_or(BuilderInvalidReason::UnknownClue(clue)))
                .collect::<Result<Vec<_>, _>>())
            .collect::<Result<Vec<_>, _>>()?;

        let columns = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|row| row.len() != columns) {
            return Err(BuilderInvalidReason::RaggedRows);
        }

        let (Some(width), Some(height)) = (NonZero::new(columns.saturating_sub(1)), NonZero::new(rows.len().saturating_sub(1))) else {
            return Err(BuilderInvalidReason::TooSmall);
        };

        Ok(Self::from_clues((width, height), |Location(x, y)| rows[y][x]))
    }
}
