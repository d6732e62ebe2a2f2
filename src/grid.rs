use bit_set::BitSet;
use petgraph::graph;
pub use petgraph::graph::IndexType;
use petgraph::{Graph, Undirected};
use smallvec::SmallVec;
use std::fmt;
use std::slice;

use crate::errors::{self, ErrorKind};
use crate::units::{ColumnIndex, ColumnsCount, EdgesCount, NodesCount, RowIndex, RowsCount};

/// Location of one cell: 0-indexed, row 0 is the top of the grid and
/// column 0 the left.
#[derive(Hash, Eq, PartialEq, Debug, Copy, Clone, Ord, PartialOrd)]
pub struct GridCoordinate {
    pub row: u32,
    pub col: u32,
}

impl GridCoordinate {
    pub fn new(row: u32, col: u32) -> GridCoordinate {
        GridCoordinate { row, col }
    }

    #[inline]
    pub fn from_row_major_index(index: usize, row_width: usize) -> GridCoordinate {
        let row = index / row_width;
        let col = index % row_width;
        GridCoordinate::new(row as u32, col as u32)
    }

    #[inline]
    pub fn from_row_column_indices(row_index: RowIndex, col_index: ColumnIndex) -> GridCoordinate {
        let (RowIndex(row), ColumnIndex(col)) = (row_index, col_index);
        GridCoordinate::new(row as u32, col as u32)
    }
}

impl From<(u32, u32)> for GridCoordinate {
    fn from(row_col_pair: (u32, u32)) -> GridCoordinate {
        GridCoordinate::new(row_col_pair.0, row_col_pair.1)
    }
}

pub type CoordinateSmallVec = SmallVec<[GridCoordinate; 4]>;

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum CompassPrimary {
    North,
    South,
    East,
    West,
}

/// State of the wall on one side of a cell.
///
/// A wall between two neighbouring cells is a single logical wall: both cells
/// always report the same state for it. Walls on the outer boundary of the
/// grid have no neighbouring cell and are permanently `Closed`.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum WallState {
    Open,
    Closed,
}

impl WallState {
    #[inline]
    pub fn is_open(self) -> bool {
        self == WallState::Open
    }
}

/// Snapshot view of one cell, produced on demand by [`RectGrid::cell`].
///
/// The `visited` flag only has meaning while a generator is running; once
/// generation completes every cell reports `visited == true`.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct Cell {
    pub coord: GridCoordinate,
    pub visited: bool,
    pub north: WallState,
    pub south: WallState,
    pub east: WallState,
    pub west: WallState,
}

/// Result of trying to open a passage between two cells.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum CellLinkError {
    InvalidGridCoordinate,
    SelfLink,
    NotAdjacent,
}

/// A rows x columns rectangular grid of cells.
///
/// Passages are modelled as the edges of an undirected graph with one node
/// per cell in row major order - the wall between two neighbouring cells is
/// open iff the edge between their nodes exists. Storing each passage as a
/// single edge keeps the shared wall state of a neighbouring cell pair in
/// one place.
///
/// Generation-time visited flags live in a bitset indexed by row major cell
/// index; they are owned by the grid but only meaningful to a running
/// generator.
#[derive(Debug)]
pub struct RectGrid<GridIndexType: IndexType> {
    graph: Graph<(), (), Undirected, GridIndexType>,
    visited: BitSet,
    rows: RowsCount,
    columns: ColumnsCount,
}

impl<GridIndexType: IndexType> RectGrid<GridIndexType> {
    /// Create a fresh grid: every cell unvisited, every wall closed.
    ///
    /// Fails with `InvalidDimensions` if either count is zero and with
    /// `GridTooLarge` if `rows * columns` cells cannot be addressed by
    /// `GridIndexType`.
    pub fn new(rows: RowsCount, columns: ColumnsCount) -> errors::Result<RectGrid<GridIndexType>> {
        let (RowsCount(rows_count), ColumnsCount(columns_count)) = (rows, columns);

        if rows_count < 1 || columns_count < 1 {
            return Err(ErrorKind::InvalidDimensions(rows_count, columns_count).into());
        }

        let cells_count = rows_count.saturating_mul(columns_count);
        let max_cells = <GridIndexType as IndexType>::max().index();
        if cells_count > max_cells {
            return Err(ErrorKind::GridTooLarge(cells_count, max_cells).into());
        }

        let (NodesCount(nodes), EdgesCount(edges)) = graph_size(rows, columns);
        let mut grid = RectGrid {
            graph: Graph::with_capacity(nodes, edges),
            visited: BitSet::with_capacity(nodes),
            rows,
            columns,
        };
        for _ in 0..nodes {
            let _ = grid.graph.add_node(());
        }

        Ok(grid)
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.rows.0 * self.columns.0
    }

    #[inline]
    pub fn rows(&self) -> RowsCount {
        self.rows
    }

    #[inline]
    pub fn columns(&self) -> ColumnsCount {
        self.columns
    }

    /// The number of open passages in the grid.
    #[inline]
    pub fn links_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Open the wall between two neighbouring cells.
    ///
    /// The wall is shared: after a successful link both cells report the
    /// boundary between them as open. Linking is idempotent - opening an
    /// already open wall changes nothing.
    pub fn link(&mut self, a: GridCoordinate, b: GridCoordinate) -> Result<(), CellLinkError> {
        if a == b {
            return Err(CellLinkError::SelfLink);
        }
        match (self.grid_coordinate_graph_index(a), self.grid_coordinate_graph_index(b)) {
            (Some(a_index), Some(b_index)) => {
                if !self.is_neighbour(a, b) {
                    return Err(CellLinkError::NotAdjacent);
                }
                let _ = self.graph.update_edge(a_index, b_index, ());
                Ok(())
            }
            _ => Err(CellLinkError::InvalidGridCoordinate),
        }
    }

    /// Cells that are joined to a particular cell by an open passage.
    pub fn links(&self, coord: GridCoordinate) -> Option<CoordinateSmallVec> {
        if let Some(graph_node_index) = self.grid_coordinate_graph_index(coord) {
            let linked_cells = self.graph
                .neighbors(graph_node_index)
                .map(|node_index| {
                         GridCoordinate::from_row_major_index(node_index.index(), self.columns.0)
                     })
                .collect();
            Some(linked_cells)
        } else {
            None
        }
    }

    /// Cells to the North, South, East or West of a particular cell, but not
    /// necessarily joined by a passage.
    pub fn neighbours(&self, coord: GridCoordinate) -> CoordinateSmallVec {
        [CompassPrimary::North, CompassPrimary::South, CompassPrimary::East, CompassPrimary::West]
            .iter()
            .filter_map(|&dir| self.neighbour_at_direction(coord, dir))
            .collect()
    }

    pub fn neighbour_at_direction(&self,
                                  coord: GridCoordinate,
                                  direction: CompassPrimary)
                                  -> Option<GridCoordinate> {
        offset_coordinate(coord, direction).and_then(|neighbour_coord| {
            if self.is_valid_coordinate(neighbour_coord) {
                Some(neighbour_coord)
            } else {
                None
            }
        })
    }

    /// Are two cells in the grid linked by an open passage?
    pub fn is_linked(&self, a: GridCoordinate, b: GridCoordinate) -> bool {
        let a_index_opt = self.grid_coordinate_graph_index(a);
        let b_index_opt = self.grid_coordinate_graph_index(b);
        if let (Some(a_index), Some(b_index)) = (a_index_opt, b_index_opt) {
            self.graph.find_edge(a_index, b_index).is_some()
        } else {
            false
        }
    }

    pub fn is_neighbour_linked(&self, coord: GridCoordinate, direction: CompassPrimary) -> bool {
        self.neighbour_at_direction(coord, direction)
            .map_or(false,
                    |neighbour_coord| self.is_linked(coord, neighbour_coord))
    }

    /// The state of the wall on one side of a cell.
    ///
    /// Directions pointing off the edge of the grid are always `Closed`.
    pub fn wall_state(&self, coord: GridCoordinate, direction: CompassPrimary) -> WallState {
        if self.is_neighbour_linked(coord, direction) {
            WallState::Open
        } else {
            WallState::Closed
        }
    }

    /// Snapshot of one cell and the state of its four walls.
    /// Returns None if the coordinate is out of the grid's bounds.
    pub fn cell(&self, coord: GridCoordinate) -> Option<Cell> {
        if self.is_valid_coordinate(coord) {
            Some(Cell {
                     coord,
                     visited: self.is_visited(coord),
                     north: self.wall_state(coord, CompassPrimary::North),
                     south: self.wall_state(coord, CompassPrimary::South),
                     east: self.wall_state(coord, CompassPrimary::East),
                     west: self.wall_state(coord, CompassPrimary::West),
                 })
        } else {
            None
        }
    }

    /// Flag a cell as visited by the running generator.
    /// Returns false if the coordinate is out of the grid's bounds.
    pub fn mark_visited(&mut self, coord: GridCoordinate) -> bool {
        if let Some(index) = self.grid_coordinate_to_index(coord) {
            self.visited.insert(index);
            true
        } else {
            false
        }
    }

    pub fn is_visited(&self, coord: GridCoordinate) -> bool {
        self.grid_coordinate_to_index(coord)
            .map_or(false, |index| self.visited.contains(index))
    }

    /// The maze-complete predicate: true iff every cell has been visited.
    pub fn all_visited(&self) -> bool {
        self.visited.len() == self.size()
    }

    /// True iff at least one in-bounds neighbour of the cell is unvisited,
    /// i.e. a generator can keep carving from here.
    pub fn has_unvisited_neighbour(&self, coord: GridCoordinate) -> bool {
        self.neighbours(coord)
            .iter()
            .any(|&neighbour| !self.is_visited(neighbour))
    }

    /// Scan the grid in row major order (row 0..rows, column 0..columns
    /// within a row) for the first cell that is itself unvisited but borders
    /// at least one visited cell.
    ///
    /// The scan order is part of the contract: when several cells qualify it
    /// decides where hunt-and-kill resumes carving, and with it the final
    /// shape of the maze for a given seed.
    pub fn first_unvisited_with_visited_neighbour(&self) -> Option<GridCoordinate> {
        self.iter().find(|&coord| {
            !self.is_visited(coord) &&
            self.neighbours(coord).iter().any(|&neighbour| self.is_visited(neighbour))
        })
    }

    /// Check that the passages form a perfect maze: every cell reachable
    /// from every other and exactly `size - 1` open walls, i.e. the passage
    /// graph is a spanning tree of the grid.
    pub fn is_perfect_maze(&self) -> bool {
        if self.links_count() != self.size() - 1 {
            return false;
        }

        let start = GridCoordinate::new(0, 0);
        let mut seen = crate::utils::fnv_hashset(self.size());
        let mut to_visit = vec![start];
        seen.insert(start);
        while let Some(cell) = to_visit.pop() {
            if let Some(linked) = self.links(cell) {
                for &next in linked.iter() {
                    if seen.insert(next) {
                        to_visit.push(next);
                    }
                }
            }
        }

        seen.len() == self.size()
    }

    /// Convert a grid coordinate to a one dimensional index in the range
    /// 0...self.size(). Returns None if the grid coordinate is invalid.
    #[inline]
    pub fn grid_coordinate_to_index(&self, coord: GridCoordinate) -> Option<usize> {
        if self.is_valid_coordinate(coord) {
            Some(coord.row as usize * self.columns.0 + coord.col as usize)
        } else {
            None
        }
    }

    /// Is the grid coordinate within the grid's dimensions?
    #[inline]
    pub fn is_valid_coordinate(&self, coord: GridCoordinate) -> bool {
        (coord.row as usize) < self.rows.0 && (coord.col as usize) < self.columns.0
    }

    /// Row major iterator over every cell coordinate in the grid.
    pub fn iter(&self) -> CellIter {
        CellIter {
            current_cell_number: 0,
            cells_count: self.size(),
            row_width: self.columns.0,
        }
    }

    pub fn iter_row(&self) -> BatchIter {
        BatchIter {
            iter_type: BatchIterType::Row,
            current_index: 0,
            rows: self.rows.0,
            columns: self.columns.0,
        }
    }

    pub fn iter_column(&self) -> BatchIter {
        BatchIter {
            iter_type: BatchIterType::Column,
            current_index: 0,
            rows: self.rows.0,
            columns: self.columns.0,
        }
    }

    pub fn iter_links(&self) -> LinksIter<GridIndexType> {
        LinksIter {
            graph_edge_iter: self.graph.raw_edges().iter(),
            row_width: self.columns.0,
        }
    }

    fn is_neighbour(&self, a: GridCoordinate, b: GridCoordinate) -> bool {
        self.neighbours(a).iter().any(|&coord| coord == b)
    }

    /// Convert a grid coordinate into a petgraph node index.
    /// Returns None if the grid coordinate is invalid (out of the grid's dimensions).
    #[inline]
    fn grid_coordinate_graph_index(&self,
                                   coord: GridCoordinate)
                                   -> Option<graph::NodeIndex<GridIndexType>> {
        self.grid_coordinate_to_index(coord)
            .map(graph::NodeIndex::<GridIndexType>::new)
    }
}

fn graph_size(rows: RowsCount, columns: ColumnsCount) -> (NodesCount, EdgesCount) {
    let (RowsCount(rows_count), ColumnsCount(columns_count)) = (rows, columns);
    let cells_count = rows_count * columns_count;
    // The edge capacity hint is the interior wall count: every passage that
    // could ever be opened.
    let edges_count = rows_count * (columns_count.saturating_sub(1)) +
                      columns_count * (rows_count.saturating_sub(1));
    (NodesCount(cells_count), EdgesCount(edges_count))
}

/// Move a coordinate one cell in the given direction.
///
/// Returns None when the result is not representable (north of row 0 or west
/// of column 0); moves south or east must be bounds checked against a grid
/// separately.
pub fn offset_coordinate(coord: GridCoordinate, dir: CompassPrimary) -> Option<GridCoordinate> {
    let GridCoordinate { row, col } = coord;
    match dir {
        CompassPrimary::North => {
            if row > 0 {
                Some(GridCoordinate::new(row - 1, col))
            } else {
                None
            }
        }
        CompassPrimary::South => Some(GridCoordinate::new(row + 1, col)),
        CompassPrimary::East => Some(GridCoordinate::new(row, col + 1)),
        CompassPrimary::West => {
            if col > 0 {
                Some(GridCoordinate::new(row, col - 1))
            } else {
                None
            }
        }
    }
}

impl<GridIndexType: IndexType> fmt::Display for RectGrid<GridIndexType> {
    /// Text rendering of the grid: `+` corners, `---` and `|` for closed
    /// walls, spaces for open passages and cell bodies.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        const CORNER: &str = "+";
        const WALL_EW: &str = "---";
        const PASSAGE_EW: &str = "   ";
        const WALL_NS: &str = "|";
        const PASSAGE_NS: &str = " ";
        const BODY: &str = "   ";

        let ColumnsCount(columns_count) = self.columns;

        // The north boundary is all wall.
        let mut output = String::from(CORNER);
        for _ in 0..columns_count {
            output.push_str(WALL_EW);
            output.push_str(CORNER);
        }
        output.push('\n');

        // Each grid row renders as a body line then its southern boundary;
        // a cell's north wall was already drawn by the row above it.
        for row in self.iter_row() {
            let mut body_line = String::from(WALL_NS);
            let mut south_line = String::from(CORNER);

            for coord in row {
                body_line.push_str(BODY);
                body_line.push_str(if self.is_neighbour_linked(coord, CompassPrimary::East) {
                                       PASSAGE_NS
                                   } else {
                                       WALL_NS
                                   });
                south_line.push_str(if self.is_neighbour_linked(coord, CompassPrimary::South) {
                                        PASSAGE_EW
                                    } else {
                                        WALL_EW
                                    });
                south_line.push_str(CORNER);
            }

            output.push_str(&body_line);
            output.push('\n');
            output.push_str(&south_line);
            output.push('\n');
        }

        write!(f, "{}", output)
    }
}

#[derive(Debug, Copy, Clone)]
pub struct CellIter {
    current_cell_number: usize,
    cells_count: usize,
    row_width: usize,
}

impl Iterator for CellIter {
    type Item = GridCoordinate;
    fn next(&mut self) -> Option<Self::Item> {
        if self.current_cell_number < self.cells_count {
            let coord = GridCoordinate::from_row_major_index(self.current_cell_number,
                                                             self.row_width);
            self.current_cell_number += 1;
            Some(coord)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.cells_count - self.current_cell_number;
        (remaining, Some(remaining))
    }
}
impl ExactSizeIterator for CellIter {} // default impl using size_hint()

// Converting the grid into an iterator (CellIter - the default most sensible).
impl<'a, GridIndexType: IndexType> IntoIterator for &'a RectGrid<GridIndexType> {
    type Item = GridCoordinate;
    type IntoIter = CellIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Copy, Clone)]
enum BatchIterType {
    Row,
    Column,
}

#[derive(Debug, Copy, Clone)]
pub struct BatchIter {
    iter_type: BatchIterType,
    current_index: usize,
    rows: usize,
    columns: usize,
}

impl Iterator for BatchIter {
    type Item = Vec<GridCoordinate>;
    fn next(&mut self) -> Option<Self::Item> {
        if let BatchIterType::Row = self.iter_type {
            if self.current_index < self.rows {
                let coords = (0..self.columns)
                    .map(|i| {
                             GridCoordinate::from_row_column_indices(RowIndex(self.current_index),
                                                                     ColumnIndex(i))
                         })
                    .collect();
                self.current_index += 1;
                Some(coords)
            } else {
                None
            }
        } else if self.current_index < self.columns {
            let coords = (0..self.rows)
                .map(|i| {
                         GridCoordinate::from_row_column_indices(RowIndex(i),
                                                                 ColumnIndex(self.current_index))
                     })
                .collect();
            self.current_index += 1;
            Some(coords)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let count = if let BatchIterType::Row = self.iter_type {
            self.rows
        } else {
            self.columns
        };
        let remaining = count - self.current_index;
        (remaining, Some(remaining))
    }
}
impl ExactSizeIterator for BatchIter {} // default impl using size_hint()

pub struct LinksIter<'a, GridIndexType: IndexType + 'a> {
    graph_edge_iter: slice::Iter<'a, graph::Edge<(), GridIndexType>>,
    row_width: usize,
}

impl<'a, GridIndexType: IndexType> Iterator for LinksIter<'a, GridIndexType> {
    type Item = (GridCoordinate, GridCoordinate);

    fn next(&mut self) -> Option<Self::Item> {
        self.graph_edge_iter.next().map(|edge| {
            let src = GridCoordinate::from_row_major_index(edge.source().index(), self.row_width);
            let dst = GridCoordinate::from_row_major_index(edge.target().index(), self.row_width);
            (src, dst)
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.graph_edge_iter.size_hint()
    }
}
impl<'a, GridIndexType: IndexType> ExactSizeIterator for LinksIter<'a, GridIndexType> {} // default impl using size_hint()
