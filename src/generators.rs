//! Maze generation algorithms.
//!
//! Both generators are carving passes over a freshly created grid: starting
//! from cell (0, 0) they only ever open walls and mark cells visited, never
//! the reverse, and they run until every cell of the grid has been visited.
//! The random source is an explicit argument so that a fixed seed always
//! reproduces the same maze.

use log::debug;
use rand::{Rng, XorShiftRng};
use std::fmt;
use std::str::FromStr;

use crate::errors::{Error, ErrorKind};
use crate::grid::{CompassPrimary, GridCoordinate, IndexType, RectGrid};

/// Apply the recursive backtracker maze generation algorithm to the grid.
///
/// A randomised depth first search: carve a passage to a random unvisited
/// neighbour until the current cell has none left (a dead end), then walk
/// back through the stack of previously carved cells until one of them has
/// an unvisited neighbour and resume carving from there. Backtracking moves
/// the cursor only - no wall is touched on the way back out. The maze is
/// complete when a dead end is reached with an empty stack, which is
/// equivalent to every cell having been visited.
pub fn recursive_backtracker<GridIndexType>(grid: &mut RectGrid<GridIndexType>,
                                            rng: &mut XorShiftRng)
    where GridIndexType: IndexType
{
    let mut current = GridCoordinate::new(0, 0);
    grid.mark_visited(current);

    let mut backtrack_stack: Vec<GridCoordinate> = Vec::with_capacity(grid.size());

    loop {
        if grid.has_unvisited_neighbour(current) {
            let next = rand_passage_target(grid, rng, current, |g, cell| !g.is_visited(cell));
            grid.link(current, next)
                .expect("carving to an adjacent unvisited cell cannot fail");
            backtrack_stack.push(current);
            current = next;
            grid.mark_visited(current);
        } else if let Some(earlier) = backtrack_stack.pop() {
            // Pure cursor relocation, nothing is carved on the way back.
            current = earlier;
        } else {
            break;
        }
    }

    debug_assert!(grid.all_visited(),
                  "recursive backtracker terminated with unvisited cells");
}

/// Apply the hunt-and-kill maze generation algorithm to the grid.
///
/// The kill phase carves exactly like the recursive backtracker - random
/// unvisited neighbour, open the wall, move on - but keeps no stack. On
/// reaching a dead end the hunt phase scans the grid in row major order for
/// the first unvisited cell bordering the carved region, joins it to a
/// random visited neighbour and resumes killing from there. The maze is
/// complete when a hunt finds nothing, which is equivalent to every cell
/// having been visited.
pub fn hunt_and_kill<GridIndexType>(grid: &mut RectGrid<GridIndexType>, rng: &mut XorShiftRng)
    where GridIndexType: IndexType
{
    let mut current = GridCoordinate::new(0, 0);
    grid.mark_visited(current);

    loop {
        // Kill: random walk through unvisited neighbours until a dead end.
        while grid.has_unvisited_neighbour(current) {
            let next = rand_passage_target(grid, rng, current, |g, cell| !g.is_visited(cell));
            grid.link(current, next)
                .expect("carving to an adjacent unvisited cell cannot fail");
            current = next;
            grid.mark_visited(current);
        }

        // Hunt: pick up the first unvisited cell adjacent to the carved
        // region and join it in.
        if let Some(found) = grid.first_unvisited_with_visited_neighbour() {
            debug!("hunt phase resumed carving at {:?}", found);
            let into_maze = rand_passage_target(grid, rng, found, |g, cell| g.is_visited(cell));
            grid.link(found, into_maze)
                .expect("joining a hunted cell to its visited neighbour cannot fail");
            grid.mark_visited(found);
            current = found;
        } else {
            break;
        }
    }

    debug_assert!(grid.all_visited(), "hunt phase found nothing with unvisited cells left");
}

/// One uniform draw from the four compass directions.
fn rand_direction(rng: &mut XorShiftRng) -> CompassPrimary {
    const DIRS_COUNT: usize = 4;
    const DIRS: [CompassPrimary; DIRS_COUNT] = [CompassPrimary::North,
                                                CompassPrimary::East,
                                                CompassPrimary::South,
                                                CompassPrimary::West];
    let dir_index = rng.gen::<usize>() % DIRS_COUNT;
    DIRS[dir_index]
}

/// Uniformly choose a neighbour of `from` satisfying `select` by redrawing
/// the direction until a valid one comes up, consuming one draw per attempt.
///
/// Rejection sampling rather than drawing once from the valid subset keeps
/// the number of draws per carving step identical to the historical
/// behaviour, so existing seeds keep producing the same mazes.
///
/// The caller must guarantee that at least one neighbour satisfies `select`,
/// otherwise the loop never terminates.
fn rand_passage_target<GridIndexType, F>(grid: &RectGrid<GridIndexType>,
                                         rng: &mut XorShiftRng,
                                         from: GridCoordinate,
                                         select: F)
                                         -> GridCoordinate
    where GridIndexType: IndexType,
          F: Fn(&RectGrid<GridIndexType>, GridCoordinate) -> bool
{
    loop {
        let direction = rand_direction(rng);
        if let Some(neighbour) = grid.neighbour_at_direction(from, direction) {
            if select(grid, neighbour) {
                return neighbour;
            }
        }
    }
}

/// The maze generation algorithms on offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorKind {
    RecursiveBacktracker,
    HuntAndKill,
}

impl GeneratorKind {
    /// Run this algorithm over the grid until the maze is complete.
    pub fn carve<GridIndexType>(self, grid: &mut RectGrid<GridIndexType>, rng: &mut XorShiftRng)
        where GridIndexType: IndexType
    {
        match self {
            GeneratorKind::RecursiveBacktracker => recursive_backtracker(grid, rng),
            GeneratorKind::HuntAndKill => hunt_and_kill(grid, rng),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            GeneratorKind::RecursiveBacktracker => "recursive-backtracker",
            GeneratorKind::HuntAndKill => "hunt-kill",
        }
    }
}

impl fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for GeneratorKind {
    type Err = Error;

    /// Select an algorithm by identifier. Anything other than the exact
    /// names `recursive-backtracker` and `hunt-kill` is an
    /// `UnknownAlgorithm` error - never a silent default.
    fn from_str(s: &str) -> Result<GeneratorKind, Error> {
        match s {
            "recursive-backtracker" => Ok(GeneratorKind::RecursiveBacktracker),
            "hunt-kill" => Ok(GeneratorKind::HuntAndKill),
            _ => Err(ErrorKind::UnknownAlgorithm(s.to_owned()).into()),
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::driver::seeded_rng;
    use crate::errors::ErrorKind;
    use crate::grid::WallState;
    use crate::grids::{small_rect_grid, SmallRectGrid};
    use crate::units::{ColumnsCount, RowsCount};

    use itertools::Itertools;
    use petgraph::unionfind::UnionFind;
    use quickcheck::quickcheck;

    fn small_grid(rows: usize, columns: usize) -> SmallRectGrid {
        small_rect_grid(RowsCount(rows), ColumnsCount(columns))
            .expect("the test grid dimensions are always valid")
    }

    /// Independent spanning tree check: union-find over the carved passages
    /// proves the open walls are acyclic and count exactly size - 1.
    fn assert_spanning_tree(grid: &SmallRectGrid) {
        let mut components = UnionFind::<usize>::new(grid.size());
        let mut edges_count = 0;
        for (a, b) in grid.iter_links() {
            let a_index = grid.grid_coordinate_to_index(a)
                .expect("links iteration only yields valid coordinates");
            let b_index = grid.grid_coordinate_to_index(b)
                .expect("links iteration only yields valid coordinates");
            assert!(components.union(a_index, b_index),
                    "the passages contain a cycle through {:?} and {:?}",
                    a,
                    b);
            edges_count += 1;
        }
        assert_eq!(edges_count, grid.size() - 1);
    }

    fn assert_boundary_closed(grid: &SmallRectGrid) {
        let last_row = grid.rows().0 as u32 - 1;
        let last_col = grid.columns().0 as u32 - 1;
        for coord in grid.iter() {
            if coord.row == 0 {
                assert_eq!(grid.wall_state(coord, CompassPrimary::North), WallState::Closed);
            }
            if coord.row == last_row {
                assert_eq!(grid.wall_state(coord, CompassPrimary::South), WallState::Closed);
            }
            if coord.col == 0 {
                assert_eq!(grid.wall_state(coord, CompassPrimary::West), WallState::Closed);
            }
            if coord.col == last_col {
                assert_eq!(grid.wall_state(coord, CompassPrimary::East), WallState::Closed);
            }
        }
    }

    fn assert_shared_walls_agree(grid: &SmallRectGrid) {
        for coord in grid.iter() {
            if let Some(east) = grid.neighbour_at_direction(coord, CompassPrimary::East) {
                assert_eq!(grid.wall_state(coord, CompassPrimary::East),
                           grid.wall_state(east, CompassPrimary::West));
            }
            if let Some(south) = grid.neighbour_at_direction(coord, CompassPrimary::South) {
                assert_eq!(grid.wall_state(coord, CompassPrimary::South),
                           grid.wall_state(south, CompassPrimary::North));
            }
        }
    }

    /// Sorted edge list, used to compare the wall configuration of two runs.
    fn maze_edges(grid: &SmallRectGrid) -> Vec<(GridCoordinate, GridCoordinate)> {
        grid.iter_links()
            .map(|(a, b)| if a <= b { (a, b) } else { (b, a) })
            .sorted()
    }

    #[test]
    fn recursive_backtracker_single_cell_completes_immediately() {
        let mut g = small_grid(1, 1);
        let mut rng = seeded_rng(1);
        recursive_backtracker(&mut g, &mut rng);

        assert!(g.all_visited());
        assert_eq!(g.links_count(), 0);
        let cell = g.cell(GridCoordinate::new(0, 0)).unwrap();
        assert_eq!(cell.north, WallState::Closed);
        assert_eq!(cell.south, WallState::Closed);
        assert_eq!(cell.east, WallState::Closed);
        assert_eq!(cell.west, WallState::Closed);
    }

    #[test]
    fn hunt_and_kill_single_cell_completes_immediately() {
        let mut g = small_grid(1, 1);
        let mut rng = seeded_rng(1);
        hunt_and_kill(&mut g, &mut rng);

        assert!(g.all_visited());
        assert_eq!(g.links_count(), 0);
    }

    #[test]
    fn recursive_backtracker_two_by_two() {
        let mut g = small_grid(2, 2);
        let mut rng = seeded_rng(42);
        recursive_backtracker(&mut g, &mut rng);

        // A spanning tree of 4 cells always has exactly 3 open walls.
        assert_eq!(g.links_count(), 3);
        assert!(g.is_perfect_maze());
        assert_spanning_tree(&g);
    }

    #[test]
    fn hunt_and_kill_five_by_five() {
        for seed in 0..10 {
            let mut g = small_grid(5, 5);
            let mut rng = seeded_rng(seed);
            hunt_and_kill(&mut g, &mut rng);

            assert!(g.is_perfect_maze());
            assert_spanning_tree(&g);
            assert_boundary_closed(&g);
            assert_shared_walls_agree(&g);
        }
    }

    #[test]
    fn termination_coincides_with_all_visited() {
        let mut backtracked = small_grid(6, 4);
        recursive_backtracker(&mut backtracked, &mut seeded_rng(7));
        assert!(backtracked.all_visited());
        assert_eq!(backtracked.first_unvisited_with_visited_neighbour(), None);

        let mut hunted = small_grid(6, 4);
        hunt_and_kill(&mut hunted, &mut seeded_rng(7));
        assert!(hunted.all_visited());
        assert_eq!(hunted.first_unvisited_with_visited_neighbour(), None);
    }

    #[test]
    fn same_seed_reproduces_the_same_maze() {
        for &kind in &[GeneratorKind::RecursiveBacktracker, GeneratorKind::HuntAndKill] {
            let mut first = small_grid(9, 7);
            let mut second = small_grid(9, 7);
            kind.carve(&mut first, &mut seeded_rng(99));
            kind.carve(&mut second, &mut seeded_rng(99));
            assert_eq!(maze_edges(&first), maze_edges(&second));
        }
    }

    #[test]
    fn different_seeds_give_different_mazes() {
        for &kind in &[GeneratorKind::RecursiveBacktracker, GeneratorKind::HuntAndKill] {
            let mut first = small_grid(9, 7);
            let mut second = small_grid(9, 7);
            kind.carve(&mut first, &mut seeded_rng(1));
            kind.carve(&mut second, &mut seeded_rng(2));
            assert_ne!(maze_edges(&first), maze_edges(&second));
            assert!(first.is_perfect_maze());
            assert!(second.is_perfect_maze());
        }
    }

    #[test]
    fn generator_kind_from_name() {
        assert_eq!("recursive-backtracker".parse::<GeneratorKind>().unwrap(),
                   GeneratorKind::RecursiveBacktracker);
        assert_eq!("hunt-kill".parse::<GeneratorKind>().unwrap(),
                   GeneratorKind::HuntAndKill);

        let unknown = "aldous-broder".parse::<GeneratorKind>();
        match unknown {
            Err(Error(ErrorKind::UnknownAlgorithm(name), _)) => {
                assert_eq!(name, "aldous-broder");
            }
            _ => panic!("expected UnknownAlgorithm for an unsupported name"),
        }
    }

    quickcheck! {
        fn prop_recursive_backtracker_carves_perfect_mazes(rows: usize,
                                                           columns: usize,
                                                           seed: u64) -> bool {
            let mut g = small_grid(rows % 8 + 1, columns % 8 + 1);
            recursive_backtracker(&mut g, &mut seeded_rng(seed));
            g.all_visited() && g.is_perfect_maze()
        }

        fn prop_hunt_and_kill_carves_perfect_mazes(rows: usize,
                                                   columns: usize,
                                                   seed: u64) -> bool {
            let mut g = small_grid(rows % 8 + 1, columns % 8 + 1);
            hunt_and_kill(&mut g, &mut seeded_rng(seed));
            g.all_visited() && g.is_perfect_maze()
        }

        fn prop_generated_walls_stay_consistent(rows: usize, columns: usize, seed: u64) -> bool {
            let mut g = small_grid(rows % 8 + 1, columns % 8 + 1);
            hunt_and_kill(&mut g, &mut seeded_rng(seed));
            assert_boundary_closed(&g);
            assert_shared_walls_agree(&g);
            true
        }
    }
}
