//! The external entry point for maze generation.
//!
//! Consumers hand over a [`GenerationRequest`] - dimensions, algorithm
//! choice and an optional seed - and receive a finished grid whose wall
//! states they can turn into whatever physical or drawn representation they
//! like. A fresh grid is built for every request; grids are never reused.

use log::info;
use rand::{weak_rng, SeedableRng, XorShiftRng};

use crate::errors::Result;
use crate::generators::GeneratorKind;
use crate::grids::{large_rect_grid, LargeRectGrid};
use crate::units::{ColumnsCount, RowsCount};

pub const DEFAULT_ROWS: usize = 10;
pub const DEFAULT_COLUMNS: usize = 10;

/// Everything needed to generate one maze.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationRequest {
    pub rows: RowsCount,
    pub columns: ColumnsCount,
    pub algorithm: GeneratorKind,
    /// Fixing the seed makes the generated maze reproducible; without one
    /// the random source is freshly seeded from the OS.
    pub seed: Option<u64>,
}

impl Default for GenerationRequest {
    fn default() -> GenerationRequest {
        GenerationRequest {
            rows: RowsCount(DEFAULT_ROWS),
            columns: ColumnsCount(DEFAULT_COLUMNS),
            algorithm: GeneratorKind::HuntAndKill,
            seed: None,
        }
    }
}

/// Build a fresh grid for the request and run the chosen algorithm over it
/// to completion.
///
/// Fails with `InvalidDimensions` (or `GridTooLarge`) before any generation
/// work happens; a previously generated grid held by the caller is never
/// touched.
pub fn generate(request: &GenerationRequest) -> Result<LargeRectGrid> {
    let mut grid = large_rect_grid(request.rows, request.columns)?;
    let mut rng = match request.seed {
        Some(seed) => seeded_rng(seed),
        None => weak_rng(),
    };

    info!("generating a {}x{} maze with {}",
          request.rows.0,
          request.columns.0,
          request.algorithm);
    request.algorithm.carve(&mut grid, &mut rng);
    info!("maze complete with {} open passages", grid.links_count());

    Ok(grid)
}

/// Expand a 64 bit seed into xorshift state.
/// The two constant words keep the state from ever being all zero, which
/// `XorShiftRng` rejects.
pub fn seeded_rng(seed: u64) -> XorShiftRng {
    let seed_words = [seed as u32, (seed >> 32) as u32, 0x9E3779B9, 0x85EBCA6B];
    XorShiftRng::from_seed(seed_words)
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::errors::{Error, ErrorKind};
    use crate::grid::GridCoordinate;

    #[test]
    fn default_request_is_ten_by_ten_hunt_and_kill() {
        let request = GenerationRequest::default();
        assert_eq!(request.rows, RowsCount(10));
        assert_eq!(request.columns, ColumnsCount(10));
        assert_eq!(request.algorithm, GeneratorKind::HuntAndKill);
        assert_eq!(request.seed, None);
    }

    #[test]
    fn generate_produces_a_perfect_maze() {
        let request = GenerationRequest { seed: Some(5), ..Default::default() };
        let maze = generate(&request).expect("generation failed");
        assert_eq!(maze.size(), 100);
        assert!(maze.all_visited());
        assert!(maze.is_perfect_maze());
    }

    #[test]
    fn generate_rejects_zero_dimensions() {
        let request = GenerationRequest {
            rows: RowsCount(0),
            columns: ColumnsCount(7),
            ..Default::default()
        };
        match generate(&request) {
            Err(Error(ErrorKind::InvalidDimensions(rows, columns), _)) => {
                assert_eq!((rows, columns), (0, 7));
            }
            _ => panic!("expected InvalidDimensions"),
        }
    }

    #[test]
    fn fixed_seed_requests_are_reproducible() {
        let request = GenerationRequest {
            algorithm: GeneratorKind::RecursiveBacktracker,
            seed: Some(12345),
            ..Default::default()
        };
        let first = generate(&request).expect("generation failed");
        let second = generate(&request).expect("generation failed");

        for coord in first.iter() {
            assert_eq!(first.cell(coord), second.cell(coord));
        }
    }

    #[test]
    fn different_seed_requests_diverge() {
        let a = generate(&GenerationRequest { seed: Some(1), ..Default::default() })
            .expect("generation failed");
        let b = generate(&GenerationRequest { seed: Some(2), ..Default::default() })
            .expect("generation failed");

        let differs = a.iter().any(|coord| a.cell(coord) != b.cell(coord));
        assert!(differs);
        assert!(a.is_perfect_maze());
        assert!(b.is_perfect_maze());
    }

    #[test]
    fn unseeded_requests_still_complete() {
        let request = GenerationRequest::default();
        let maze = generate(&request).expect("generation failed");
        assert!(maze.is_perfect_maze());
    }

    #[test]
    fn generated_cells_report_their_coordinates() {
        let maze = generate(&GenerationRequest { seed: Some(3), ..Default::default() })
            .expect("generation failed");
        let cell = maze.cell(GridCoordinate::new(4, 6)).unwrap();
        assert_eq!(cell.coord, GridCoordinate::new(4, 6));
        assert!(cell.visited);
    }
}
