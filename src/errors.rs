//! Error taxonomy for the crate.
//!
//! All failures are local and synchronous: nothing is retried internally, a
//! caller fixes the request and reissues it. Unknown algorithm names are
//! reported, never silently defaulted.

use error_chain::*;

error_chain! {
    errors {
        InvalidDimensions(rows: usize, columns: usize) {
            description("invalid grid dimensions")
            display("invalid grid dimensions {}x{}: rows and columns must both be at least 1",
                    rows, columns)
        }
        GridTooLarge(cells: usize, max_cells: usize) {
            description("grid too large for the grid index type")
            display("grid of {} cells exceeds the {} cell capacity of the grid index type",
                    cells, max_cells)
        }
        UnknownAlgorithm(name: String) {
            description("unknown maze generation algorithm")
            display("unknown maze generation algorithm \"{}\"", name)
        }
    }
}
