use docopt::Docopt;
use mazegen::{
    driver::{self, GenerationRequest},
    generators::GeneratorKind,
    units::{ColumnsCount, RowsCount},
};
use serde_derive::Deserialize;
use std::{
    fs::File,
    io,
    io::prelude::*
};

const USAGE: &str = "Mazegen driver.

Usage:
    mazegen_driver -h | --help
    mazegen_driver generate <algorithm> [(--grid-size=<n>|[--grid-width=<w> --grid-height=<h>])] [--seed=<s>] [--text-out=<path>]

Options:
    -h --help           Show this screen.
    --grid-size=<n>     Shorthand for a square grid with n rows and n columns.
    --grid-width=<w>    The number of columns in the grid [default: 10].
    --grid-height=<h>   The number of rows in the grid [default: 10].
    --seed=<s>          Fix the random number generator seed. Rerunning with the same seed, dimensions and algorithm carves the same maze.
    --text-out=<path>   Write the text rendering of the maze to a file instead of stdout.

The algorithm is one of: recursive-backtracker, hunt-kill.
";

#[derive(Debug, Deserialize)]
struct DriverArgs {
    arg_algorithm: String,
    flag_grid_size: Option<usize>,
    flag_grid_width: usize,
    flag_grid_height: usize,
    flag_seed: Option<u64>,
    flag_text_out: String,
}

mod errors {
    // Create the Error, ErrorKind, ResultExt, and Result types.
    use error_chain::*;
    error_chain! {
        links {
            Maze(::mazegen::errors::Error, ::mazegen::errors::ErrorKind);
        }
        foreign_links {
            DocOptFailure(::docopt::Error);
        }
    }
}
use crate::errors::*;

fn main() -> Result<()> {

    env_logger::init();

    let args: DriverArgs = Docopt::new(USAGE).and_then(|d| d.deserialize())?;

    let (rows, columns) = if let Some(square_grid_size) = args.flag_grid_size {
        (square_grid_size, square_grid_size)
    } else {
        (args.flag_grid_height, args.flag_grid_width)
    };

    let algorithm: GeneratorKind = args.arg_algorithm.parse()?;

    let request = GenerationRequest {
        rows: RowsCount(rows),
        columns: ColumnsCount(columns),
        algorithm,
        seed: args.flag_seed,
    };
    let maze = driver::generate(&request)?;

    let rendering = format!("{}", maze);
    if args.flag_text_out.is_empty() {
        print!("{}", rendering);
    } else {
        write_text_to_file(&rendering, &args.flag_text_out)
            .chain_err(|| format!("Failed to write maze to text file {}", args.flag_text_out))?;
    }

    Ok(())
}

fn write_text_to_file(data: &str, file_name: &str) -> io::Result<()> {
    let mut f = File::create(file_name)?;
    f.write_all(data.as_bytes())?;
    Ok(())
}
