//! Command-line driver
//!
//! Loads CSV datasets into a file-backed index, answers point, range and
//! snapshot queries, and benchmarks the chain strategies in memory.
//! Responses are single JSON lines on stdout; logs go to stderr.

mod args;
mod bench;
mod commands;
mod config;
mod dataset;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use bench::{run_bench, BenchReport, StrategyReport};
pub use commands::{build_index, execute, open_index, run, RowIndex};
pub use config::{Config, Strategy};
pub use dataset::{parse_csv, read_csv, synthetic, DatasetRow, Row};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_error, write_response};
