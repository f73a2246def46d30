//! CLI argument definitions using clap
//!
//! Commands:
//! - chronoweave load --config <path> --csv <path>
//! - chronoweave get --config <path> --key <k> --at <t>
//! - chronoweave range --config <path> --from <k> --to <k> --at <t>
//! - chronoweave snapshot --config <path> --at <t>
//! - chronoweave bench [--csv <path>] [--runs N] [--probes a,b,c]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// chronoweave - a deterministic temporal index over keyed rows
#[derive(Parser, Debug)]
#[command(name = "chronoweave")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Emit TRACE log lines on stderr
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Append every row of a CSV file, in file order
    Load {
        /// Path to configuration file
        #[arg(long, default_value = "./chronoweave.json")]
        config: PathBuf,

        /// Dataset with `key,title,comment,version` rows
        #[arg(long)]
        csv: PathBuf,
    },

    /// Value of one key visible at a version
    Get {
        /// Path to configuration file
        #[arg(long, default_value = "./chronoweave.json")]
        config: PathBuf,

        #[arg(long)]
        key: String,

        #[arg(long)]
        at: u64,
    },

    /// Values of a key range visible at a version
    Range {
        /// Path to configuration file
        #[arg(long, default_value = "./chronoweave.json")]
        config: PathBuf,

        #[arg(long)]
        from: String,

        #[arg(long)]
        to: String,

        /// Exclude `from` itself
        #[arg(long)]
        from_exclusive: bool,

        /// Exclude `to` itself
        #[arg(long)]
        to_exclusive: bool,

        #[arg(long)]
        at: u64,
    },

    /// Values of every key visible at a version
    Snapshot {
        /// Path to configuration file
        #[arg(long, default_value = "./chronoweave.json")]
        config: PathBuf,

        #[arg(long)]
        at: u64,
    },

    /// Time inserts and full snapshots for every strategy in memory
    Bench {
        /// Dataset to replay; a synthetic one is generated when absent
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Runs averaged per strategy
        #[arg(long, default_value_t = 5)]
        runs: usize,

        /// Snapshot versions probed in every run
        #[arg(
            long,
            value_delimiter = ',',
            default_value = "10,100,500,1000,5000,10000,50000,100000,500000"
        )]
        probes: Vec<u64>,

        /// Synthetic dataset size
        #[arg(long, default_value_t = 10_000)]
        rows: usize,

        /// Synthetic key count
        #[arg(long, default_value_t = 100)]
        keys: usize,

        /// Synthetic dataset seed
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
