//! CLI frontend for the Fauna actor simulation.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "fauna",
    about = "Fauna — a streamed actor simulation",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate the built-in demo world and report what happened
    Run {
        /// Species definitions file (built-in catalog when omitted)
        #[arg(short, long)]
        defs: Option<PathBuf>,

        /// RNG seed for deterministic runs
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Number of ticks to simulate
        #[arg(short, long, default_value = "600")]
        ticks: u64,

        /// Actor pool capacity
        #[arg(long, default_value = "128")]
        capacity: usize,

        /// Skip the event tail, print only the summary and table
        #[arg(short, long)]
        quiet: bool,
    },

    /// List the species catalog after load-or-fallback
    Species {
        /// Species definitions file (built-in catalog when omitted)
        #[arg(short, long)]
        defs: Option<PathBuf>,
    },

    /// Parse a definitions file and report its warnings
    Check {
        /// Species definitions file
        #[arg(short, long)]
        defs: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            defs,
            seed,
            ticks,
            capacity,
            quiet,
        } => commands::run::run(defs.as_deref(), seed, ticks, capacity, quiet),
        Commands::Species { defs } => commands::species::run(defs.as_deref()),
        Commands::Check { defs } => commands::check::run(&defs),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
