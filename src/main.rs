//! purpose: This is the CLI entry point for docsync. It parses command-line arguments
//!     using clap, determines the project root directory, and dispatches to the harvest
//!     or sync command handler.
//!
//! when-editing:
//!     - !The root directory defaults to current working directory if not specified
//!     - Error messages are printed to stderr and exit with code 1
//!
//! invariants:
//!     - One and only one subcommand is always executed per invocation
//!     - sync owns its exit code (0 clean, 1 check failures, 2 strict failures)
//!
//! do-not:
//!     - Never add business logic here - delegate to command modules

use anyhow::Context;
use clap::Parser;
use docsync::cli::{Cli, Commands};
use docsync::commands::{run_harvest, run_sync};
use std::env;

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn run() -> anyhow::Result<i32> {
    let cli = Cli::parse();

    // Determine root directory
    let root = match cli.root {
        Some(root) => root,
        None => env::current_dir().context("Failed to get current directory")?,
    };

    match cli.command {
        Commands::Harvest(args) => run_harvest(&args, &root, cli.verbose).map(|()| 0),
        Commands::Sync(args) => run_sync(&args, &root, cli.verbose),
    }
}
