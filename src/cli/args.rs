//! purpose: This module defines the command-line interface for docsync using the clap
//!     derive macros. It specifies the harvest and sync commands and their arguments.
//!
//! when-editing:
//!     - !Global flags (root, verbose) are defined on Cli and propagate to all subcommands
//!     - !Harvest modes (--dump, --dump-extracted, --seed, --insert-ids) are mutually
//!       exclusive; with no mode, harvest prints per-file block counts
//!
//! invariants:
//!     - Each subcommand has its own Args struct with typed fields
//!     - PathBuf is used for all file/directory path arguments
//!
//! gotchas:
//!     - sync defaults to dry-run; --check and --write are mutually exclusive modes
//!     - --ext takes a comma-separated list and tolerates leading dots (".h" == "h")

use crate::exclusion::ExclusionConfig;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "docsync")]
#[command(author, version, about = "Synchronize structured API docs between a YAML store and source comment blocks")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to project root (defaults to current directory)
    #[arg(short, long, global = true)]
    pub root: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Harvest doc blocks from source files into the YAML store
    Harvest(HarvestArgs),

    /// Apply store documents into marker-bearing source comment blocks
    Sync(SyncArgs),
}

/// Common options shared between harvest and sync commands
#[derive(Args, Clone, Default)]
pub struct CommonOptions {
    /// Exclude files/directories matching glob pattern (can be repeated)
    #[arg(long, value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Don't respect .gitignore files
    #[arg(long)]
    pub no_gitignore: bool,
}

impl CommonOptions {
    /// Create an ExclusionConfig from these options, merging with config file patterns
    pub fn exclusion_config(&self, config_patterns: &[String]) -> ExclusionConfig {
        let mut patterns = config_patterns.to_vec();
        patterns.extend(self.exclude.clone());
        ExclusionConfig {
            patterns,
            respect_gitignore: !self.no_gitignore,
        }
    }
}

#[derive(Args)]
pub struct HarvestArgs {
    /// Specific files or directories to harvest
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Dump normalized doc blocks from a single file
    #[arg(long, value_name = "FILE", group = "mode")]
    pub dump: Option<PathBuf>,

    /// Dump extracted description/examples summary for a single file
    #[arg(long, value_name = "FILE", group = "mode")]
    pub dump_extracted: Option<PathBuf>,

    /// Seed the YAML docs store from harvested blocks
    #[arg(long, group = "mode")]
    pub seed: bool,

    /// Insert/update identifier markers in harvestable blocks (edits sources in place)
    #[arg(long, group = "mode")]
    pub insert_ids: bool,

    /// Store directory for --seed (overrides docsync.toml store_dir)
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Comma-separated list of file extensions to scan
    #[arg(long, default_value = "ts")]
    pub ext: String,

    /// Limit on records written (--seed) or blocks updated (--insert-ids)
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,

    /// Max number of doc blocks to dump (--dump / --dump-extracted)
    #[arg(long, default_value_t = 2, value_name = "N")]
    pub max_blocks: usize,

    /// When seeding, delete store records not regenerated in this run
    #[arg(long)]
    pub prune: bool,

    #[command(flatten)]
    pub common: CommonOptions,
}

impl Default for HarvestArgs {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            dump: None,
            dump_extracted: None,
            seed: false,
            insert_ids: false,
            out_dir: None,
            ext: "ts".to_string(),
            limit: None,
            max_blocks: 2,
            prune: false,
            common: CommonOptions::default(),
        }
    }
}

#[derive(Args)]
pub struct SyncArgs {
    /// Specific files or directories to synchronize
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Single example language key to render (e.g. "objc", "ts", "kotlin")
    #[arg(long)]
    pub lang: String,

    /// Store directory to read documents from (overrides docsync.toml store_dir)
    #[arg(long, value_name = "DIR")]
    pub store: Option<PathBuf>,

    /// Comma-separated list of file extensions to scan
    #[arg(long, default_value = "h")]
    pub ext: String,

    /// Write changes to files
    #[arg(long, conflicts_with = "check")]
    pub write: bool,

    /// No writes; exit 1 if any changes would be made
    #[arg(long)]
    pub check: bool,

    /// Fail (exit 2) if any referenced identifier is missing from the store
    #[arg(long)]
    pub strict: bool,

    /// Print the change report as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub common: CommonOptions,
}

/// Parse a comma-separated extension list, tolerating leading dots.
pub fn parse_ext_list(ext: &str) -> Vec<String> {
    ext.split(',')
        .map(|e| e.trim().trim_start_matches('.').to_string())
        .filter(|e| !e.is_empty())
        .collect()
}
