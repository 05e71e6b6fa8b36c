//! purpose: This module provides file exclusion functionality for directory walking,
//!     supporting gitignore files and patterns from docsync.toml/CLI --exclude.
//!
//! when-editing:
//!     - !Override patterns use ! prefix to negate (exclude), so we add ! to user patterns
//!     - The ignore crate handles gitignore parsing automatically
//!
//! invariants:
//!     - Default exclusions (node_modules, build trees, vendor dirs) are always applied
//!     - CLI --exclude patterns are combined with docsync.toml exclude patterns
//!     - Gitignore is respected by default unless --no-gitignore is passed
//!
//! gotchas:
//!     - The ignore crate's override patterns are inclusive by default, so we negate them

use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::overrides::OverrideBuilder;
use ignore::WalkBuilder;
use std::path::Path;

/// Configuration for file exclusion during directory walking
pub struct ExclusionConfig {
    /// Glob patterns to exclude (from --exclude flags and docsync.toml)
    pub patterns: Vec<String>,
    /// Whether to respect .gitignore files (default: true)
    pub respect_gitignore: bool,
}

impl Default for ExclusionConfig {
    fn default() -> Self {
        Self {
            patterns: Vec::new(),
            respect_gitignore: true,
        }
    }
}

/// Default directories that are always excluded
const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    ".hg",
    ".svn",
    "target",
    "build",
    "Build",
    "DerivedData",
    "Pods",
    "Carthage",
    "dist",
    ".idea",
    ".vscode",
];

/// Build a WalkBuilder with the given exclusion configuration
pub fn build_walker(root: &Path, config: &ExclusionConfig) -> WalkBuilder {
    let mut builder = WalkBuilder::new(root);

    // Configure gitignore handling
    builder.git_ignore(config.respect_gitignore);
    builder.git_global(config.respect_gitignore);
    builder.git_exclude(config.respect_gitignore);

    // Don't respect hidden files filter (we handle .git explicitly)
    builder.hidden(false);

    // Build override patterns for default exclusions and exclude patterns
    let mut overrides = OverrideBuilder::new(root);

    // Add default directory exclusions
    for dir in DEFAULT_EXCLUDED_DIRS {
        // Exclude the directory and all its contents
        let pattern = format!("!{}/**", dir);
        let _ = overrides.add(&pattern);
        let pattern = format!("!{}", dir);
        let _ = overrides.add(&pattern);
    }

    // Add user patterns as exclusions (! prefix makes them exclude)
    for pattern in &config.patterns {
        let exclude_pattern = format!("!{}", pattern);
        if let Err(e) = overrides.add(&exclude_pattern) {
            eprintln!("Warning: invalid exclude pattern '{}': {}", pattern, e);
        }
    }

    if let Ok(built) = overrides.build() {
        builder.overrides(built);
    }

    builder
}

/// Build a GlobSet from patterns for filtering explicit path arguments
pub fn build_exclude_globset(patterns: &[String]) -> Option<GlobSet> {
    if patterns.is_empty() {
        return None;
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        match Glob::new(pattern) {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(e) => {
                eprintln!("Warning: invalid exclude pattern '{}': {}", pattern, e);
            }
        }
    }

    builder.build().ok()
}

/// Check if a directory name is excluded by default
pub fn is_default_excluded(name: &str) -> bool {
    DEFAULT_EXCLUDED_DIRS.contains(&name)
}
