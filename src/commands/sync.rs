//! purpose: This module implements the sync command: load the document store, run the
//!     synchronization driver over every matched source file, report the result, and
//!     (only in --write mode) rewrite changed files wholesale.
//!
//! when-editing:
//!     - !Exit codes are part of the contract: 0 clean, 1 pending changes in --check
//!       mode, 2 unresolved identifiers in --strict mode (strict wins over check)
//!     - !Files are replaced only after the full in-memory computation succeeded; there
//!       is no partial-write visibility
//!
//! invariants:
//!     - Dry-run is the default; nothing is written unless --write is passed
//!     - An unreadable file is fatal for that file only; the run continues and fails
//!       at the end
//!
//! gotchas:
//!     - The missing-id report aggregates across files, so one stale identifier
//!       referenced from many headers is listed once with its reference count

use crate::cli::{parse_ext_list, SyncArgs};
use crate::commands::{collect_files, display_relative};
use crate::config::Config;
use crate::store::DocStore;
use crate::sync::sync_text;
use anyhow::{Context, Result};
use serde_json::json;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// One file whose synchronized text differs from what is on disk.
struct FileChange {
    path: PathBuf,
    updated: String,
    changed: Vec<String>,
}

pub fn run_sync(args: &SyncArgs, root: &Path, verbose: bool) -> Result<i32> {
    let config = Config::load(root);

    let store_dir = match &args.store {
        Some(dir) if dir.is_absolute() => dir.clone(),
        Some(dir) => root.join(dir),
        None => root.join(&config.store_dir),
    };
    let store = DocStore::new(&store_dir);
    let docs = store
        .load_all()
        .with_context(|| format!("Failed to load document store at {}", store_dir.display()))?;

    if verbose {
        println!("Loaded {} document(s) from {}", docs.len(), store_dir.display());
    }

    let exts = parse_ext_list(&args.ext);
    let excl = args.common.exclusion_config(&config.exclude);
    let files = collect_files(&args.paths, root, &exts, &excl);

    let mut changes: Vec<FileChange> = Vec::new();
    let mut missing: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut errors = 0;

    for file in &files {
        let original = match fs::read_to_string(file) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("Error reading {}: {}", file.display(), e);
                errors += 1;
                continue;
            }
        };

        let outcome = sync_text(&original, &docs, &args.lang);
        let rel = display_relative(file, root);

        for id in &outcome.unresolved {
            missing.entry(id.clone()).or_default().push(rel.clone());
        }

        if outcome.text != original {
            if verbose {
                for id in &outcome.changed {
                    println!("{}: updating {}", rel, id);
                }
            }
            changes.push(FileChange {
                path: file.clone(),
                updated: outcome.text,
                changed: outcome.changed,
            });
        }
    }

    report(&changes, &missing, root, args.json, verbose)?;

    if args.write {
        for change in &changes {
            fs::write(&change.path, &change.updated)
                .with_context(|| format!("Failed to write {}", change.path.display()))?;
        }
        if !changes.is_empty() {
            println!("Wrote {} file(s)", changes.len());
        }
    }

    if errors > 0 {
        anyhow::bail!("{} files failed to process", errors);
    }
    if args.strict && !missing.is_empty() {
        return Ok(2);
    }
    if args.check && !changes.is_empty() {
        return Ok(1);
    }
    Ok(0)
}

fn report(
    changes: &[FileChange],
    missing: &BTreeMap<String, Vec<String>>,
    root: &Path,
    as_json: bool,
    verbose: bool,
) -> Result<()> {
    if as_json {
        let report = json!({
            "files": changes
                .iter()
                .map(|c| json!({
                    "path": display_relative(&c.path, root),
                    "changed": c.changed,
                }))
                .collect::<Vec<_>>(),
            "unresolved": missing,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if !missing.is_empty() {
        eprintln!("Missing doc-ids referenced in source:");
        for (id, referencing) in missing {
            eprintln!("  - {}  (referenced in {} file(s))", id, referencing.len());
            if verbose {
                for file in referencing {
                    eprintln!("      - {}", file);
                }
            }
        }
    }

    if changes.is_empty() {
        if verbose {
            println!("No changes");
        }
        return Ok(());
    }

    let total_blocks: usize = changes.iter().map(|c| c.changed.len()).sum();
    println!(
        "{} file(s) would change; {} doc block(s) updated",
        changes.len(),
        total_blocks
    );
    for change in changes {
        println!(
            "- {}  ({} block(s))",
            display_relative(&change.path, root),
            change.changed.len()
        );
        if verbose {
            for id in &change.changed {
                println!("    * {}", id);
            }
        }
    }
    Ok(())
}
