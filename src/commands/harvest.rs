//! purpose: This module implements the harvest command: scan TypeScript declaration
//!     files for doc blocks and either seed the YAML store, insert identifier markers
//!     into the sources, or dump diagnostics for a single file.
//!
//! when-editing:
//!     - !Seeding merges each fresh extraction with the prior store record so examples
//!       hand-added in other languages survive re-harvesting
//!     - !Blocks flagged @internal/@hidden never reach the store and never get markers
//!
//! invariants:
//!     - The first block to claim an identifier in a run wins; later duplicates are
//!       counted as skipped
//!     - Source files are only rewritten by --insert-ids, and only when a marker
//!       actually changed
//!
//! flows:
//!     - Seed: locate blocks -> resolve signature/container -> infer id -> extract ->
//!       merge with prior record -> upsert
//!     - Insert-ids: same resolution, then ensure_marker and splice changed blocks

use crate::cli::{parse_ext_list, HarvestArgs};
use crate::commands::{collect_files, display_relative};
use crate::config::Config;
use crate::parser::{
    ensure_marker, extract, find_next_signature, infer_id, locate_blocks, normalize_block,
    ContainerMap, TokenKind,
};
use crate::store::{merge_documents, DocStore};
use crate::types::{Document, Example, Extraction};
use anyhow::{Context, Result};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

pub fn run_harvest(args: &HarvestArgs, root: &Path, verbose: bool) -> Result<()> {
    let config = Config::load(root);

    if let Some(ref target) = args.dump {
        return dump_blocks(&resolve_target(target, root)?, args.max_blocks);
    }
    if let Some(ref target) = args.dump_extracted {
        return dump_extracted(&resolve_target(target, root)?, args.max_blocks);
    }

    let exts = parse_ext_list(&args.ext);
    let excl = args.common.exclusion_config(&config.exclude);
    let files = collect_files(&args.paths, root, &exts, &excl);

    if args.insert_ids {
        return insert_ids(&files, root, &config, args.limit, verbose);
    }

    if args.seed {
        let store_dir = match &args.out_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => root.join(dir),
            None => root.join(&config.store_dir),
        };
        let store = DocStore::new(store_dir);
        return seed(&files, root, &config, &store, args.limit, args.prune, verbose);
    }

    // Default mode: per-file doc-block counts.
    for file in &files {
        if let Ok(text) = fs::read_to_string(file) {
            let count = locate_blocks(&text).len();
            if count > 0 {
                println!("{}: {} doc blocks", display_relative(file, root), count);
            }
        }
    }
    Ok(())
}

/// Resolve a dump target, trying the path as given and relative to the root.
fn resolve_target(arg: &Path, root: &Path) -> Result<PathBuf> {
    if arg.exists() {
        return Ok(arg.to_path_buf());
    }
    let joined = root.join(arg);
    if joined.exists() {
        return Ok(joined);
    }
    anyhow::bail!("File not found: {}", arg.display())
}

/// Build the store document for one extracted block.
fn build_document(
    doc_id: &str,
    source_file: String,
    signature: &str,
    extraction: &Extraction,
) -> Document {
    let mut doc = Document::new(doc_id);
    doc.source_file = source_file;
    doc.signature = signature.trim().to_string();
    doc.categories = extraction.categories.clone();
    doc.description = extraction.description_text();
    for ex in &extraction.examples {
        doc.examples.insert(
            ex.key.clone(),
            Example {
                title: Some(ex.title.clone()),
                code: BTreeMap::from([(ex.lang.clone(), ex.code.clone())]),
            },
        );
    }
    doc
}

fn seed(
    files: &[PathBuf],
    root: &Path,
    config: &Config,
    store: &DocStore,
    limit: Option<usize>,
    prune: bool,
    verbose: bool,
) -> Result<()> {
    let mut files_scanned = 0;
    let mut blocks_found = 0;
    let mut written = 0;
    let mut skipped = 0;
    let mut errors = 0;

    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut generated: HashSet<PathBuf> = HashSet::new();

    'files: for file in files {
        files_scanned += 1;
        let text = match fs::read_to_string(file) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("Error reading {}: {}", file.display(), e);
                errors += 1;
                continue;
            }
        };

        let containers = ContainerMap::scan(&text);

        for block in locate_blocks(&text) {
            blocks_found += 1;

            let Some((signature, sig_line)) = find_next_signature(&text, block.end) else {
                skipped += 1;
                continue;
            };
            let container = containers.at_or_before(sig_line);
            let Some(doc_id) = infer_id(&signature, container, &config.aliases) else {
                skipped += 1;
                continue;
            };
            if seen_ids.contains(&doc_id) {
                skipped += 1;
                continue;
            }

            let extraction = extract(&normalize_block(&block.inner));
            if extraction.flags.is_excluded() {
                skipped += 1;
                continue;
            }

            let fresh = build_document(
                &doc_id,
                display_relative(file, root),
                &signature,
                &extraction,
            );
            let merged = match store.load_one(&doc_id) {
                Some(prior) => merge_documents(fresh, prior),
                None => fresh,
            };

            let path = store
                .upsert(&merged)
                .with_context(|| format!("Failed to write store record for {doc_id}"))?;
            generated.insert(path);
            seen_ids.insert(doc_id.clone());
            written += 1;

            if verbose {
                println!("Seeded: {}", doc_id);
            }

            if limit.is_some_and(|n| written >= n) {
                break 'files;
            }
        }
    }

    if prune {
        let pruned = store
            .prune_except(&generated)
            .context("Failed to prune orphan store records")?;
        if pruned > 0 {
            println!("Pruned: {} orphan record(s)", pruned);
        }
    }

    println!(
        "Files: {}, Blocks: {}, Written: {}, Skipped: {}, Errors: {}",
        files_scanned, blocks_found, written, skipped, errors
    );

    if errors > 0 {
        anyhow::bail!("{} files failed to process", errors);
    }
    Ok(())
}

fn insert_ids(
    files: &[PathBuf],
    root: &Path,
    config: &Config,
    limit: Option<usize>,
    verbose: bool,
) -> Result<()> {
    let mut files_scanned = 0;
    let mut blocks_seen = 0;
    let mut blocks_updated = 0;
    let mut errors = 0;
    let mut limit_reached = false;

    for file in files {
        if limit_reached {
            break;
        }
        files_scanned += 1;

        let text = match fs::read_to_string(file) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("Error reading {}: {}", file.display(), e);
                errors += 1;
                continue;
            }
        };

        let containers = ContainerMap::scan(&text);
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        let mut changed_file = false;

        for block in locate_blocks(&text) {
            blocks_seen += 1;

            let Some((signature, sig_line)) = find_next_signature(&text, block.end) else {
                continue;
            };
            let container = containers.at_or_before(sig_line);
            let Some(doc_id) = infer_id(&signature, container, &config.aliases) else {
                continue;
            };

            // Flagged blocks are excluded from the store, so they get no marker either.
            let extraction = extract(&normalize_block(&block.inner));
            if extraction.flags.is_excluded() {
                continue;
            }

            let (updated, changed) = ensure_marker(block.raw(&text), &doc_id);
            if !changed {
                continue;
            }

            out.push_str(&text[last..block.start]);
            out.push_str(&updated);
            last = block.end;
            changed_file = true;
            blocks_updated += 1;

            if verbose {
                println!(
                    "{}: updated marker for {}",
                    display_relative(file, root),
                    doc_id
                );
            }

            if limit.is_some_and(|n| blocks_updated >= n) {
                limit_reached = true;
                break;
            }
        }

        if changed_file {
            out.push_str(&text[last..]);
            if out != text {
                if let Err(e) = fs::write(file, &out) {
                    eprintln!("Error writing {}: {}", file.display(), e);
                    errors += 1;
                }
            }
        }
    }

    println!(
        "Files: {}, Blocks: {}, Updated: {}, Errors: {}",
        files_scanned, blocks_seen, blocks_updated, errors
    );

    if errors > 0 {
        anyhow::bail!("{} files failed to process", errors);
    }
    Ok(())
}

fn dump_blocks(path: &Path, max_blocks: usize) -> Result<()> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let blocks = locate_blocks(&text);
    println!("{}: {} doc blocks\n", path.display(), blocks.len());

    for (i, block) in blocks.iter().take(max_blocks).enumerate() {
        let lines = normalize_block(&block.inner);
        let n_examples = crate::parser::tokenize(&lines)
            .iter()
            .filter(|t| matches!(t.kind, TokenKind::Example(_)))
            .count();
        println!("----- BLOCK {} (examples: {}) -----", i + 1, n_examples);
        for line in &lines {
            println!("{}", line);
        }
        println!();
    }
    Ok(())
}

fn dump_extracted(path: &Path, max_blocks: usize) -> Result<()> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let blocks = locate_blocks(&text);
    println!("{}: {} doc blocks\n", path.display(), blocks.len());

    for (i, block) in blocks.iter().take(max_blocks).enumerate() {
        let extraction = extract(&normalize_block(&block.inner));

        println!("----- BLOCK {} -----", i + 1);
        if !extraction.categories.is_empty() {
            println!("categories: {}", extraction.categories.join(", "));
        }
        println!("examples: {}", extraction.examples.len());
        for ex in &extraction.examples {
            let first = ex.code.lines().next().unwrap_or("");
            println!("  - {}: {}  (lang={})", ex.key, ex.title, ex.lang);
            println!("    first line: {}", first);
        }
        println!("description lines: {}", extraction.description.len());
        if extraction.flags.is_excluded() {
            let mut flags = Vec::new();
            if extraction.flags.hidden {
                flags.push("hidden");
            }
            if extraction.flags.internal {
                flags.push("internal");
            }
            println!("flags: {}", flags.join(", "));
        }

        if !extraction.description.is_empty() {
            println!("description preview:");
            for line in extraction.description.iter().take(8) {
                println!("  {}", line);
            }
        }
        println!();
    }
    Ok(())
}
