//! purpose: This module is the synchronization driver: given one source text and the
//!     resolved document store, it replaces every identifier-marked comment block whose
//!     canonical rendering differs from what is in the file. It is a single forward
//!     rebuild pass - unmatched spans are copied through verbatim, so byte offsets stay
//!     valid by construction.
//!
//! invariants:
//!     - Blocks without an identifier marker are never touched
//!     - A block whose identifier is missing from the store is left untouched and
//!       reported as unresolved
//!     - Replacement happens only when the rendered block differs byte-for-byte, so a
//!       second run over the same input reports no changes
//!
//! gotchas:
//!     - The rendered block carries no trailing newline; the original trailing
//!       whitespace after `*/` sits outside the replaced span and is copied with the gap

use crate::formatter::{render_block, BlockStyle};
use crate::parser::locate_blocks;
use crate::types::{Document, SyncOutcome};
use std::collections::BTreeMap;

/// Synchronize one source text against the store.
///
/// Returns the updated text plus the identifiers that changed and the identifiers that
/// could not be resolved, both in text order.
pub fn sync_text(text: &str, docs: &BTreeMap<String, Document>, lang: &str) -> SyncOutcome {
    let mut outcome = SyncOutcome::default();
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for block in locate_blocks(text) {
        let Some(id) = &block.doc_id else {
            continue;
        };

        let Some(doc) = docs.get(id) else {
            outcome.unresolved.push(id.clone());
            continue;
        };

        let style = BlockStyle::canonical(&block.indent);
        let rendered = render_block(doc, id, lang, &style);

        if block.raw(text) != rendered {
            out.push_str(&text[last..block.start]);
            out.push_str(&rendered);
            last = block.end;
            outcome.changed.push(id.clone());
        }
    }

    out.push_str(&text[last..]);
    outcome.text = out;
    outcome
}
