//! Merge a freshly harvested document with the previously persisted one so independent
//! harvesting passes (one per source language) accumulate a multi-language example set
//! without knowing about each other.

use crate::types::Document;
use std::collections::btree_map::Entry;

/// Combine a fresh extraction with the prior record under the same identifier.
///
/// Description, signature, and categories come from the fresh document (a fresh document
/// with no description keeps the prior one). Examples merge additively: keys only the
/// prior document has are kept whole; keys in both union their language maps with the
/// fresh language winning on conflict, and the prior title fills in when the fresh
/// example has none.
pub fn merge_documents(mut fresh: Document, prior: Document) -> Document {
    if fresh.description.is_empty() {
        fresh.description = prior.description;
    }

    for (key, prior_example) in prior.examples {
        match fresh.examples.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(prior_example);
            }
            Entry::Occupied(mut slot) => {
                let fresh_example = slot.get_mut();
                if fresh_example.title.is_none() {
                    fresh_example.title = prior_example.title;
                }
                for (lang, code) in prior_example.code {
                    fresh_example.code.entry(lang).or_insert(code);
                }
            }
        }
    }

    fresh
}
