//! purpose: This module defines the core data types shared across docsync: the persisted
//!     Document record, extraction results, and the sync outcome. Document maps directly
//!     to the YAML store record format.
//!
//! invariants:
//!     - Document.id is the only required field; all others are omitted from YAML when empty
//!     - examples and per-example code maps are BTreeMaps so renders and store dumps are
//!       deterministic (ascending key order)
//!     - Flags are never persisted - flagged blocks are excluded from the store entirely
//!
//! gotchas:
//!     - Example.title is optional because hand-maintained store records may omit it;
//!       the renderer falls back to "Example"
//!     - Extraction.description holds raw lines (joined with \n only at persist time)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A synchronized documentation record, keyed by identifier in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Dotted stable identifier (`Container.member` or a bare top-level name)
    pub id: String,

    /// Source file the document was harvested from (informational)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source_file: String,

    /// Raw declaration line the document describes (informational)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub signature: String,

    /// Free-form category tags, in source order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,

    /// Description text with embedded `@example <key>` placeholder lines
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Example key -> titled, multi-language code snippets
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub examples: BTreeMap<String, Example>,
}

impl Document {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source_file: String::new(),
            signature: String::new(),
            categories: Vec::new(),
            description: String::new(),
            examples: BTreeMap::new(),
        }
    }
}

/// One named example with code variants per language key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
    /// Human-readable title shown in the rendered heading
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Language key (e.g. "ts", "objc", "kotlin") -> code body
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub code: BTreeMap<String, String>,
}

/// Visibility flags parsed from `@internal` / `@hidden` tags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    pub internal: bool,
    pub hidden: bool,
}

impl Flags {
    /// A flagged block never enters the store and never receives a marker.
    pub fn is_excluded(&self) -> bool {
        self.internal || self.hidden
    }
}

/// One example pulled out of a comment block during extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedExample {
    /// Storage key (slug of the resolved title, de-duplicated per block)
    pub key: String,
    pub title: String,
    /// Normalized language key of the fenced code block
    pub lang: String,
    pub code: String,
}

/// Everything extracted from one comment block.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Description lines with `@example <key>` placeholders inserted in place
    pub description: Vec<String>,
    pub examples: Vec<ParsedExample>,
    pub categories: Vec<String>,
    pub flags: Flags,
}

impl Extraction {
    /// Description joined for persistence (placeholder lines intact).
    pub fn description_text(&self) -> String {
        self.description.join("\n").trim().to_string()
    }
}

/// Result of synchronizing one source text against the store.
#[derive(Debug, Clone, Default)]
pub struct SyncOutcome {
    /// The (possibly updated) full text
    pub text: String,
    /// Identifiers whose blocks were replaced, in text order
    pub changed: Vec<String>,
    /// Identifiers referenced by markers but absent from the store, in text order
    pub unresolved: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_excluded() {
        assert!(!Flags::default().is_excluded());
        assert!(Flags {
            internal: true,
            hidden: false
        }
        .is_excluded());
        assert!(Flags {
            internal: false,
            hidden: true
        }
        .is_excluded());
    }

    #[test]
    fn test_document_yaml_omits_empty_fields() {
        let doc = Document::new("Plugin.ready");
        let yaml = serde_yaml::to_string(&doc).unwrap();
        assert!(yaml.contains("id: Plugin.ready"));
        assert!(!yaml.contains("categories"));
        assert!(!yaml.contains("description"));
        assert!(!yaml.contains("examples"));
        assert!(!yaml.contains("signature"));
    }

    #[test]
    fn test_document_yaml_round_trip() {
        let mut doc = Document::new("Config.url");
        doc.source_file = "src/config.d.ts".to_string();
        doc.signature = "url?: string;".to_string();
        doc.categories = vec!["HTTP".to_string()];
        doc.description = "The server URL.\n\n@example basic-setup".to_string();
        doc.examples.insert(
            "basic-setup".to_string(),
            Example {
                title: Some("Basic Setup".to_string()),
                code: BTreeMap::from([("ts".to_string(), "ready({url: \"x\"});".to_string())]),
            },
        );

        let yaml = serde_yaml::to_string(&doc).unwrap();
        let parsed: Document = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, doc);
    }

    #[test]
    fn test_document_parses_minimal_record() {
        // Hand-maintained records may carry only an id and examples.
        let yaml = "id: Plugin.start\nexamples:\n  usage:\n    code:\n      objc: '[plugin start];'\n";
        let doc: Document = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(doc.id, "Plugin.start");
        assert!(doc.signature.is_empty());
        assert_eq!(doc.examples["usage"].title, None);
        assert_eq!(doc.examples["usage"].code["objc"], "[plugin start];");
    }

    #[test]
    fn test_extraction_description_text_trims() {
        let ex = Extraction {
            description: vec![String::new(), "Line one.".to_string(), String::new()],
            ..Default::default()
        };
        assert_eq!(ex.description_text(), "Line one.");
    }
}
