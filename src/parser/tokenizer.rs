//! purpose: This module normalizes the inside of a comment block into plain lines and
//!     tokenizes those lines into a flat stream for the example extractor. It is a single
//!     stateful pass; open-fence state is the only state carried between lines.
//!
//! invariants:
//!     - Inside an open fence every line is a TEXT token, even if it looks like a tag
//!     - A whole-line category tag never also produces a TEXT token
//!     - Identifier marker lines are dropped entirely so re-harvesting rendered blocks
//!       does not fold the marker into the description
//!
//! gotchas:
//!     - Normalization strips only the ` * ` continuation prefix; indentation beyond it
//!       survives, which is what keeps fenced code indented correctly
//!     - `@internal`/`@hidden` match anywhere on a line; the leftover prose (if any) is
//!       re-emitted as a TEXT token with collapsed whitespace

use once_cell::sync::Lazy;
use regex::Regex;

static STAR_LINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\*\s?(.*)$").unwrap());

pub(crate) static FENCE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*```").unwrap());

pub(crate) static EXAMPLE_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^@example(?:\s+(?P<label>.+?))?\s*$").unwrap());

static CATEGORY_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^@category\s+(?P<cat>.+?)\s*$").unwrap());

static INTERNAL_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"@internal\b").unwrap());

static HIDDEN_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"@hidden\b").unwrap());

static MARKER_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^<!--\s*doc-id:\s*[A-Za-z0-9_.-]+\s*-->$").unwrap());

static WS_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").unwrap());

/// One token of a normalized comment block.
#[derive(Debug, Clone, PartialEq)]
pub struct DocToken {
    pub kind: TokenKind,
    /// Index of the originating line in the normalized block
    pub idx: usize,
    /// The line content this token contributes to the description stream
    pub raw: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Whole-line `@category <value>` tag
    Category(String),
    Internal,
    Hidden,
    /// `@example` tag with its optional inline label
    Example(Option<String>),
    /// Fence open/close with the declared language label, if any
    Fence(Option<String>),
    Text,
}

/// Normalize the inside of a `/** ... */` block into de-starred lines.
///
/// Each line loses its trailing whitespace and its leading ` * ` continuation marker
/// (indentation inside fenced code survives). Leading and trailing blank lines are
/// dropped.
pub fn normalize_block(inner: &str) -> Vec<String> {
    let mut lines: Vec<String> = inner
        .lines()
        .map(|raw| {
            let raw = raw.trim_end();
            match STAR_LINE_RE.captures(raw) {
                Some(c) => c[1].trim_end().to_string(),
                None => raw.to_string(),
            }
        })
        .collect();

    while lines.first().is_some_and(|l| l.is_empty()) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }

    lines
}

/// Tokenize normalized block lines into a flat stream.
pub fn tokenize(lines: &[String]) -> Vec<DocToken> {
    let mut toks = Vec::new();
    let mut in_fence = false;

    for (i, line) in lines.iter().enumerate() {
        let s = line.trim();

        if FENCE_RE.is_match(s) {
            let label = s[3..].trim();
            toks.push(DocToken {
                kind: TokenKind::Fence((!label.is_empty()).then(|| label.to_string())),
                idx: i,
                raw: line.clone(),
            });
            in_fence = !in_fence;
            continue;
        }

        if in_fence {
            toks.push(DocToken {
                kind: TokenKind::Text,
                idx: i,
                raw: line.clone(),
            });
            continue;
        }

        if MARKER_LINE_RE.is_match(s) {
            continue;
        }

        if let Some(c) = CATEGORY_TAG_RE.captures(s) {
            toks.push(DocToken {
                kind: TokenKind::Category(c["cat"].trim().to_string()),
                idx: i,
                raw: line.clone(),
            });
            continue;
        }

        // Flags may sit anywhere on a line, mixed with prose.
        let has_internal = INTERNAL_TAG_RE.is_match(s);
        let has_hidden = HIDDEN_TAG_RE.is_match(s);
        if has_internal {
            toks.push(DocToken {
                kind: TokenKind::Internal,
                idx: i,
                raw: line.clone(),
            });
        }
        if has_hidden {
            toks.push(DocToken {
                kind: TokenKind::Hidden,
                idx: i,
                raw: line.clone(),
            });
        }
        if has_internal || has_hidden {
            let cleaned = INTERNAL_TAG_RE.replace_all(line, "");
            let cleaned = HIDDEN_TAG_RE.replace_all(&cleaned, "");
            let cleaned = WS_RUN_RE.replace_all(&cleaned, " ").trim().to_string();
            if !cleaned.is_empty() {
                toks.push(DocToken {
                    kind: TokenKind::Text,
                    idx: i,
                    raw: cleaned,
                });
            }
            continue;
        }

        if let Some(c) = EXAMPLE_TAG_RE.captures(s) {
            let label = c
                .name("label")
                .map(|m| m.as_str().trim().to_string())
                .filter(|l| !l.is_empty());
            toks.push(DocToken {
                kind: TokenKind::Example(label),
                idx: i,
                raw: line.clone(),
            });
            continue;
        }

        toks.push(DocToken {
            kind: TokenKind::Text,
            idx: i,
            raw: line.clone(),
        });
    }

    toks
}
