//! purpose: This module infers stable dotted identifiers for comment blocks from the next
//!     code signature line and the nearest enclosing container. It is deliberately
//!     line-oriented - regex patterns sufficient for declaration headers, not a grammar.
//!
//! when-editing:
//!     - !Containers do not nest in this model: the most recent container opening at or
//!       before the signature line wins
//!     - !The container map is rebuilt per file and scoped to one resolution pass
//!
//! invariants:
//!     - A signature that matches no pattern yields no identifier (the block is excluded,
//!       not an error - plenty of blocks document non-exported declarations)
//!     - Container names pass through the alias table before being prefixed
//!
//! gotchas:
//!     - `export const Foo = {` opens an object-literal container AND matches the
//!       top-level const pattern; the top-level check runs first, so the const itself
//!       resolves to `Foo` while its members resolve to `Foo.member`

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static EXPORT_CONTAINER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*export\s+(?P<kind>interface|class|enum)\s+(?P<name>[A-Za-z_]\w*)\b").unwrap()
});

static EXPORT_CONST_OBJECT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*export\s+const\s+(?P<name>[A-Za-z_]\w*)\s*=\s*\{\s*$").unwrap());

static EXPORT_NAMED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*export\s+(?:interface|class|enum|type)\s+(?P<name>[A-Za-z_]\w*)\b").unwrap()
});

static EXPORT_CONST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*export\s+const\s+(?P<name>[A-Za-z_]\w*)\b").unwrap());

static MEMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:public|protected|private)?\s*(?:readonly\s+)?(?P<name>[A-Za-z_]\w*)\s*\??\s*[:(]")
        .unwrap()
});

static ENUM_MEMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?P<name>[A-Za-z_]\w*)\s*[=,]").unwrap());

static LINE_COMMENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*//").unwrap());

static BLOCK_COMMENT_START_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*/\*").unwrap());

static BLOCK_COMMENT_END_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*/\s*$").unwrap());

/// Container kinds the resolver distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Interface,
    Class,
    Enum,
    /// Object-literal const namespace (`export const Foo = {`)
    Const,
}

/// One container opening, recorded by line number.
#[derive(Debug, Clone)]
pub struct Container {
    pub line: usize,
    pub name: String,
    pub kind: ContainerKind,
}

/// Per-file, sorted-by-line association of container openings.
///
/// Rebuilt for every file; the resolver carries no state across files.
#[derive(Debug, Default)]
pub struct ContainerMap {
    entries: Vec<Container>,
}

impl ContainerMap {
    /// Scan a full source text for container openings.
    pub fn scan(text: &str) -> Self {
        let mut entries = Vec::new();

        for (idx, line) in text.lines().enumerate() {
            if let Some(c) = EXPORT_CONTAINER_RE.captures(line) {
                let kind = match &c["kind"] {
                    "interface" => ContainerKind::Interface,
                    "class" => ContainerKind::Class,
                    _ => ContainerKind::Enum,
                };
                entries.push(Container {
                    line: idx,
                    name: c["name"].to_string(),
                    kind,
                });
                continue;
            }
            if let Some(c) = EXPORT_CONST_OBJECT_RE.captures(line) {
                entries.push(Container {
                    line: idx,
                    name: c["name"].to_string(),
                    kind: ContainerKind::Const,
                });
            }
        }

        Self { entries }
    }

    /// The most recent container opened at or before `line`, if any.
    pub fn at_or_before(&self, line: usize) -> Option<&Container> {
        self.entries.iter().take_while(|c| c.line <= line).last()
    }
}

/// Find the next code signature line after `end_pos` (byte offset just past a block).
///
/// Skips blank lines, `//` comments, `/* ... */` comments (including multi-line), and
/// stray doc-block closers. Returns the right-trimmed line and its line number.
pub fn find_next_signature(text: &str, end_pos: usize) -> Option<(String, usize)> {
    let start_line_no = text[..end_pos].matches('\n').count();
    let lines: Vec<&str> = text.lines().collect();
    let mut in_block_comment = false;

    for (i, raw) in lines.iter().enumerate().skip(start_line_no + 1) {
        let s = raw.trim();

        if s.is_empty() {
            continue;
        }

        if in_block_comment {
            if BLOCK_COMMENT_END_RE.is_match(s) {
                in_block_comment = false;
            }
            continue;
        }

        if BLOCK_COMMENT_START_RE.is_match(s) && !BLOCK_COMMENT_END_RE.is_match(s) {
            in_block_comment = true;
            continue;
        }

        if LINE_COMMENT_RE.is_match(s) {
            continue;
        }

        // Stray doc-block closers left on their own line.
        if s == "*/" || (s.ends_with("*/") && s.trim_end_matches(['*', '/']).trim().is_empty()) {
            continue;
        }

        return Some((raw.trim_end().to_string(), i));
    }

    None
}

/// Infer a dotted identifier from a signature line and its enclosing container.
pub fn infer_id(
    signature: &str,
    container: Option<&Container>,
    aliases: &HashMap<String, String>,
) -> Option<String> {
    let s = signature.trim();

    // Top-level exported declarations resolve to their own name regardless of container.
    if let Some(c) = EXPORT_CONST_RE.captures(s) {
        return Some(c["name"].to_string());
    }
    if let Some(c) = EXPORT_NAMED_RE.captures(s) {
        return Some(c["name"].to_string());
    }

    let container = container?;
    let name = aliases
        .get(&container.name)
        .unwrap_or(&container.name)
        .as_str();

    if container.kind == ContainerKind::Enum {
        if let Some(c) = ENUM_MEMBER_RE.captures(s) {
            return Some(format!("{name}.{}", &c["name"]));
        }
    }

    // Interface/class members and object-literal namespace members share one shape:
    // optional modifiers, a name, then `:` or `(`.
    if let Some(c) = MEMBER_RE.captures(s) {
        return Some(format!("{name}.{}", &c["name"]));
    }

    None
}
