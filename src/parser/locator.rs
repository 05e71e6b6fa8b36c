//! purpose: This module locates structured `/** ... */` comment blocks in source text and
//!     manages the `<!-- doc-id: ... -->` identifier markers embedded in them. It is a pure,
//!     best-effort scan: unterminated blocks are simply not matched.
//!
//! invariants:
//!     - Located spans are ordered by position and never overlap
//!     - Block.start/Block.end cover exactly `/**` through `*/`; trailing whitespace after
//!       the closing delimiter is captured separately and never included in the span
//!     - The locator never mutates its input
//!
//! gotchas:
//!     - indent is the leading whitespace of the opening line only when the delimiter starts
//!       the line; code before `/**` on the same line yields an empty indent
//!     - ensure_marker leaves single-line blocks untouched - a marker line cannot be
//!       inserted into a compact block without reformatting it

use once_cell::sync::Lazy;
use regex::Regex;

static BLOCK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)/\*\*.*?\*/").unwrap());

static DOC_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<!--\s*doc-id:\s*([A-Za-z0-9_.-]+)\s*-->").unwrap());

static OPEN_LINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*)/\*\*\s*$").unwrap());

static STAR_PREFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*\*\s*)").unwrap());

/// One located comment block span.
#[derive(Debug, Clone)]
pub struct Block {
    /// Byte offset of the opening `/**`
    pub start: usize,
    /// Byte offset just past the closing `*/`
    pub end: usize,
    /// Whitespace preceding the opening delimiter on its line
    pub indent: String,
    /// Text between the delimiters (exclusive)
    pub inner: String,
    /// Whitespace/newline immediately following the closing delimiter, verbatim
    pub trailing: String,
    /// Identifier from the embedded marker line, when present
    pub doc_id: Option<String>,
}

impl Block {
    /// The raw block text, delimiters included.
    pub fn raw<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }
}

/// Scan source text for structured comment blocks, in order of appearance.
pub fn locate_blocks(text: &str) -> Vec<Block> {
    let mut blocks = Vec::new();

    for m in BLOCK_RE.find_iter(text) {
        let raw = m.as_str();
        let inner = &raw[3..raw.len() - 2];

        blocks.push(Block {
            start: m.start(),
            end: m.end(),
            indent: indent_before(text, m.start()),
            inner: inner.to_string(),
            trailing: trailing_after(text, m.end()),
            doc_id: DOC_ID_RE.captures(raw).map(|c| c[1].trim().to_string()),
        });
    }

    blocks
}

/// Leading whitespace of the line containing `pos`, up to `pos` itself.
fn indent_before(text: &str, pos: usize) -> String {
    let line_start = text[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0);
    text[line_start..pos]
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .collect()
}

/// Horizontal whitespace plus one newline immediately after `pos`, if present.
fn trailing_after(text: &str, pos: usize) -> String {
    let rest = &text[pos..];
    let mut len = 0;
    for (i, c) in rest.char_indices() {
        match c {
            ' ' | '\t' => len = i + 1,
            '\r' => {
                // Only counts when followed by \n
                if rest[i + 1..].starts_with('\n') {
                    return rest[..i + 2].to_string();
                }
                return rest[..len].to_string();
            }
            '\n' => return rest[..i + 1].to_string(),
            _ => return rest[..len].to_string(),
        }
    }
    rest[..len].to_string()
}

/// Ensure a block carries a leading `<!-- doc-id: ... -->` marker line.
///
/// Inserts the marker right after the opening `/**` when absent, rewrites the first
/// existing marker when it differs, and removes duplicate marker lines. The marker
/// reuses the `*` prefix of the block's own interior lines so alignment matches.
///
/// Returns the (possibly rewritten) block text and whether it changed.
pub fn ensure_marker(raw_block: &str, doc_id: &str) -> (String, bool) {
    let had_final_newline = raw_block.ends_with('\n');
    let mut lines: Vec<String> = raw_block.lines().map(str::to_string).collect();
    if lines.len() < 2 {
        return (raw_block.to_string(), false);
    }

    let indent = OPEN_LINE_RE
        .captures(&lines[0])
        .map(|c| c[1].to_string())
        .unwrap_or_else(|| {
            lines[0]
                .chars()
                .take_while(|c| c.is_whitespace())
                .collect::<String>()
        });

    // Locate existing marker lines.
    let mut marker_idxs: Vec<usize> = Vec::new();
    let mut existing_id: Option<String> = None;
    for (i, line) in lines.iter().enumerate() {
        if let Some(c) = DOC_ID_RE.captures(line) {
            marker_idxs.push(i);
            if existing_id.is_none() {
                existing_id = Some(c[1].trim().to_string());
            }
        }
    }

    // Prefer the `*` prefix used by the rest of the block so alignment matches.
    let mut star_prefix = format!("{indent} * ");
    for probe in lines.iter().skip(1).take(5) {
        if let Some(c) = STAR_PREFIX_RE.captures(probe) {
            star_prefix = c[1].to_string();
            break;
        }
    }

    let desired_line = format!("{star_prefix}<!-- doc-id: {doc_id} -->")
        .trim_end()
        .to_string();

    let changed;
    if let Some(&first) = marker_idxs.first() {
        lines[first] = desired_line;
        // Remove duplicates bottom-up to keep indices valid.
        for &j in marker_idxs.iter().skip(1).rev() {
            lines.remove(j);
        }
        changed = existing_id.as_deref() != Some(doc_id) || marker_idxs.len() > 1;
    } else {
        lines.insert(1, desired_line);
        changed = true;
    }

    let mut out = lines.join("\n");
    if had_final_newline {
        out.push('\n');
    }
    (out, changed)
}
