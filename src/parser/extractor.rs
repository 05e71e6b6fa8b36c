//! purpose: This module consumes the tokenizer's stream and splits a comment block into
//!     description lines (with `@example <key>` placeholders inserted in place), extracted
//!     examples, categories, and visibility flags.
//!
//! when-editing:
//!     - !Title precedence is inline label > forward label line > backward label line >
//!       ordinal fallback. Changing this order is a behavior change, not a bug fix.
//!     - !The storage key is the slug of the resolved title, de-duplicated with -2/-3
//!       suffixes. Suffixing must be stable across repeated runs over the same input.
//!
//! invariants:
//!     - A backward-resolved title line is relocated, never duplicated: it and everything
//!       after it are removed from the accumulated description
//!     - An example tag with no following fence is consumed without producing an example
//!       or a placeholder
//!     - Literal fences that do not belong to an example pass through into the description
//!       untouched
//!
//! gotchas:
//!     - The forward scan for the code fence stops early at the next @example tag, so one
//!       abandoned example never swallows the next one's code

use crate::parser::tokenizer::{tokenize, DocToken, TokenKind, EXAMPLE_TAG_RE, FENCE_RE};
use crate::types::{Extraction, ParsedExample};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static HEADING_PREFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*#+\s*").unwrap());

static SLUG_STRIP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Parse normalized block lines into description, examples, categories, and flags.
pub fn extract(lines: &[String]) -> Extraction {
    let toks = tokenize(lines);

    let mut out = Extraction::default();
    let mut used_keys: HashSet<String> = HashSet::new();

    let mut i = 0;
    while i < toks.len() {
        let tok = &toks[i];

        match &tok.kind {
            TokenKind::Fence(_) | TokenKind::Text => {
                out.description.push(tok.raw.clone());
                i += 1;
            }
            TokenKind::Category(value) => {
                out.categories.push(value.clone());
                i += 1;
            }
            TokenKind::Internal => {
                out.flags.internal = true;
                i += 1;
            }
            TokenKind::Hidden => {
                out.flags.hidden = true;
                i += 1;
            }
            TokenKind::Example(label) => {
                i = consume_example(tok, label.as_deref(), lines, &toks, i, &mut out, &mut used_keys);
            }
        }
    }

    while out.description.last().is_some_and(|l| l.trim().is_empty()) {
        out.description.pop();
    }

    out
}

/// Handle one `@example` tag: resolve its title, capture its fenced code, insert the
/// placeholder, and return the token index to resume the outer scan at.
#[allow(clippy::too_many_arguments)]
fn consume_example(
    tok: &DocToken,
    label: Option<&str>,
    lines: &[String],
    toks: &[DocToken],
    i: usize,
    out: &mut Extraction,
    used_keys: &mut HashSet<String>,
) -> usize {
    let ordinal = out.examples.len() + 1;

    // Look past blank lines following the tag.
    let mut j = tok.idx + 1;
    while j < lines.len() && lines[j].trim().is_empty() {
        j += 1;
    }

    let mut title: Option<String> = label.map(str::to_string);

    // Forward label line ("Foo:") directly after the tag.
    if title.is_none() && j < lines.len() && looks_like_title(&lines[j]) {
        title = Some(normalize_title(&lines[j]));
        j += 1;
        while j < lines.len() && lines[j].trim().is_empty() {
            j += 1;
        }
    }

    // Backward label line already accumulated into the description; relocate it.
    if title.is_none() {
        let mut k = out.description.len();
        while k > 0 && out.description[k - 1].trim().is_empty() {
            k -= 1;
        }
        if k > 0 && looks_like_title(&out.description[k - 1]) {
            title = Some(normalize_title(&out.description[k - 1]));
            out.description.truncate(k - 1);
        }
    }

    // Find the code fence, stopping early at the next example tag.
    let mut fence_start = j;
    while fence_start < lines.len() {
        let s = lines[fence_start].trim();
        if EXAMPLE_TAG_RE.is_match(s) || FENCE_RE.is_match(s) {
            break;
        }
        fence_start += 1;
    }

    if fence_start >= lines.len() || !FENCE_RE.is_match(lines[fence_start].trim()) {
        // No code to attach; the tag is consumed and the example abandoned.
        return i + 1;
    }

    let (fence_lang, code, end_idx) = extract_fenced_code(lines, fence_start);

    let title = title.unwrap_or_else(|| format!("Example {ordinal}"));
    let base_key = match slugify(&title) {
        s if s.is_empty() => format!("example-{ordinal}"),
        s => s,
    };

    let mut key = base_key.clone();
    let mut suffix = 2;
    while used_keys.contains(&key) {
        key = format!("{base_key}-{suffix}");
        suffix += 1;
    }
    used_keys.insert(key.clone());

    // Placeholder goes exactly where the tag sat.
    out.description.push(format!("@example {key}"));

    out.examples.push(ParsedExample {
        key,
        title,
        lang: normalize_lang(fence_lang.as_deref()),
        code,
    });

    // Resume the outer scan past the consumed fence-close line.
    let mut next = i;
    while next < toks.len() && toks[next].idx < end_idx {
        next += 1;
    }
    next
}

/// Heuristic for label lines that title the adjacent `@example`.
///
/// Must end with `:`, must not be a tag, fence, or markdown table row, and must not be
/// a generic section heading. Long colon-terminated lines are treated as prose.
fn looks_like_title(line: &str) -> bool {
    let s = line.trim();
    if s.is_empty() || s.starts_with('@') || FENCE_RE.is_match(s) {
        return false;
    }
    if s.starts_with('|') && s.ends_with('|') {
        return false;
    }
    if !s.ends_with(':') {
        return false;
    }

    // Strip markdown heading markers, the colon, then up to two emphasis wrappers.
    let t = HEADING_PREFIX_RE.replace(s, "");
    let mut t = t.trim_end_matches(':').trim().to_string();
    for _ in 0..2 {
        if let Some(u) = strip_emphasis(&t) {
            t = u;
        }
    }

    if matches!(
        t.to_lowercase().as_str(),
        "examples" | "example" | "overview"
    ) {
        return false;
    }

    s.chars().count() <= 60
}

fn strip_emphasis(s: &str) -> Option<String> {
    for wrapper in ["**", "__"] {
        if let Some(u) = s
            .strip_prefix(wrapper)
            .and_then(|m| m.strip_suffix(wrapper))
        {
            return Some(u.trim().to_string());
        }
    }
    None
}

/// Clean title text out of a label line.
fn normalize_title(line: &str) -> String {
    line.trim().trim_end_matches(':').trim().to_string()
}

/// Capture a fenced code block starting at `start`.
///
/// Returns the declared language label, the code body (trailing blanks trimmed), and the
/// line index just past the closing fence.
fn extract_fenced_code(lines: &[String], start: usize) -> (Option<String>, String, usize) {
    let fence_line = lines[start].trim();
    let label = fence_line[3..].trim();
    let lang = (!label.is_empty()).then(|| label.to_string());

    let mut code_lines: Vec<&str> = Vec::new();
    let mut end = start + 1;
    while end < lines.len() && !FENCE_RE.is_match(lines[end].trim()) {
        code_lines.push(&lines[end]);
        end += 1;
    }

    // Step past the closing fence when present.
    if end < lines.len() {
        end += 1;
    }

    (lang, code_lines.join("\n").trim_end().to_string(), end)
}

/// Markdown-style slug: lowercase, non-alphanumeric runs collapsed to single hyphens.
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    SLUG_STRIP_RE
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// Normalize fenced-code language labels into canonical language keys.
pub fn normalize_lang(lang: Option<&str>) -> String {
    let Some(lang) = lang else {
        return "ts".to_string();
    };
    let s = lang.trim().to_lowercase();

    match s.as_str() {
        "" | "ts" | "typescript" | "js" | "javascript" => "ts".to_string(),
        "objc" | "obj-c" | "objective-c" | "objectivec" => "objc".to_string(),
        "kt" | "kts" => "kotlin".to_string(),
        _ => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tokenizer::normalize_block;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    // ==================== slugify / normalize_lang Tests ====================

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Basic Setup"), "basic-setup");
        assert_eq!(slugify("  HTTP & JSON!  "), "http-json");
        assert_eq!(slugify("already-slugged"), "already-slugged");
    }

    #[test]
    fn test_slugify_empty_result() {
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn test_normalize_lang_aliases() {
        assert_eq!(normalize_lang(None), "ts");
        assert_eq!(normalize_lang(Some("typescript")), "ts");
        assert_eq!(normalize_lang(Some("javascript")), "ts");
        assert_eq!(normalize_lang(Some("Obj-C")), "objc");
        assert_eq!(normalize_lang(Some("objective-c")), "objc");
        assert_eq!(normalize_lang(Some("kt")), "kotlin");
        assert_eq!(normalize_lang(Some("Swift")), "swift");
    }

    // ==================== looks_like_title Tests ====================

    #[test]
    fn test_title_heuristic_accepts_short_label() {
        assert!(looks_like_title("Basic Setup:"));
        assert!(looks_like_title("## Configuring the plugin:"));
        assert!(looks_like_title("**Advanced usage**:"));
    }

    #[test]
    fn test_title_heuristic_rejects_generic_headings() {
        assert!(!looks_like_title("Example:"));
        assert!(!looks_like_title("Examples:"));
        assert!(!looks_like_title("## Overview:"));
        assert!(!looks_like_title("**Examples**:"));
    }

    #[test]
    fn test_title_heuristic_rejects_non_labels() {
        assert!(!looks_like_title(""));
        assert!(!looks_like_title("@category Foo:"));
        assert!(!looks_like_title("```ts:"));
        assert!(!looks_like_title("| col: | col: |"));
        assert!(!looks_like_title("No trailing colon"));
        let long = format!("{}:", "x".repeat(70));
        assert!(!looks_like_title(&long));
    }

    // ==================== extract Tests ====================

    #[test]
    fn test_extract_plain_description() {
        let ex = extract(&lines("First line.\n\nSecond paragraph."));
        assert_eq!(
            ex.description,
            vec!["First line.", "", "Second paragraph."]
        );
        assert!(ex.examples.is_empty());
        assert!(ex.categories.is_empty());
        assert!(!ex.flags.is_excluded());
    }

    #[test]
    fn test_extract_inline_label_example() {
        let ex = extract(&lines(
            "Configure it.\n@example Basic Setup\n```ts\nready();\n```\nAfter.",
        ));
        assert_eq!(ex.examples.len(), 1);
        let e = &ex.examples[0];
        assert_eq!(e.key, "basic-setup");
        assert_eq!(e.title, "Basic Setup");
        assert_eq!(e.lang, "ts");
        assert_eq!(e.code, "ready();");
        assert_eq!(
            ex.description,
            vec!["Configure it.", "@example basic-setup", "After."]
        );
    }

    #[test]
    fn test_extract_forward_title() {
        let ex = extract(&lines(
            "@example\n\nStart Tracking:\n\n```ts\nstart();\n```",
        ));
        assert_eq!(ex.examples[0].key, "start-tracking");
        assert_eq!(ex.examples[0].title, "Start Tracking");
        assert_eq!(ex.description, vec!["@example start-tracking"]);
    }

    #[test]
    fn test_extract_backward_title_is_relocated() {
        let ex = extract(&lines(
            "Intro prose.\n\nStop Tracking:\n@example\n```ts\nstop();\n```",
        ));
        assert_eq!(ex.examples[0].key, "stop-tracking");
        assert_eq!(ex.examples[0].title, "Stop Tracking");
        // The title line was relocated into the example, not duplicated.
        assert_eq!(
            ex.description,
            vec!["Intro prose.", "", "@example stop-tracking"]
        );
    }

    #[test]
    fn test_extract_ordinal_fallback_title() {
        let ex = extract(&lines("@example\n```ts\ngo();\n```"));
        assert_eq!(ex.examples[0].title, "Example 1");
        assert_eq!(ex.examples[0].key, "example-1");
    }

    #[test]
    fn test_extract_key_collision_suffixes() {
        let ex = extract(&lines(
            "@example Setup\n```ts\na();\n```\n@example Setup\n```objc\nb();\n```",
        ));
        assert_eq!(ex.examples[0].key, "setup");
        assert_eq!(ex.examples[1].key, "setup-2");
        assert_eq!(
            ex.description,
            vec!["@example setup", "@example setup-2"]
        );
    }

    #[test]
    fn test_extract_suffixing_is_stable_across_runs() {
        let input = lines(
            "@example Setup\n```ts\na();\n```\n@example Setup\n```ts\nb();\n```\n@example Setup\n```ts\nc();\n```",
        );
        let first = extract(&input);
        let second = extract(&input);
        let keys: Vec<&str> = first.examples.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["setup", "setup-2", "setup-3"]);
        assert_eq!(
            keys,
            second
                .examples
                .iter()
                .map(|e| e.key.as_str())
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_extract_example_without_fence_abandoned() {
        let ex = extract(&lines("@example Lost\nJust prose, no code."));
        assert!(ex.examples.is_empty());
        // No placeholder was inserted; the prose survives.
        assert_eq!(ex.description, vec!["Just prose, no code."]);
    }

    #[test]
    fn test_extract_example_scan_stops_at_next_example() {
        let ex = extract(&lines(
            "@example First\nno code here\n@example Second\n```ts\nb();\n```",
        ));
        assert_eq!(ex.examples.len(), 1);
        assert_eq!(ex.examples[0].key, "second");
        assert_eq!(ex.examples[0].code, "b();");
    }

    #[test]
    fn test_extract_unlabeled_fence_defaults_ts() {
        let ex = extract(&lines("@example Demo\n```\nrun();\n```"));
        assert_eq!(ex.examples[0].lang, "ts");
    }

    #[test]
    fn test_extract_literal_fence_stays_in_description() {
        let ex = extract(&lines("See:\n```json\n{\"a\": 1}\n```\nDone."));
        assert!(ex.examples.is_empty());
        assert_eq!(
            ex.description,
            vec!["See:", "```json", "{\"a\": 1}", "```", "Done."]
        );
    }

    #[test]
    fn test_extract_categories_and_flags_interleaved() {
        let ex = extract(&lines(
            "@category Events\nProse. @internal\n@example Demo\n```ts\nx();\n```\n@category Advanced",
        ));
        assert_eq!(ex.categories, vec!["Events", "Advanced"]);
        assert!(ex.flags.internal);
        assert!(!ex.flags.hidden);
        assert_eq!(ex.examples.len(), 1);
    }

    #[test]
    fn test_extract_code_trailing_blanks_trimmed() {
        let ex = extract(&lines("@example Demo\n```ts\nx();\n\n\n```"));
        assert_eq!(ex.examples[0].code, "x();");
    }

    #[test]
    fn test_extract_multiline_code_preserves_interior() {
        let ex = extract(&lines(
            "@example Demo\n```ts\nconst a = 1;\n\nif (a) {\n  go();\n}\n```",
        ));
        assert_eq!(
            ex.examples[0].code,
            "const a = 1;\n\nif (a) {\n  go();\n}"
        );
    }

    #[test]
    fn test_extract_from_normalized_block() {
        let inner = "\n * <!-- doc-id: Config.url -->\n * The URL.\n *\n * @example Basic\n * ```ts\n * ready();\n * ```\n ";
        let ex = extract(&normalize_block(inner));
        assert_eq!(ex.description, vec!["The URL.", "", "@example basic"]);
        assert_eq!(ex.examples[0].code, "ready();");
    }
}
