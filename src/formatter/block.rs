//! purpose: This module renders a document back into its canonical comment block,
//!     substituting exactly one example code variant per placeholder. Rendering is a pure
//!     function of (document, identifier, language, style) - identical inputs produce
//!     byte-identical output, which is what makes repeated sync runs idempotent.
//!
//! when-editing:
//!     - !Always render the canonical style; the original block's formatting never leaks
//!       into the output
//!     - !MISSING and WARNING stubs use distinct wording so greps can tell an absent
//!       example from an absent language variant
//!
//! invariants:
//!     - The identifier marker line is always the first interior line
//!     - Placeholder substitution is framed by blank separator lines, never doubled
//!     - A description with zero placeholders renders all examples at the end in
//!       ascending key order
//!     - No trailing newline - the driver reattaches the block's own trailing whitespace
//!
//! gotchas:
//!     - Code lines are prefixed then right-trimmed, so blank snippet lines render as
//!       the blank-line form of the style rather than as trailing whitespace

use crate::store::filename_for_id;
use crate::types::Document;
use once_cell::sync::Lazy;
use regex::Regex;

static EXAMPLE_PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*@example\s+(?P<key>[A-Za-z0-9_.-]+)\s*$").unwrap());

/// Structural style of a rendered comment block.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStyle {
    pub open_line: String,
    /// Prefix for prose/code lines
    pub line_prefix: String,
    /// The blank interior line
    pub blank_line: String,
    pub close_line: String,
}

impl BlockStyle {
    /// The canonical style at the given indentation:
    ///
    /// ```text
    /// /**
    ///  * line
    ///  */
    /// ```
    pub fn canonical(indent: &str) -> Self {
        Self {
            open_line: format!("{indent}/**"),
            line_prefix: format!("{indent} * "),
            blank_line: format!("{indent} *"),
            close_line: format!("{indent} */"),
        }
    }
}

/// Render the replacement text for one comment block.
pub fn render_block(doc: &Document, doc_id: &str, lang: &str, style: &BlockStyle) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.push(style.open_line.clone());
    push_prefixed(&mut lines, style, &format!("<!-- doc-id: {doc_id} -->"));

    let desc = doc.description.trim_matches('\n');
    let mut placeholder_keys: Vec<&str> = Vec::new();

    if !desc.is_empty() {
        for raw_ln in desc.split('\n') {
            if raw_ln.is_empty() {
                lines.push(style.blank_line.clone());
                continue;
            }

            if let Some(c) = EXAMPLE_PLACEHOLDER_RE.captures(raw_ln) {
                let key = c.name("key").map(|m| m.as_str()).unwrap_or_default();
                if !placeholder_keys.contains(&key) {
                    placeholder_keys.push(key);
                }

                ensure_blank_separator(&mut lines, style);
                render_example(&mut lines, doc, doc_id, key, lang, style);
                lines.push(style.blank_line.clone());
                continue;
            }

            push_prefixed(&mut lines, style, raw_ln.trim_end());
        }
    }

    // Placeholder-free documents still render every example, deterministically.
    if placeholder_keys.is_empty() && !doc.examples.is_empty() {
        ensure_blank_separator(&mut lines, style);
        for key in doc.examples.keys() {
            render_example(&mut lines, doc, doc_id, key, lang, style);
            lines.push(style.blank_line.clone());
        }
        while lines.last() == Some(&style.blank_line) {
            lines.pop();
        }
    }

    lines.push(style.close_line.clone());
    lines.join("\n")
}

/// Heading plus fenced code (or a diagnostic stub) for one example key.
fn render_example(
    lines: &mut Vec<String>,
    doc: &Document,
    doc_id: &str,
    key: &str,
    lang: &str,
    style: &BlockStyle,
) {
    let example = doc.examples.get(key);

    let title = example
        .and_then(|e| e.title.as_deref())
        .filter(|t| !t.is_empty())
        .unwrap_or("Example");
    push_prefixed(lines, style, &format!("@example {title}"));

    let Some(example) = example else {
        // Placeholder references a key the document does not have.
        push_fenced(lines, style, lang, &[
            format!("// MISSING example {key}"),
            format!("// Filename: {}", filename_for_id(doc_id)),
        ]);
        return;
    };

    match example.code.get(lang).filter(|c| !c.trim().is_empty()) {
        Some(snippet) => {
            let body: Vec<String> = snippet
                .trim_end_matches('\n')
                .split('\n')
                .map(str::to_string)
                .collect();
            push_fenced(lines, style, lang, &body);
        }
        None => {
            // The key exists but has no variant for the requested language.
            push_fenced(lines, style, lang, &[
                format!("// WARNING: no example code for lang \"{lang}\" under {key}"),
                format!("// Filename: {}", filename_for_id(doc_id)),
            ]);
        }
    }
}

fn push_fenced(lines: &mut Vec<String>, style: &BlockStyle, lang: &str, body: &[String]) {
    push_prefixed(lines, style, &format!("```{lang}"));
    for ln in body {
        push_prefixed(lines, style, ln);
    }
    push_prefixed(lines, style, "```");
}

fn push_prefixed(lines: &mut Vec<String>, style: &BlockStyle, content: &str) {
    lines.push(format!("{}{}", style.line_prefix, content).trim_end().to_string());
}

fn ensure_blank_separator(lines: &mut Vec<String>, style: &BlockStyle) {
    if lines.last() != Some(&style.blank_line) {
        lines.push(style.blank_line.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Example;
    use std::collections::BTreeMap;

    fn doc(description: &str) -> Document {
        let mut d = Document::new("Config.url");
        d.description = description.to_string();
        d
    }

    fn with_example(mut d: Document, key: &str, title: &str, lang: &str, code: &str) -> Document {
        d.examples.insert(
            key.to_string(),
            Example {
                title: Some(title.to_string()),
                code: BTreeMap::from([(lang.to_string(), code.to_string())]),
            },
        );
        d
    }

    fn style() -> BlockStyle {
        BlockStyle::canonical("")
    }

    // ==================== BlockStyle Tests ====================

    #[test]
    fn test_canonical_style_indented() {
        let s = BlockStyle::canonical("    ");
        assert_eq!(s.open_line, "    /**");
        assert_eq!(s.line_prefix, "     * ");
        assert_eq!(s.blank_line, "     *");
        assert_eq!(s.close_line, "     */");
    }

    // ==================== render_block Tests ====================

    #[test]
    fn test_render_prose_only() {
        let d = doc("The server URL.\n\nUsed on boot.");
        let out = render_block(&d, "Config.url", "ts", &style());
        assert_eq!(
            out,
            "/**\n * <!-- doc-id: Config.url -->\n * The server URL.\n *\n * Used on boot.\n */"
        );
    }

    #[test]
    fn test_render_empty_description() {
        let d = doc("");
        let out = render_block(&d, "Config.url", "ts", &style());
        assert_eq!(out, "/**\n * <!-- doc-id: Config.url -->\n */");
    }

    #[test]
    fn test_render_placeholder_substitutes_code() {
        let d = with_example(
            doc("Start it.\n@example setup"),
            "setup",
            "Setup",
            "ts",
            "ready();",
        );
        let out = render_block(&d, "Config.url", "ts", &style());
        assert_eq!(
            out,
            "/**\n * <!-- doc-id: Config.url -->\n * Start it.\n *\n * @example Setup\n * ```ts\n * ready();\n * ```\n *\n */"
        );
    }

    #[test]
    fn test_render_no_double_blank_before_example() {
        let d = with_example(
            doc("Start it.\n\n@example setup"),
            "setup",
            "Setup",
            "ts",
            "ready();",
        );
        let out = render_block(&d, "Config.url", "ts", &style());
        assert!(!out.contains(" *\n *\n * @example"));
        assert!(out.contains(" *\n * @example Setup"));
    }

    #[test]
    fn test_render_missing_key_stub() {
        let d = doc("See below.\n@example ghost");
        let out = render_block(&d, "Config.url", "ts", &style());
        assert!(out.contains("// MISSING example ghost"));
        assert!(out.contains("// Filename: Config.url.yaml"));
        assert!(!out.contains("WARNING"));
    }

    #[test]
    fn test_render_missing_language_stub() {
        let d = with_example(
            doc("See below.\n@example setup"),
            "setup",
            "Setup",
            "ts",
            "ready();",
        );
        let out = render_block(&d, "Config.url", "objc", &style());
        assert!(out.contains("// WARNING: no example code for lang \"objc\" under setup"));
        assert!(!out.contains("MISSING"));
        // The stub fence still names the requested language.
        assert!(out.contains(" * ```objc"));
    }

    #[test]
    fn test_render_blank_code_treated_as_missing_language() {
        let d = with_example(doc("@example setup"), "setup", "Setup", "ts", "   \n  ");
        let out = render_block(&d, "Config.url", "ts", &style());
        assert!(out.contains("// WARNING"));
    }

    #[test]
    fn test_render_examples_appended_without_placeholders() {
        let d = with_example(
            with_example(
                doc("Prose only."),
                "b-second",
                "Second",
                "ts",
                "two();",
            ),
            "a-first",
            "First",
            "ts",
            "one();",
        );
        let out = render_block(&d, "Config.url", "ts", &style());

        // Ascending key order, and no trailing blank before the closer.
        let first = out.find("@example First").unwrap();
        let second = out.find("@example Second").unwrap();
        assert!(first < second);
        assert!(out.ends_with(" * ```\n */"));
    }

    #[test]
    fn test_render_untitled_example_heading_falls_back() {
        let mut d = doc("@example setup");
        d.examples.insert(
            "setup".to_string(),
            Example {
                title: None,
                code: BTreeMap::from([("ts".to_string(), "go();".to_string())]),
            },
        );
        let out = render_block(&d, "Config.url", "ts", &style());
        assert!(out.contains(" * @example Example\n"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let d = with_example(
            doc("Start it.\n@example setup"),
            "setup",
            "Setup",
            "ts",
            "ready();",
        );
        let a = render_block(&d, "Config.url", "ts", &style());
        let b = render_block(&d, "Config.url", "ts", &style());
        assert_eq!(a, b);
    }

    #[test]
    fn test_render_indented_style_prefixes_everything() {
        let d = with_example(
            doc("Start it.\n@example setup"),
            "setup",
            "Setup",
            "ts",
            "ready();",
        );
        let out = render_block(&d, "Config.url", "ts", &BlockStyle::canonical("  "));
        for line in out.lines() {
            assert!(line.starts_with("  "), "unindented line: {line:?}");
        }
    }

    #[test]
    fn test_render_right_trims_prose() {
        let d = doc("Trailing spaces.   ");
        let out = render_block(&d, "Config.url", "ts", &style());
        assert!(out.contains(" * Trailing spaces.\n"));
    }

    #[test]
    fn test_render_extract_render_round_trip() {
        let d = with_example(
            doc("Start it.\n@example setup"),
            "setup",
            "Setup",
            "ts",
            "ready();",
        );
        let first = render_block(&d, "Config.url", "ts", &style());

        // Re-harvest the rendered block and render the result again.
        let blocks = crate::parser::locate_blocks(&first);
        assert_eq!(blocks.len(), 1);
        let extraction = crate::parser::extract(&crate::parser::normalize_block(&blocks[0].inner));

        let mut reparsed = Document::new("Config.url");
        reparsed.description = extraction.description_text();
        for ex in &extraction.examples {
            reparsed.examples.insert(
                ex.key.clone(),
                Example {
                    title: Some(ex.title.clone()),
                    code: BTreeMap::from([(ex.lang.clone(), ex.code.clone())]),
                },
            );
        }

        let second = render_block(&reparsed, "Config.url", "ts", &style());
        assert_eq!(second, first);
    }

    #[test]
    fn test_render_blank_snippet_line_renders_as_blank_line() {
        let d = with_example(
            doc("@example setup"),
            "setup",
            "Setup",
            "ts",
            "a();\n\nb();",
        );
        let out = render_block(&d, "Config.url", "ts", &style());
        assert!(out.contains(" * a();\n *\n * b();"));
    }
}
