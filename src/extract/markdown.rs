//! Markdown rendering and cleanup
//!
//! The renderer walks the parsed DOM and emits Markdown with ATX-style
//! headings and a depth-rotated bullet glyph set. The cleanup pass
//! normalizes the result for LLM-ready output; it is deterministic and
//! idempotent (`clean(clean(md)) == clean(md)`).

use crate::extract::text::collapse_blank_runs;
use ego_tree::NodeRef;
use regex::Regex;
use scraper::node::Element;
use scraper::{Html, Node};
use std::sync::LazyLock;

/// Bullet glyphs rotated per nesting level
const BULLET_GLYPHS: [char; 3] = ['•', '◦', '▪'];

/// Converts a parsed document to Markdown
pub fn render_markdown(doc: &Html) -> String {
    let mut out = String::new();
    render_children(doc.tree.root(), &mut out, 0);
    out.trim().to_string()
}

fn render_children(node: NodeRef<'_, Node>, out: &mut String, list_depth: usize) {
    for child in node.children() {
        render_node(child, out, list_depth);
    }
}

fn render_node(node: NodeRef<'_, Node>, out: &mut String, list_depth: usize) {
    match node.value() {
        Node::Text(text) => append_text(&text.text, out),
        Node::Element(element) => render_element(node, element, out, list_depth),
        _ => {}
    }
}

fn render_element(
    node: NodeRef<'_, Node>,
    element: &Element,
    out: &mut String,
    list_depth: usize,
) {
    match element.name() {
        // Invisible machinery; never part of the rendered output.
        "script" | "style" | "noscript" | "template" | "title" | "meta" | "link" | "base"
        | "iframe" => {}

        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = element.name()[1..].parse::<usize>().unwrap_or(1);
            let inner = render_to_string(node, list_depth);
            let inner = inner.trim();
            if !inner.is_empty() {
                ensure_block_separator(out);
                for _ in 0..level {
                    out.push('#');
                }
                out.push(' ');
                out.push_str(inner);
                ensure_block_separator(out);
            }
        }

        "p" | "div" | "section" | "article" | "main" | "header" | "footer" | "nav" | "aside"
        | "figure" | "figcaption" | "details" | "summary" | "address" | "html" | "head"
        | "body" => {
            ensure_block_separator(out);
            render_children(node, out, list_depth);
            ensure_block_separator(out);
        }

        "br" => out.push('\n'),

        "hr" => {
            ensure_block_separator(out);
            out.push_str("---");
            ensure_block_separator(out);
        }

        "ul" => render_list(node, out, list_depth, false),
        "ol" => render_list(node, out, list_depth, true),

        // A stray item outside any list still gets a marker.
        "li" => {
            ensure_block_separator(out);
            let inner = render_to_string(node, list_depth + 1);
            let inner = inner.trim();
            if !inner.is_empty() {
                out.push(bullet_glyph(list_depth));
                out.push(' ');
                out.push_str(inner);
            }
            ensure_block_separator(out);
        }

        "blockquote" => {
            let inner = render_to_string(node, list_depth);
            let inner = inner.trim();
            if !inner.is_empty() {
                ensure_block_separator(out);
                for (i, line) in inner.lines().enumerate() {
                    if i > 0 {
                        out.push('\n');
                    }
                    let line = line.trim();
                    if line.is_empty() {
                        out.push('>');
                    } else {
                        out.push_str("> ");
                        out.push_str(line);
                    }
                }
                ensure_block_separator(out);
            }
        }

        "pre" => {
            let code = raw_text(node);
            let code = code.trim_matches('\n');
            ensure_block_separator(out);
            out.push_str("```\n");
            out.push_str(code);
            out.push_str("\n```");
            ensure_block_separator(out);
        }

        "code" => {
            let inner = render_to_string(node, list_depth);
            let inner = inner.trim();
            if !inner.is_empty() {
                out.push('`');
                out.push_str(inner);
                out.push('`');
            }
        }

        "strong" | "b" => wrap_inline(node, out, list_depth, "**"),
        "em" | "i" => wrap_inline(node, out, list_depth, "*"),
        "del" | "s" | "strike" => wrap_inline(node, out, list_depth, "~~"),

        "a" => {
            let inner = render_to_string(node, list_depth);
            let inner = inner.trim();
            match element.attr("href") {
                Some(href) if !href.trim().is_empty() => {
                    out.push('[');
                    out.push_str(inner);
                    out.push_str("](");
                    out.push_str(href.trim());
                    out.push(')');
                }
                _ => out.push_str(inner),
            }
        }

        "img" => {
            if let Some(src) = element.attr("src") {
                let alt = element.attr("alt").unwrap_or("");
                out.push_str("![");
                out.push_str(alt.trim());
                out.push_str("](");
                out.push_str(src.trim());
                out.push(')');
            }
        }

        "table" => {
            ensure_block_separator(out);
            render_children(node, out, list_depth);
            ensure_block_separator(out);
        }

        "tr" => {
            let mut cells = Vec::new();
            for child in node.children() {
                if let Node::Element(cell) = child.value() {
                    if matches!(cell.name(), "td" | "th") {
                        cells.push(render_to_string(child, list_depth).trim().to_string());
                    }
                }
            }
            if !cells.iter().all(|cell| cell.is_empty()) {
                out.push_str(&cells.join(" | "));
                out.push('\n');
            }
        }

        _ => render_children(node, out, list_depth),
    }
}

fn render_list(node: NodeRef<'_, Node>, out: &mut String, list_depth: usize, ordered: bool) {
    ensure_block_separator(out);
    let indent = "  ".repeat(list_depth);
    let mut index = 0usize;

    for child in node.children() {
        let Node::Element(element) = child.value() else {
            continue;
        };
        if element.name() != "li" {
            continue;
        }
        index += 1;

        let body = render_to_string(child, list_depth + 1);
        let body = body.trim();
        if body.is_empty() {
            continue;
        }

        let marker = if ordered {
            format!("{index}. ")
        } else {
            format!("{} ", bullet_glyph(list_depth))
        };

        for (i, line) in body.lines().enumerate() {
            if i == 0 {
                out.push_str(&indent);
                out.push_str(&marker);
                out.push_str(line.trim_end());
            } else {
                // Nested lists carry their own indentation.
                out.push('\n');
                out.push_str(line.trim_end());
            }
        }
        out.push('\n');
    }

    ensure_block_separator(out);
}

fn bullet_glyph(list_depth: usize) -> char {
    BULLET_GLYPHS[list_depth % BULLET_GLYPHS.len()]
}

fn wrap_inline(node: NodeRef<'_, Node>, out: &mut String, list_depth: usize, marker: &str) {
    let inner = render_to_string(node, list_depth);
    let inner = inner.trim();
    if !inner.is_empty() {
        out.push_str(marker);
        out.push_str(inner);
        out.push_str(marker);
    }
}

fn render_to_string(node: NodeRef<'_, Node>, list_depth: usize) -> String {
    let mut out = String::new();
    render_children(node, &mut out, list_depth);
    out
}

/// Concatenated descendant text with whitespace preserved (for `<pre>`)
fn raw_text(node: NodeRef<'_, Node>) -> String {
    let mut out = String::new();
    for descendant in node.descendants() {
        if let Node::Text(text) = descendant.value() {
            out.push_str(&text.text);
        }
    }
    out
}

/// Appends a text node with HTML whitespace collapsing
fn append_text(raw: &str, out: &mut String) {
    let ends_with_whitespace = |s: &String| s.ends_with(char::is_whitespace);

    if raw.trim().is_empty() {
        if !out.is_empty() && !ends_with_whitespace(out) {
            out.push(' ');
        }
        return;
    }

    if raw.starts_with(char::is_whitespace) && !out.is_empty() && !ends_with_whitespace(out) {
        out.push(' ');
    }
    let mut first = true;
    for word in raw.split_whitespace() {
        if !first {
            out.push(' ');
        }
        out.push_str(word);
        first = false;
    }
    if raw.ends_with(char::is_whitespace) {
        out.push(' ');
    }
}

/// Trims trailing spaces and guarantees exactly one blank line before the
/// next block
fn ensure_block_separator(out: &mut String) {
    while out.ends_with(' ') || out.ends_with('\t') {
        out.pop();
    }
    if out.is_empty() || out.ends_with("\n\n") {
        return;
    }
    if out.ends_with('\n') {
        out.push('\n');
    } else {
        out.push_str("\n\n");
    }
}

static TRAILING_WS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)[ \t]+$").expect("hardcoded regex pattern is valid"));
static HEADING_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(#+)[ \t]*(.+?)[ \t#]*$").expect("hardcoded regex pattern is valid"));
static QUOTED_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^"(.+)"$"#).expect("hardcoded regex pattern is valid"));
static BYLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^by[ \t]+(.+?)[ \t]*$").expect("hardcoded regex pattern is valid"));
static BULLET_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*[-*+•◦▪][ \t]+(.+)$").expect("hardcoded regex pattern is valid")
});
static LINK_SYNTAX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]*)\]\(([^)]+)\)").expect("hardcoded regex pattern is valid"));

/// Cleans generated Markdown for LLM-ready output
///
/// Steps, in order: normalize line endings; strip trailing whitespace per
/// line; normalize heading lines to a single `#`-run, one space, and
/// trimmed text; convert `"..."` lines to blockquotes and `by ...` lines to
/// `By ...` attributions; normalize all bullet markers to `- `; trim
/// whitespace inside link syntax; regroup sections with blockquote
/// attribution spacing; collapse blank-line runs; trim the document.
pub fn clean_markdown(markdown: &str) -> String {
    let markdown = markdown.replace("\r\n", "\n").replace('\r', "\n");
    let markdown = TRAILING_WS.replace_all(&markdown, "");
    let markdown = HEADING_LINE.replace_all(&markdown, "${1} ${2}");
    let markdown = QUOTED_LINE.replace_all(&markdown, "> ${1}");
    let markdown = BYLINE.replace_all(&markdown, "By ${1}");
    let markdown = BULLET_LINE.replace_all(&markdown, "- ${1}");
    let markdown = LINK_SYNTAX.replace_all(&markdown, |caps: &regex::Captures<'_>| {
        format!("[{}]({})", caps[1].trim(), caps[2].trim())
    });

    let markdown = regroup_sections(&markdown);
    collapse_blank_runs(&markdown).trim().to_string()
}

/// Rebuilds paragraph sections, keeping attribution lines visually attached
/// to the blockquote they follow
fn regroup_sections(markdown: &str) -> String {
    let mut sections = Vec::new();

    for section in markdown.split("\n\n") {
        if section.trim().is_empty() {
            continue;
        }
        let lines: Vec<&str> = section
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        if lines.iter().any(|line| line.starts_with('>')) {
            let mut grouped = Vec::new();
            for line in lines {
                if line.starts_with("By ") && !line.starts_with('>') {
                    grouped.push(format!("\n{line}"));
                } else {
                    grouped.push(line.to_string());
                }
            }
            sections.push(grouped.join("\n"));
        } else {
            sections.push(lines.join("\n"));
        }
    }

    sections.join("\n\n")
}
