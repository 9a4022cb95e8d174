//! Markup to bounded markdown-like text.

use scraper::node::Node;
use scraper::{ElementRef, Html};

use crate::utils::truncate_at_whitespace;

/// Elements whose whole subtree is dropped.
const DROPPED_TAGS: &[&str] = &[
    "script", "style", "noscript", "nav", "header", "svg", "iframe", "template", "form", "head",
];

/// Elements separated from their surroundings by a blank line.
const PARAGRAPH_TAGS: &[&str] = &[
    "p",
    "ul",
    "ol",
    "dl",
    "table",
    "blockquote",
    "pre",
    "section",
    "article",
    "address",
    "figure",
];

/// Elements rendered on their own line.
const LINE_TAGS: &[&str] = &[
    "div",
    "main",
    "aside",
    "footer",
    "tr",
    "dt",
    "dd",
    "figcaption",
    "center",
];

/// Converts a page into markdown-like text of at most `max_chars` characters.
///
/// Headings become `#` lines, list items `- ` lines, and block elements and
/// `<br>` line breaks; links are reduced to their text. Whitespace runs
/// inside a line are collapsed and at most one blank line is kept between
/// blocks. Overlong text is cut at the last whitespace before the bound and
/// ends with `…`. Never fails; empty input yields an empty string.
pub fn normalize(html: &str, max_chars: usize) -> String {
    if html.trim().is_empty() {
        return String::new();
    }
    let document = Html::parse_document(html);
    let mut raw = String::with_capacity(html.len() / 4);
    walk(document.root_element(), &mut raw);

    let text = tidy_lines(&raw);
    truncate_at_whitespace(&text, max_chars)
}

fn walk(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => push_inline(out, &text.text),
            Node::Element(el) => {
                let Some(child_el) = ElementRef::wrap(child) else {
                    continue;
                };
                let name = el.name();
                if DROPPED_TAGS.contains(&name) {
                    continue;
                }
                match name {
                    "br" | "hr" => out.push('\n'),
                    "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                        let level = name[1..].parse::<usize>().unwrap_or(1);
                        ensure_blank_line(out);
                        out.push_str(&"#".repeat(level));
                        out.push(' ');
                        walk(child_el, out);
                        ensure_blank_line(out);
                    }
                    "li" => {
                        ensure_newline(out);
                        out.push_str("- ");
                        walk(child_el, out);
                        ensure_newline(out);
                    }
                    "td" | "th" => {
                        out.push(' ');
                        walk(child_el, out);
                        out.push(' ');
                    }
                    _ if PARAGRAPH_TAGS.contains(&name) => {
                        ensure_blank_line(out);
                        walk(child_el, out);
                        ensure_blank_line(out);
                    }
                    _ if LINE_TAGS.contains(&name) => {
                        ensure_newline(out);
                        walk(child_el, out);
                        ensure_newline(out);
                    }
                    _ => walk(child_el, out),
                }
            }
            _ => {}
        }
    }
}

fn ensure_newline(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

fn ensure_blank_line(out: &mut String) {
    ensure_newline(out);
    if !out.is_empty() && !out.ends_with("\n\n") {
        out.push('\n');
    }
}

/// Appends a text node with source whitespace (including newlines) collapsed.
fn push_inline(out: &mut String, text: &str) {
    let mut pending_space = text.starts_with(char::is_whitespace);
    for word in text.split_whitespace() {
        if pending_space && !out.is_empty() && !out.ends_with([' ', '\n']) {
            out.push(' ');
        }
        out.push_str(word);
        pending_space = true;
    }
    if text.ends_with(char::is_whitespace) && !out.is_empty() && !out.ends_with([' ', '\n']) {
        out.push(' ');
    }
}

/// Trims every line and keeps at most one blank line between content lines.
fn tidy_lines(raw: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    for line in raw.lines() {
        let line = line.split_whitespace().collect::<Vec<_>>().join(" ");
        let has_content = line.chars().any(|c| c != '#' && c != '-' && c != ' ');
        if has_content {
            lines.push(line);
        } else if lines.last().is_some_and(|last| !last.is_empty()) {
            lines.push(String::new());
        }
    }
    while lines.last().is_some_and(|last| last.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}
