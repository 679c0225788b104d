//! Markdown-to-HTML rendering for backend summaries and chat replies.
//!
//! The backend is prompted to answer in a restricted Markdown subset: flat
//! bullet/numbered lists and `**bold**` spans. This module converts that
//! subset to display-ready HTML (`<p>`, `<strong>`, `<ul>`, `<li>` only).
//! It is intentionally not a general Markdown engine — headings, links,
//! code spans and block quotes are not part of the subset and pass through
//! as literal paragraph text.
//!
//! ## Contract
//!
//! [`render`] is total: it never fails, performs no I/O, and holds no state
//! beyond one invocation. Malformed syntax (an unterminated `**`, a bare
//! list marker with no content) is passed through literally rather than
//! rejected.
//!
//! ## Known limitations
//!
//! - Nested or overlapping `**` markers are resolved left-to-right, first
//!   match wins, non-overlapping; the result for pathological inputs is
//!   unspecified but never an error.
//! - Numbered lines (`1.`, `2.`, …) are grouped into `<ul>` exactly like
//!   bullet lines — ordered-list semantics are not preserved.
//! - Content is caller-trusted: HTML-special characters are not escaped.
//! - The output is not valid renderer input. Re-running [`render`] on its
//!   own HTML wraps the tags in fresh paragraph tags; don't round-trip.

use once_cell::sync::Lazy;
use regex::Regex;

/// `**content**` where content may be whitespace-padded but must open with
/// a character that is not whitespace or an angle bracket. Non-greedy, so
/// several bold spans on one line each match separately.
static RE_BOLD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*(\s*[^<>\s].*?\s*)\*\*").unwrap());

/// A list-item line: `*`, `-`, or `<digits>.`, then whitespace, then content.
static RE_LIST_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:[*-]|\d+\.)\s+(.+)$").unwrap());

/// The marker prefix stripped from a matched list-item line.
static RE_LIST_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:[*-]|\d+\.)\s+").unwrap());

/// Line classification driving the list-grouping state machine.
enum Line<'a> {
    /// Trimmed line matched the list-item pattern; holds the content with
    /// the marker stripped.
    ListItem(&'a str),
    /// Non-blank line that is not a list item; holds the trimmed line.
    Paragraph(&'a str),
    /// Whitespace-only line. Emits nothing but closes an open list.
    Blank,
}

fn classify(line: &str) -> Line<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        Line::Blank
    } else if RE_LIST_ITEM.is_match(trimmed) {
        let content = RE_LIST_MARKER
            .find(trimmed)
            .map(|m| &trimmed[m.end()..])
            .unwrap_or(trimmed);
        Line::ListItem(content)
    } else {
        Line::Paragraph(trimmed)
    }
}

/// Render the restricted Markdown subset to HTML.
///
/// Processing order:
/// 1. Substitute `**bold**` spans with `<strong>…</strong>` across the
///    whole text.
/// 2. Split on newlines and classify each line as list item, paragraph, or
///    blank.
/// 3. Group consecutive list items under one `<ul>`; wrap each paragraph
///    line in `<p>`; drop blank lines (they terminate an open list).
///
/// Output lines are joined with `\n` in document order.
///
/// # Example
/// ```
/// use pdfchat::markdown::render;
///
/// let html = render("**Summary:**\n* first point\n* second point");
/// assert_eq!(
///     html,
///     "<p><strong>Summary:</strong></p>\n<ul>\n<li>first point</li>\n<li>second point</li>\n</ul>"
/// );
/// ```
pub fn render(text: &str) -> String {
    let bolded = RE_BOLD.replace_all(text, "<strong>$1</strong>");

    let mut out: Vec<String> = Vec::new();
    let mut in_list = false;

    for line in bolded.split('\n') {
        match classify(line) {
            Line::ListItem(content) => {
                if !in_list {
                    out.push("<ul>".to_string());
                    in_list = true;
                }
                out.push(format!("<li>{}</li>", content));
            }
            Line::Paragraph(content) => {
                if in_list {
                    out.push("</ul>".to_string());
                    in_list = false;
                }
                out.push(format!("<p>{}</p>", content));
            }
            Line::Blank => {
                if in_list {
                    out.push("</ul>".to_string());
                    in_list = false;
                }
            }
        }
    }

    if in_list {
        out.push("</ul>".to_string());
    }

    out.join("\n")
}
