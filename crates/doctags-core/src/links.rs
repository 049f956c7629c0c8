//! Markdown link scanning for tag content.
//!
//! Only links outside code spans and fenced blocks are returned, since
//! example code frequently contains bracket syntax that is not a link.

use regex::Regex;
use std::sync::LazyLock;

static MARKDOWN_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\[\]]+?\]\(<?(?P<link>[^()]+?)>?\)").unwrap());

/// Extract markdown link targets (`[text](url)` or `[text](<url>)`) from
/// `content`, in order of appearance.
pub fn extract_links(content: &str) -> Vec<String> {
    let cleaned = strip_code(content);
    MARKDOWN_LINK_RE
        .captures_iter(&cleaned)
        .filter_map(|c| c.name("link").map(|m| m.as_str().to_string()))
        .collect()
}

/// Remove inline code spans and fenced blocks.
///
/// A run of one to three backticks opens a span that closes at the next run
/// of the same length, with at least one character between. An opener with
/// no matching closer is kept as plain text.
pub fn strip_code(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut rest = content;

    while let Some(start) = rest.find('`') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let run = tail.chars().take_while(|&c| c == '`').count().min(3);

        match (1..=run).rev().find_map(|n| closing_span(tail, n)) {
            Some(end) => rest = &tail[end..],
            None => {
                out.push('`');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Byte length of the code span opened by `n` backticks at the start of
/// `tail`, including both fences.
fn closing_span(tail: &str, n: usize) -> Option<usize> {
    let fence = &tail[..n];
    let body_start = n + tail[n..].chars().next()?.len_utf8();
    tail[body_start..]
        .find(fence)
        .map(|pos| body_start + pos + n)
}
