//! Autocomplete ranking for the tag query option.
//!
//! With a query, tags are grouped as exact keyword matches, keyword
//! substring matches and content substring matches, in that order. Without
//! one, hoisted tags are listed.

use serde::Serialize;

use crate::models::TagSet;
use crate::AUTOCOMPLETE_MAX_ITEMS;

/// One autocomplete choice: a decorated label and the tag name to submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub name: String,
    pub value: String,
}

impl Choice {
    fn new(marker: &str, tag: &str) -> Self {
        Self {
            name: format!("{} {}", marker, tag),
            value: tag.to_string(),
        }
    }
}

const EXACT: &str = "✅";
const KEYWORD: &str = "🔑";
const CONTENT: &str = "📄";
const PINNED: &str = "📌";

/// Rank tags for a partially typed query.
pub fn autocomplete(tags: &TagSet, query: &str) -> Vec<Choice> {
    let query = query.trim().to_lowercase();

    let mut choices: Vec<Choice> = if query.is_empty() {
        tags.hoisted().map(|t| Choice::new(PINNED, &t.name)).collect()
    } else {
        let mut exact = Vec::new();
        let mut keyword = Vec::new();
        let mut content = Vec::new();

        for tag in tags {
            let lowered: Vec<String> = tag.keywords.iter().map(|k| k.to_lowercase()).collect();
            if lowered.iter().any(|k| *k == query) {
                exact.push(Choice::new(EXACT, &tag.name));
            } else if lowered.iter().any(|k| k.contains(&query)) {
                keyword.push(Choice::new(KEYWORD, &tag.name));
            } else if tag.content.to_lowercase().contains(&query) {
                content.push(Choice::new(CONTENT, &tag.name));
            }
        }

        exact.into_iter().chain(keyword).chain(content).collect()
    };

    choices.truncate(AUTOCOMPLETE_MAX_ITEMS);
    choices
}
