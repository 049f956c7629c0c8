//! Core data models for the tag store.
//!
//! A [`Tag`] is one canned response; a [`TagSet`] is the parsed corpus,
//! ordered by file order and then by table order within each file.

use serde::Serialize;
use std::collections::HashMap;

/// A single tag: a named response body with lookup aliases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    /// Table key in the corpus (e.g. `[partials]`).
    pub name: String,
    /// Aliases the tag can be looked up by.
    pub keywords: Vec<String>,
    /// Markdown response body.
    pub content: String,
    /// Listed when autocomplete runs with an empty query.
    pub hoisted: bool,
}

impl Tag {
    /// Case-insensitive keyword membership.
    pub fn has_keyword(&self, query: &str) -> bool {
        self.keywords
            .iter()
            .any(|k| k.to_lowercase() == query.to_lowercase())
    }
}

/// Insertion-ordered tag collection with a case-insensitive name index.
#[derive(Debug, Clone, Default)]
pub struct TagSet {
    tags: Vec<Tag>,
    index: HashMap<String, usize>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Insert a tag. A tag whose name matches an existing one (ignoring case)
    /// replaces it in place and keeps the original position.
    ///
    /// Returns the replaced tag, if any.
    pub fn insert(&mut self, tag: Tag) -> Option<Tag> {
        let key = tag.name.to_lowercase();
        match self.index.get(&key) {
            Some(&pos) => Some(std::mem::replace(&mut self.tags[pos], tag)),
            None => {
                self.index.insert(key, self.tags.len());
                self.tags.push(tag);
                None
            }
        }
    }

    /// Exact, case-insensitive lookup by tag name.
    pub fn get(&self, name: &str) -> Option<&Tag> {
        self.index
            .get(&name.to_lowercase())
            .map(|&pos| &self.tags[pos])
    }

    /// First tag (in set order) that lists `query` as a keyword.
    pub fn find_by_keyword(&self, query: &str) -> Option<&Tag> {
        let query = query.to_lowercase();
        self.tags.iter().find(|t| t.has_keyword(&query))
    }

    /// Normalize `query`, then try the name index and fall back to keywords.
    pub fn lookup(&self, query: &str) -> Option<&Tag> {
        let query = normalize_query(query);
        if query.is_empty() {
            return None;
        }
        self.get(&query).or_else(|| self.find_by_keyword(&query))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.tags.iter()
    }

    /// Tags flagged `hoisted = true`, in set order.
    pub fn hoisted(&self) -> impl Iterator<Item = &Tag> {
        self.tags.iter().filter(|t| t.hoisted)
    }
}

impl FromIterator<Tag> for TagSet {
    fn from_iter<I: IntoIterator<Item = Tag>>(iter: I) -> Self {
        let mut set = TagSet::new();
        for tag in iter {
            set.insert(tag);
        }
        set
    }
}

impl<'a> IntoIterator for &'a TagSet {
    type Item = &'a Tag;
    type IntoIter = std::slice::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.tags.iter()
    }
}

/// Size change reported by a successful reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReloadOutcome {
    pub previous_size: usize,
    pub new_size: usize,
    /// Whether the tags came from the remote copy.
    pub remote: bool,
}

/// Normalize a user query to corpus key form.
///
/// Trims, lowercases and collapses every whitespace run into a single `-`,
/// since tag names and keywords use hyphens instead of spaces.
pub fn normalize_query(query: &str) -> String {
    query
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}
