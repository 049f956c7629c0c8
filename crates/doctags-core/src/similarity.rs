//! Edit-distance suggestions for lookup misses.
//!
//! # Algorithm
//!
//! 1. For every tag, measure the Levenshtein distance between the query and
//!    each keyword, then the tag name as a trailing implicit keyword.
//! 2. Keep the closest candidate per tag (earliest candidate on ties).
//! 3. Stable-sort tags by distance, so equal distances keep set order.
//! 4. Truncate to `limit`.

use serde::Serialize;

use crate::models::{normalize_query, TagSet};

/// One ranked suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimilarityEntry {
    /// The keyword (or tag name) that came closest to the query.
    pub word: String,
    /// Owning tag.
    pub name: String,
    /// Levenshtein distance between the normalized query and `word`.
    pub distance: usize,
}

/// Rank tags by how close their keywords are to `query`, closest first.
pub fn find_similar(tags: &TagSet, query: &str, limit: usize) -> Vec<SimilarityEntry> {
    let query = normalize_query(query);
    if query.is_empty() || limit == 0 {
        return Vec::new();
    }

    let mut entries: Vec<SimilarityEntry> = tags
        .iter()
        .filter_map(|tag| {
            tag.keywords
                .iter()
                .chain(std::iter::once(&tag.name))
                .map(|word| (word, levenshtein(&query, &word.to_lowercase())))
                // First minimum wins.
                .min_by_key(|&(_, d)| d)
                .map(|(word, distance)| SimilarityEntry {
                    word: word.clone(),
                    name: tag.name.clone(),
                    distance,
                })
        })
        .collect();

    entries.sort_by_key(|e| e.distance);
    entries.truncate(limit);
    entries
}

/// Levenshtein edit distance over Unicode scalar values.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}
