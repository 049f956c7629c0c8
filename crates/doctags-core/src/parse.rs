//! TOML tag parsing with strict schema checks.
//!
//! A tag file is a TOML document where every top-level table is a tag:
//!
//! ```toml
//! [ping]
//! keywords = ["pong"]
//! content = """
//! Pong!
//! """
//! hoisted = false
//! ```
//!
//! `keywords` and `content` are required, `hoisted` defaults to `false`, and
//! any other field is rejected. Tag names are case-insensitive, so `[Ping]`
//! and `[ping]` in the same file are rejected as duplicates.

use serde::Deserialize;
use std::collections::HashMap;

use crate::error::TagError;
use crate::models::{Tag, TagSet};

/// Raw contents of one tag file, as produced by a tag source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// File name relative to the tag directory (e.g. `tags.toml`).
    pub name: String,
    pub text: String,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTag {
    keywords: Vec<String>,
    content: String,
    #[serde(default)]
    hoisted: bool,
}

/// Concatenate source files into one corpus, separated by a blank line.
pub fn concat_sources(files: &[SourceFile]) -> String {
    files
        .iter()
        .map(|f| f.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Parse a single TOML document into a [`TagSet`].
pub fn parse_corpus(text: &str) -> Result<TagSet, TagError> {
    Ok(parse_document("corpus", text)?.into_iter().collect())
}

/// Parse every file separately and merge the results.
///
/// A file that redefines a tag name from an earlier file replaces the earlier
/// record (last write wins). Two tables with the same name inside one file are
/// a TOML error.
pub fn parse_sources(files: &[SourceFile]) -> Result<TagSet, TagError> {
    let mut set = TagSet::new();
    for file in files {
        for tag in parse_document(&file.name, &file.text)? {
            set.insert(tag);
        }
    }
    Ok(set)
}

/// Parse a single candidate tag, as submitted for preview.
///
/// The text must hold exactly one tag with at least one keyword and
/// non-empty content.
pub fn parse_single_tag(text: &str) -> Result<Tag, TagError> {
    let mut tags = parse_document("submission", text)?;
    if tags.len() != 1 {
        return Err(TagError::Shape(format!(
            "expected exactly one [name] table, found {}",
            tags.len()
        )));
    }
    let tag = tags.remove(0);
    if tag.keywords.is_empty() {
        return Err(TagError::Shape("needs keywords (string[])".to_string()));
    }
    if tag.content.is_empty() {
        return Err(TagError::Shape("needs content (string)".to_string()));
    }
    Ok(tag)
}

fn parse_document(source_name: &str, text: &str) -> Result<Vec<Tag>, TagError> {
    let table: toml::Table = toml::from_str(text).map_err(|e| TagError::Parse {
        source_name: source_name.to_string(),
        source: e,
    })?;

    let mut tags = Vec::with_capacity(table.len());
    let mut seen: HashMap<String, String> = HashMap::new();
    for (name, value) in table {
        if let Some(first) = seen.insert(name.to_lowercase(), name.clone()) {
            return Err(TagError::Schema {
                name,
                reason: format!(
                    "duplicate of [{}] in {} (tag names ignore case)",
                    first, source_name
                ),
            });
        }
        if !value.is_table() {
            return Err(TagError::Schema {
                name,
                reason: format!("expected a table, found {}", value.type_str()),
            });
        }
        let raw: RawTag = value.try_into().map_err(|e: toml::de::Error| TagError::Schema {
            name: name.clone(),
            reason: e.message().to_string(),
        })?;
        tags.push(Tag {
            name,
            keywords: raw.keywords,
            content: raw.content,
            hoisted: raw.hoisted,
        });
    }
    Ok(tags)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PING: &str = "[ping]\nkeywords=[\"pong\"]\ncontent=\"\"\"Pong!\"\"\"";

    #[test]
    fn test_parse_minimal_tag() {
        let set = parse_corpus(PING).unwrap();
        assert_eq!(set.len(), 1);
        let tag = set.get("ping").unwrap();
        assert_eq!(tag.keywords, vec!["pong"]);
        assert_eq!(tag.content, "Pong!");
        assert!(!tag.hoisted);
    }

    #[test]
    fn test_parse_multiline_and_hoisted() {
        let text = r#"
[embeds]
keywords = ["embed", "rich-embed"]
hoisted = true
content = """
Embeds are built with `EmbedBuilder`.
- [guide](https://discordjs.guide/popular-topics/embeds.html)
"""

[intents]
keywords = []
content = "Intents decide which events you receive."
"#;
        let set = parse_corpus(text).unwrap();
        let names: Vec<&str> = set.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["embeds", "intents"]);

        let embeds = set.get("embeds").unwrap();
        assert!(embeds.hoisted);
        assert_eq!(embeds.keywords.len(), 2);
        assert!(embeds.content.starts_with("Embeds are built"));
        assert!(embeds.content.contains('\n'));
    }

    #[test]
    fn test_unterminated_string_is_parse_error() {
        let err = parse_corpus("[a]\nkeywords = []\ncontent = \"\"\"never closed").unwrap_err();
        assert!(matches!(err, TagError::Parse { .. }), "got {:?}", err);
    }

    #[test]
    fn test_malformed_array_is_parse_error() {
        let err = parse_corpus("[a]\nkeywords = [\"x\",\ncontent = \"y\"").unwrap_err();
        assert!(matches!(err, TagError::Parse { .. }));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = parse_corpus("[a]\nkeywords = []\ncontent = \"y\"\ncolour = 3").unwrap_err();
        match err {
            TagError::Schema { name, reason } => {
                assert_eq!(name, "a");
                assert!(reason.contains("colour"), "reason: {}", reason);
            }
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_content_rejected() {
        let err = parse_corpus("[a]\nkeywords = [\"x\"]").unwrap_err();
        assert!(matches!(err, TagError::Schema { ref name, .. } if name == "a"));
    }

    #[test]
    fn test_top_level_value_rejected() {
        let err = parse_corpus("stray = 1").unwrap_err();
        assert!(matches!(err, TagError::Schema { ref name, .. } if name == "stray"));
    }

    #[test]
    fn test_duplicate_in_one_file_is_parse_error() {
        let text = format!("{}\n\n{}", PING, PING);
        assert!(matches!(
            parse_corpus(&text).unwrap_err(),
            TagError::Parse { .. }
        ));
    }

    #[test]
    fn test_case_variant_in_one_file_is_schema_error() {
        let text = "[Ping]\nkeywords = [\"a\"]\ncontent = \"A\"\n\n[ping]\nkeywords = [\"b\"]\ncontent = \"B\"";
        match parse_corpus(text).unwrap_err() {
            TagError::Schema { name, reason } => {
                assert_eq!(name, "ping");
                assert!(reason.contains("[Ping]"), "reason: {}", reason);
            }
            other => panic!("expected schema error, got {:?}", other),
        }

        let files = vec![SourceFile::new("tags.toml", text)];
        let err = parse_sources(&files).unwrap_err();
        assert!(err.to_string().contains("tags.toml"), "error: {}", err);
    }

    #[test]
    fn test_later_file_wins() {
        let files = vec![
            SourceFile::new("a.toml", PING),
            SourceFile::new("b.toml", "[ping]\nkeywords = [\"pong2\"]\ncontent = \"Pong again\""),
        ];
        let set = parse_sources(&files).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("ping").unwrap().content, "Pong again");
    }

    #[test]
    fn test_parse_error_names_source_file() {
        let files = vec![
            SourceFile::new("good.toml", PING),
            SourceFile::new("bad.toml", "[oops"),
        ];
        let err = parse_sources(&files).unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn test_placeholder_comment_parses_empty() {
        let set = parse_corpus("# failed to load remote tag file x.toml: 404").unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_concat_sources() {
        let files = vec![SourceFile::new("a", "one"), SourceFile::new("b", "two")];
        assert_eq!(concat_sources(&files), "one\n\ntwo");
    }

    #[test]
    fn test_parse_single_tag() {
        let tag = parse_single_tag(PING).unwrap();
        assert_eq!(tag.name, "ping");

        let err = parse_single_tag("[a]\nkeywords = []\ncontent = \"x\"").unwrap_err();
        assert!(matches!(err, TagError::Shape(_)));

        let two = format!("{}\n[b]\nkeywords = [\"c\"]\ncontent = \"d\"", PING);
        assert!(matches!(parse_single_tag(&two).unwrap_err(), TagError::Shape(_)));
    }
}
