//! Errors raised while turning tag text into a [`TagSet`](crate::TagSet).

/// Tag parsing and schema errors.
#[derive(Debug, thiserror::Error)]
pub enum TagError {
    /// The text is not valid TOML (unterminated string, malformed array, ...).
    #[error("failed to parse tag file '{source_name}': {source}")]
    Parse {
        source_name: String,
        #[source]
        source: toml::de::Error,
    },

    /// The TOML is valid but a tag table does not match the tag schema.
    #[error("invalid tag [{name}]: {reason}")]
    Schema { name: String, reason: String },

    /// A single-tag submission does not have the expected shape.
    #[error("unexpected tag shape: {0}")]
    Shape(String),
}
