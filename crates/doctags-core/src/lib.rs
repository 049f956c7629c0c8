//! # doctags core
//!
//! Pure tag-store logic for doctags: the tag data model, TOML parsing with
//! strict schema checks, similarity ranking, autocomplete ranking, markdown
//! link scanning, response rendering and the validation rule engine.
//!
//! This crate performs no filesystem or network I/O. Link reachability is
//! delegated to a [`validate::LinkChecker`] supplied by the caller.

pub mod autocomplete;
pub mod error;
pub mod links;
pub mod models;
pub mod parse;
pub mod render;
pub mod similarity;
pub mod validate;

pub use error::TagError;
pub use models::{normalize_query, ReloadOutcome, Tag, TagSet};
pub use parse::SourceFile;

/// Maximum number of choices Discord accepts in one autocomplete response.
///
/// Also the ceiling on hoisted tags, since hoisted tags are what an empty
/// autocomplete query lists.
pub const AUTOCOMPLETE_MAX_ITEMS: usize = 25;
