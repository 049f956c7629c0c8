//! # doctags
//!
//! A tag store for a documentation help bot: canned markdown responses
//! ("tags") kept as TOML files, looked up by name or keyword, with typo
//! suggestions, hot reloading from a remote copy and a validation gate for CI.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌─────────────┐   ┌──────────────┐
//! │ Tag sources │──▶│   Parser    │──▶│  Repository   │
//! │ local/remote│   │ strict TOML │   │ Arc<TagSet>   │
//! └─────────────┘   └──────┬──────┘   └──────┬───────┘
//!                          │                 │
//!                          ▼          ┌──────┴──────┐
//!                    ┌──────────┐     ▼             ▼
//!                    │Validator │  ┌──────┐    ┌──────────┐
//!                    │ + links  │  │ CLI  │    │   HTTP   │
//!                    └──────────┘  └──────┘    └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! doctags validate --links      # CI gate
//! doctags show "embed builder"  # resolve a query
//! doctags similar png           # typo suggestions
//! doctags serve                 # HTTP surface
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`sources`] | Local and remote tag file loading |
//! | [`repository`] | The live, reloadable tag set |
//! | [`link_check`] | HTTP link probing |
//! | [`progress`] | Link-check progress reporters |
//! | [`validate_cmd`] | `validate` and `test` commands |
//! | [`tag_cmd`] | Lookup and reload commands |
//! | [`server`] | JSON HTTP surface |
//!
//! Pure parsing, ranking and validation logic lives in `doctags_core`.

pub mod config;
pub mod link_check;
pub mod progress;
pub mod repository;
pub mod server;
pub mod sources;
pub mod tag_cmd;
pub mod validate_cmd;
