//! # doctags CLI
//!
//! ## Usage
//!
//! ```bash
//! doctags --config ./config/doctags.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `doctags validate` | Validate the tag corpus (exit 0/1) |
//! | `doctags test <file>` | Preview a single tag against the corpus |
//! | `doctags show <query>` | Resolve a query to a tag |
//! | `doctags similar <query>` | Closest tags to a query |
//! | `doctags list` | Hoisted tags, or all with `--all` |
//! | `doctags autocomplete [query]` | Ranked autocomplete choices |
//! | `doctags reload` | Load, reload and report the size change |
//! | `doctags corpus` | Print the combined tag corpus |
//! | `doctags serve` | Start the JSON HTTP server |
//!
//! ## Examples
//!
//! ```bash
//! # CI gate with link checks
//! doctags validate --links
//!
//! # Validate a proposed tag together with the corpus
//! doctags validate --extra ./new-tag.toml
//!
//! # Pull tag edits from the remote copy
//! doctags reload --remote
//! ```

use clap::{Parser, Subcommand};
use doctags::progress::ProgressMode;
use doctags::{config, server, tag_cmd, validate_cmd};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// doctags: canned documentation responses with fuzzy lookup and validation.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. Without one, tags are read from `./tags`.
#[derive(Parser)]
#[command(
    name = "doctags",
    about = "doctags: TOML-backed documentation tags with fuzzy lookup and corpus validation",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/doctags.toml`. Built-in defaults are used when
    /// the file does not exist.
    #[arg(long, global = true, default_value = "./config/doctags.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the tag corpus.
    ///
    /// Checks uniqueness of names and keywords, whitespace, empty content and
    /// the hoisted ceiling. Exits with 1 and prints every error block when
    /// the corpus is invalid.
    Validate {
        /// Also probe every markdown link in tag content.
        #[arg(long)]
        links: bool,

        /// Extra tag file validated together with the corpus.
        #[arg(long)]
        extra: Option<PathBuf>,

        /// Link-check progress: `auto`, `off`, `human`, or `json`.
        #[arg(long, default_value = "auto")]
        progress: String,
    },

    /// Preview a single-tag TOML file and validate it with the corpus.
    Test {
        /// File containing exactly one tag table.
        file: PathBuf,
    },

    /// Resolve a query to a tag and print its content.
    Show {
        query: String,

        /// User id to address the response to.
        #[arg(long)]
        target: Option<String>,

        /// Load tags from the remote copy instead of the local directory.
        #[arg(long)]
        remote: bool,
    },

    /// List the tags closest to a query.
    Similar {
        query: String,

        /// Number of suggestions (defaults to `similarity.limit`).
        #[arg(long)]
        limit: Option<usize>,
    },

    /// List hoisted tags.
    List {
        /// List every tag instead.
        #[arg(long)]
        all: bool,
    },

    /// Print autocomplete choices for a partial query.
    Autocomplete {
        #[arg(default_value = "")]
        query: String,
    },

    /// Load tags, reload them and report the size change.
    Reload {
        /// Reload from the remote copy.
        #[arg(long)]
        remote: bool,
    },

    /// Print every tag file joined into one corpus.
    Corpus {
        /// Read the remote copy instead of the local directory.
        #[arg(long)]
        remote: bool,
    },

    /// Start the JSON HTTP server on `[server].bind`.
    Serve,
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg = config::load_config_or_minimal(&cli.config)?;
    init_tracing(&cfg.logging.filter);

    let code = match cli.command {
        Commands::Validate {
            links,
            extra,
            progress,
        } => {
            let mode = ProgressMode::parse(&progress)?;
            validate_cmd::run_validate(&cfg, links, extra.as_deref(), mode).await?
        }
        Commands::Test { file } => validate_cmd::run_test(&cfg, &file).await?,
        Commands::Show {
            query,
            target,
            remote,
        } => tag_cmd::run_show(&cfg, &query, target.as_deref(), remote).await?,
        Commands::Similar { query, limit } => {
            tag_cmd::run_similar(&cfg, &query, limit).await?;
            0
        }
        Commands::List { all } => {
            tag_cmd::run_list(&cfg, all).await?;
            0
        }
        Commands::Autocomplete { query } => {
            tag_cmd::run_autocomplete(&cfg, &query).await?;
            0
        }
        Commands::Reload { remote } => tag_cmd::run_reload(&cfg, remote).await?,
        Commands::Corpus { remote } => {
            tag_cmd::run_corpus(&cfg, remote).await?;
            0
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
            0
        }
    };

    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
