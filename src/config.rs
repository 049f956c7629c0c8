use anyhow::{Context, Result};
use globset::Glob;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub tags: TagsConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub similarity: SimilarityConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TagsConfig {
    pub dir: PathBuf,
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default = "default_remote_base_url")]
    pub remote_base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub remote_timeout_secs: u64,
}

fn default_include_globs() -> Vec<String> {
    vec!["*.toml".to_string()]
}

fn default_remote_base_url() -> String {
    "https://raw.githubusercontent.com/discordjs/discord-utils-bot/main/tags/".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct ValidationConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            max_redirects: default_max_redirects(),
        }
    }
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:101.0) Gecko/20100101 Firefox/101.0"
        .to_string()
}

fn default_max_redirects() -> usize {
    1
}

#[derive(Debug, Deserialize, Clone)]
pub struct SimilarityConfig {
    #[serde(default = "default_similarity_limit")]
    pub limit: usize,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            limit: default_similarity_limit(),
        }
    }
}

fn default_similarity_limit() -> usize {
    3
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7400".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` takes precedence.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    "warn".to_string()
}

impl Config {
    /// Defaults with tags read from `./tags`, used when no config file exists.
    pub fn minimal() -> Self {
        Self {
            tags: TagsConfig {
                dir: PathBuf::from("./tags"),
                include_globs: default_include_globs(),
                remote_base_url: default_remote_base_url(),
                remote_timeout_secs: default_timeout_secs(),
            },
            validation: ValidationConfig::default(),
            similarity: SimilarityConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate_config(&config)?;

    Ok(config)
}

/// Load `path` when it exists, otherwise fall back to [`Config::minimal`].
pub fn load_config_or_minimal(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        Ok(Config::minimal())
    }
}

fn validate_config(config: &Config) -> Result<()> {
    if config.similarity.limit < 1 {
        anyhow::bail!("similarity.limit must be >= 1");
    }

    if config.validation.timeout_secs == 0 {
        anyhow::bail!("validation.timeout_secs must be > 0");
    }

    if config.tags.remote_timeout_secs == 0 {
        anyhow::bail!("tags.remote_timeout_secs must be > 0");
    }

    let base = &config.tags.remote_base_url;
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        anyhow::bail!("tags.remote_base_url must be an http(s) URL, got '{}'", base);
    }
    if !base.ends_with('/') {
        anyhow::bail!("tags.remote_base_url must end with '/', got '{}'", base);
    }

    if config.tags.include_globs.is_empty() {
        anyhow::bail!("tags.include_globs must not be empty");
    }
    for pattern in &config.tags.include_globs {
        Glob::new(pattern)
            .with_context(|| format!("Invalid tags.include_globs pattern: '{}'", pattern))?;
    }

    Ok(())
}
