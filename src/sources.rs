//! Tag sources: where tag files come from.
//!
//! Both sources enumerate the local tag directory. [`LocalTagSource`] reads
//! the files from disk; [`RemoteTagSource`] downloads the same file names from
//! `tags.remote_base_url`, so a deployment can pick up tag edits without a
//! redeploy.
//!
//! A remote file that cannot be fetched is replaced by a comment-only
//! placeholder, so one missing file degrades the reload instead of failing it.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use doctags_core::SourceFile;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::Config;

/// A provider of raw tag files.
#[async_trait]
pub trait TagSource: Send + Sync {
    /// Short name used in logs and errors.
    fn label(&self) -> &str;

    /// Whether the files come from the remote copy.
    fn is_remote(&self) -> bool;

    /// Produce every tag file, in enumeration order.
    async fn fetch(&self) -> Result<Vec<SourceFile>>;
}

/// Reads tag files from the configured directory.
pub struct LocalTagSource {
    dir: PathBuf,
    include: GlobSet,
}

impl LocalTagSource {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            dir: config.tags.dir.clone(),
            include: build_globset(&config.tags.include_globs)?,
        })
    }
}

#[async_trait]
impl TagSource for LocalTagSource {
    fn label(&self) -> &str {
        "local"
    }

    fn is_remote(&self) -> bool {
        false
    }

    async fn fetch(&self) -> Result<Vec<SourceFile>> {
        let mut files = Vec::new();
        for name in list_tag_files(&self.dir, &self.include)? {
            let path = self.dir.join(&name);
            let text = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read tag file: {}", path.display()))?;
            debug!(file = %name, bytes = text.len(), "read local tag file");
            files.push(SourceFile::new(name, text));
        }
        Ok(files)
    }
}

/// Downloads the locally enumerated tag files from a remote base URL.
pub struct RemoteTagSource {
    dir: PathBuf,
    include: GlobSet,
    base_url: String,
    client: reqwest::Client,
}

impl RemoteTagSource {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.tags.remote_timeout_secs))
            .build()?;
        Ok(Self {
            dir: config.tags.dir.clone(),
            include: build_globset(&config.tags.include_globs)?,
            base_url: config.tags.remote_base_url.clone(),
            client,
        })
    }

    async fn fetch_one(&self, name: String) -> SourceFile {
        let url = format!("{}{}", self.base_url, name);
        match fetch_text(&self.client, &url).await {
            Ok(text) => {
                debug!(file = %name, bytes = text.len(), "fetched remote tag file");
                SourceFile::new(name, text)
            }
            Err(e) => {
                warn!(file = %name, url = %url, error = %e, "remote tag file unavailable, using placeholder");
                let text = placeholder(&name, &e);
                SourceFile::new(name, text)
            }
        }
    }
}

#[async_trait]
impl TagSource for RemoteTagSource {
    fn label(&self) -> &str {
        "remote"
    }

    fn is_remote(&self) -> bool {
        true
    }

    async fn fetch(&self) -> Result<Vec<SourceFile>> {
        let names = list_tag_files(&self.dir, &self.include)?;
        // join_all keeps input order even though requests run concurrently.
        let files = futures::future::join_all(names.into_iter().map(|n| self.fetch_one(n))).await;
        Ok(files)
    }
}

/// Build the source selected by `remote`.
pub fn tag_source(config: &Config, remote: bool) -> Result<Box<dyn TagSource>> {
    if remote {
        Ok(Box::new(RemoteTagSource::new(config)?))
    } else {
        Ok(Box::new(LocalTagSource::new(config)?))
    }
}

/// Relative paths (with `/` separators) of every tag file under `dir`,
/// sorted for deterministic ordering.
pub fn list_tag_files(dir: &Path, include: &GlobSet) -> Result<Vec<String>> {
    if !dir.exists() {
        bail!("Tag directory does not exist: {}", dir.display());
    }

    let mut names = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(dir).unwrap_or(path);
        let rel_str = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if include.is_match(&rel_str) {
            names.push(rel_str);
        }
    }

    names.sort();
    Ok(names)
}

async fn fetch_text(client: &reqwest::Client, url: &str) -> Result<String> {
    let resp = client.get(url).send().await?.error_for_status()?;
    Ok(resp.text().await?)
}

/// Comment-only stand-in for a file that could not be fetched.
fn placeholder(name: &str, err: &anyhow::Error) -> String {
    let message = err.to_string().replace(['\r', '\n'], " ");
    format!("# failed to load remote tag file {}: {}\n", name, message)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}
