//! The live tag repository.
//!
//! [`TagRepository`] owns the current [`TagSet`] and is shared by handle
//! (`Arc<TagRepository>`) from the process entry point. Readers take a cheap
//! snapshot (`Arc<TagSet>`); a load builds the new set completely before
//! swapping it in, so a failed load or reload never disturbs the live set.
//!
//! Reloads are not serialized here. Callers that can reload concurrently
//! (the HTTP server) hold their own lock around [`TagRepository::reload`].

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use doctags_core::autocomplete::{autocomplete, Choice};
use doctags_core::parse::parse_sources;
use doctags_core::similarity::{find_similar, SimilarityEntry};
use doctags_core::{ReloadOutcome, Tag, TagSet};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{error, info};

use crate::config::Config;
use crate::sources::{tag_source, TagSource};

#[derive(Clone, Default)]
struct Loaded {
    tags: Arc<TagSet>,
    loaded_at: Option<DateTime<Utc>>,
}

pub struct TagRepository {
    config: Config,
    state: RwLock<Loaded>,
}

impl TagRepository {
    /// An empty repository. Call [`load`](Self::load) to populate it.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: RwLock::new(Loaded::default()),
        }
    }

    /// A repository pre-populated with `tags`.
    pub fn with_tags(config: Config, tags: TagSet) -> Self {
        let repo = Self::new(config);
        repo.swap(tags);
        repo
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load tags from the local directory or the remote copy and replace the
    /// current set. Returns the new size. On error the current set is kept.
    pub async fn load(&self, remote: bool) -> Result<usize> {
        let source = tag_source(&self.config, remote)?;
        self.load_from(source.as_ref()).await
    }

    /// Like [`load`](Self::load), with an explicit source.
    pub async fn load_from(&self, source: &dyn TagSource) -> Result<usize> {
        let files = source
            .fetch()
            .await
            .with_context(|| format!("Failed to fetch {} tag files", source.label()))?;
        let tags = parse_sources(&files)?;
        let size = tags.len();
        self.swap(tags);
        info!(
            source = source.label(),
            files = files.len(),
            tags = size,
            "tag cache loaded"
        );
        Ok(size)
    }

    /// Reload and report the size change.
    pub async fn reload(&self, remote: bool) -> Result<ReloadOutcome> {
        let source = tag_source(&self.config, remote)?;
        self.reload_from(source.as_ref()).await
    }

    pub async fn reload_from(&self, source: &dyn TagSource) -> Result<ReloadOutcome> {
        let previous_size = self.len();
        match self.load_from(source).await {
            Ok(new_size) => Ok(ReloadOutcome {
                previous_size,
                new_size,
                remote: source.is_remote(),
            }),
            Err(e) => {
                let message = format!("{:#}", e);
                error!(
                    source = source.label(),
                    kept = previous_size,
                    error = %message,
                    "tag reload failed"
                );
                Err(e)
            }
        }
    }

    fn swap(&self, tags: TagSet) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        *state = Loaded {
            tags: Arc::new(tags),
            loaded_at: Some(Utc::now()),
        };
    }

    /// The current tag set. Unaffected by later reloads.
    pub fn snapshot(&self) -> Arc<TagSet> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .tags
            .clone()
    }

    /// When the current set was loaded, `None` before the first load.
    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .loaded_at
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Case-insensitive exact match on the tag name.
    pub fn get(&self, name: &str) -> Option<Tag> {
        self.snapshot().get(name).cloned()
    }

    pub fn find_by_keyword(&self, query: &str) -> Option<Tag> {
        self.snapshot().find_by_keyword(query).cloned()
    }

    /// Normalized lookup: name first, then keywords.
    pub fn lookup(&self, query: &str) -> Option<Tag> {
        self.snapshot().lookup(query).cloned()
    }

    /// The `limit` closest tags to `query`.
    pub fn find_similar(&self, query: &str, limit: usize) -> Vec<SimilarityEntry> {
        find_similar(&self.snapshot(), query, limit)
    }

    /// [`find_similar`](Self::find_similar) with the configured limit.
    pub fn suggest(&self, query: &str) -> Vec<SimilarityEntry> {
        self.find_similar(query, self.config.similarity.limit)
    }

    pub fn hoisted(&self) -> Vec<Tag> {
        self.snapshot().hoisted().cloned().collect()
    }

    pub fn autocomplete(&self, query: &str) -> Vec<Choice> {
        autocomplete(&self.snapshot(), query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use doctags_core::SourceFile;
    use std::sync::Mutex;
    use tempfile::TempDir;

    const PING: &str = "[ping]\nkeywords=[\"pong\"]\ncontent=\"\"\"Pong!\"\"\"";

    fn setup_repo(files: &[(&str, &str)]) -> (TempDir, TagRepository) {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("tags");
        std::fs::create_dir_all(&dir).unwrap();
        for (name, body) in files {
            std::fs::write(dir.join(name), body).unwrap();
        }
        let mut cfg = Config::minimal();
        cfg.tags.dir = dir;
        (tmp, TagRepository::new(cfg))
    }

    struct ScriptedSource {
        label: &'static str,
        files: Mutex<Vec<SourceFile>>,
    }

    #[async_trait]
    impl TagSource for ScriptedSource {
        fn label(&self) -> &str {
            self.label
        }

        fn is_remote(&self) -> bool {
            false
        }

        async fn fetch(&self) -> Result<Vec<SourceFile>> {
            Ok(self.files.lock().unwrap().clone())
        }
    }

    #[tokio::test]
    async fn test_ping_pong_scenario() {
        let (_tmp, repo) = setup_repo(&[("tags.toml", PING)]);
        assert!(repo.is_empty());
        assert!(repo.loaded_at().is_none());

        assert_eq!(repo.load(false).await.unwrap(), 1);
        assert_eq!(repo.lookup("ping").unwrap().content, "Pong!");
        assert_eq!(repo.lookup("pong").unwrap().content, "Pong!");
        assert!(repo.lookup("png").is_none());

        let similar = repo.find_similar("png", 1);
        assert_eq!(similar.len(), 1);
        assert_eq!(similar[0].word, "pong");
        assert_eq!(similar[0].name, "ping");
        assert_eq!(similar[0].distance, 1);
        assert!(repo.loaded_at().is_some());
    }

    #[tokio::test]
    async fn test_reload_is_idempotent() {
        let (_tmp, repo) = setup_repo(&[
            ("a.toml", PING),
            ("b.toml", "[embed]\nkeywords = [\"embeds\"]\nhoisted = true\ncontent = \"E\""),
        ]);
        repo.reload(false).await.unwrap();
        let first = repo.snapshot();
        let outcome = repo.reload(false).await.unwrap();
        let second = repo.snapshot();

        assert_eq!(outcome.previous_size, 2);
        assert_eq!(outcome.new_size, 2);
        assert!(!outcome.remote);
        let a: Vec<&Tag> = first.iter().collect();
        let b: Vec<&Tag> = second.iter().collect();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_failed_reload_preserves_state() {
        let (tmp, repo) = setup_repo(&[("tags.toml", PING)]);
        repo.load(false).await.unwrap();
        let before = repo.lookup("pong");
        let loaded_at = repo.loaded_at();

        std::fs::write(tmp.path().join("tags/tags.toml"), "[ping]\ncontent = \"\"\"unterminated").unwrap();
        let err = repo.reload(false).await.unwrap_err();
        assert!(err.to_string().contains("tags.toml"), "error: {:#}", err);

        assert_eq!(repo.lookup("pong"), before);
        assert_eq!(repo.len(), 1);
        assert_eq!(repo.loaded_at(), loaded_at);
    }

    #[tokio::test]
    async fn test_missing_directory_fails_without_mutation() {
        let (tmp, repo) = setup_repo(&[("tags.toml", PING)]);
        repo.load(false).await.unwrap();
        std::fs::remove_dir_all(tmp.path().join("tags")).unwrap();
        assert!(repo.reload(false).await.is_err());
        assert!(repo.get("PING").is_some());
    }

    #[tokio::test]
    async fn test_snapshot_survives_reload() {
        let source = ScriptedSource {
            label: "scripted",
            files: Mutex::new(vec![SourceFile::new("a.toml", PING)]),
        };
        let repo = TagRepository::new(Config::minimal());
        repo.load_from(&source).await.unwrap();
        let old = repo.snapshot();

        *source.files.lock().unwrap() = vec![SourceFile::new(
            "a.toml",
            "[other]\nkeywords = [\"x\"]\ncontent = \"y\"",
        )];
        let outcome = repo.reload_from(&source).await.unwrap();

        assert_eq!(outcome.previous_size, 1);
        assert!(old.get("ping").is_some());
        assert!(repo.get("ping").is_none());
        assert!(repo.get("other").is_some());
    }

    #[tokio::test]
    async fn test_reload_origin_ignores_label() {
        let source = ScriptedSource {
            label: "remote",
            files: Mutex::new(vec![SourceFile::new("a.toml", PING)]),
        };
        let repo = TagRepository::new(Config::minimal());
        let outcome = repo.reload_from(&source).await.unwrap();
        assert!(!outcome.remote);
        assert_eq!(outcome.new_size, 1);
    }

    #[tokio::test]
    async fn test_lookup_normalization() {
        let repo = TagRepository::with_tags(
            Config::minimal(),
            doctags_core::parse::parse_corpus("[my-tag]\nkeywords = [\"mine\"]\ncontent = \"M\"")
                .unwrap(),
        );
        assert_eq!(repo.lookup("My Tag").unwrap().name, "my-tag");
        assert_eq!(repo.lookup(" my-tag ").unwrap().name, "my-tag");
        assert_eq!(repo.lookup("MINE").unwrap().name, "my-tag");
        assert_eq!(repo.find_by_keyword("mine").unwrap().name, "my-tag");
        assert!(repo.find_by_keyword("my-tag").is_none());
    }
}
