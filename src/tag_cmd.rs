//! Tag lookup commands: `show`, `similar`, `list`, `autocomplete`, `reload`,
//! `corpus`.
//!
//! Each command loads a fresh [`TagRepository`] and prints to stdout.
//! Lookup misses and failed reloads go to stderr and exit with code 1.

use anyhow::{bail, Result};
use doctags_core::parse::concat_sources;
use doctags_core::render::{
    not_found_message, reload_failure_message, reload_success_message, suggestion_message,
};

use crate::config::Config;
use crate::repository::TagRepository;
use crate::sources::{tag_source, TagSource};

async fn loaded_repo(config: &Config, remote: bool) -> Result<TagRepository> {
    let repo = TagRepository::new(config.clone());
    repo.load(remote).await?;
    Ok(repo)
}

/// `doctags show <query>`
pub async fn run_show(
    config: &Config,
    query: &str,
    target: Option<&str>,
    remote: bool,
) -> Result<i32> {
    let repo = loaded_repo(config, remote).await?;
    match repo.lookup(query) {
        Some(tag) => {
            println!("{}", suggestion_message("tag", &tag.content, target));
            Ok(0)
        }
        None => {
            eprintln!("{}", not_found_message(query.trim(), &repo.suggest(query)));
            Ok(1)
        }
    }
}

/// `doctags similar <query>`
pub async fn run_similar(config: &Config, query: &str, limit: Option<usize>) -> Result<()> {
    let limit = limit.unwrap_or(config.similarity.limit);
    if limit == 0 {
        bail!("--limit must be at least 1");
    }

    let repo = loaded_repo(config, false).await?;
    let entries = repo.find_similar(query, limit);
    if entries.is_empty() {
        println!("No similar tags.");
        return Ok(());
    }

    for (i, e) in entries.iter().enumerate() {
        println!("{}. {} (via `{}`, distance {})", i + 1, e.name, e.word, e.distance);
    }
    Ok(())
}

/// `doctags list`: hoisted tags, or every tag with `--all`.
pub async fn run_list(config: &Config, all: bool) -> Result<()> {
    let repo = loaded_repo(config, false).await?;
    let tags = repo.snapshot();

    let mut count = 0;
    for tag in tags.iter().filter(|t| all || t.hoisted) {
        let marker = if tag.hoisted { " 📌" } else { "" };
        println!("{}{}  [{}]", tag.name, marker, tag.keywords.join(", "));
        count += 1;
    }
    println!(
        "\n{} {} tag(s).",
        count,
        if all { "total" } else { "hoisted" }
    );
    Ok(())
}

/// `doctags autocomplete [query]`: one choice per line, label then value.
pub async fn run_autocomplete(config: &Config, query: &str) -> Result<()> {
    let repo = loaded_repo(config, false).await?;
    for choice in repo.autocomplete(query) {
        println!("{}\t{}", choice.name, choice.value);
    }
    Ok(())
}

/// `doctags reload`: load the local tags, then reload from the selected
/// source and report the size change, as a running bot would.
pub async fn run_reload(config: &Config, remote: bool) -> Result<i32> {
    let repo = loaded_repo(config, false).await?;
    match repo.reload(remote).await {
        Ok(outcome) => {
            println!("{}", reload_success_message(&outcome));
            Ok(0)
        }
        Err(e) => {
            eprintln!(
                "{}",
                reload_failure_message(remote, repo.len(), &format!("{:#}", e))
            );
            Ok(1)
        }
    }
}

/// Every tag file from the selected source, joined by blank lines.
pub async fn corpus_text(config: &Config, remote: bool) -> Result<String> {
    let files = tag_source(config, remote)?.fetch().await?;
    Ok(concat_sources(&files))
}

/// `doctags corpus`: print the combined tag corpus, e.g. to diff the local
/// directory against the remote copy.
pub async fn run_corpus(config: &Config, remote: bool) -> Result<()> {
    println!("{}", corpus_text(config, remote).await?);
    Ok(())
}
