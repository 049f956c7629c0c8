//! `doctags validate` and `doctags test`.
//!
//! Validation always reads the local tag directory, independent of any
//! running server, so it can gate CI before a merge.

use anyhow::{Context, Result};
use crossterm::style::Stylize;
use doctags_core::parse::{parse_single_tag, parse_sources};
use doctags_core::validate::{
    render_warnings, validate, LinkPass, LinkProgress, NoLinkProgress, ValidationReport,
};
use doctags_core::SourceFile;
use std::path::Path;
use tracing::info;

use crate::config::Config;
use crate::link_check::HttpLinkChecker;
use crate::progress::ProgressMode;
use crate::sources::{LocalTagSource, TagSource};

/// Name given to submitted tag text appended to the corpus.
const SUBMISSION: &str = "submission";

/// Load the local corpus, append `extra` tag text if given, and validate it.
pub async fn validate_corpus(
    config: &Config,
    extra: Option<&str>,
    check_links: bool,
    progress: &dyn LinkProgress,
) -> Result<ValidationReport> {
    let mut files = LocalTagSource::new(config)?.fetch().await?;
    if let Some(extra) = extra {
        files.push(SourceFile::new(SUBMISSION, extra));
    }
    let tags = parse_sources(&files)?;
    info!(files = files.len(), tags = tags.len(), check_links, "validating tags");

    let report = if check_links {
        let checker = HttpLinkChecker::new(&config.validation)?;
        validate(
            &tags,
            Some(LinkPass {
                checker: &checker,
                progress,
            }),
        )
        .await
    } else {
        validate(&tags, None).await
    };

    Ok(report)
}

/// CLI entry point. Returns the process exit code: 0 when valid, 1 otherwise.
pub async fn run_validate(
    config: &Config,
    check_links: bool,
    extra: Option<&Path>,
    progress: ProgressMode,
) -> Result<i32> {
    let extra_text = match extra {
        Some(path) => Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read extra tag file: {}", path.display()))?,
        ),
        None => None,
    };

    let reporter = progress.reporter();
    let report = validate_corpus(config, extra_text.as_deref(), check_links, reporter.as_ref()).await?;
    Ok(print_report(&report))
}

fn print_warnings(report: &ValidationReport) {
    if report.warnings.is_empty() {
        return;
    }
    eprintln!("\n\nTag validation warnings:");
    for line in render_warnings(&report.warnings) {
        eprintln!("{}", line.yellow());
    }
}

fn print_report(report: &ValidationReport) -> i32 {
    if !report.is_ok() {
        eprintln!();
        eprintln!("{}", report.errors.join("\n\n").red());
        print_warnings(report);
        eprintln!("{}", "\n\nTag validation failed\n".red());
        return 1;
    }

    print_warnings(report);
    println!(
        "{}",
        format!(
            "\n\nTag validation passed with {} warnings 🎉\n",
            report.warnings.len()
        )
        .green()
    );
    0
}

/// Preview verdict for a submitted tag.
pub fn verdict(report: &ValidationReport) -> String {
    if !report.is_ok() {
        "invalid".to_string()
    } else if !report.warnings.is_empty() {
        format!("valid ({} warnings)", report.warnings.len())
    } else {
        "valid".to_string()
    }
}

/// `doctags test <file>`: parse one candidate tag, validate it together with
/// the local corpus and print a preview. Returns the process exit code.
pub async fn run_test(config: &Config, path: &Path) -> Result<i32> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read tag file: {}", path.display()))?;

    let tag = match parse_single_tag(&text) {
        Ok(tag) => tag,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(1);
        }
    };

    let existing = LocalTagSource::new(config)?.fetch().await?;
    let replaces = parse_sources(&existing)?.get(&tag.name).is_some();

    let report = validate_corpus(config, Some(&text), false, &NoLinkProgress).await?;

    println!("--- Content ---");
    println!("{}", tag.content);
    println!();
    println!("--- Tag ---");
    println!("name:       `{}`", tag.name);
    let keywords: Vec<String> = tag.keywords.iter().map(|k| format!("`{}`", k)).collect();
    println!("keywords:   {}", keywords.join(", "));
    println!("validation: {}", verdict(&report));
    if replaces {
        println!("note:       replaces the existing [{}] tag", tag.name);
    }

    Ok(print_report(&report))
}
