//! Corpus-wide tag validation.
//!
//! Runs every consistency rule over a [`TagSet`] and groups the violations
//! into one human-readable block per rule. Any block is a hard failure;
//! [`Warning`]s are surfaced but never fail a run.
//!
//! # Rules
//!
//! | Rule | Violation |
//! |------|-----------|
//! | [`ConflictKind::NameInKeywords`] | a tag lists its own name as a keyword |
//! | [`ConflictKind::UniqueKeywords`] | two tags share a keyword, or one lists the other's name |
//! | [`ConflictKind::NonEmptyBody`] | content is empty or whitespace |
//! | [`ConflictKind::NameLowercase`] | name is not lowercase |
//! | [`ConflictKind::NonEmptyKeyword`] | a keyword is empty or whitespace |
//! | [`ConflictKind::NoWhiteSpace`] | a name or keyword contains whitespace |
//! | [`ConflictKind::UnreachableLink`] | a link answered 404 or the request failed |
//! | hoisted ceiling | more than [`AUTOCOMPLETE_MAX_ITEMS`] hoisted tags |
//!
//! Link checks are optional because they hit the network. They run strictly
//! one at a time through a [`LinkChecker`].

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

use crate::links::extract_links;
use crate::models::TagSet;
use crate::AUTOCOMPLETE_MAX_ITEMS;

/// Which rule a [`Conflict`] violates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConflictKind {
    NameInKeywords,
    UniqueKeywords,
    NonEmptyBody,
    NameLowercase,
    NonEmptyKeyword,
    NoWhiteSpace,
    UnreachableLink,
}

impl ConflictKind {
    /// Report order of the grouped error blocks.
    pub const ALL: [ConflictKind; 7] = [
        ConflictKind::NameInKeywords,
        ConflictKind::UniqueKeywords,
        ConflictKind::NonEmptyBody,
        ConflictKind::NameLowercase,
        ConflictKind::NonEmptyKeyword,
        ConflictKind::NoWhiteSpace,
        ConflictKind::UnreachableLink,
    ];

    fn heading(self) -> &'static str {
        match self {
            ConflictKind::NameInKeywords => "Tag name should not be included in keywords",
            ConflictKind::UniqueKeywords => "Tag names and keywords have to be unique",
            ConflictKind::NonEmptyBody => "Tag body cannot be empty",
            ConflictKind::NameLowercase => "Tag name has to be lowercase",
            ConflictKind::NonEmptyKeyword => "Tag keywords cannot be empty",
            ConflictKind::NoWhiteSpace => {
                "Tag names and keywords cannot include whitespace (use - instead)"
            }
            ConflictKind::UnreachableLink => "Links returned a 404 status code or failed",
        }
    }
}

/// A single rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub kind: ConflictKind,
    /// The offending tag.
    pub first: String,
    /// The other tag of a [`ConflictKind::UniqueKeywords`] pair.
    pub second: Option<String>,
    /// Offending keywords, names or links, when the rule names them.
    pub offenders: Vec<String>,
}

impl Conflict {
    fn single(kind: ConflictKind, name: &str) -> Self {
        Self {
            kind,
            first: name.to_string(),
            second: None,
            offenders: Vec::new(),
        }
    }

    fn describe(&self) -> String {
        match self.kind {
            ConflictKind::UniqueKeywords => format!(
                "[{}] <> [{}]: conflicts: {}",
                self.first,
                self.second.as_deref().unwrap_or_default(),
                self.offenders.join(", ")
            ),
            ConflictKind::NoWhiteSpace | ConflictKind::UnreachableLink => {
                format!("tag: {}: {}", self.first, self.offenders.join(", "))
            }
            _ => format!("[{}]", self.first),
        }
    }
}

/// A non-fatal finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub name: String,
    pub description: String,
}

/// Result of a validation run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    /// One block per violated rule; empty on success.
    pub errors: Vec<String>,
    pub warnings: Vec<Warning>,
    pub conflicts: Vec<Conflict>,
    /// Number of hoisted tags seen.
    pub hoisted: usize,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Probes a link and returns the HTTP status code.
///
/// An `Err` means the request itself failed (DNS, TLS, timeout, ...).
#[async_trait]
pub trait LinkChecker: Send + Sync {
    async fn status(&self, url: &str) -> Result<u16>;
}

/// How a probed link is judged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// `200`.
    Ok(u16),
    /// Any status other than 200 or 404.
    Warning(u16),
    /// `404`, or no status at all when the request failed.
    Broken(Option<u16>),
}

impl LinkOutcome {
    pub fn classify(result: &Result<u16>) -> Self {
        match result {
            Ok(200) => LinkOutcome::Ok(200),
            Ok(404) => LinkOutcome::Broken(Some(404)),
            Ok(status) => LinkOutcome::Warning(*status),
            Err(_) => LinkOutcome::Broken(None),
        }
    }

    /// `404` or `request failed`.
    pub fn status_label(&self) -> String {
        match self {
            LinkOutcome::Ok(s) | LinkOutcome::Warning(s) | LinkOutcome::Broken(Some(s)) => {
                s.to_string()
            }
            LinkOutcome::Broken(None) => "request failed".to_string(),
        }
    }
}

/// Observer for the sequential link pass.
pub trait LinkProgress: Send + Sync {
    /// Called before a link is probed.
    fn checking(&self, tag: &str, url: &str);
    /// Called after a link is probed.
    fn finished(&self, tag: &str, url: &str, outcome: &LinkOutcome);
}

/// Discards link progress.
pub struct NoLinkProgress;

impl LinkProgress for NoLinkProgress {
    fn checking(&self, _tag: &str, _url: &str) {}
    fn finished(&self, _tag: &str, _url: &str, _outcome: &LinkOutcome) {}
}

/// Link checking inputs for [`validate`].
pub struct LinkPass<'a> {
    pub checker: &'a dyn LinkChecker,
    pub progress: &'a dyn LinkProgress,
}

/// Run every rule over `tags`, plus the link pass when `links` is given.
pub async fn validate(tags: &TagSet, links: Option<LinkPass<'_>>) -> ValidationReport {
    let mut conflicts = Vec::new();
    let mut warnings = Vec::new();

    if let Some(pass) = links {
        let (link_conflicts, link_warnings) = check_links(tags, pass).await;
        conflicts.extend(link_conflicts);
        warnings.extend(link_warnings);
    }

    conflicts.extend(check_rules(tags));
    let hoisted = tags.hoisted().count();
    let errors = render_errors(&conflicts, hoisted);

    ValidationReport {
        errors,
        warnings,
        conflicts,
        hoisted,
    }
}

/// Per-tag and pairwise rules. Pure and synchronous.
pub fn check_rules(tags: &TagSet) -> Vec<Conflict> {
    let mut conflicts = Vec::new();

    for tag in tags {
        if tag.keywords.iter().any(|k| k.to_lowercase() == tag.name.to_lowercase()) {
            conflicts.push(Conflict::single(ConflictKind::NameInKeywords, &tag.name));
        }

        if tag.name != tag.name.to_lowercase() {
            conflicts.push(Conflict::single(ConflictKind::NameLowercase, &tag.name));
        }

        if tag.keywords.iter().any(|k| k.trim().is_empty()) {
            conflicts.push(Conflict::single(ConflictKind::NonEmptyKeyword, &tag.name));
        }

        if tag.content.trim().is_empty() {
            conflicts.push(Conflict::single(ConflictKind::NonEmptyBody, &tag.name));
        }

        let offenders: Vec<String> = std::iter::once(&tag.name)
            .chain(tag.keywords.iter())
            .filter(|s| s.chars().any(char::is_whitespace))
            .cloned()
            .collect();
        if !offenders.is_empty() {
            conflicts.push(Conflict {
                kind: ConflictKind::NoWhiteSpace,
                first: tag.name.clone(),
                second: None,
                offenders,
            });
        }
    }

    let all: Vec<_> = tags.iter().collect();
    for (i, a) in all.iter().enumerate() {
        for b in &all[i + 1..] {
            let shared = shared_keywords(a, b);
            if !shared.is_empty() {
                conflicts.push(Conflict {
                    kind: ConflictKind::UniqueKeywords,
                    first: a.name.clone(),
                    second: Some(b.name.clone()),
                    offenders: shared,
                });
            }
        }
    }

    conflicts
}

/// Keywords of `a` claimed by `b` (as a keyword or its name), then keywords
/// of `b` equal to `a`'s name. Compared case-insensitively, as lookups are.
fn shared_keywords(a: &crate::Tag, b: &crate::Tag) -> Vec<String> {
    let a_name = a.name.to_lowercase();
    let b_name = b.name.to_lowercase();

    let mut shared: Vec<String> = a
        .keywords
        .iter()
        .filter(|k| b.has_keyword(k) || k.to_lowercase() == b_name)
        .cloned()
        .collect();
    for k in &b.keywords {
        if k.to_lowercase() == a_name && !shared.iter().any(|s| s.to_lowercase() == a_name) {
            shared.push(k.clone());
        }
    }
    shared
}

/// Probe every link of every tag, one request at a time.
pub async fn check_links(tags: &TagSet, pass: LinkPass<'_>) -> (Vec<Conflict>, Vec<Warning>) {
    let mut conflicts = Vec::new();
    let mut warnings = Vec::new();

    for tag in tags {
        let mut broken = Vec::new();
        for url in extract_links(&tag.content) {
            pass.progress.checking(&tag.name, &url);
            let outcome = LinkOutcome::classify(&pass.checker.status(&url).await);
            pass.progress.finished(&tag.name, &url, &outcome);

            match outcome {
                LinkOutcome::Ok(_) => {}
                LinkOutcome::Warning(status) => warnings.push(Warning {
                    name: tag.name.clone(),
                    description: format!("Non-200 status code response on: {} ({})", url, status),
                }),
                LinkOutcome::Broken(_) => {
                    broken.push(format!("{} ({})", url, outcome.status_label()));
                }
            }
        }

        if !broken.is_empty() {
            conflicts.push(Conflict {
                kind: ConflictKind::UnreachableLink,
                first: tag.name.clone(),
                second: None,
                offenders: broken,
            });
        }
    }

    (conflicts, warnings)
}

/// Group conflicts into one numbered block per rule, in report order.
pub fn render_errors(conflicts: &[Conflict], hoisted: usize) -> Vec<String> {
    let mut blocks = Vec::new();

    for kind in ConflictKind::ALL {
        let lines: Vec<String> = conflicts
            .iter()
            .filter(|c| c.kind == kind)
            .enumerate()
            .map(|(i, c)| format!("{}. {}", i + 1, c.describe()))
            .collect();
        if !lines.is_empty() {
            blocks.push(format!(
                "Tag validation error: {}:\n{}",
                kind.heading(),
                lines.join("\n")
            ));
        }
    }

    if hoisted > AUTOCOMPLETE_MAX_ITEMS {
        blocks.push(format!(
            "Amount of hoisted tags exceeds {} (is {})",
            AUTOCOMPLETE_MAX_ITEMS, hoisted
        ));
    }

    blocks
}

/// Render warnings as numbered `name: description` lines.
pub fn render_warnings(warnings: &[Warning]) -> Vec<String> {
    warnings
        .iter()
        .enumerate()
        .map(|(i, w)| format!("{}. {}: {}", i + 1, w.name, w.description))
        .collect()
}
