//! Link-check progress reporting.
//!
//! Reports each probe during `doctags validate --links` so users can follow a
//! slow, sequential pass. Progress is emitted on **stderr** so stdout remains
//! parseable for scripts.

use crossterm::style::Stylize;
use doctags_core::validate::{LinkOutcome, LinkProgress, NoLinkProgress};
use std::io::Write;

/// Human-friendly progress: a pending line per link, rewritten in place with
/// the result.
pub struct StderrProgress;

impl LinkProgress for StderrProgress {
    fn checking(&self, _tag: &str, url: &str) {
        let mut err = std::io::stderr().lock();
        let _ = write!(err, "\n[ ] Testing link: {}", url);
        let _ = err.flush();
    }

    fn finished(&self, _tag: &str, url: &str, outcome: &LinkOutcome) {
        let label = outcome.status_label();
        let line = match outcome {
            LinkOutcome::Ok(_) => format!("[{}] {} ({})", "✔".green(), url, label.as_str().green()),
            LinkOutcome::Warning(_) => format!("[{}] {} ({})", "✔".yellow(), url, label.as_str().yellow()),
            LinkOutcome::Broken(_) => format!("[{}] {} ({})", "✖".red(), url, label.as_str().red()),
        };
        let mut err = std::io::stderr().lock();
        let _ = write!(err, "\r\x1b[K{}", line);
        let _ = err.flush();
    }
}

/// Machine-readable progress: one JSON object per probed link on stderr.
pub struct JsonProgress;

impl LinkProgress for JsonProgress {
    fn checking(&self, _tag: &str, _url: &str) {}

    fn finished(&self, tag: &str, url: &str, outcome: &LinkOutcome) {
        let result = match outcome {
            LinkOutcome::Ok(_) => "ok",
            LinkOutcome::Warning(_) => "warning",
            LinkOutcome::Broken(_) => "broken",
        };
        let obj = serde_json::json!({
            "event": "link",
            "tag": tag,
            "url": url,
            "result": result,
            "status": outcome.status_label(),
        });
        if let Ok(line) = serde_json::to_string(&obj) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
        }
    }
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    /// Parse the `--progress` flag value; `auto` defers to [`default_for_tty`](Self::default_for_tty).
    pub fn parse(value: &str) -> anyhow::Result<Self> {
        match value {
            "auto" => Ok(Self::default_for_tty()),
            "off" => Ok(ProgressMode::Off),
            "human" => Ok(ProgressMode::Human),
            "json" => Ok(ProgressMode::Json),
            other => anyhow::bail!(
                "Unknown progress mode: '{}'. Use auto, off, human, or json.",
                other
            ),
        }
    }

    pub fn reporter(&self) -> Box<dyn LinkProgress> {
        match self {
            ProgressMode::Off => Box::new(NoLinkProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_modes() {
        assert_eq!(ProgressMode::parse("off").unwrap(), ProgressMode::Off);
        assert_eq!(ProgressMode::parse("human").unwrap(), ProgressMode::Human);
        assert_eq!(ProgressMode::parse("json").unwrap(), ProgressMode::Json);
        assert!(ProgressMode::parse("loud").is_err());
    }
}
