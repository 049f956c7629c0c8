//! User-facing response text.

use crate::models::ReloadOutcome;
use crate::similarity::SimilarityEntry;

pub const PREFIX_SUCCESS: &str = "✅";
pub const PREFIX_FAIL: &str = "❌";

/// Prefix `content` with a suggestion line mentioning `target`, if any.
///
/// `kind` is capitalized, so `"tag"` renders as `*Tag suggestion for <@1>:*`.
pub fn suggestion_message(kind: &str, content: &str, target: Option<&str>) -> String {
    let mut message = String::new();
    if let Some(target) = target {
        let mut chars = kind.chars();
        let kind = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
            None => String::new(),
        };
        message.push_str(&format!("*{} suggestion for <@{}>:*\n", kind, target));
    }
    message.push_str(content);
    message
}

/// Message for a lookup miss, listing suggestions when there are any.
pub fn not_found_message(query: &str, suggestions: &[SimilarityEntry]) -> String {
    let mut message = format!(
        "{} Could not find a tag with name or alias similar to `{}`.",
        PREFIX_FAIL, query
    );
    if !suggestions.is_empty() {
        let names: Vec<String> = suggestions
            .iter()
            .map(|s| format!("`{}`", s.name))
            .collect();
        message.push_str(&format!("\nDid you mean: {}?", names.join(", ")));
    }
    message
}

fn origin(remote: bool) -> &'static str {
    if remote {
        "(remote)"
    } else {
        "(local)"
    }
}

pub fn reload_success_message(outcome: &ReloadOutcome) -> String {
    format!(
        "{} Tags have fully reloaded {}! Tag cache size has changed from {} to {}.",
        PREFIX_SUCCESS,
        origin(outcome.remote),
        outcome.previous_size,
        outcome.new_size
    )
}

/// Failure message. The cache keeps `kept_size` tags after a failed reload.
pub fn reload_failure_message(remote: bool, kept_size: usize, error: &str) -> String {
    format!(
        "{} Something went wrong while loading tags {}; keeping the previous {} tags.\n`{}`",
        PREFIX_FAIL,
        origin(remote),
        kept_size,
        error
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggestion_with_target() {
        assert_eq!(
            suggestion_message("tag", "Pong!", Some("42")),
            "*Tag suggestion for <@42>:*\nPong!"
        );
        assert_eq!(suggestion_message("tag", "Pong!", None), "Pong!");
    }

    #[test]
    fn test_not_found_lists_suggestions() {
        let suggestions = vec![SimilarityEntry {
            word: "pong".to_string(),
            name: "ping".to_string(),
            distance: 1,
        }];
        let message = not_found_message("png", &suggestions);
        assert!(message.contains("similar to `png`"));
        assert!(message.ends_with("Did you mean: `ping`?"));
        assert!(!not_found_message("png", &[]).contains("Did you mean"));
    }

    #[test]
    fn test_reload_messages() {
        let outcome = ReloadOutcome {
            previous_size: 3,
            new_size: 5,
            remote: true,
        };
        assert_eq!(
            reload_success_message(&outcome),
            "✅ Tags have fully reloaded (remote)! Tag cache size has changed from 3 to 5."
        );
        let failure = reload_failure_message(false, 3, "invalid tag [x]");
        assert!(failure.contains("(local)"));
        assert!(failure.contains("previous 3 tags"));
        assert!(failure.ends_with("`invalid tag [x]`"));
    }
}
