use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn doctags_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("doctags");
    path
}

const CORPUS: &str = r#"
[ping]
keywords = ["pong"]
content = """
Pong!
"""

[embed]
keywords = ["embeds", "rich-embed"]
hoisted = true
content = """
Build rich messages with an [EmbedBuilder](https://example.invalid/embed).
"""
"#;

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let tags_dir = root.join("tags");
    fs::create_dir_all(&tags_dir).unwrap();
    fs::write(tags_dir.join("tags.toml"), CORPUS).unwrap();

    let config_content = format!(
        r#"[tags]
dir = "{}/tags"
include_globs = ["*.toml"]

[similarity]
limit = 3

[server]
bind = "127.0.0.1:7401"

[logging]
filter = "error"
"#,
        root.display()
    );

    let config_path = config_dir.join("doctags.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_doctags(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = doctags_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|e| panic!("Failed to run doctags binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

#[test]
fn test_validate_passes() {
    let (_tmp, config) = setup_test_env();
    let (stdout, stderr, success) = run_doctags(&config, &["validate"]);
    assert!(success, "validate failed: {}", stderr);
    assert!(stdout.contains("Tag validation passed with 0 warnings"));
}

#[test]
fn test_validate_reports_conflicts() {
    let (tmp, config) = setup_test_env();
    fs::write(
        tmp.path().join("tags/broken.toml"),
        r#"
[Pong-Again]
keywords = ["pong", "two words"]
content = "  "
"#,
    )
    .unwrap();

    let (_stdout, stderr, success) = run_doctags(&config, &["validate"]);
    assert!(!success);
    assert!(stderr.contains("Tag names and keywords have to be unique"));
    assert!(stderr.contains("1. [Pong-Again] <> [ping]: conflicts: pong"));
    assert!(stderr.contains("Tag body cannot be empty"));
    assert!(stderr.contains("Tag name has to be lowercase"));
    assert!(stderr.contains("tag: Pong-Again: two words"));
    assert!(stderr.contains("Tag validation failed"));
}

#[test]
fn test_validate_hoisted_ceiling() {
    let (tmp, config) = setup_test_env();
    // embed is already hoisted; 25 more exceed the ceiling.
    let mut extra = String::new();
    for i in 0..25 {
        extra.push_str(&format!(
            "[hoisted-{i}]\nkeywords = [\"hk-{i}\"]\nhoisted = true\ncontent = \"H{i}\"\n\n"
        ));
    }
    fs::write(tmp.path().join("tags/hoisted.toml"), extra).unwrap();

    let (_stdout, stderr, success) = run_doctags(&config, &["validate"]);
    assert!(!success);
    assert!(stderr.contains("Amount of hoisted tags exceeds 25 (is 26)"));
}

#[test]
fn test_validate_extra_file() {
    let (tmp, config) = setup_test_env();
    let extra = tmp.path().join("new.toml");
    fs::write(&extra, "[pingu]\nkeywords = [\"pong\"]\ncontent = \"Noot\"").unwrap();

    let (_stdout, stderr, success) =
        run_doctags(&config, &["validate", "--extra", extra.to_str().unwrap()]);
    assert!(!success);
    assert!(stderr.contains("[ping] <> [pingu]"));
}

#[test]
fn test_validate_parse_error() {
    let (tmp, config) = setup_test_env();
    fs::write(tmp.path().join("tags/bad.toml"), "[oops]\nkeyword = [\"x\"]\ncontent = \"y\"").unwrap();

    let (_stdout, stderr, success) = run_doctags(&config, &["validate"]);
    assert!(!success);
    assert!(stderr.contains("oops"), "stderr: {}", stderr);
}

#[test]
fn test_show_by_name_and_keyword() {
    let (_tmp, config) = setup_test_env();

    let (stdout, _stderr, success) = run_doctags(&config, &["show", "ping"]);
    assert!(success);
    assert!(stdout.contains("Pong!"));

    let (stdout, _stderr, success) = run_doctags(&config, &["show", "PONG", "--target", "42"]);
    assert!(success);
    assert!(stdout.contains("*Tag suggestion for <@42>:*"));
    assert!(stdout.contains("Pong!"));

    let (stdout, _stderr, success) = run_doctags(&config, &["show", "rich embed"]);
    assert!(success);
    assert!(stdout.contains("EmbedBuilder"));
}

#[test]
fn test_show_miss_suggests() {
    let (_tmp, config) = setup_test_env();
    let (_stdout, stderr, success) = run_doctags(&config, &["show", "png"]);
    assert!(!success);
    assert!(stderr.contains("Could not find a tag with name or alias similar to `png`"));
    assert!(stderr.contains("Did you mean: `ping`"));
}

#[test]
fn test_similar() {
    let (_tmp, config) = setup_test_env();
    let (stdout, stderr, success) = run_doctags(&config, &["similar", "png", "--limit", "1"]);
    assert!(success, "similar failed: {}", stderr);
    assert!(stdout.contains("1. ping (via `pong`, distance 1)"));
    assert!(!stdout.contains("2."));
}

#[test]
fn test_list_and_autocomplete() {
    let (_tmp, config) = setup_test_env();

    let (stdout, _stderr, success) = run_doctags(&config, &["list"]);
    assert!(success);
    assert!(stdout.contains("embed 📌"));
    assert!(!stdout.contains("ping"));

    let (stdout, _stderr, success) = run_doctags(&config, &["list", "--all"]);
    assert!(success);
    assert!(stdout.contains("ping"));
    assert!(stdout.contains("2 total tag(s)."));

    let (stdout, _stderr, success) = run_doctags(&config, &["autocomplete", "pong"]);
    assert!(success);
    assert!(stdout.contains("✅ ping\tping"));
}

#[test]
fn test_reload_reports_sizes() {
    let (_tmp, config) = setup_test_env();
    let (stdout, stderr, success) = run_doctags(&config, &["reload"]);
    assert!(success, "reload failed: {}", stderr);
    assert!(stdout.contains("Tags have fully reloaded (local)! Tag cache size has changed from 2 to 2."));
}

#[test]
fn test_corpus_joins_tag_files() {
    let (tmp, config) = setup_test_env();
    fs::write(
        tmp.path().join("tags/zz.toml"),
        "[zed]\nkeywords = [\"last\"]\ncontent = \"Z\"",
    )
    .unwrap();

    let (stdout, stderr, success) = run_doctags(&config, &["corpus"]);
    assert!(success, "corpus failed: {}", stderr);
    assert!(stdout.starts_with(CORPUS));
    assert!(stdout.contains(&format!("{}\n\n[zed]", CORPUS)));
}

#[test]
fn test_tag_preview() {
    let (tmp, config) = setup_test_env();
    let file = tmp.path().join("candidate.toml");
    fs::write(&file, "[threads]\nkeywords = [\"thread\"]\ncontent = \"Use threads.\"").unwrap();

    let (stdout, stderr, success) = run_doctags(&config, &["test", file.to_str().unwrap()]);
    assert!(success, "test failed: {}", stderr);
    assert!(stdout.contains("Use threads."));
    assert!(stdout.contains("name:       `threads`"));
    assert!(stdout.contains("validation: valid"));
}

#[test]
fn test_tag_preview_rejects_multiple_tables() {
    let (tmp, config) = setup_test_env();
    let file = tmp.path().join("candidate.toml");
    fs::write(
        &file,
        "[a]\nkeywords = [\"x\"]\ncontent = \"A\"\n\n[b]\nkeywords = [\"y\"]\ncontent = \"B\"",
    )
    .unwrap();

    let (_stdout, stderr, success) = run_doctags(&config, &["test", file.to_str().unwrap()]);
    assert!(!success);
    assert!(stderr.contains("Error:"));
}

#[test]
fn test_missing_tag_directory_fails() {
    let (tmp, config) = setup_test_env();
    fs::remove_dir_all(tmp.path().join("tags")).unwrap();

    let (_stdout, stderr, success) = run_doctags(&config, &["show", "ping"]);
    assert!(!success);
    assert!(stderr.contains("Tag directory does not exist"));
}
