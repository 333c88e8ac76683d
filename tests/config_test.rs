// tests/config_test.rs
use std::env;
use std::fs;
use std::io::Write;

use git_release::config::{load_config, Config, SortBy};
use git_release::version::VersionBump;
use git_release::ReleaseError;
use serial_test::serial;
use tempfile::{NamedTempFile, TempDir};

/// Runs `f` with the working directory set to `dir`, restoring it afterwards.
fn in_dir<T>(dir: &TempDir, f: impl FnOnce() -> T) -> T {
    let previous = env::current_dir().unwrap();
    env::set_current_dir(dir.path()).unwrap();
    let result = f();
    env::set_current_dir(previous).unwrap();
    result
}

#[test]
fn test_load_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();
    let yaml = r#"
release:
  tag-prefix: ""
  initial-version: "0.1.0"
branch:
  base-branch: develop
bump:
  default: minor
files:
  - file-path: Cargo.toml
    line: 3
"#;
    temp_file.write_all(yaml.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let config = load_config(Some(temp_file.path().to_str().unwrap())).unwrap();
    assert_eq!(config.release.tag_prefix, "");
    assert_eq!(config.release.initial_version, "0.1.0");
    assert_eq!(config.branch.base_branch, "develop");
    assert_eq!(config.bump.default, VersionBump::Minor);
    assert_eq!(config.files.len(), 1);
    // Untouched sections keep their defaults
    assert_eq!(config.categories, Config::default().categories);
    assert_eq!(config.release.sort_by, SortBy::CommitAt);
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.yml");

    let result = load_config(Some(missing.to_str().unwrap()));
    assert!(matches!(result, Err(ReleaseError::Io(_))));
}

#[test]
fn test_invalid_yaml_is_a_config_error() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"release: [unterminated").unwrap();
    temp_file.flush().unwrap();

    let result = load_config(Some(temp_file.path().to_str().unwrap()));
    assert!(matches!(result, Err(ReleaseError::Config(_))));
}

#[test]
#[serial]
fn test_github_directory_config_is_preferred() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join(".github")).unwrap();
    fs::write(
        dir.path().join(".github/git-release.yml"),
        "release:\n  body-title: From .github\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("git-release.yml"),
        "release:\n  body-title: From root\n",
    )
    .unwrap();

    let config = in_dir(&dir, || load_config(None)).unwrap();
    assert_eq!(config.release.body_title, "From .github");
}

#[test]
#[serial]
fn test_root_config_is_used_without_github_directory() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("git-release.yml"),
        "release:\n  body-title: From root\n",
    )
    .unwrap();

    let config = in_dir(&dir, || load_config(None)).unwrap();
    assert_eq!(config.release.body_title, "From root");
}
