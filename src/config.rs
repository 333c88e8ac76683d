use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::Result;
use crate::version::VersionBump;

/// Represents the complete configuration for git-release.
///
/// Loaded from YAML. Every field has a default, so an empty document is valid.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub release: ReleaseConfig,

    #[serde(default, deserialize_with = "lenient_or_default")]
    pub branch: BranchConfig,

    #[serde(default = "default_categories", deserialize_with = "lenient_list")]
    pub categories: Vec<CategoryConfig>,

    #[serde(default, deserialize_with = "lenient_or_default")]
    pub bump: BumpConfig,

    #[serde(default, deserialize_with = "lenient_list")]
    pub files: Vec<FileConfig>,
}

/// How changes are ordered inside a changelog section.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    #[default]
    #[serde(rename = "commit_at")]
    CommitAt,
    #[serde(rename = "note")]
    Note,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

/// Rewrites the start of a commit subject when it is shown in the changelog.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct CommitNoteReplacer {
    pub replace_prefix: String,
    #[serde(default)]
    pub new_prefix: String,
}

/// Naming and rendering of the release itself.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ReleaseConfig {
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub title_prefix: String,

    #[serde(default, deserialize_with = "lenient_or_default")]
    pub title_postfix: String,

    #[serde(default = "default_tag_prefix", deserialize_with = "lenient_tag_prefix")]
    pub tag_prefix: String,

    #[serde(default, deserialize_with = "lenient_or_default")]
    pub tag_postfix: String,

    #[serde(default = "default_body_title", deserialize_with = "lenient_body_title")]
    pub body_title: String,

    #[serde(
        default = "default_body_when_empty_changes",
        deserialize_with = "lenient_body_when_empty_changes"
    )]
    pub body_when_empty_changes: String,

    #[serde(default = "default_initial_version", deserialize_with = "lenient_initial_version")]
    pub initial_version: String,

    #[serde(default, deserialize_with = "lenient_or_default")]
    pub sort_by: SortBy,

    #[serde(default, deserialize_with = "lenient_or_default")]
    pub sort_direction: SortDirection,

    #[serde(default, deserialize_with = "lenient_list")]
    pub commit_note_replacers: Vec<CommitNoteReplacer>,
}

fn default_tag_prefix() -> String {
    "v".to_string()
}

fn default_body_title() -> String {
    "What's Changed".to_string()
}

fn default_body_when_empty_changes() -> String {
    "No changes".to_string()
}

fn default_initial_version() -> String {
    "1.0.0".to_string()
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        ReleaseConfig {
            title_prefix: String::new(),
            title_postfix: String::new(),
            tag_prefix: default_tag_prefix(),
            tag_postfix: String::new(),
            body_title: default_body_title(),
            body_when_empty_changes: default_body_when_empty_changes(),
            initial_version: default_initial_version(),
            sort_by: SortBy::default(),
            sort_direction: SortDirection::default(),
            commit_note_replacers: Vec::new(),
        }
    }
}

impl ReleaseConfig {
    /// Tag name for a bare version, e.g. "1.2.3" -> "v1.2.3"
    pub fn tag_name(&self, version: &str) -> String {
        format!("{}{}{}", self.tag_prefix, version, self.tag_postfix)
    }

    /// Release title for a bare version
    pub fn release_title(&self, version: &str) -> String {
        format!("{}{}{}", self.title_prefix, version, self.title_postfix)
    }
}

/// Branch the release is cut from and how the version bump is committed.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct BranchConfig {
    #[serde(default = "default_base_branch", deserialize_with = "lenient_base_branch")]
    pub base_branch: String,

    #[serde(
        default = "default_bump_version_commit_prefix",
        deserialize_with = "lenient_bump_version_commit_prefix"
    )]
    pub bump_version_commit_prefix: String,
}

fn default_base_branch() -> String {
    "main".to_string()
}

fn default_bump_version_commit_prefix() -> String {
    "chore: bump version to ".to_string()
}

impl Default for BranchConfig {
    fn default() -> Self {
        BranchConfig {
            base_branch: default_base_branch(),
            bump_version_commit_prefix: default_bump_version_commit_prefix(),
        }
    }
}

/// One changelog section. Categories are matched in declared order.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct CategoryConfig {
    pub title: String,

    #[serde(default)]
    pub labels: Vec<String>,

    #[serde(default)]
    pub skip_label: Option<String>,

    #[serde(default)]
    pub commit_prefixes: Vec<String>,

    #[serde(default)]
    pub changes_prefix: String,

    #[serde(default)]
    pub changes_postfix: String,
}

impl CategoryConfig {
    pub fn new(title: impl Into<String>) -> Self {
        CategoryConfig {
            title: title.into(),
            labels: Vec::new(),
            skip_label: None,
            commit_prefixes: Vec::new(),
            changes_prefix: String::new(),
            changes_postfix: String::new(),
        }
    }
}

/// Returns the default changelog categories.
fn default_categories() -> Vec<CategoryConfig> {
    vec![
        CategoryConfig {
            labels: vec!["feature".to_string(), "enhancement".to_string()],
            commit_prefixes: vec!["feat".to_string()],
            ..CategoryConfig::new("Features")
        },
        CategoryConfig {
            labels: vec!["bug".to_string(), "fix".to_string()],
            commit_prefixes: vec!["fix".to_string()],
            ..CategoryConfig::new("Bug Fixes")
        },
    ]
}

/// Labels and commit prefixes that select one bump level.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(rename_all = "kebab-case")]
pub struct BumpRule {
    #[serde(default, deserialize_with = "lenient_list")]
    pub labels: Vec<String>,

    #[serde(default, deserialize_with = "lenient_list")]
    pub commit_prefixes: Vec<String>,
}

impl BumpRule {
    pub fn matches_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    pub fn matches_message(&self, message: &str) -> bool {
        self.commit_prefixes
            .iter()
            .any(|prefix| message.starts_with(prefix.as_str()))
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BumpConfig {
    #[serde(default = "default_bump_level", deserialize_with = "lenient_bump_level")]
    pub default: VersionBump,

    #[serde(default = "default_major_rule", deserialize_with = "lenient_major_rule")]
    pub major: BumpRule,

    #[serde(default = "default_minor_rule", deserialize_with = "lenient_minor_rule")]
    pub minor: BumpRule,

    #[serde(default = "default_patch_rule", deserialize_with = "lenient_patch_rule")]
    pub patch: BumpRule,
}

fn default_bump_level() -> VersionBump {
    VersionBump::Patch
}

fn default_major_rule() -> BumpRule {
    BumpRule {
        labels: vec!["major".to_string(), "breaking".to_string()],
        commit_prefixes: Vec::new(),
    }
}

fn default_minor_rule() -> BumpRule {
    BumpRule {
        labels: vec!["feature".to_string(), "enhancement".to_string()],
        commit_prefixes: vec!["feat".to_string()],
    }
}

fn default_patch_rule() -> BumpRule {
    BumpRule {
        labels: vec!["bug".to_string(), "fix".to_string()],
        commit_prefixes: vec!["fix".to_string()],
    }
}

impl Default for BumpConfig {
    fn default() -> Self {
        BumpConfig {
            default: default_bump_level(),
            major: default_major_rule(),
            minor: default_minor_rule(),
            patch: default_patch_rule(),
        }
    }
}

/// Location of a version string inside a tracked file.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct FileConfig {
    pub file_path: String,

    /// 1-based line number
    pub line: usize,

    /// 0-based column where the search for the version starts
    #[serde(default)]
    pub start: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            release: ReleaseConfig::default(),
            branch: BranchConfig::default(),
            categories: default_categories(),
            bump: BumpConfig::default(),
            files: Vec::new(),
        }
    }
}

impl Config {
    /// Parses a YAML document. An empty document yields the defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Config::default());
        }
        Ok(serde_yaml_ng::from_str(yaml)?)
    }
}

/// Converts a YAML value into `T`.
///
/// Numbers and booleans are retried as their text, so `body-title: 5` reads
/// as "5". `None` when the value still does not fit.
fn coerce<T: DeserializeOwned>(value: serde_yaml_ng::Value) -> Option<T> {
    use serde_yaml_ng::Value;

    let text = match &value {
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    };

    match serde_yaml_ng::from_value(value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            let retried = text.and_then(|t| serde_yaml_ng::from_value(Value::String(t)).ok());
            if retried.is_none() {
                debug!(error = %e, "ignoring malformed config value");
            }
            retried
        }
    }
}

/// Deserializes a list, dropping entries that do not fit `T`.
fn lenient_list<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_yaml_ng::Value::deserialize(deserializer)?;
    let values: Vec<serde_yaml_ng::Value> = serde_yaml_ng::from_value(value).unwrap_or_default();
    Ok(values
        .into_iter()
        .filter_map(coerce)
        .collect())
}

/// Deserializes a value, falling back to `fallback()` when it does not fit.
fn lenient_with<'de, D, T>(
    deserializer: D,
    fallback: fn() -> T,
) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_yaml_ng::Value::deserialize(deserializer)?;
    Ok(coerce(value).unwrap_or_else(fallback))
}

fn lenient_or_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    lenient_with(deserializer, T::default)
}

fn lenient_bump_level<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<VersionBump, D::Error> {
    lenient_with(d, default_bump_level)
}

fn lenient_tag_prefix<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    lenient_with(d, default_tag_prefix)
}

fn lenient_body_title<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    lenient_with(d, default_body_title)
}

fn lenient_body_when_empty_changes<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<String, D::Error> {
    lenient_with(d, default_body_when_empty_changes)
}

fn lenient_initial_version<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<String, D::Error> {
    lenient_with(d, default_initial_version)
}

fn lenient_base_branch<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    lenient_with(d, default_base_branch)
}

fn lenient_bump_version_commit_prefix<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<String, D::Error> {
    lenient_with(d, default_bump_version_commit_prefix)
}

fn lenient_major_rule<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<BumpRule, D::Error> {
    lenient_with(d, default_major_rule)
}

fn lenient_minor_rule<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<BumpRule, D::Error> {
    lenient_with(d, default_minor_rule)
}

fn lenient_patch_rule<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<BumpRule, D::Error> {
    lenient_with(d, default_patch_rule)
}

/// Candidate configuration files, in lookup order, when no path is given.
fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = vec![
        PathBuf::from(".github/git-release.yml"),
        PathBuf::from("git-release.yml"),
    ];
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("git-release").join("config.yml"));
    }
    paths
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `.github/git-release.yml` in current directory
/// 3. `git-release.yml` in current directory
/// 4. `git-release/config.yml` in the user config directory
/// 5. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If a file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let path = match config_path {
        Some(path) => Some(PathBuf::from(path)),
        None => default_config_paths().into_iter().find(|p| p.exists()),
    };

    match path {
        Some(path) => load_config_file(&path),
        None => {
            info!("no configuration file found, using defaults");
            Ok(Config::default())
        }
    }
}

fn load_config_file(path: &Path) -> Result<Config> {
    info!(path = %path.display(), "loading configuration");
    let yaml = fs::read_to_string(path)?;
    Config::from_yaml(&yaml)
}
