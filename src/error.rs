use thiserror::Error;

/// Unified error type for git-release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Invalid version: '{0}' - expected MAJOR.MINOR.PATCH")]
    InvalidVersion(String),

    #[error("Unresolvable tag: '{0}' cannot be cleaned to a version")]
    UnresolvableTag(String),

    #[error("No version token found on line {line} at or after column {column}")]
    VersionTokenNotFound { line: usize, column: usize },

    #[error("Line {line} does not exist in the file")]
    NoLineMatched { line: usize },

    #[error("Line count changed while patching '{path}': {before} lines before, {after} after")]
    LineCountMismatch {
        path: String,
        before: usize,
        after: usize,
    },

    #[error("Commit {sha} was emitted on its own before the pull request that contains it")]
    HistoryOrder { sha: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Tag error: {0}")]
    Tag(String),

    #[error("Remote operation failed: {0}")]
    Remote(String),

    #[error("Hosting API error: {0}")]
    Api(String),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in git-release
pub type Result<T> = std::result::Result<T, ReleaseError>;

impl ReleaseError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseError::Config(msg.into())
    }

    /// Create a tag error with context
    pub fn tag(msg: impl Into<String>) -> Self {
        ReleaseError::Tag(msg.into())
    }

    /// Create a remote error with context
    pub fn remote(msg: impl Into<String>) -> Self {
        ReleaseError::Remote(msg.into())
    }

    /// Create a hosting API error with context
    pub fn api(msg: impl Into<String>) -> Self {
        ReleaseError::Api(msg.into())
    }
}

impl From<serde_yaml_ng::Error> for ReleaseError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        ReleaseError::Config(err.to_string())
    }
}
