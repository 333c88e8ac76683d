use std::path::PathBuf;

use crate::version::VersionBump;

/// Runtime options for one release run.
///
/// Mirrors the CLI Args but in a format suitable for orchestration logic,
/// so the workflow can be driven programmatically without clap.
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseOptions {
    /// Repository in `owner/name` form
    pub repository: String,

    pub github_token: String,

    /// Author of the version bump commit
    pub commit_user: String,
    pub commit_email: String,

    /// Path to custom config file
    pub config_path: Option<String>,

    /// Bump level that overrides the one inferred from changes
    pub bump: Option<VersionBump>,

    /// Preview mode - compute everything, write and publish nothing
    pub dry_run: bool,

    pub pre_release: bool,
    pub draft: bool,

    /// Root that tracked file paths are relative to
    pub workdir: PathBuf,

    pub api_url: String,
    pub server_url: String,
    pub remote: String,
}

impl Default for ReleaseOptions {
    fn default() -> Self {
        ReleaseOptions {
            repository: String::new(),
            github_token: String::new(),
            commit_user: "github-actions[bot]".to_string(),
            commit_email: "41898282+github-actions[bot]@users.noreply.github.com".to_string(),
            config_path: None,
            bump: None,
            dry_run: false,
            pre_release: false,
            draft: false,
            workdir: PathBuf::from("."),
            api_url: "https://api.github.com".to_string(),
            server_url: "https://github.com".to_string(),
            remote: "origin".to_string(),
        }
    }
}

impl ReleaseOptions {
    /// Web URL of the repository, used for commit links in the changelog
    pub fn repo_base_url(&self) -> String {
        format!(
            "{}/{}",
            self.server_url.trim_end_matches('/'),
            self.repository
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_base_url() {
        let options = ReleaseOptions {
            repository: "octo/widgets".to_string(),
            server_url: "https://git.example.com/".to_string(),
            ..ReleaseOptions::default()
        };
        assert_eq!(options.repo_base_url(), "https://git.example.com/octo/widgets");
    }

    #[test]
    fn test_defaults() {
        let options = ReleaseOptions::default();
        assert_eq!(options.bump, None);
        assert!(!options.dry_run);
        assert_eq!(options.remote, "origin");
        assert_eq!(options.workdir, PathBuf::from("."));
    }
}
