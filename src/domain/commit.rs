/// A single commit from the base branch history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub sha: String,
    pub message: String,
    /// Committer time in seconds since the Unix epoch
    pub occurred_at: i64,
}

impl Commit {
    pub fn new(sha: impl Into<String>, message: impl Into<String>, occurred_at: i64) -> Self {
        Commit {
            sha: sha.into(),
            message: message.into(),
            occurred_at,
        }
    }

    /// First line of the message
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }
}

/// A merged pull request and the commits it brought into the base branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub html_url: String,
    pub author_login: String,
    pub labels: Vec<String>,
    pub merge_commit_sha: String,
    pub commits: Vec<Commit>,
}

impl PullRequest {
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// Returns true if any label on the pull request appears in `labels`
    pub fn has_any_label(&self, labels: &[String]) -> bool {
        self.labels.iter().any(|l| labels.contains(l))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_is_first_line() {
        let commit = Commit::new("abc", "fix: crash\n\nLonger body text", 1);
        assert_eq!(commit.subject(), "fix: crash");
    }

    #[test]
    fn test_subject_of_empty_message() {
        let commit = Commit::new("abc", "", 1);
        assert_eq!(commit.subject(), "");
    }

    #[test]
    fn test_label_matching() {
        let pr = PullRequest {
            number: 7,
            title: "Add search".to_string(),
            html_url: "https://github.com/o/r/pull/7".to_string(),
            author_login: "octocat".to_string(),
            labels: vec!["feature".to_string(), "ui".to_string()],
            merge_commit_sha: "m7".to_string(),
            commits: vec![],
        };

        assert!(pr.has_label("ui"));
        assert!(!pr.has_label("bug"));
        assert!(pr.has_any_label(&["bug".to_string(), "feature".to_string()]));
        assert!(!pr.has_any_label(&[]));
    }
}
