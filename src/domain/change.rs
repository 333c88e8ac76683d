use super::commit::{Commit, PullRequest};

/// What a [`Change`] stands for in the history
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeKind {
    Commit(Commit),
    PullRequest(PullRequest),
}

/// A changelog-eligible unit of history: a standalone commit or a merged pull request.
///
/// A pull request change takes its `occurred_at` from its merge commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub occurred_at: i64,
    pub kind: ChangeKind,
}

impl Change {
    pub fn commit(commit: Commit) -> Self {
        Change {
            occurred_at: commit.occurred_at,
            kind: ChangeKind::Commit(commit),
        }
    }

    pub fn pull_request(pull_request: PullRequest, occurred_at: i64) -> Self {
        Change {
            occurred_at,
            kind: ChangeKind::PullRequest(pull_request),
        }
    }

    /// Sha of the commit this change collapses to in the base branch
    pub fn sha(&self) -> &str {
        match &self.kind {
            ChangeKind::Commit(commit) => &commit.sha,
            ChangeKind::PullRequest(pr) => &pr.merge_commit_sha,
        }
    }
}
