use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::domain::Commit;
use crate::error::{ReleaseError, Result};
use crate::git::Repository;

/// A commit recorded by [`MockRepository::commit_files`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCommit {
    pub paths: Vec<PathBuf>,
    pub message: String,
    pub user: String,
    pub email: String,
}

/// Mock repository for testing without actual git operations
///
/// History is a single branch held newest first.
pub struct MockRepository {
    commits: Vec<Commit>,
    tags: HashMap<String, String>,
    branch: String,
    recorded_commits: RefCell<Vec<RecordedCommit>>,
    pushes: RefCell<Vec<(String, String)>>,
}

impl MockRepository {
    /// Create a new empty mock repository on branch `main`
    pub fn new() -> Self {
        MockRepository {
            commits: Vec::new(),
            tags: HashMap::new(),
            branch: "main".to_string(),
            recorded_commits: RefCell::new(Vec::new()),
            pushes: RefCell::new(Vec::new()),
        }
    }

    /// Rename the single branch the mock serves
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    /// Add a commit on top of the history
    pub fn add_commit(&mut self, commit: Commit) {
        self.commits.insert(0, commit);
    }

    /// Add a tag pointing to a commit sha
    pub fn add_tag(&mut self, name: impl Into<String>, sha: impl Into<String>) {
        self.tags.insert(name.into(), sha.into());
    }

    pub fn recorded_commits(&self) -> Vec<RecordedCommit> {
        self.recorded_commits.borrow().clone()
    }

    /// `(remote, branch)` pairs pushed so far
    pub fn pushes(&self) -> Vec<(String, String)> {
        self.pushes.borrow().clone()
    }

    fn check_branch(&self, branch_name: &str) -> Result<()> {
        if branch_name == self.branch {
            Ok(())
        } else {
            Err(ReleaseError::config(format!(
                "Cannot find branch '{}'",
                branch_name
            )))
        }
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MockRepository {
    fn branch_head_sha(&self, branch_name: &str) -> Result<String> {
        self.check_branch(branch_name)?;
        self.commits
            .first()
            .map(|c| c.sha.clone())
            .ok_or_else(|| ReleaseError::config(format!("Branch '{}' has no commits", branch_name)))
    }

    fn commits_since(&self, branch_name: &str, since_sha: Option<&str>) -> Result<Vec<Commit>> {
        self.check_branch(branch_name)?;
        Ok(self
            .commits
            .iter()
            .take_while(|c| Some(c.sha.as_str()) != since_sha)
            .cloned()
            .collect())
    }

    fn find_tag_oid(&self, tag_name: &str) -> Result<Option<String>> {
        Ok(self.tags.get(tag_name).cloned())
    }

    fn commit_files(
        &self,
        paths: &[PathBuf],
        message: &str,
        user: &str,
        email: &str,
    ) -> Result<String> {
        let mut recorded = self.recorded_commits.borrow_mut();
        recorded.push(RecordedCommit {
            paths: paths.to_vec(),
            message: message.to_string(),
            user: user.to_string(),
            email: email.to_string(),
        });
        Ok(format!("mock-commit-{}", recorded.len()))
    }

    fn push_branch(&self, remote: &str, branch_name: &str, _token: Option<&str>) -> Result<()> {
        self.check_branch(branch_name)?;
        self.pushes
            .borrow_mut()
            .push((remote.to_string(), branch_name.to_string()));
        Ok(())
    }
}
