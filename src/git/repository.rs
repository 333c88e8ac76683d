use std::path::{Path, PathBuf};

use git2::{Cred, Oid, PushOptions, RemoteCallbacks, Repository as Git2Repo, Signature, Sort};
use tracing::{debug, info};

use crate::domain::Commit;
use crate::error::{ReleaseError, Result};
use crate::git::Repository;

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }

    fn branch_oid(&self, branch_name: &str) -> Result<Oid> {
        if let Ok(branch) = self.repo.find_branch(branch_name, git2::BranchType::Local) {
            if let Some(oid) = branch.get().target() {
                return Ok(oid);
            }
        }

        // CI checkouts often only carry the remote-tracking branch
        let object = self
            .repo
            .revparse_single(&format!("origin/{}", branch_name))
            .map_err(|e| {
                ReleaseError::config(format!("Cannot find branch '{}': {}", branch_name, e))
            })?;
        Ok(object.id())
    }

    /// Path of `path` relative to the work tree, as the index expects it
    fn index_path(&self, path: &Path) -> Result<PathBuf> {
        let workdir = self
            .repo
            .workdir()
            .ok_or_else(|| ReleaseError::config("Repository has no work tree"))?
            .canonicalize()?;
        let absolute = path.canonicalize()?;

        absolute
            .strip_prefix(&workdir)
            .map(Path::to_path_buf)
            .map_err(|_| {
                ReleaseError::config(format!(
                    "'{}' is outside the repository work tree",
                    path.display()
                ))
            })
    }
}

impl Repository for Git2Repository {
    fn branch_head_sha(&self, branch_name: &str) -> Result<String> {
        Ok(self.branch_oid(branch_name)?.to_string())
    }

    fn commits_since(&self, branch_name: &str, since_sha: Option<&str>) -> Result<Vec<Commit>> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        revwalk.push(self.branch_oid(branch_name)?)?;

        if let Some(sha) = since_sha {
            revwalk.hide(Oid::from_str(sha)?)?;
        }

        let mut commits = Vec::new();
        for oid_result in revwalk {
            let oid = oid_result?;
            let commit = self.repo.find_commit(oid)?;

            commits.push(Commit {
                sha: oid.to_string(),
                message: commit.message().unwrap_or("").to_string(),
                occurred_at: commit.time().seconds(),
            });
        }

        debug!(branch = branch_name, count = commits.len(), "listed commits");
        Ok(commits)
    }

    fn find_tag_oid(&self, tag_name: &str) -> Result<Option<String>> {
        let reference_name = format!("refs/tags/{}", tag_name);

        match self.repo.find_reference(&reference_name) {
            Ok(reference) => {
                let commit = reference
                    .peel_to_commit()
                    .map_err(|e| ReleaseError::tag(format!("Cannot peel tag: {}", e)))?;

                Ok(Some(commit.id().to_string()))
            }
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(ReleaseError::tag(format!(
                "Cannot find tag '{}': {}",
                tag_name, e
            ))),
        }
    }

    fn commit_files(
        &self,
        paths: &[PathBuf],
        message: &str,
        user: &str,
        email: &str,
    ) -> Result<String> {
        let mut index = self.repo.index()?;
        for path in paths {
            index.add_path(&self.index_path(path)?)?;
        }
        index.write()?;

        let tree_oid = index.write_tree()?;
        let tree = self.repo.find_tree(tree_oid)?;
        let parent = self.repo.head()?.peel_to_commit()?;
        let signature = Signature::now(user, email)?;

        let oid = self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &[&parent],
        )?;

        info!(sha = %oid, files = paths.len(), "created version bump commit");
        Ok(oid.to_string())
    }

    fn push_branch(&self, remote: &str, branch_name: &str, token: Option<&str>) -> Result<()> {
        let mut remote = self
            .repo
            .find_remote(remote)
            .map_err(|e| ReleaseError::remote(format!("Cannot find remote: {}", e)))?;

        let mut callbacks = RemoteCallbacks::new();
        callbacks.credentials(move |_url, username, allowed| {
            if let Some(token) = token.filter(|t| !t.is_empty()) {
                if allowed.contains(git2::CredentialType::USER_PASS_PLAINTEXT) {
                    return Cred::userpass_plaintext("x-access-token", token);
                }
            }
            Cred::ssh_key_from_agent(username.unwrap_or("git"))
        });
        callbacks.push_update_reference(|refname, status| match status {
            Some(message) => Err(git2::Error::from_str(&format!(
                "{} rejected: {}",
                refname, message
            ))),
            None => Ok(()),
        });

        let mut push_options = PushOptions::new();
        push_options.remote_callbacks(callbacks);

        let refspec = format!("refs/heads/{0}:refs/heads/{0}", branch_name);
        remote
            .push(&[refspec.as_str()], Some(&mut push_options))
            .map_err(|e| ReleaseError::remote(format!("Push failed: {}", e)))?;

        info!(branch = branch_name, "pushed branch");
        Ok(())
    }
}
