//! Git operations abstraction layer
//!
//! This module provides a trait-based abstraction over the Git operations a
//! release needs, with a real implementation and a mock for testing.
//!
//! - [repository::Git2Repository]: A real implementation using the `git2` crate
//! - [mock::MockRepository]: An in-memory implementation for testing
//!
//! Most code should depend on the [Repository] trait rather than concrete
//! implementations.

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use std::path::PathBuf;

use crate::domain::Commit;
use crate::error::Result;

/// Common git operation trait for abstraction
///
/// All methods return [crate::error::Result<T>]. Implementations map
/// underlying errors (like `git2::Error`) to the matching
/// [crate::error::ReleaseError] variants.
pub trait Repository {
    /// Sha of the commit at the tip of `branch_name`
    fn branch_head_sha(&self, branch_name: &str) -> Result<String>;

    /// Commits reachable from `branch_name` but not from `since_sha`.
    ///
    /// Returned newest first in topological order, so the commits brought in by
    /// a merge follow the merge commit itself. With `since_sha == None` the
    /// whole history of the branch is returned.
    fn commits_since(&self, branch_name: &str, since_sha: Option<&str>) -> Result<Vec<Commit>>;

    /// Find a tag by name and get the sha of the commit it points to
    ///
    /// Handles both lightweight and annotated tags. Returns `Ok(None)` if the
    /// tag doesn't exist.
    fn find_tag_oid(&self, tag_name: &str) -> Result<Option<String>>;

    /// Stages `paths` and commits them on top of HEAD, returning the new sha
    fn commit_files(
        &self,
        paths: &[PathBuf],
        message: &str,
        user: &str,
        email: &str,
    ) -> Result<String>;

    /// Pushes the local `branch_name` to the same branch on `remote`
    ///
    /// `token` is used for HTTPS authentication when present.
    fn push_branch(&self, remote: &str, branch_name: &str, token: Option<&str>) -> Result<()>;
}
