//! Source-hosting abstraction layer
//!
//! Pull request metadata and release publication come from the hosting
//! service, not from git. [HostingClient] is the seam:
//!
//! - [client::GitHubClient]: GitHub REST API over blocking `reqwest`
//! - [mock::MockHostingClient]: An in-memory implementation for testing

pub mod client;
pub mod mock;

pub use client::GitHubClient;
pub use mock::MockHostingClient;

use std::collections::HashSet;

use crate::domain::{Commit, PullRequest};
use crate::error::Result;

/// Release to publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRelease {
    pub tag_name: String,
    /// Branch or sha the tag is created from
    pub target_commitish: String,
    pub name: String,
    pub body: String,
    pub draft: bool,
    pub prerelease: bool,
}

/// Release as returned by the hosting service after publication
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedRelease {
    pub id: u64,
    pub html_url: String,
}

pub trait HostingClient {
    /// Tag name of the latest published release, `None` before the first one
    fn latest_release_tag(&self) -> Result<Option<String>>;

    /// Merged pull requests into `base_branch` whose merge commit is in `merge_shas`.
    ///
    /// The returned pull requests have an empty `commits` list, see
    /// [HostingClient::pull_request_commits].
    fn merged_pull_requests(
        &self,
        base_branch: &str,
        merge_shas: &HashSet<String>,
    ) -> Result<Vec<PullRequest>>;

    /// Commits of a pull request, oldest first
    fn pull_request_commits(&self, number: u64) -> Result<Vec<Commit>>;

    fn create_release(&self, release: &NewRelease) -> Result<PublishedRelease>;
}
