use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use crate::domain::{Commit, PullRequest};
use crate::error::Result;
use crate::github::{HostingClient, NewRelease, PublishedRelease};

/// Mock hosting client for testing without network access
#[derive(Default)]
pub struct MockHostingClient {
    latest_tag: Option<String>,
    pull_requests: Vec<PullRequest>,
    pull_request_commits: HashMap<u64, Vec<Commit>>,
    created: RefCell<Vec<NewRelease>>,
}

impl MockHostingClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_latest_release(&mut self, tag_name: impl Into<String>) {
        self.latest_tag = Some(tag_name.into());
    }

    /// Register a merged pull request; its `commits` are served by
    /// [HostingClient::pull_request_commits]
    pub fn add_pull_request(&mut self, mut pull_request: PullRequest) {
        let commits = std::mem::take(&mut pull_request.commits);
        self.pull_request_commits
            .insert(pull_request.number, commits);
        self.pull_requests.push(pull_request);
    }

    pub fn created_releases(&self) -> Vec<NewRelease> {
        self.created.borrow().clone()
    }
}

impl HostingClient for MockHostingClient {
    fn latest_release_tag(&self) -> Result<Option<String>> {
        Ok(self.latest_tag.clone())
    }

    fn merged_pull_requests(
        &self,
        _base_branch: &str,
        merge_shas: &HashSet<String>,
    ) -> Result<Vec<PullRequest>> {
        Ok(self
            .pull_requests
            .iter()
            .filter(|pr| merge_shas.contains(&pr.merge_commit_sha))
            .cloned()
            .collect())
    }

    fn pull_request_commits(&self, number: u64) -> Result<Vec<Commit>> {
        Ok(self
            .pull_request_commits
            .get(&number)
            .cloned()
            .unwrap_or_default())
    }

    fn create_release(&self, release: &NewRelease) -> Result<PublishedRelease> {
        let mut created = self.created.borrow_mut();
        created.push(release.clone());
        Ok(PublishedRelease {
            id: created.len() as u64,
            html_url: format!("https://github.com/mock/releases/tag/{}", release.tag_name),
        })
    }
}
