use std::collections::HashSet;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::{Commit, PullRequest};
use crate::error::{ReleaseError, Result};
use crate::github::{HostingClient, NewRelease, PublishedRelease};

const PER_PAGE: usize = 100;
const MAX_PAGES: usize = 10;

#[derive(Debug, Deserialize)]
struct ReleaseDto {
    tag_name: String,
}

#[derive(Debug, Deserialize)]
struct UserDto {
    login: String,
}

#[derive(Debug, Deserialize)]
struct LabelDto {
    name: String,
}

#[derive(Debug, Deserialize)]
struct PullRequestDto {
    number: u64,
    title: String,
    html_url: String,
    user: Option<UserDto>,
    #[serde(default)]
    labels: Vec<LabelDto>,
    merge_commit_sha: Option<String>,
    merged_at: Option<String>,
}

impl PullRequestDto {
    /// `None` for pull requests closed without merging
    fn into_merged(self) -> Option<PullRequest> {
        self.merged_at.as_ref()?;
        let merge_commit_sha = self.merge_commit_sha?;

        Some(PullRequest {
            number: self.number,
            title: self.title,
            html_url: self.html_url,
            author_login: self.user.map(|u| u.login).unwrap_or_default(),
            labels: self.labels.into_iter().map(|l| l.name).collect(),
            merge_commit_sha,
            commits: Vec::new(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct CommitDetailDto {
    message: String,
}

#[derive(Debug, Deserialize)]
struct PullRequestCommitDto {
    sha: String,
    commit: CommitDetailDto,
}

#[derive(Debug, Serialize)]
struct CreateReleaseDto<'a> {
    tag_name: &'a str,
    target_commitish: &'a str,
    name: &'a str,
    body: &'a str,
    draft: bool,
    prerelease: bool,
}

#[derive(Debug, Deserialize)]
struct PublishedReleaseDto {
    id: u64,
    html_url: String,
}

/// GitHub REST API client scoped to one repository
pub struct GitHubClient {
    http: Client,
    api_url: String,
    repository: String,
    token: String,
}

impl GitHubClient {
    /// # Arguments
    /// * `api_url` - API root, e.g. `https://api.github.com`
    /// * `repository` - `owner/name`
    /// * `token` - token sent as a bearer credential, skipped when empty
    pub fn new(
        api_url: impl Into<String>,
        repository: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("git-release/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(GitHubClient {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            repository: repository.into(),
            token: token.into(),
        })
    }

    fn repo_url(&self, path: &str) -> String {
        format!("{}/repos/{}{}", self.api_url, self.repository, path)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");
        if self.token.is_empty() {
            builder
        } else {
            builder.bearer_auth(&self.token)
        }
    }

    fn get(&self, path: &str) -> Result<Response> {
        let url = self.repo_url(path);
        debug!(url = %url, "GET");
        Ok(self.authorize(self.http.get(&url)).send()?)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = check_status(self.get(path)?)?;
        Ok(response.json()?)
    }
}

fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    let body = response.text().unwrap_or_default();
    Err(ReleaseError::api(format!(
        "HTTP {} from {}: {}",
        status.as_u16(),
        url,
        body
    )))
}

impl HostingClient for GitHubClient {
    fn latest_release_tag(&self) -> Result<Option<String>> {
        let response = self.get("/releases/latest")?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let release: ReleaseDto = check_status(response)?.json()?;
        Ok(Some(release.tag_name))
    }

    fn merged_pull_requests(
        &self,
        base_branch: &str,
        merge_shas: &HashSet<String>,
    ) -> Result<Vec<PullRequest>> {
        let mut found = Vec::new();

        for page in 1..=MAX_PAGES {
            let batch: Vec<PullRequestDto> = self.get_json(&format!(
                "/pulls?state=closed&base={}&sort=updated&direction=desc&per_page={}&page={}",
                base_branch, PER_PAGE, page
            ))?;
            let batch_len = batch.len();

            found.extend(
                batch
                    .into_iter()
                    .filter_map(PullRequestDto::into_merged)
                    .filter(|pr| merge_shas.contains(&pr.merge_commit_sha)),
            );

            if batch_len < PER_PAGE || found.len() >= merge_shas.len() {
                break;
            }
        }

        info!(count = found.len(), base = base_branch, "matched merged pull requests");
        Ok(found)
    }

    fn pull_request_commits(&self, number: u64) -> Result<Vec<Commit>> {
        let mut commits = Vec::new();

        for page in 1..=MAX_PAGES {
            let batch: Vec<PullRequestCommitDto> = self.get_json(&format!(
                "/pulls/{}/commits?per_page={}&page={}",
                number, PER_PAGE, page
            ))?;
            let batch_len = batch.len();

            commits.extend(
                batch
                    .into_iter()
                    .map(|c| Commit::new(c.sha, c.commit.message, 0)),
            );

            if batch_len < PER_PAGE {
                break;
            }
        }

        Ok(commits)
    }

    fn create_release(&self, release: &NewRelease) -> Result<PublishedRelease> {
        let payload = CreateReleaseDto {
            tag_name: &release.tag_name,
            target_commitish: &release.target_commitish,
            name: &release.name,
            body: &release.body,
            draft: release.draft,
            prerelease: release.prerelease,
        };

        let url = self.repo_url("/releases");
        debug!(url = %url, tag = %release.tag_name, "POST");
        let response = self
            .authorize(self.http.post(&url))
            .json(&payload)
            .send()?;
        let published: PublishedReleaseDto = check_status(response)?.json()?;

        info!(tag = %release.tag_name, url = %published.html_url, "published release");
        Ok(PublishedRelease {
            id: published.id,
            html_url: published.html_url,
        })
    }
}
