//! Main release workflow orchestration logic
//!
//! Wires the release engine to the git and hosting collaborators. The CLI in
//! `main.rs` only parses arguments and renders the [WorkflowResult].

use std::collections::{HashMap, HashSet};

use tracing::{info, warn};

use crate::analyzer::{calculate_current_version, calculate_next_version};
use crate::boundary::BoundaryWarning;
use crate::changelog::create_release_body;
use crate::cli::ReleaseOptions;
use crate::collector::{calculate_changes, pair_with_pull_requests};
use crate::config::Config;
use crate::domain::{Change, Commit, Release};
use crate::error::{ReleaseError, Result};
use crate::git::Repository;
use crate::github::{HostingClient, NewRelease};
use crate::patcher::{replace_versions, PatchReport};

/// Result of a release workflow run
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowResult {
    /// Version of the latest release, or the initial version
    pub current_version: String,
    pub next_version: String,
    pub tag_name: String,
    pub release_name: String,
    pub body: String,
    pub changes: usize,
    pub patch: PatchReport,
    /// Sha of the version bump commit, when one was pushed
    pub bump_commit: Option<String>,
    /// URL of the published release; `None` in dry-run mode
    pub release_url: Option<String>,
    pub warnings: Vec<BoundaryWarning>,
}

/// Resolves the latest published release to its tag and commit.
pub fn find_latest_release<R: Repository, H: HostingClient>(
    repo: &R,
    client: &H,
) -> Result<Option<Release>> {
    let Some(tag_name) = client.latest_release_tag()? else {
        return Ok(None);
    };

    let commit_sha = repo.find_tag_oid(&tag_name)?.ok_or_else(|| {
        ReleaseError::tag(format!(
            "Latest release tag '{}' is not present in the local repository",
            tag_name
        ))
    })?;

    Ok(Some(Release::new(tag_name, commit_sha)))
}

/// Lists changes on the base branch since `release`.
pub fn collect_changes<R: Repository, H: HostingClient>(
    repo: &R,
    client: &H,
    base_branch: &str,
    release: Option<&Release>,
) -> Result<Vec<Change>> {
    let commits = repo.commits_since(base_branch, release.map(|r| r.commit_sha.as_str()))?;
    let merge_shas: HashSet<String> = commits.iter().map(|c| c.sha.clone()).collect();
    let times: HashMap<String, i64> = commits
        .iter()
        .map(|c| (c.sha.clone(), c.occurred_at))
        .collect();

    let mut pull_requests = if merge_shas.is_empty() {
        Vec::new()
    } else {
        client.merged_pull_requests(base_branch, &merge_shas)?
    };

    for pr in &mut pull_requests {
        pr.commits = client
            .pull_request_commits(pr.number)?
            .into_iter()
            .map(|c| {
                let occurred_at = times.get(&c.sha).copied().unwrap_or(c.occurred_at);
                Commit { occurred_at, ..c }
            })
            .collect();
    }

    info!(
        commits = commits.len(),
        pull_requests = pull_requests.len(),
        "collected history"
    );
    calculate_changes(pair_with_pull_requests(commits, pull_requests))
}

/// Main release workflow
///
/// 1. Find the latest release and the history since it
/// 2. Fold history into changes and resolve the next version
/// 3. Render the release body
/// 4. Patch tracked files; commit and push them when anything changed
/// 5. Publish the release
///
/// With `options.dry_run` steps 4 and 5 only report what they would do.
pub fn run_release_workflow<R: Repository, H: HostingClient>(
    options: &ReleaseOptions,
    config: &Config,
    repo: &R,
    client: &H,
) -> Result<WorkflowResult> {
    let mut warnings = Vec::new();
    let base_branch = config.branch.base_branch.as_str();

    let head = repo.branch_head_sha(base_branch)?;
    info!(branch = base_branch, head = %head, "releasing from branch head");

    let release = find_latest_release(repo, client)?;
    let changes = collect_changes(repo, client, base_branch, release.as_ref())?;

    match &release {
        None => warnings.push(BoundaryWarning::FirstRelease {
            initial_version: config.release.initial_version.clone(),
        }),
        Some(release) if changes.is_empty() => {
            warnings.push(BoundaryWarning::NoChangesSinceRelease {
                tag: release.tag_name.clone(),
            })
        }
        Some(_) => {}
    }
    for warning in &warnings {
        warn!("{}", warning);
    }

    let current_version = calculate_current_version(config, release.as_ref())?;
    let next_version = calculate_next_version(options, config, release.as_ref(), &changes)?;
    let tag_name = config.release.tag_name(&next_version);
    let release_name = config.release.release_title(&next_version);
    let body = create_release_body(options, config, &changes);

    let patch = replace_versions(options, config, &next_version)?;

    let mut bump_commit = None;
    if patch.changed {
        let paths: Vec<_> = patch
            .written
            .iter()
            .map(|path| options.workdir.join(path))
            .collect();
        let message = format!(
            "{}{}",
            config.branch.bump_version_commit_prefix, next_version
        );
        let sha = repo.commit_files(&paths, &message, &options.commit_user, &options.commit_email)?;
        let token = Some(options.github_token.as_str()).filter(|t| !t.is_empty());
        repo.push_branch(&options.remote, base_branch, token)?;
        bump_commit = Some(sha);
    }

    let release_url = if options.dry_run {
        info!(tag = %tag_name, "dry run, release not published");
        None
    } else {
        let target_commitish = bump_commit
            .clone()
            .unwrap_or_else(|| base_branch.to_string());
        let published = client.create_release(&NewRelease {
            tag_name: tag_name.clone(),
            target_commitish,
            name: release_name.clone(),
            body: body.clone(),
            draft: options.draft,
            prerelease: options.pre_release,
        })?;
        Some(published.html_url)
    };

    Ok(WorkflowResult {
        current_version,
        next_version,
        tag_name,
        release_name,
        body,
        changes: changes.len(),
        patch,
        bump_commit,
        release_url,
        warnings,
    })
}
