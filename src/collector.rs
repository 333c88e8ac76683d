//! Folds raw base-branch history into changelog units.
//!
//! A merged pull request shows up in the history as its merge commit, usually
//! followed by the commits it brought in. Those subsumed commits are absorbed
//! into the pull request so every commit is represented exactly once.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::domain::{Change, Commit, PullRequest};
use crate::error::{ReleaseError, Result};

/// Pairs each commit with the pull request merged as that commit, if any.
///
/// Order of `commits` is kept. Pull requests whose merge commit is not in
/// `commits` are ignored.
pub fn pair_with_pull_requests(
    commits: Vec<Commit>,
    pull_requests: Vec<PullRequest>,
) -> Vec<(Commit, Option<PullRequest>)> {
    let mut by_merge_sha: HashMap<String, PullRequest> = pull_requests
        .into_iter()
        .map(|pr| (pr.merge_commit_sha.clone(), pr))
        .collect();

    commits
        .into_iter()
        .map(|commit| {
            let pr = by_merge_sha.remove(&commit.sha);
            (commit, pr)
        })
        .collect()
}

#[derive(Default)]
struct Accumulator {
    absorbed: HashSet<String>,
    standalone: HashSet<String>,
    changes: Vec<Change>,
}

/// Collapses a history into [`Change`]s, one per unit of history.
///
/// `history` must be ordered newest to oldest, and the row of a pull request's
/// merge commit must come before the rows of every commit that pull request
/// contains. A commit listed by a pull request after it was already emitted on
/// its own violates that order and fails with [`ReleaseError::HistoryOrder`].
pub fn calculate_changes(history: Vec<(Commit, Option<PullRequest>)>) -> Result<Vec<Change>> {
    let acc = history
        .into_iter()
        .try_fold(Accumulator::default(), |mut acc, (commit, pr)| {
            match pr {
                Some(pr) => {
                    for absorbed in &pr.commits {
                        if acc.standalone.contains(&absorbed.sha) {
                            return Err(ReleaseError::HistoryOrder {
                                sha: absorbed.sha.clone(),
                            });
                        }
                        acc.absorbed.insert(absorbed.sha.clone());
                    }
                    debug!(
                        number = pr.number,
                        absorbed = pr.commits.len(),
                        "pull request change"
                    );
                    acc.changes.push(Change::pull_request(pr, commit.occurred_at));
                }
                None if acc.absorbed.contains(&commit.sha) => {
                    debug!(sha = %commit.sha, "commit absorbed by pull request");
                }
                None => {
                    acc.standalone.insert(commit.sha.clone());
                    acc.changes.push(Change::commit(commit));
                }
            }
            Ok(acc)
        })?;

    Ok(acc.changes)
}
