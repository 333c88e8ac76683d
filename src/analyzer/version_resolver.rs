use tracing::{debug, info};

use crate::cli::ReleaseOptions;
use crate::config::{BumpConfig, Config};
use crate::domain::{Change, ChangeKind, Release};
use crate::error::{ReleaseError, Result};
use crate::version::{Version, VersionBump};

/// Strips the configured tag decoration and cleans what is left into a version.
///
/// `tag_prefix` is removed only when the tag starts with it, and `tag_postfix`
/// only when the remainder ends with it.
pub fn clean_tag_name(config: &Config, tag_name: &str) -> Result<String> {
    let release = &config.release;
    let stripped = tag_name
        .strip_prefix(release.tag_prefix.as_str())
        .unwrap_or(tag_name);
    let stripped = stripped
        .strip_suffix(release.tag_postfix.as_str())
        .unwrap_or(stripped);

    Version::clean(stripped)
        .map(|v| v.to_string())
        .ok_or_else(|| ReleaseError::UnresolvableTag(tag_name.to_string()))
}

/// Version of the latest release, or the configured initial version verbatim.
pub fn calculate_current_version(config: &Config, release: Option<&Release>) -> Result<String> {
    match release {
        Some(release) => clean_tag_name(config, &release.tag_name),
        None => Ok(config.release.initial_version.clone()),
    }
}

/// Infers a bump level from changes in their given order.
///
/// The first major signal ends the scan. Once minor is selected a later patch
/// signal cannot lower it. Returns `None` when no rule matched any change.
pub fn infer_bump(rules: &BumpConfig, changes: &[Change]) -> Option<VersionBump> {
    let mut candidate: Option<VersionBump> = None;

    for change in changes {
        match &change.kind {
            ChangeKind::PullRequest(pr) => {
                for label in &pr.labels {
                    if rules.major.matches_label(label) {
                        candidate = Some(VersionBump::Major);
                        break;
                    } else if rules.minor.matches_label(label) {
                        candidate = Some(VersionBump::Minor);
                    } else if candidate != Some(VersionBump::Minor)
                        && rules.patch.matches_label(label)
                    {
                        candidate = Some(VersionBump::Patch);
                    }
                }
            }
            ChangeKind::Commit(commit) => {
                if rules.major.matches_message(&commit.message) {
                    candidate = Some(VersionBump::Major);
                } else if rules.minor.matches_message(&commit.message) {
                    candidate = Some(VersionBump::Minor);
                } else if candidate != Some(VersionBump::Minor)
                    && rules.patch.matches_message(&commit.message)
                {
                    candidate = Some(VersionBump::Patch);
                }
            }
        }

        debug!(sha = change.sha(), candidate = ?candidate, "bump scan");

        if candidate == Some(VersionBump::Major) {
            break;
        }
    }

    candidate
}

/// Computes the bare version string of the next release.
///
/// The very first release uses the current (initial) version unchanged.
/// Otherwise the inferred bump, or `config.bump.default` when nothing matched,
/// is applied; `options.bump` replaces either one when set.
pub fn calculate_next_version(
    options: &ReleaseOptions,
    config: &Config,
    release: Option<&Release>,
    changes: &[Change],
) -> Result<String> {
    let current = calculate_current_version(config, release)?;

    if release.is_none() {
        info!(version = %current, "first release, using initial version");
        return Ok(current);
    }

    let inferred = infer_bump(&config.bump, changes).unwrap_or(config.bump.default);
    let bump = options.bump.unwrap_or(inferred);
    let next = Version::parse(&current)?.bump(bump)?;

    info!(current = %current, next = %next, bump = %bump, "resolved next version");
    Ok(next.to_string())
}
