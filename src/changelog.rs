//! Markdown release body rendering.
//!
//! Changes are claimed by the first matching category, categories sharing a
//! title are merged into one section, and each section is sorted before it is
//! rendered.

use tracing::{debug, warn};

use crate::boundary::BoundaryWarning;
use crate::cli::ReleaseOptions;
use crate::config::{CategoryConfig, CommitNoteReplacer, Config, SortBy, SortDirection};
use crate::domain::{Change, ChangeKind};

/// A change claimed by a category, ready to render
struct Entry<'a> {
    category: &'a CategoryConfig,
    occurred_at: i64,
    sort_note: String,
    note: String,
}

struct Section<'a> {
    title: &'a str,
    entries: Vec<Entry<'a>>,
}

fn claims(category: &CategoryConfig, change: &Change) -> bool {
    match &change.kind {
        ChangeKind::PullRequest(pr) => {
            if let Some(skip) = &category.skip_label {
                if pr.has_label(skip) {
                    return false;
                }
            }
            pr.has_any_label(&category.labels)
        }
        ChangeKind::Commit(commit) => category
            .commit_prefixes
            .iter()
            .any(|prefix| commit.message.starts_with(prefix.as_str())),
    }
}

/// Applies the first replacer whose prefix matches the subject.
fn display_message(subject: &str, replacers: &[CommitNoteReplacer]) -> String {
    replacers
        .iter()
        .find_map(|r| {
            subject
                .strip_prefix(r.replace_prefix.as_str())
                .map(|rest| format!("{}{}", r.new_prefix, rest))
        })
        .unwrap_or_else(|| subject.to_string())
}

/// Returns `(sort_note, note)` for a change.
fn notes(
    change: &Change,
    replacers: &[CommitNoteReplacer],
    repo_base_url: &str,
) -> (String, String) {
    match &change.kind {
        ChangeKind::PullRequest(pr) => (
            pr.title.clone(),
            format!(
                "{} ([#{}]({})) @{}",
                pr.title, pr.number, pr.html_url, pr.author_login
            ),
        ),
        ChangeKind::Commit(commit) => {
            let message = display_message(commit.subject(), replacers);
            let note = format!("{} ({}/commit/{})", message, repo_base_url, commit.sha);
            (message, note)
        }
    }
}

fn sort_entries(entries: &mut [Entry<'_>], sort_by: SortBy, direction: SortDirection) {
    // slice::sort_by is stable, ties keep claim order
    match (sort_by, direction) {
        (SortBy::CommitAt, SortDirection::Ascending) => {
            entries.sort_by(|a, b| a.occurred_at.cmp(&b.occurred_at))
        }
        (SortBy::CommitAt, SortDirection::Descending) => {
            entries.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at))
        }
        (SortBy::Note, SortDirection::Ascending) => {
            entries.sort_by(|a, b| a.sort_note.cmp(&b.sort_note))
        }
        (SortBy::Note, SortDirection::Descending) => {
            entries.sort_by(|a, b| b.sort_note.cmp(&a.sort_note))
        }
    }
}

/// Groups claimed changes into sections.
///
/// Section order follows the first category, in declared order, that claimed
/// anything under that title.
fn build_sections<'a>(
    options: &ReleaseOptions,
    config: &'a Config,
    changes: &[Change],
) -> Vec<Section<'a>> {
    let repo_base_url = options.repo_base_url();
    let replacers = &config.release.commit_note_replacers;

    let mut claimed: Vec<Vec<Entry<'a>>> = config.categories.iter().map(|_| Vec::new()).collect();
    let mut unclaimed = 0;

    for change in changes {
        let owner = config
            .categories
            .iter()
            .enumerate()
            .find(|(_, category)| claims(category, change));

        match owner {
            Some((index, category)) => {
                let (sort_note, note) = notes(change, replacers, &repo_base_url);
                debug!(sha = change.sha(), category = %category.title, "change claimed");
                if let Some(bucket) = claimed.get_mut(index) {
                    bucket.push(Entry {
                        category,
                        occurred_at: change.occurred_at,
                        sort_note,
                        note,
                    });
                }
            }
            None => {
                debug!(sha = change.sha(), "change not claimed by any category");
                unclaimed += 1;
            }
        }
    }

    if unclaimed > 0 {
        warn!("{}", BoundaryWarning::UnclaimedChanges { count: unclaimed });
    }

    let mut sections: Vec<Section<'a>> = Vec::new();
    for (category, entries) in config.categories.iter().zip(claimed) {
        if entries.is_empty() {
            continue;
        }
        match sections.iter_mut().find(|s| s.title == category.title) {
            Some(section) => section.entries.extend(entries),
            None => sections.push(Section {
                title: &category.title,
                entries,
            }),
        }
    }

    for section in &mut sections {
        sort_entries(
            &mut section.entries,
            config.release.sort_by,
            config.release.sort_direction,
        );
    }

    sections
}

/// Renders the Markdown body of a release.
///
/// Returns `body_when_empty_changes` verbatim when no category claimed
/// anything.
pub fn create_release_body(
    options: &ReleaseOptions,
    config: &Config,
    changes: &[Change],
) -> String {
    let sections = build_sections(options, config, changes);

    if sections.is_empty() {
        return config.release.body_when_empty_changes.clone();
    }

    let mut body = format!("## {}\n", config.release.body_title);
    for section in sections {
        body.push_str(&format!("### {}\n", section.title));
        for entry in section.entries {
            body.push_str(&format!(
                "- {}{}{}\n",
                entry.category.changes_prefix, entry.note, entry.category.changes_postfix
            ));
        }
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Commit, PullRequest};

    fn options() -> ReleaseOptions {
        ReleaseOptions {
            repository: "octo/widgets".to_string(),
            ..ReleaseOptions::default()
        }
    }

    fn category(title: &str, labels: &[&str], prefixes: &[&str]) -> CategoryConfig {
        CategoryConfig {
            labels: labels.iter().map(|l| l.to_string()).collect(),
            commit_prefixes: prefixes.iter().map(|p| p.to_string()).collect(),
            ..CategoryConfig::new(title)
        }
    }

    fn config(categories: Vec<CategoryConfig>) -> Config {
        Config {
            categories,
            ..Config::default()
        }
    }

    fn pr(number: u64, title: &str, labels: &[&str], at: i64) -> Change {
        Change::pull_request(
            PullRequest {
                number,
                title: title.to_string(),
                html_url: format!("https://github.com/octo/widgets/pull/{}", number),
                author_login: "octocat".to_string(),
                labels: labels.iter().map(|l| l.to_string()).collect(),
                merge_commit_sha: format!("m{}", number),
                commits: vec![],
            },
            at,
        )
    }

    fn commit(sha: &str, message: &str, at: i64) -> Change {
        Change::commit(Commit::new(sha, message, at))
    }

    #[test]
    fn test_grouped_rendering_merges_same_titles() {
        let config = config(vec![
            category("Feature", &["feature"], &[]),
            category("Feature", &["f"], &[]),
            category("Bug Fix", &["bug"], &["bug"]),
        ]);
        let changes = vec![
            pr(1, "Add search", &["feature"], 30),
            pr(2, "Add filters", &["f"], 20),
            commit("abc123", "bug: x", 10),
        ];

        let body = create_release_body(&options(), &config, &changes);
        assert_eq!(
            body,
            "## What's Changed\n\
             ### Feature\n\
             - Add search ([#1](https://github.com/octo/widgets/pull/1)) @octocat\n\
             - Add filters ([#2](https://github.com/octo/widgets/pull/2)) @octocat\n\
             ### Bug Fix\n\
             - bug: x (https://github.com/octo/widgets/commit/abc123)\n"
        );
        assert_eq!(body.matches("### Feature").count(), 1);
    }

    #[test]
    fn test_skip_label_excludes_pull_request() {
        let mut features = category("Features", &["feature"], &[]);
        features.skip_label = Some("skip-changelog".to_string());
        let mut misc = category("Misc", &["skip-changelog", "feature"], &[]);
        misc.skip_label = Some("skip-changelog".to_string());
        let config = config(vec![features, misc]);

        let changes = vec![
            pr(1, "Hidden", &["feature", "skip-changelog"], 2),
            pr(2, "Shown", &["feature"], 1),
        ];

        let body = create_release_body(&options(), &config, &changes);
        assert!(!body.contains("Hidden"));
        assert!(body.contains("Shown"));
    }

    #[test]
    fn test_skip_label_falls_through_to_next_category() {
        let mut features = category("Features", &["feature"], &[]);
        features.skip_label = Some("internal".to_string());
        let config = config(vec![features, category("Internal", &["internal"], &[])]);

        let changes = vec![pr(1, "Refactor", &["feature", "internal"], 1)];
        let body = create_release_body(&options(), &config, &changes);
        assert!(body.contains("### Internal\n- Refactor"));
        assert!(!body.contains("### Features"));
    }

    #[test]
    fn test_first_claiming_category_wins() {
        let config = config(vec![
            category("Breaking", &["breaking"], &[]),
            category("Features", &["feature"], &[]),
        ]);
        let changes = vec![pr(1, "Rewrite", &["feature", "breaking"], 1)];

        let body = create_release_body(&options(), &config, &changes);
        assert!(body.contains("### Breaking\n- Rewrite"));
        assert!(!body.contains("### Features"));
    }

    #[test]
    fn test_empty_body_when_nothing_claimed() {
        let mut config = config(vec![category("Features", &["feature"], &["feat"])]);
        config.release.body_when_empty_changes = "Nothing to see".to_string();

        let changes = vec![commit("a", "docs: readme", 1), pr(1, "Chore", &["chore"], 2)];
        assert_eq!(create_release_body(&options(), &config, &changes), "Nothing to see");
        assert_eq!(create_release_body(&options(), &config, &[]), "Nothing to see");
    }

    #[test]
    fn test_section_order_follows_first_claiming_category() {
        let config = config(vec![
            category("Features", &["feature"], &[]),
            category("Fixes", &["bug"], &[]),
            category("Features", &["f"], &[]),
        ]);
        let changes = vec![pr(1, "Fix", &["bug"], 2), pr(2, "Small", &["f"], 1)];

        let body = create_release_body(&options(), &config, &changes);
        let fixes = body.find("### Fixes").unwrap();
        let features = body.find("### Features").unwrap();
        assert!(fixes < features);
    }

    #[test]
    fn test_sort_by_commit_at() {
        let mut config = config(vec![category("Features", &[], &["feat"])]);
        let changes = vec![
            commit("b", "feat: b", 2),
            commit("c", "feat: c", 3),
            commit("a", "feat: a", 1),
        ];

        let body = create_release_body(&options(), &config, &changes);
        let order: Vec<usize> = ["feat: c", "feat: b", "feat: a"]
            .iter()
            .map(|n| body.find(n).unwrap())
            .collect();
        assert!(order.windows(2).all(|w| w[0] < w[1]));

        config.release.sort_direction = SortDirection::Ascending;
        let body = create_release_body(&options(), &config, &changes);
        assert!(body.find("feat: a").unwrap() < body.find("feat: c").unwrap());
    }

    #[test]
    fn test_sort_by_note_is_ordinal_and_stable() {
        let mut config = config(vec![category("Features", &["feature"], &[])]);
        config.release.sort_by = SortBy::Note;
        config.release.sort_direction = SortDirection::Ascending;

        let changes = vec![
            pr(1, "beta", &["feature"], 1),
            pr(2, "Zulu", &["feature"], 2),
            pr(3, "alpha", &["feature"], 3),
            pr(4, "beta", &["feature"], 4),
        ];

        let body = create_release_body(&options(), &config, &changes);
        let lines: Vec<&str> = body.lines().skip(2).collect();
        assert!(lines[0].starts_with("- Zulu"));
        assert!(lines[1].starts_with("- alpha"));
        assert!(lines[2].contains("[#1]"));
        assert!(lines[3].contains("[#4]"));
    }

    #[test]
    fn test_commit_note_replacer_is_display_only() {
        let mut config = config(vec![category("Features", &[], &["feat: "])]);
        config.release.commit_note_replacers = vec![
            CommitNoteReplacer {
                replace_prefix: "feat: ".to_string(),
                new_prefix: "".to_string(),
            },
            CommitNoteReplacer {
                replace_prefix: "feat".to_string(),
                new_prefix: "never".to_string(),
            },
        ];

        let changes = vec![commit("f00d", "feat: dark mode\n\nbody text", 1)];
        let body = create_release_body(&options(), &config, &changes);
        assert_eq!(
            body,
            "## What's Changed\n\
             ### Features\n\
             - dark mode (https://github.com/octo/widgets/commit/f00d)\n"
        );
    }

    #[test]
    fn test_changes_prefix_and_postfix() {
        let mut features = category("Features", &["feature"], &[]);
        features.changes_prefix = "**".to_string();
        features.changes_postfix = "**".to_string();
        let config = config(vec![features]);

        let body = create_release_body(&options(), &config, &[pr(5, "Bold", &["feature"], 1)]);
        assert!(body.contains(
            "- **Bold ([#5](https://github.com/octo/widgets/pull/5)) @octocat**\n"
        ));
    }

    #[test]
    fn test_empty_title_keeps_its_heading() {
        let config = config(vec![
            category("Features", &["feature"], &[]),
            category("", &["misc"], &[]),
        ]);
        let changes = vec![pr(7, "Quiet", &["misc"], 1), pr(8, "Loud", &["feature"], 2)];

        let body = create_release_body(&options(), &config, &changes);
        assert_eq!(
            body,
            "## What's Changed\n\
             ### Features\n\
             - Loud ([#8](https://github.com/octo/widgets/pull/8)) @octocat\n\
             ### \n\
             - Quiet ([#7](https://github.com/octo/widgets/pull/7)) @octocat\n"
        );
    }
}
