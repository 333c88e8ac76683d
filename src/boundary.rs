use std::fmt;

/// Non-fatal conditions met while computing a release.
/// These are reported to the user but never stop the run.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// No release has been published yet
    FirstRelease { initial_version: String },
    /// Nothing was merged since the latest release
    NoChangesSinceRelease { tag: String },
    /// Changes that no category claimed and that are left out of the body
    UnclaimedChanges { count: usize },
    /// A tracked file already holds an equal or newer version
    VersionNotBumped {
        path: String,
        line: usize,
        current: String,
        target: String,
    },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::FirstRelease { initial_version } => {
                write!(
                    f,
                    "No previous release found, using initial version {}",
                    initial_version
                )
            }
            BoundaryWarning::NoChangesSinceRelease { tag } => {
                write!(f, "No new changes since release '{}'", tag)
            }
            BoundaryWarning::UnclaimedChanges { count } => {
                let noun = if *count == 1 { "change" } else { "changes" };
                write!(
                    f,
                    "{} {} matched no category and will not appear in the release notes",
                    count, noun
                )
            }
            BoundaryWarning::VersionNotBumped {
                path,
                line,
                current,
                target,
            } => {
                write!(
                    f,
                    "{}:{} already at {} (target {}), left unchanged",
                    path, line, current, target
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_release_display() {
        let warning = BoundaryWarning::FirstRelease {
            initial_version: "1.0.0".to_string(),
        };
        assert_eq!(
            warning.to_string(),
            "No previous release found, using initial version 1.0.0"
        );
    }

    #[test]
    fn test_unclaimed_changes_pluralization() {
        assert!(BoundaryWarning::UnclaimedChanges { count: 1 }
            .to_string()
            .starts_with("1 change matched"));
        assert!(BoundaryWarning::UnclaimedChanges { count: 3 }
            .to_string()
            .starts_with("3 changes matched"));
    }

    #[test]
    fn test_version_not_bumped_display() {
        let warning = BoundaryWarning::VersionNotBumped {
            path: "Cargo.toml".to_string(),
            line: 3,
            current: "2.0.0".to_string(),
            target: "1.9.0".to_string(),
        };
        assert_eq!(
            warning.to_string(),
            "Cargo.toml:3 already at 2.0.0 (target 1.9.0), left unchanged"
        );
    }
}
