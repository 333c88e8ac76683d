//! In-place version patching of tracked files.
//!
//! A file is split into alternating content and line-break tokens so that one
//! line can be rewritten while every other byte, line endings included, is
//! reproduced unchanged.

use std::fs;
use std::path::PathBuf;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::boundary::BoundaryWarning;
use crate::cli::ReleaseOptions;
use crate::config::Config;
use crate::error::{ReleaseError, Result};
use crate::version::Version;

const VERSION_PATTERN: &str = r"[0-9]+\.[0-9]+\.[0-9]+";

/// One line that differs between the original and the patched file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub path: String,
    /// 1-based line number
    pub line: usize,
    pub before: String,
    pub after: String,
}

/// Outcome of patching every configured file
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PatchReport {
    /// True when at least one file was rewritten on disk
    pub changed: bool,
    pub diffs: Vec<FileDiff>,
    /// Paths written, in configuration order
    pub written: Vec<String>,
}

/// Splits text into `[content, break, content, break, ..]` tokens.
///
/// A break is `\r\n`, `\r` or `\n`, with `\r\n` kept as a single token. A
/// trailing segment without a break is the last content token. Joining the
/// tokens gives back the input exactly.
pub fn split_lines(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut line_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let width = match bytes[i] {
            b'\r' if bytes.get(i + 1) == Some(&b'\n') => 2,
            b'\r' | b'\n' => 1,
            _ => 0,
        };

        if width == 0 {
            i += 1;
            continue;
        }

        tokens.push(&text[line_start..i]);
        tokens.push(&text[i..i + width]);
        i += width;
        line_start = i;
    }

    if line_start < text.len() {
        tokens.push(&text[line_start..]);
    }

    tokens
}

/// Content tokens only, indexed by line number - 1
fn content_lines(text: &str) -> Vec<&str> {
    split_lines(text).into_iter().step_by(2).collect()
}

struct PatchedText {
    text: String,
    found: Version,
    replaced: bool,
}

fn patch_line(text: &str, line: usize, start: usize, new_version: Version) -> Result<PatchedText> {
    let pattern = Regex::new(VERSION_PATTERN)?;
    let mut tokens: Vec<String> = split_lines(text).into_iter().map(String::from).collect();

    let index = (0..tokens.len())
        .step_by(2)
        .find(|index| index / 2 + 1 == line)
        .ok_or(ReleaseError::NoLineMatched { line })?;

    let content = &tokens[index];
    let not_found = || ReleaseError::VersionTokenNotFound {
        line,
        column: start,
    };

    let byte_start = content
        .char_indices()
        .nth(start)
        .map(|(offset, _)| offset)
        .ok_or_else(not_found)?;
    let token = pattern
        .find_at(content, byte_start)
        .ok_or_else(not_found)?;
    let found = Version::parse(token.as_str())?;

    if new_version <= found {
        debug!(line, found = %found, target = %new_version, "version not lower, line kept");
        return Ok(PatchedText {
            text: text.to_string(),
            found,
            replaced: false,
        });
    }

    let patched = format!(
        "{}{}{}",
        &content[..token.start()],
        new_version,
        &content[token.end()..]
    );
    tokens[index] = patched;

    Ok(PatchedText {
        text: tokens.concat(),
        found,
        replaced: true,
    })
}

/// Replaces the first version token at or after char column `start` of `line`.
///
/// The line is left as is when `new_version` is not greater than the version
/// already there, so applying the same version twice is a no-op.
///
/// # Errors
/// * [`ReleaseError::InvalidVersion`] - `new_version` is not `major.minor.patch`
/// * [`ReleaseError::NoLineMatched`] - the text has fewer than `line` lines
/// * [`ReleaseError::VersionTokenNotFound`] - no version on the line after `start`
pub fn replace_version(text: &str, line: usize, start: usize, new_version: &str) -> Result<String> {
    let target = Version::parse(new_version)?;
    Ok(patch_line(text, line, start, target)?.text)
}

/// Lists the lines that differ between two versions of a file.
///
/// Fails with [`ReleaseError::LineCountMismatch`] if the line structure changed.
pub fn diff_lines(path: &str, before: &str, after: &str) -> Result<Vec<FileDiff>> {
    let old_lines = content_lines(before);
    let new_lines = content_lines(after);

    if old_lines.len() != new_lines.len() {
        return Err(ReleaseError::LineCountMismatch {
            path: path.to_string(),
            before: old_lines.len(),
            after: new_lines.len(),
        });
    }

    Ok(old_lines
        .iter()
        .zip(new_lines.iter())
        .enumerate()
        .filter(|(_, (old, new))| old != new)
        .map(|(index, (old, new))| FileDiff {
            path: path.to_string(),
            line: index + 1,
            before: old.to_string(),
            after: new.to_string(),
        })
        .collect())
}

struct PendingFile {
    display: String,
    full_path: PathBuf,
    original: String,
    patched: String,
}

/// Writes `version` into every configured file.
///
/// Every file is patched and checked in memory before anything is written, so
/// a failure leaves all files untouched. Entries that point at the same file
/// are applied one after another. In dry-run mode the diffs are reported and
/// nothing is written.
pub fn replace_versions(
    options: &ReleaseOptions,
    config: &Config,
    version: &str,
) -> Result<PatchReport> {
    let target = Version::parse(version)?;
    let mut pending: Vec<PendingFile> = Vec::new();

    for file in &config.files {
        // Different spellings of one path share a pending entry
        let full_path = options.workdir.join(&file.file_path).canonicalize()?;
        let index = match pending.iter().position(|p| p.full_path == full_path) {
            Some(index) => index,
            None => {
                let original = fs::read_to_string(&full_path)?;
                pending.push(PendingFile {
                    display: file.file_path.clone(),
                    full_path,
                    patched: original.clone(),
                    original,
                });
                pending.len() - 1
            }
        };

        let Some(entry) = pending.get_mut(index) else {
            continue;
        };
        let patched = patch_line(&entry.patched, file.line, file.start, target)?;
        if !patched.replaced {
            warn!(
                "{}",
                BoundaryWarning::VersionNotBumped {
                    path: file.file_path.clone(),
                    line: file.line,
                    current: patched.found.to_string(),
                    target: target.to_string(),
                }
            );
        }
        entry.patched = patched.text;
    }

    let mut report = PatchReport::default();
    for entry in &pending {
        report
            .diffs
            .extend(diff_lines(&entry.display, &entry.original, &entry.patched)?);
    }

    if options.dry_run {
        for diff in &report.diffs {
            info!(
                path = %diff.path,
                line = diff.line,
                before = %diff.before,
                after = %diff.after,
                "dry run, file not written"
            );
        }
        return Ok(report);
    }

    for entry in pending.iter().filter(|e| e.original != e.patched) {
        fs::write(&entry.full_path, &entry.patched)?;
        info!(path = %entry.display, version = %target, "version written");
        report.written.push(entry.display.clone());
    }
    report.changed = !report.written.is_empty();

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_lines_tokens() {
        assert_eq!(split_lines("a\nb"), vec!["a", "\n", "b"]);
        assert_eq!(split_lines("a\r\nb\r\n"), vec!["a", "\r\n", "b", "\r\n"]);
        assert_eq!(split_lines("a\rb"), vec!["a", "\r", "b"]);
        assert_eq!(split_lines("\n\n"), vec!["", "\n", "", "\n"]);
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn test_split_lines_crlf_is_one_break() {
        assert_eq!(split_lines("x\r\n\ry"), vec!["x", "\r\n", "", "\r", "y"]);
        assert_eq!(split_lines("x\n\ry"), vec!["x", "\n", "", "\r", "y"]);
    }

    #[test]
    fn test_split_join_round_trip() {
        for text in [
            "",
            "single",
            "a\nb\r\nc\rd",
            "\r\n\r\r\n\n",
            "trailing\n",
            "mixed\r\n\n\r\nend",
            "ünïcode\r\n1.2.3\rx",
        ] {
            assert_eq!(split_lines(text).concat(), text);
        }
    }

    #[test]
    fn test_replace_version_in_line() {
        let text = "[package]\nname = \"demo\"\nversion = \"1.2.3\"\n";
        let patched = replace_version(text, 3, 0, "1.3.0").unwrap();
        assert_eq!(patched, "[package]\nname = \"demo\"\nversion = \"1.3.0\"\n");
    }

    #[test]
    fn test_replace_version_keeps_line_endings() {
        let text = "a 0.1.0\r\nb 0.1.0\rc 0.1.0\n";
        let patched = replace_version(text, 2, 0, "0.2.0").unwrap();
        assert_eq!(patched, "a 0.1.0\r\nb 0.2.0\rc 0.1.0\n");
    }

    #[test]
    fn test_replace_version_from_column() {
        let text = "deps 1.0.0 self 2.0.0";
        assert_eq!(
            replace_version(text, 1, 10, "2.1.0").unwrap(),
            "deps 1.0.0 self 2.1.0"
        );
        assert_eq!(
            replace_version(text, 1, 0, "1.5.0").unwrap(),
            "deps 1.5.0 self 2.0.0"
        );
    }

    #[test]
    fn test_replace_version_no_downgrade() {
        let text = "version = 2.0.0";
        assert_eq!(replace_version(text, 1, 0, "1.9.9").unwrap(), text);
        assert_eq!(replace_version(text, 1, 0, "2.0.0").unwrap(), text);
    }

    #[test]
    fn test_replace_version_idempotent() {
        let text = "x\r\nversion: 0.9.0\n";
        let once = replace_version(text, 2, 0, "1.0.0").unwrap();
        let twice = replace_version(&once, 2, 0, "1.0.0").unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_replace_version_missing_line() {
        match replace_version("only one line 1.0.0\n", 2, 0, "2.0.0") {
            Err(ReleaseError::NoLineMatched { line }) => assert_eq!(line, 2),
            other => panic!("expected NoLineMatched, got {:?}", other),
        }
    }

    #[test]
    fn test_replace_version_token_not_found() {
        assert!(matches!(
            replace_version("version = unknown", 1, 0, "2.0.0"),
            Err(ReleaseError::VersionTokenNotFound { line: 1, column: 0 })
        ));
        assert!(matches!(
            replace_version("1.0.0 here", 1, 3, "2.0.0"),
            Err(ReleaseError::VersionTokenNotFound { line: 1, column: 3 })
        ));
        assert!(matches!(
            replace_version("short", 1, 40, "2.0.0"),
            Err(ReleaseError::VersionTokenNotFound { .. })
        ));
    }

    #[test]
    fn test_replace_version_rejects_invalid_target() {
        assert!(matches!(
            replace_version("1.0.0", 1, 0, "v2"),
            Err(ReleaseError::InvalidVersion(_))
        ));
    }

    #[test]
    fn test_replace_version_columns_count_chars() {
        let text = "é 1.0.0 é 3.0.0";
        assert_eq!(replace_version(text, 1, 8, "3.1.0").unwrap(), "é 1.0.0 é 3.1.0");
    }

    #[test]
    fn test_diff_lines_reports_changed_line() {
        let diffs = diff_lines("VERSION", "a\n1.0.0\n", "a\n1.1.0\n").unwrap();
        assert_eq!(
            diffs,
            vec![FileDiff {
                path: "VERSION".to_string(),
                line: 2,
                before: "1.0.0".to_string(),
                after: "1.1.0".to_string(),
            }]
        );
        assert!(diff_lines("VERSION", "same", "same").unwrap().is_empty());
    }

    #[test]
    fn test_diff_lines_line_count_mismatch() {
        assert!(matches!(
            diff_lines("f", "a\nb", "a\nb\nc"),
            Err(ReleaseError::LineCountMismatch {
                before: 2,
                after: 3,
                ..
            })
        ));
    }
}
