//! Formatting and display functions for UI output.
//!
//! Formatting is kept separate from printing so it can be tested.

use console::style;

use crate::boundary::BoundaryWarning;
use crate::cli::WorkflowResult;
use crate::patcher::FileDiff;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Display a boundary warning to the user.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// Renders one changed line as `path:line` followed by the old and new text.
pub fn format_diff(diff: &FileDiff) -> String {
    format!(
        "{}:{}\n  - {}\n  + {}",
        diff.path, diff.line, diff.before, diff.after
    )
}

/// Display the lines that were (or in dry-run mode would be) changed.
pub fn display_diffs(diffs: &[FileDiff], dry_run: bool) {
    if diffs.is_empty() {
        display_status("No tracked file needs a version change");
        return;
    }

    let heading = if dry_run {
        "Files that would change:"
    } else {
        "Files changed:"
    };
    println!("\n{}", style(heading).bold());
    for diff in diffs {
        let rendered = format_diff(diff);
        let mut lines = rendered.lines();
        if let Some(location) = lines.next() {
            println!("  {}", style(location).cyan());
        }
        for line in lines {
            if line.trim_start().starts_with('-') {
                println!("  {}", style(line).red());
            } else {
                println!("  {}", style(line).green());
            }
        }
    }
}

/// Display the computed release: versions, tag and body.
pub fn display_release_preview(result: &WorkflowResult) {
    println!("\n{}", style("Release").bold());
    println!(
        "  Version: {} -> {}",
        style(&result.current_version).red(),
        style(&result.next_version).green()
    );
    println!("  Tag:     {}", style(&result.tag_name).green());
    println!("  Title:   {}", result.release_name);
    println!("  Changes: {}", result.changes);

    println!("\n{}", style("Release notes").bold().underlined());
    println!("{}", result.body.trim_end());
}
