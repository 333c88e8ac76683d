use git_release::boundary::BoundaryWarning;
use git_release::ui;

// ============================================================================
// BoundaryWarning Display Tests
// ============================================================================

#[test]
fn test_boundary_warning_first_release_display() {
    let warning = BoundaryWarning::FirstRelease {
        initial_version: "0.1.0".to_string(),
    };

    let display_msg = warning.to_string();
    assert!(
        display_msg.contains("No previous release"),
        "Message should mention the missing release, got: {}",
        display_msg
    );
    assert!(display_msg.contains("0.1.0"), "got: {}", display_msg);
}

#[test]
fn test_boundary_warning_no_changes_display() {
    let warning = BoundaryWarning::NoChangesSinceRelease {
        tag: "v1.4.0".to_string(),
    };

    let display_msg = warning.to_string();
    assert!(display_msg.contains("No new changes"), "got: {}", display_msg);
    assert!(display_msg.contains("v1.4.0"), "got: {}", display_msg);
}

#[test]
fn test_boundary_warning_unclaimed_changes_pluralizes() {
    let one = BoundaryWarning::UnclaimedChanges { count: 1 }.to_string();
    let many = BoundaryWarning::UnclaimedChanges { count: 3 }.to_string();

    assert!(one.starts_with("1 change matched"), "got: {}", one);
    assert!(many.starts_with("3 changes matched"), "got: {}", many);
}

#[test]
fn test_boundary_warning_version_not_bumped_display() {
    let warning = BoundaryWarning::VersionNotBumped {
        path: "package.json".to_string(),
        line: 3,
        current: "2.0.0".to_string(),
        target: "1.5.0".to_string(),
    };

    assert_eq!(
        warning.to_string(),
        "package.json:3 already at 2.0.0 (target 1.5.0), left unchanged"
    );
}

// ============================================================================
// UI Display Tests
// ============================================================================

#[test]
fn test_display_boundary_warning_does_not_panic() {
    let warnings = vec![
        BoundaryWarning::FirstRelease {
            initial_version: "1.0.0".to_string(),
        },
        BoundaryWarning::NoChangesSinceRelease {
            tag: "v1.0.0".to_string(),
        },
        BoundaryWarning::UnclaimedChanges { count: 2 },
    ];

    for warning in &warnings {
        ui::display_boundary_warning(warning);
    }
}
