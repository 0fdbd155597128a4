/// Smoke tests to verify the binary runs without panicking
use std::process::Command;

#[test]
fn binary_shows_help() {
    let output = Command::new("cargo")
        .args(["run", "--", "--help"])
        .output()
        .expect("Failed to execute cargo run");

    assert!(
        output.status.success(),
        "Binary failed to run --help: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("edobonsai"),
        "Help output should mention edobonsai"
    );
}

#[test]
fn binary_shows_version() {
    let output = Command::new("cargo")
        .args(["run", "--", "--version"])
        .output()
        .expect("Failed to execute cargo run");

    assert!(
        output.status.success(),
        "Binary failed to run --version: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn invalid_subcommand_fails_gracefully() {
    let output = Command::new("cargo")
        .args(["run", "--", "nonexistent-command"])
        .output()
        .expect("Failed to execute cargo run");

    // Should fail with error, not panic
    assert!(
        !output.status.success(),
        "Invalid subcommand should return error status"
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    // Should show helpful error, not a panic backtrace
    assert!(
        !stderr.contains("panicked at"),
        "Invalid subcommand should not cause panic"
    );
}

#[test]
fn subcommands_have_help() {
    for sub in ["grow", "serve", "haiku"] {
        let output = Command::new("cargo")
            .args(["run", "--", sub, "--help"])
            .output()
            .expect("Failed to execute cargo run");

        assert!(
            output.status.success(),
            "{} --help failed: {}",
            sub,
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

#[test]
fn print_mode_draws_a_tree() {
    let output = Command::new("cargo")
        .args([
            "run", "--", "grow", "--print", "--no-haiku", "--seed", "7", "--depth", "6", "--season", "winter",
        ])
        .output()
        .expect("Failed to execute cargo run");

    assert!(
        output.status.success(),
        "Print mode failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    // the tree is drawn in braille dots
    assert!(
        stdout.chars().any(|c| ('\u{2801}'..='\u{28FF}').contains(&c)),
        "Printed scene should contain braille ink"
    );
}
