mod common;

use assert_cmd::Command;
use common::{Project, ROSTER};
use predicates::prelude::*;

fn certsplit(project: &Project) -> Command {
    let mut cmd = Command::cargo_bin("certsplit").unwrap();
    cmd.current_dir(project.root())
        .env_remove("RUST_LOG")
        .env_remove("CERTSPLIT_DATA_DIR");
    cmd
}

#[test]
fn help_lists_main_flags() {
    let project = Project::new(ROSTER);
    certsplit(&project)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--course-code"))
        .stdout(predicate::str::contains("--no-archive"));
}

#[test]
fn generate_config_writes_file() {
    let project = Project::new(ROSTER);
    certsplit(&project)
        .args(["--generate-config", "--config", "sample.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sample.toml"));

    let content = std::fs::read_to_string(project.root().join("sample.toml")).unwrap();
    assert!(content.contains("roster_pattern"));
}

#[test]
fn full_run_creates_archives() {
    let project = Project::new(ROSTER);
    project
        .certificates("all.pdf", &["a", "b"])
        .receipts("all.pdf", &["a", "b"]);

    certsplit(&project)
        .args(["--data-dir", "data", "--output", "out", "--output-format", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Participants: 2"));

    assert!(project.out().join("Certificate_Result.zip").exists());
    assert!(project.out().join("Receipt_Result.zip").exists());
    assert!(!project.out().join("combined").exists());
}

#[test]
fn partial_failure_exits_with_two() {
    let project = Project::new(ROSTER);
    project.certificates("all.pdf", &["a", "b"]);

    certsplit(&project)
        .args(["--data-dir", "data", "--output", "out", "-q"])
        .assert()
        .code(2);

    assert!(project.out().join("Certificate_Result.zip").exists());
}

#[test]
fn missing_roster_exits_with_three() {
    let project = Project::new(ROSTER);
    std::fs::remove_file(project.data().join("participants.csv")).unwrap();

    certsplit(&project)
        .args(["--data-dir", "data", "--output", "out"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("roster"));
}

#[test]
fn dry_run_writes_nothing() {
    let project = Project::new(ROSTER);
    project.certificates("all.pdf", &["a", "b"]);

    certsplit(&project)
        .args([
            "--data-dir",
            "data",
            "--output",
            "out",
            "--dry-run",
            "--output-format",
            "json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"participants\":2"));

    assert!(!project.out().exists());
}

#[test]
fn log_file_records_failures() {
    let project = Project::new(ROSTER);
    project.certificates("all.pdf", &["only one"]);

    certsplit(&project)
        .args([
            "--data-dir",
            "data",
            "--output",
            "out",
            "-q",
            "--log-file",
            "app_errors.log",
        ])
        .assert()
        .code(2);

    let log = std::fs::read_to_string(project.root().join("app_errors.log")).unwrap();
    assert!(log.contains("document kind failed"));
}
