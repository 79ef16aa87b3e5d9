use assert_fs::TempDir;
use predicates::prelude::predicate;
use pretty_assertions::assert_eq;
use rstest::rstest;

mod common;

use common::command::{
    committed_repository_dir, repository_dir, rit_commit, run_rit_command, stdout_of,
};
use common::file::write;

#[rstest]
fn clean_repository_reports_nothing_to_commit(
    committed_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let output = stdout_of(committed_repository_dir.path(), &["status"]);
    assert_eq!(
        output,
        "On branch master\n\nnothing to commit, working tree clean\n"
    );

    Ok(())
}

#[rstest]
fn untracked_files_are_listed_in_name_order(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    write(repository_dir.path(), "zeta.txt", "z\n");
    write(repository_dir.path(), "alpha.txt", "a\n");

    let output = stdout_of(repository_dir.path(), &["status"]);
    assert_eq!(
        output,
        "On branch master\n\nUntracked files:\n  alpha.txt\n  zeta.txt\n\n"
    );

    Ok(())
}

#[rstest]
fn modified_files_are_reported_unstaged(
    committed_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    write(committed_repository_dir.path(), "1.txt", "modified one\n");
    write(committed_repository_dir.path(), "a/2.txt", "modified two\n");

    let output = stdout_of(committed_repository_dir.path(), &["status"]);
    assert!(output.contains("Changes not staged for commit:"));
    assert!(output.contains("  modified: 1.txt"));
    assert!(output.contains("  modified: a/2.txt"));

    Ok(())
}

#[rstest]
fn deleted_files_are_reported_unstaged(
    committed_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::remove_file(committed_repository_dir.path().join("a/2.txt"))?;

    let output = stdout_of(committed_repository_dir.path(), &["status"]);
    assert!(output.contains("  deleted:  a/2.txt"));

    Ok(())
}

#[rstest]
fn staged_changes_are_reported(
    committed_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    write(committed_repository_dir.path(), "fresh.txt", "new file\n");
    run_rit_command(committed_repository_dir.path(), &["add", "fresh.txt"])
        .assert()
        .success();

    let output = stdout_of(committed_repository_dir.path(), &["status"]);
    assert!(output.contains("Changes to be committed:"));
    assert!(output.contains("  staged:   fresh.txt"));

    Ok(())
}

#[rstest]
fn touched_but_unchanged_files_stay_clean(
    committed_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    // rewrite the same bytes; only timestamps change
    write(committed_repository_dir.path(), "1.txt", "one\n");

    let output = stdout_of(committed_repository_dir.path(), &["status"]);
    assert!(output.contains("nothing to commit, working tree clean"));

    Ok(())
}

#[rstest]
fn ignored_files_are_invisible_but_negations_are_not(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    write(repository_dir.path(), ".gitignore", "*.log\n!keep.log\n");
    write(repository_dir.path(), "a.log", "noise\n");
    write(repository_dir.path(), "keep.log", "kept\n");
    write(repository_dir.path(), "sub/a.log", "noise\n");

    let output = stdout_of(repository_dir.path(), &["status"]);
    assert!(output.contains("keep.log"));
    assert!(!output.contains("a.log"));

    Ok(())
}

#[rstest]
fn ignored_directories_are_not_descended_into(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    write(repository_dir.path(), ".gitignore", "build/\n");
    write(repository_dir.path(), "build/out.txt", "artifact\n");
    write(repository_dir.path(), "src.txt", "source\n");

    run_rit_command(repository_dir.path(), &["add", "."])
        .assert()
        .success();

    let listed = stdout_of(repository_dir.path(), &["ls-files"]);
    assert_eq!(listed, ".gitignore\nsrc.txt\n");

    let status = stdout_of(repository_dir.path(), &["status"]);
    assert!(!status.contains("build/out.txt"));

    Ok(())
}

#[rstest]
fn tracked_files_stay_visible_after_an_ignore_rule_appears(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    write(repository_dir.path(), "logs/app.log", "base\n");
    run_rit_command(repository_dir.path(), &["add", "logs/app.log"])
        .assert()
        .success();
    rit_commit(repository_dir.path(), "track log").assert().success();

    write(repository_dir.path(), ".gitignore", "*.log\n");
    run_rit_command(repository_dir.path(), &["add", ".gitignore"])
        .assert()
        .success();
    rit_commit(repository_dir.path(), "ignore logs").assert().success();

    write(repository_dir.path(), "logs/app.log", "base\nchanged\n");
    let output = stdout_of(repository_dir.path(), &["status"]);
    assert!(output.contains("modified: logs/app.log"));

    Ok(())
}

#[rstest]
fn explicitly_adding_an_ignored_file_is_refused(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    write(repository_dir.path(), ".gitignore", "*.secret\n");
    write(repository_dir.path(), "token.secret", "hush\n");

    run_rit_command(repository_dir.path(), &["add", "token.secret"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ignored"));

    Ok(())
}
