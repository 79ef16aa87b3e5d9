use assert_fs::TempDir;
use predicates::prelude::predicate;
use pretty_assertions::assert_eq;
use rstest::rstest;

mod common;

use common::command::{
    committed_repository_dir, repository_dir, run_rit_command, stdout_of,
};

#[rstest]
fn remote_add_list_get_url_remove(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    run_rit_command(
        repository_dir.path(),
        &["remote", "add", "origin", "http://example.com/repo.git"],
    )
    .assert()
    .success();
    run_rit_command(
        repository_dir.path(),
        &["remote", "add", "backup", "http://backup.example.com/repo.git"],
    )
    .assert()
    .success();

    let listed = stdout_of(repository_dir.path(), &["remote", "list"]);
    assert_eq!(listed, "backup\norigin\n");

    // a bare `remote` behaves like `remote list`
    assert_eq!(stdout_of(repository_dir.path(), &["remote"]), listed);

    let verbose = stdout_of(repository_dir.path(), &["remote", "list", "-v"]);
    assert!(verbose.contains("origin\thttp://example.com/repo.git (fetch)"));
    assert!(verbose.contains("origin\thttp://example.com/repo.git (push)"));

    let url = stdout_of(repository_dir.path(), &["remote", "get-url", "origin"]);
    assert_eq!(url, "http://example.com/repo.git\n");

    run_rit_command(repository_dir.path(), &["remote", "remove", "backup"])
        .assert()
        .success();
    assert_eq!(
        stdout_of(repository_dir.path(), &["remote", "list"]),
        "origin\n"
    );

    Ok(())
}

#[rstest]
fn duplicate_remote_and_unknown_remote_fail(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    run_rit_command(
        repository_dir.path(),
        &["remote", "add", "origin", "http://example.com"],
    )
    .assert()
    .success();

    run_rit_command(
        repository_dir.path(),
        &["remote", "add", "origin", "http://elsewhere.example.com"],
    )
    .assert()
    .failure()
    .stderr(predicate::str::contains("already exists"));

    run_rit_command(repository_dir.path(), &["remote", "get-url", "missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));

    run_rit_command(repository_dir.path(), &["remote", "remove", "missing"])
        .assert()
        .failure();

    Ok(())
}

#[rstest]
fn push_without_a_configured_remote_fails(
    committed_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    run_rit_command(committed_repository_dir.path(), &["push"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("origin"));

    Ok(())
}

#[rstest]
fn push_to_an_unreachable_remote_fails_without_mutating_refs(
    committed_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let head_before = common::command::rev_parse(committed_repository_dir.path(), "HEAD");

    run_rit_command(
        committed_repository_dir.path(),
        &["remote", "add", "origin", "http://127.0.0.1:1/nope.git"],
    )
    .assert()
    .success();

    let mut push = run_rit_command(committed_repository_dir.path(), &["push"]);
    push.env("RIT_HTTP_TIMEOUT", "2");
    push.assert()
        .failure()
        .stderr(predicate::str::contains("error:"));

    assert_eq!(
        common::command::rev_parse(committed_repository_dir.path(), "HEAD"),
        head_before
    );

    Ok(())
}
