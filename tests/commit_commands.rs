use assert_fs::TempDir;
use predicates::prelude::predicate;
use pretty_assertions::assert_eq;
use rstest::rstest;

mod common;

use common::command::{
    repository_dir, rev_parse, rit_commit, run_rit_command, stdout_of,
};
use common::file::write;

#[rstest]
fn root_commit_has_tree_author_and_no_parent(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    write(repository_dir.path(), "a", "A\n");
    run_rit_command(repository_dir.path(), &["add", "a"])
        .assert()
        .success();

    rit_commit(repository_dir.path(), "m")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^committed to master: [0-9a-f]{40}\n$")?);

    let payload = stdout_of(repository_dir.path(), &["cat-file", "-p", "HEAD"]);
    assert!(payload.starts_with("tree "));
    assert!(payload.contains("\nauthor "));
    assert!(payload.contains("\ncommitter "));
    assert!(!payload.contains("\nparent "));
    assert!(payload.ends_with("\n\nm\n"));

    Ok(())
}

#[rstest]
fn second_commit_links_to_the_first(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    write(repository_dir.path(), "a", "v1\n");
    run_rit_command(repository_dir.path(), &["add", "a"])
        .assert()
        .success();
    rit_commit(repository_dir.path(), "first").assert().success();
    let first = rev_parse(repository_dir.path(), "HEAD");

    write(repository_dir.path(), "a", "v2\n");
    run_rit_command(repository_dir.path(), &["add", "a"])
        .assert()
        .success();
    rit_commit(repository_dir.path(), "second").assert().success();
    let second = rev_parse(repository_dir.path(), "HEAD");

    assert_ne!(first, second);
    let payload = stdout_of(repository_dir.path(), &["cat-file", "-p", &second]);
    assert!(payload.contains(&format!("parent {first}")));

    Ok(())
}

#[rstest]
fn amend_replaces_the_tip_but_keeps_its_parent(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    write(repository_dir.path(), "a", "v1\n");
    run_rit_command(repository_dir.path(), &["add", "a"])
        .assert()
        .success();
    rit_commit(repository_dir.path(), "first").assert().success();
    let first = rev_parse(repository_dir.path(), "HEAD");

    write(repository_dir.path(), "a", "v2\n");
    run_rit_command(repository_dir.path(), &["add", "a"])
        .assert()
        .success();
    rit_commit(repository_dir.path(), "second").assert().success();
    let second = rev_parse(repository_dir.path(), "HEAD");
    let second_tree = stdout_of(repository_dir.path(), &["cat-file", "-p", &second])
        .lines()
        .next()
        .map(str::to_string)
        .ok_or("empty commit payload")?;

    run_rit_command(repository_dir.path(), &["commit", "--amend", "-m", "x"])
        .assert()
        .success()
        .stdout(predicate::str::contains("amended master"));
    let amended = rev_parse(repository_dir.path(), "HEAD");

    assert_ne!(amended, second);
    let payload = stdout_of(repository_dir.path(), &["cat-file", "-p", &amended]);
    // same parent and same tree as the commit it replaced
    assert!(payload.contains(&format!("parent {first}")));
    assert!(payload.starts_with(&second_tree));
    assert!(payload.ends_with("\n\nx\n"));

    // the replaced commit is unreferenced but still stored
    let object_type = stdout_of(repository_dir.path(), &["cat-file", "-t", &second]);
    assert_eq!(object_type, "commit\n");

    Ok(())
}

#[rstest]
fn amend_without_a_message_reuses_the_old_one(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    write(repository_dir.path(), "a", "v1\n");
    run_rit_command(repository_dir.path(), &["add", "a"])
        .assert()
        .success();
    rit_commit(repository_dir.path(), "keep this message")
        .assert()
        .success();

    run_rit_command(repository_dir.path(), &["commit", "--amend"])
        .assert()
        .success();

    let payload = stdout_of(repository_dir.path(), &["cat-file", "-p", "HEAD"]);
    assert!(payload.ends_with("\n\nkeep this message\n"));

    Ok(())
}

#[rstest]
fn commit_with_an_empty_index_fails(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    rit_commit(repository_dir.path(), "nothing staged")
        .assert()
        .failure()
        .stderr(predicate::str::contains("index is empty"));

    Ok(())
}

#[rstest]
fn commit_message_without_m_fails(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    write(repository_dir.path(), "a", "A\n");
    run_rit_command(repository_dir.path(), &["add", "a"])
        .assert()
        .success();

    run_rit_command(repository_dir.path(), &["commit"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("message is required"));

    Ok(())
}

#[rstest]
fn author_identity_defaults_when_env_is_missing(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    write(repository_dir.path(), "a", "A\n");
    run_rit_command(repository_dir.path(), &["add", "a"])
        .assert()
        .success();

    let mut commit = run_rit_command(repository_dir.path(), &["commit", "-m", "defaulted"]);
    for var in [
        "GIT_AUTHOR_NAME",
        "GIT_AUTHOR_EMAIL",
        "GIT_COMMITTER_NAME",
        "GIT_COMMITTER_EMAIL",
    ] {
        commit.env_remove(var);
    }
    commit.assert().success();

    let payload = stdout_of(repository_dir.path(), &["cat-file", "-p", "HEAD"]);
    assert!(payload.contains("author pygit <pygit@localhost>"));

    Ok(())
}
