use assert_cmd::Command;
use predicates::prelude::predicate;

mod common;

#[test]
fn init_creates_the_repository_layout() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let mut sut = Command::cargo_bin("rit")?;

    sut.arg("init").arg(dir.path());

    sut.assert()
        .success()
        .stdout(predicate::str::contains("initialized empty repository"));

    assert!(dir.path().join(".git").is_dir());
    assert!(dir.path().join(".git/objects").is_dir());
    assert!(dir.path().join(".git/refs/heads").is_dir());

    let head = std::fs::read_to_string(dir.path().join(".git/HEAD"))?;
    assert_eq!(head, "ref: refs/heads/master\n");

    let config = std::fs::read_to_string(dir.path().join(".git/config"))?;
    assert!(config.contains("[core]"));

    Ok(())
}

#[test]
fn init_refuses_an_existing_repository() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;

    common::command::run_rit_command(dir.path(), &["init"])
        .assert()
        .success();
    common::command::run_rit_command(dir.path(), &["init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    Ok(())
}

#[test]
fn commands_outside_a_repository_fail() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;

    common::command::run_rit_command(dir.path(), &["status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a git repository"));

    Ok(())
}
