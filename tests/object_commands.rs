use assert_fs::TempDir;
use predicates::prelude::predicate;
use pretty_assertions::assert_eq;
use rstest::rstest;

mod common;

use common::command::{repository_dir, run_rit_command, stdout_of};
use common::file::write;

#[rstest]
fn hash_object_is_stable_and_matches_git(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    write(repository_dir.path(), "greeting.txt", "hello pygit\n");

    // the value `git hash-object greeting.txt` prints for the same bytes
    run_rit_command(repository_dir.path(), &["hash-object", "greeting.txt"])
        .assert()
        .success()
        .stdout(predicate::eq("40e51761b78f600a29d3e6cd6a373b77d9e112bb\n"));

    Ok(())
}

#[rstest]
fn hash_object_write_then_cat_file_round_trips(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = "some file content\nwith two lines\n";
    write(repository_dir.path(), "data.txt", content);

    let oid = stdout_of(repository_dir.path(), &["hash-object", "-w", "data.txt"])
        .trim()
        .to_string();
    assert_eq!(oid.len(), 40);

    // the object landed in the fanout layout
    assert!(repository_dir
        .path()
        .join(".git/objects")
        .join(&oid[..2])
        .join(&oid[2..])
        .is_file());

    let printed = stdout_of(repository_dir.path(), &["cat-file", "-p", &oid]);
    assert_eq!(printed, content);

    let object_type = stdout_of(repository_dir.path(), &["cat-file", "-t", &oid]);
    assert_eq!(object_type, "blob\n");

    let size = stdout_of(repository_dir.path(), &["cat-file", "-s", &oid]);
    assert_eq!(size, format!("{}\n", content.len()));

    Ok(())
}

#[rstest]
fn cat_file_resolves_unique_prefixes(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    write(repository_dir.path(), "data.txt", "prefix lookup\n");
    let oid = stdout_of(repository_dir.path(), &["hash-object", "-w", "data.txt"])
        .trim()
        .to_string();

    let printed = stdout_of(repository_dir.path(), &["cat-file", "-p", &oid[..8]]);
    assert_eq!(printed, "prefix lookup\n");

    // three chars are below the minimum prefix length
    run_rit_command(repository_dir.path(), &["cat-file", "-p", &oid[..3]])
        .assert()
        .failure();

    Ok(())
}

#[rstest]
fn cat_file_of_a_missing_object_fails(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    run_rit_command(
        repository_dir.path(),
        &["cat-file", "-p", "deadbeefdeadbeefdeadbeefdeadbeefdeadbeef"],
    )
    .assert()
    .failure()
    .stderr(predicate::str::contains("not found"));

    Ok(())
}
