use crate::common::file::{write_file, FileSpec};
use assert_cmd::Command;
use assert_fs::TempDir;
use derive_new::new;
use rstest::fixture;
use std::path::Path;

#[fixture]
pub fn repository_dir() -> TempDir {
    let dir = TempDir::new().expect("failed to create temp dir");
    run_rit_command(dir.path(), &["init"]).assert().success();
    dir
}

/// A repository with three committed files: `1.txt`, `a/2.txt`, `a/b/3.txt`.
#[fixture]
pub fn committed_repository_dir(repository_dir: TempDir) -> TempDir {
    write_file(FileSpec::new(
        repository_dir.path().join("1.txt"),
        "one\n".to_string(),
    ));
    write_file(FileSpec::new(
        repository_dir.path().join("a").join("2.txt"),
        "two\n".to_string(),
    ));
    write_file(FileSpec::new(
        repository_dir.path().join("a").join("b").join("3.txt"),
        "three\n".to_string(),
    ));

    run_rit_command(repository_dir.path(), &["add", "."])
        .assert()
        .success();
    rit_commit(repository_dir.path(), "initial commit")
        .assert()
        .success();

    repository_dir
}

pub fn run_rit_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("rit").expect("failed to find rit binary");
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

#[derive(Debug, Clone, new)]
pub struct RandomAuthor {
    pub name: String,
    pub email: String,
}

pub fn generate_random_author() -> RandomAuthor {
    use fake::faker::internet::en::FreeEmail;
    use fake::faker::name::en::Name;
    use fake::Fake;

    let name = Name().fake::<String>().replace(' ', "_");
    let email = FreeEmail().fake::<String>();
    RandomAuthor::new(name, email)
}

pub fn rit_commit(dir: &Path, message: &str) -> Command {
    let author = generate_random_author();
    let mut cmd = run_rit_command(dir, &["commit", "-m", message]);
    cmd.envs(vec![
        ("GIT_AUTHOR_NAME", author.name.as_str()),
        ("GIT_AUTHOR_EMAIL", author.email.as_str()),
    ]);
    cmd
}

pub fn rev_parse(dir: &Path, rev: &str) -> String {
    let output = run_rit_command(dir, &["rev-parse", rev])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    String::from_utf8(output).expect("rev-parse output is not UTF-8").trim().to_string()
}

pub fn stdout_of(dir: &Path, args: &[&str]) -> String {
    let output = run_rit_command(dir, args)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    String::from_utf8(output).expect("command output is not UTF-8")
}
