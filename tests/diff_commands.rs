use assert_fs::TempDir;
use pretty_assertions::assert_eq;
use rstest::rstest;

mod common;

use common::command::{committed_repository_dir, run_rit_command, stdout_of};
use common::file::write;

#[rstest]
fn clean_tree_diffs_to_nothing(
    committed_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let output = stdout_of(committed_repository_dir.path(), &["diff"]);
    assert_eq!(output, "");

    Ok(())
}

#[rstest]
fn modified_file_produces_a_unified_hunk(
    committed_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    write(committed_repository_dir.path(), "1.txt", "uno\n");

    let output = stdout_of(committed_repository_dir.path(), &["diff"]);
    assert!(output.contains("diff --git a/1.txt b/1.txt"));
    assert!(output.contains("--- a/1.txt"));
    assert!(output.contains("+++ b/1.txt"));
    assert!(output.contains("@@ -1,1 +1,1 @@"));
    assert!(output.contains("-one"));
    assert!(output.contains("+uno"));

    Ok(())
}

#[rstest]
fn deleted_file_diffs_against_dev_null(
    committed_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::remove_file(committed_repository_dir.path().join("1.txt"))?;

    let output = stdout_of(committed_repository_dir.path(), &["diff"]);
    assert!(output.contains("deleted file mode 100644"));
    assert!(output.contains("+++ /dev/null"));
    assert!(output.contains("-one"));

    Ok(())
}

#[rstest]
fn staged_changes_are_not_in_the_unstaged_diff(
    committed_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    write(committed_repository_dir.path(), "1.txt", "staged change\n");
    run_rit_command(committed_repository_dir.path(), &["add", "1.txt"])
        .assert()
        .success();

    let output = stdout_of(committed_repository_dir.path(), &["diff"]);
    assert_eq!(output, "");

    Ok(())
}

#[rstest]
fn hunks_carry_context_lines(
    committed_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let original = (1..=9).map(|i| format!("line{i}\n")).collect::<String>();
    write(committed_repository_dir.path(), "long.txt", &original);
    run_rit_command(committed_repository_dir.path(), &["add", "long.txt"])
        .assert()
        .success();

    let modified = original.replace("line5\n", "LINE5\n");
    write(committed_repository_dir.path(), "long.txt", &modified);

    let output = stdout_of(committed_repository_dir.path(), &["diff"]);
    assert!(output.contains("@@ -2,7 +2,7 @@"));
    assert!(output.contains(" line4\n-line5\n+LINE5\n line6"));

    Ok(())
}
