use crate::common::command::{
    init_repository_dir, read_branch, read_head, repository_dir, run_sprig_command,
};
use assert_fs::TempDir;
use predicates::prelude::*;
use rstest::rstest;

mod common;

#[rstest]
fn new_branches_snapshot_head_and_become_current(init_repository_dir: TempDir) {
    let tip = read_branch(&init_repository_dir, "master");

    run_sprig_command(&init_repository_dir, &["branch", "feature"])
        .assert()
        .success()
        .stdout("Switched to a new branch 'feature'\n");

    assert_eq!(read_branch(&init_repository_dir, "feature"), tip);
    assert_eq!(read_head(&init_repository_dir), "ref: refs/heads/feature");
}

#[rstest]
fn hierarchical_names_are_allowed(init_repository_dir: TempDir) {
    run_sprig_command(&init_repository_dir, &["branch", "feature/login"])
        .assert()
        .success();

    assert_eq!(read_head(&init_repository_dir), "ref: refs/heads/feature/login");
}

#[rstest]
fn branches_without_commits_start_empty(repository_dir: TempDir) {
    run_sprig_command(&repository_dir, &["init"]).assert().success();

    run_sprig_command(&repository_dir, &["branch", "early"]).assert().success();

    assert_eq!(read_branch(&repository_dir, "early"), "");
}

#[rstest]
fn duplicate_branches_are_refused(init_repository_dir: TempDir) {
    run_sprig_command(&init_repository_dir, &["branch", "master"])
        .assert()
        .failure()
        .code(7)
        .stderr(predicate::str::contains("already exists"));
}

#[rstest]
#[case("has space")]
#[case("double..dot")]
#[case("ends.lock")]
#[case("/leading")]
fn invalid_names_are_refused(init_repository_dir: TempDir, #[case] name: &str) {
    run_sprig_command(&init_repository_dir, &["branch", name])
        .assert()
        .failure()
        .code(1);

    assert_eq!(read_head(&init_repository_dir), "ref: refs/heads/master");
}
