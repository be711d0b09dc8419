use crate::common::command::{repository_dir, run_sprig_command, run_sprig_command_in, work_dir};
use assert_fs::TempDir;
use predicates::prelude::predicate;
use rstest::rstest;

mod common;

#[rstest]
fn init_lays_out_the_control_directory(repository_dir: TempDir) {
    let control = work_dir(&repository_dir).canonicalize().unwrap().join(".sprig");

    run_sprig_command(&repository_dir, &["init"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Initialized empty sprig repository in"))
        .stdout(predicate::str::contains(control.display().to_string()));

    let buckets = std::fs::read_dir(control.join("objects")).unwrap().count();
    assert_eq!(buckets, 256);
    assert!(control.join("refs/heads").is_dir());
    assert_eq!(
        std::fs::read_to_string(control.join("HEAD")).unwrap(),
        "ref: refs/heads/master"
    );
}

#[rstest]
fn init_twice_is_refused(repository_dir: TempDir) {
    run_sprig_command(&repository_dir, &["init"]).assert().success();

    run_sprig_command(&repository_dir, &["init"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("already initialized"));
}

#[rstest]
fn init_accepts_a_root_option(repository_dir: TempDir) {
    let nested = repository_dir.path().join("nested");

    run_sprig_command(
        &repository_dir,
        &["-C", nested.to_str().unwrap(), "init"],
    )
    .assert()
    .success();

    assert!(nested.join(".sprig/HEAD").is_file());
}

#[rstest]
fn commands_outside_a_repository_fail(repository_dir: TempDir) {
    run_sprig_command_in(
        repository_dir.path(),
        &repository_dir.path().join("identity"),
        &["status"],
    )
    .assert()
    .failure()
    .code(3)
    .stderr(predicate::str::contains("not a sprig repository"));
}
