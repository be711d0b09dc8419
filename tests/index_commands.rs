use crate::common::command::{repository_dir, run_sprig_command, work_dir};
use crate::common::file::{FileSpec, write_file, write_generated_files};
use crate::common::parse_oid;
use assert_fs::TempDir;
use predicates::prelude::*;
use rstest::rstest;

mod common;

fn write_tree(dir: &TempDir) -> String {
    let output = run_sprig_command(dir, &["write-tree"]).output().unwrap();
    assert!(output.status.success());
    parse_oid(&output.stdout)
}

#[rstest]
fn staged_directories_become_tree_entries(repository_dir: TempDir) {
    let work = work_dir(&repository_dir);
    run_sprig_command(&repository_dir, &["init"]).assert().success();
    write_file(FileSpec::new(work.join("a.txt"), "a\n".to_string()));
    write_file(FileSpec::new(work.join("dir").join("b.txt"), "b\n".to_string()));

    run_sprig_command(&repository_dir, &["update-cache", "a.txt", "dir/b.txt"])
        .assert()
        .success();
    let tree_id = write_tree(&repository_dir);

    run_sprig_command(&repository_dir, &["cat-file", &tree_id])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^blob [0-9a-f]{40}\ta\.txt\ntree [0-9a-f]{40}\tdir\n$").unwrap());
}

#[rstest]
fn extensionless_files_are_blobs(repository_dir: TempDir) {
    let work = work_dir(&repository_dir);
    run_sprig_command(&repository_dir, &["init"]).assert().success();
    write_file(FileSpec::new(work.join("Makefile"), "all:\n".to_string()));

    run_sprig_command(&repository_dir, &["update-cache", "."]).assert().success();
    let tree_id = write_tree(&repository_dir);

    run_sprig_command(&repository_dir, &["cat-file", &tree_id])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("blob "))
        .stdout(predicate::str::ends_with("\tMakefile\n"));
}

#[rstest]
fn writing_the_same_index_twice_yields_the_same_tree(repository_dir: TempDir) {
    run_sprig_command(&repository_dir, &["init"]).assert().success();
    write_generated_files(&work_dir(&repository_dir), 5);
    run_sprig_command(&repository_dir, &["update-cache", "."]).assert().success();

    assert_eq!(write_tree(&repository_dir), write_tree(&repository_dir));
}

#[rstest]
fn every_generated_file_is_staged(repository_dir: TempDir) {
    let work = work_dir(&repository_dir);
    run_sprig_command(&repository_dir, &["init"]).assert().success();
    let files = write_generated_files(&work, 4);

    run_sprig_command(&repository_dir, &["update-cache", "."]).assert().success();

    let mut status = run_sprig_command(&repository_dir, &["status"]).assert().success();
    for file in files {
        let name = file.path.file_name().unwrap().to_string_lossy().to_string();
        status = status.stdout(predicate::str::contains(name).not());
    }
}

#[rstest]
fn missing_paths_are_skipped(repository_dir: TempDir) {
    let work = work_dir(&repository_dir);
    run_sprig_command(&repository_dir, &["init"]).assert().success();
    write_file(FileSpec::new(work.join("a.txt"), "a\n".to_string()));

    run_sprig_command(&repository_dir, &["update-cache", "ghost.txt", "a.txt"])
        .assert()
        .success();

    run_sprig_command(&repository_dir, &["status"])
        .assert()
        .success()
        .stdout("On branch master\nnothing to commit, working tree clean\n");
}

#[rstest]
fn rm_unstages_paths(repository_dir: TempDir) {
    let work = work_dir(&repository_dir);
    run_sprig_command(&repository_dir, &["init"]).assert().success();
    write_file(FileSpec::new(work.join("a.txt"), "a\n".to_string()));
    write_file(FileSpec::new(work.join("b.txt"), "b\n".to_string()));
    run_sprig_command(&repository_dir, &["update-cache", "."]).assert().success();

    run_sprig_command(&repository_dir, &["rm", "a.txt"])
        .assert()
        .success()
        .stdout("removed\n");
    run_sprig_command(&repository_dir, &["rm", "a.txt"])
        .assert()
        .success()
        .stdout("nothing to remove\n");

    run_sprig_command(&repository_dir, &["status"])
        .assert()
        .success()
        .stdout("On branch master\nUntracked files:\n\ta.txt\n");

    run_sprig_command(&repository_dir, &["rm", "."])
        .assert()
        .success()
        .stdout("removed\n");
}

#[rstest]
fn index_files_carry_the_signature(repository_dir: TempDir) {
    let work = work_dir(&repository_dir);
    run_sprig_command(&repository_dir, &["init"]).assert().success();
    write_file(FileSpec::new(work.join("a.txt"), "a\n".to_string()));

    run_sprig_command(&repository_dir, &["update-cache", "a.txt"]).assert().success();

    let index = std::fs::read(work.join(".sprig/index")).unwrap();
    assert_eq!(&index[..4], b"SIDX");
    assert_eq!(&index[4..12], &[0, 0, 0, 1, 0, 0, 0, 1]);
}

#[rstest]
fn corrupt_indexes_are_fatal(repository_dir: TempDir) {
    let work = work_dir(&repository_dir);
    run_sprig_command(&repository_dir, &["init"]).assert().success();
    std::fs::write(work.join(".sprig/index"), b"not an index at all").unwrap();

    run_sprig_command(&repository_dir, &["write-tree"])
        .assert()
        .failure()
        .code(11)
        .stderr(predicate::str::contains("index is corrupt"));
}
