use crate::common::command::{
    init_repository_dir, read_branch, run_sprig_command, sprig_commit_all, work_dir,
};
use crate::common::file::{FileSpec, write_file};
use assert_fs::TempDir;
use predicates::prelude::*;
use rstest::rstest;

mod common;

#[rstest]
fn diff_prints_patches_in_path_order(init_repository_dir: TempDir) {
    let work = work_dir(&init_repository_dir);
    let first = read_branch(&init_repository_dir, "master");
    write_file(FileSpec::new(work.join("1.txt"), "uno\n".to_string()));
    write_file(FileSpec::new(work.join("0.txt"), "zero\n".to_string()));
    let second = sprig_commit_all(&init_repository_dir, "Second commit");

    run_sprig_command(&init_repository_dir, &["diff", &first, &second])
        .assert()
        .success()
        .stdout(
            "diff --git a/0.txt b/0.txt\n\
             --- /dev/null\n\
             +++ b/0.txt\n\
             @@ -0,0 +1,1 @@\n\
             +zero\n\
             diff --git a/1.txt b/1.txt\n\
             --- a/1.txt\n\
             +++ b/1.txt\n\
             @@ -1,1 +1,1 @@\n\
             -one\n\
             +uno\n",
        );
}

#[rstest]
fn identical_commits_have_no_diff(init_repository_dir: TempDir) {
    let tip = read_branch(&init_repository_dir, "master");

    run_sprig_command(&init_repository_dir, &["diff", &tip, &tip])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[rstest]
fn missing_newlines_are_marked(init_repository_dir: TempDir) {
    let work = work_dir(&init_repository_dir);
    let first = read_branch(&init_repository_dir, "master");
    write_file(FileSpec::new(work.join("1.txt"), "one".to_string()));
    let second = sprig_commit_all(&init_repository_dir, "Drop newline");

    run_sprig_command(&init_repository_dir, &["diff", &first, &second])
        .assert()
        .success()
        .stdout(predicate::str::ends_with(
            "-one\n+one\n\\ No newline at end of file\n",
        ));
}
