use crate::common::file::{FileSpec, write_file};
use crate::common::parse_oid;
use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

pub const AUTHOR_NAME: &str = "Fake User";
pub const AUTHOR_EMAIL: &str = "fake_email@email.com";
/// `%Y-%m-%d %H:%M:%S %z`
pub const AUTHOR_DATE: &str = "2023-01-01 12:00:00 +0000";

/// Name of the identity file written next to (not inside) the repository
const IDENTITY_FILE: &str = "identity";

/// A scratch directory holding the identity file and an empty `work/` root
#[fixture]
pub fn repository_dir() -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    std::fs::write(
        dir.path().join(IDENTITY_FILE),
        format!("name = {AUTHOR_NAME}\nemail = {AUTHOR_EMAIL}\n"),
    )
    .expect("Failed to write identity file");
    std::fs::create_dir_all(dir.path().join("work")).expect("Failed to create work dir");

    dir
}

/// An initialized repository with three files in nested directories committed on master
#[fixture]
pub fn init_repository_dir(repository_dir: TempDir) -> TempDir {
    let work = work_dir(&repository_dir);
    run_sprig_command(&repository_dir, &["init"]).assert().success();

    write_file(FileSpec::new(work.join("1.txt"), "one\n".to_string()));
    write_file(FileSpec::new(work.join("a").join("2.txt"), "two\n".to_string()));
    write_file(FileSpec::new(
        work.join("a").join("b").join("3.txt"),
        "three\n".to_string(),
    ));

    sprig_commit_all(&repository_dir, "Initial commit");

    repository_dir
}

pub fn work_dir(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join("work")
}

/// `sprig` running inside `<dir>/work` with a pinned identity and author date
pub fn run_sprig_command(dir: &TempDir, args: &[&str]) -> Command {
    run_sprig_command_in(&work_dir(dir), &dir.path().join(IDENTITY_FILE), args)
}

pub fn run_sprig_command_in(cwd: &Path, identity: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("sprig").expect("Failed to find sprig binary");
    cmd.current_dir(cwd);
    cmd.envs([
        ("NO_PAGER", "1"),
        ("NO_COLOR", "1"),
        ("SPRIG_AUTHOR_DATE", AUTHOR_DATE),
    ]);
    cmd.env("SPRIG_CONFIG", identity);
    cmd.env_remove("SPRIG_DIFF_TOOL");
    cmd.args(args);
    cmd
}

/// Stage everything, write the tree and commit it; returns the commit id
pub fn sprig_commit_all(dir: &TempDir, message: &str) -> String {
    run_sprig_command(dir, &["update-cache", "."]).assert().success();

    let tree = run_sprig_command(dir, &["write-tree"]).output().expect("write-tree failed");
    assert!(tree.status.success(), "write-tree failed: {tree:?}");
    let tree_id = parse_oid(&tree.stdout);

    let commit = run_sprig_command(dir, &["commit-tree", &tree_id, "--message", message])
        .output()
        .expect("commit-tree failed");
    assert!(commit.status.success(), "commit-tree failed: {commit:?}");

    parse_oid(&commit.stdout)
}

/// Current content of a ref file under `.sprig/refs/heads`
pub fn read_branch(dir: &TempDir, name: &str) -> String {
    std::fs::read_to_string(work_dir(dir).join(".sprig/refs/heads").join(name))
        .expect("Failed to read branch ref")
        .trim()
        .to_string()
}

pub fn read_head(dir: &TempDir) -> String {
    std::fs::read_to_string(work_dir(dir).join(".sprig/HEAD"))
        .expect("Failed to read HEAD")
        .trim()
        .to_string()
}
