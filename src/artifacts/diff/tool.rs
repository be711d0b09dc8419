use crate::artifacts::diff::NULL_PATH;
use crate::artifacts::diff::diff3::Diff3;
use crate::artifacts::diff::patch::{FilePatch, format_patch};
use crate::config::DiffToolKind;
use anyhow::Context;
use bytes::Bytes;
use derive_new::new;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

/// One side of a file comparison; `content: None` is a missing file
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct DiffSide {
    pub path: String,
    pub content: Option<Bytes>,
}

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct MergeInput {
    pub base: Bytes,
    pub ours: Bytes,
    pub theirs: Bytes,
    pub ours_label: String,
    pub theirs_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeResult {
    pub content: Bytes,
    pub conflicted: bool,
}

/// Text diffing collaborator used by status, diff and merge
pub trait DiffTool {
    /// Unified diff from `old` to `new`, empty when they are equal
    fn compute_diff(&self, old: &DiffSide, new: &DiffSide) -> anyhow::Result<String>;

    /// Apply a multi-file unified diff with paths relative to `root`
    fn apply_patch(&self, root: &Path, patch: &str) -> anyhow::Result<()>;

    fn three_way_merge(&self, input: &MergeInput) -> anyhow::Result<MergeResult>;
}

pub fn diff_tool(kind: DiffToolKind) -> Box<dyn DiffTool> {
    match kind {
        DiffToolKind::Builtin => Box::new(BuiltinDiffTool),
        DiffToolKind::External => Box::new(ExternalDiffTool),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinDiffTool;

impl DiffTool for BuiltinDiffTool {
    fn compute_diff(&self, old: &DiffSide, new: &DiffSide) -> anyhow::Result<String> {
        let path = new.content.as_ref().map_or(&old.path, |_| &new.path);

        Ok(format_patch(
            path,
            old.content.as_deref(),
            new.content.as_deref(),
        ))
    }

    fn apply_patch(&self, root: &Path, patch: &str) -> anyhow::Result<()> {
        for file in FilePatch::parse_all(patch)? {
            let old = match &file.old_path {
                Some(path) => std::fs::read(root.join(path))
                    .with_context(|| format!("Unable to read {path} to patch it"))?,
                None => Vec::new(),
            };

            let patched = file.apply(&old).with_context(|| {
                format!(
                    "Unable to patch {}",
                    file.new_path.as_deref().or(file.old_path.as_deref()).unwrap_or(NULL_PATH)
                )
            })?;

            match &file.new_path {
                Some(path) => {
                    let target = root.join(path);
                    if let Some(parent) = target.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&target, patched)
                        .with_context(|| format!("Unable to write patched {path}"))?;
                }
                None => {
                    if let Some(path) = &file.old_path {
                        std::fs::remove_file(root.join(path))
                            .with_context(|| format!("Unable to delete {path}"))?;
                    }
                }
            }
        }

        Ok(())
    }

    fn three_way_merge(&self, input: &MergeInput) -> anyhow::Result<MergeResult> {
        let output = Diff3::new(&input.base, &input.ours, &input.theirs)
            .merge(&input.ours_label, &input.theirs_label);

        Ok(MergeResult {
            content: Bytes::from(output.content),
            conflicted: output.conflicted,
        })
    }
}

/// Delegates to `diff -u`, `patch` and `merge -p` found on `PATH`
#[derive(Debug, Clone, Copy, Default)]
pub struct ExternalDiffTool;

impl ExternalDiffTool {
    fn scratch_file(content: &[u8]) -> anyhow::Result<tempfile::NamedTempFile> {
        let mut file = tempfile::NamedTempFile::new().context("Unable to create scratch file")?;
        file.write_all(content)?;
        file.flush()?;
        Ok(file)
    }
}

impl DiffTool for ExternalDiffTool {
    fn compute_diff(&self, old: &DiffSide, new: &DiffSide) -> anyhow::Result<String> {
        let path = new.content.as_ref().map_or(&old.path, |_| &new.path);
        let old_file = old.content.as_deref().map(Self::scratch_file).transpose()?;
        let new_file = new.content.as_deref().map(Self::scratch_file).transpose()?;

        let old_label = old_file.as_ref().map_or(NULL_PATH.to_string(), |_| format!("a/{path}"));
        let new_label = new_file.as_ref().map_or(NULL_PATH.to_string(), |_| format!("b/{path}"));

        let output = Command::new("diff")
            .arg("-u")
            .args(["--label", &old_label, "--label", &new_label])
            .arg(old_file.as_ref().map_or(Path::new(NULL_PATH), |file| file.path()))
            .arg(new_file.as_ref().map_or(Path::new(NULL_PATH), |file| file.path()))
            .output()
            .context("Unable to run diff")?;

        match output.status.code() {
            Some(0) => Ok(String::new()),
            Some(1) => Ok(format!(
                "diff --git a/{path} b/{path}\n{}",
                String::from_utf8_lossy(&output.stdout)
            )),
            _ => anyhow::bail!("diff failed: {}", String::from_utf8_lossy(&output.stderr)),
        }
    }

    fn apply_patch(&self, root: &Path, patch: &str) -> anyhow::Result<()> {
        let mut child = Command::new("patch")
            .args(["--batch", "--silent", "-p1", "-d"])
            .arg(root)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .context("Unable to run patch")?;

        child
            .stdin
            .take()
            .context("patch stdin is not available")?
            .write_all(patch.as_bytes())?;

        let output = child.wait_with_output()?;
        if !output.status.success() {
            anyhow::bail!("patch failed: {}", String::from_utf8_lossy(&output.stdout));
        }

        Ok(())
    }

    fn three_way_merge(&self, input: &MergeInput) -> anyhow::Result<MergeResult> {
        let ours = Self::scratch_file(&input.ours)?;
        let base = Self::scratch_file(&input.base)?;
        let theirs = Self::scratch_file(&input.theirs)?;

        let output = Command::new("merge")
            .arg("-p")
            .args(["-L", &input.ours_label, "-L", "base", "-L", &input.theirs_label])
            .arg(ours.path())
            .arg(base.path())
            .arg(theirs.path())
            .output()
            .context("Unable to run merge")?;

        let conflicted = match output.status.code() {
            Some(0) => false,
            Some(1) => true,
            _ => anyhow::bail!("merge failed: {}", String::from_utf8_lossy(&output.stderr)),
        };

        Ok(MergeResult {
            content: Bytes::from(output.stdout),
            conflicted,
        })
    }
}
