use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::branch::head::Head;
use crate::artifacts::diff::tool::{DiffSide, MergeInput};
use crate::artifacts::merge::ancestry::{ancestry_chain, common_ancestor, is_fast_forward};
use crate::artifacts::merge::reconcile::{Resolution, plan};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepositoryError;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::io::Write;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The current branch was moved to the target tip
    FastForward(ObjectId),
    /// A merge commit was created; `conflicts` lists the paths left with markers
    Merged {
        commit: ObjectId,
        conflicts: Vec<String>,
    },
}

/// The three flattened trees a merge reconciles
struct MergeSides {
    base: BTreeMap<String, ObjectId>,
    ours: BTreeMap<String, ObjectId>,
    theirs: BTreeMap<String, ObjectId>,
}

impl Repository {
    /// Merge `target` into the current branch
    ///
    /// The working tree is reset to the common ancestor and every path is then
    /// reconciled in place. A failure part way through leaves the working tree and
    /// index partially merged; nothing is rolled back.
    pub async fn merge(
        &self,
        target: &str,
        message: Option<&str>,
    ) -> anyhow::Result<MergeOutcome> {
        let current = match self.refs().read_head()? {
            Head::Attached(branch) => branch,
            Head::Detached(_) => return Err(RepositoryError::DetachedHeadMergeRefused.into()),
        };
        let target = BranchName::try_parse(target)?;

        let target_tip = self
            .refs()
            .read_branch(&target)?
            .ok_or_else(|| anyhow::anyhow!("branch {target} has no commits to merge"))?;
        let target_chain = ancestry_chain(self.database(), &target_tip)?;

        let current_tip = match self.refs().read_branch(&current)? {
            Some(tip) if !is_fast_forward(&tip, &target_chain) => tip,
            _ => return self.fast_forward(&current, target_tip),
        };
        let current_chain = ancestry_chain(self.database(), &current_tip)?;

        let ancestor = common_ancestor(&current_chain, &target_chain).ok_or_else(|| {
            anyhow::anyhow!("branches {current} and {target} share no history")
        })?;
        tracing::info!(%current_tip, %target_tip, %ancestor, "found common ancestor");

        let sides = MergeSides {
            base: self.database().flatten_commit(&ancestor)?,
            ours: self.database().flatten_commit(&current_tip)?,
            theirs: self.database().flatten_commit(&target_tip)?,
        };

        let index = self.index();
        let mut index = index.lock().await;

        let ancestor_tree = self.database().parse_commit(&ancestor)?.tree_oid().clone();
        self.materialize_tree(&mut index, Some(&ancestor_tree))?;

        let resolutions = plan(&sides.base, &sides.ours, &sides.theirs);
        let mut conflicts = Vec::new();
        for (path, resolution) in &resolutions {
            let conflicted = self.reconcile_path(path, resolution, &sides, &current, &target)?;
            if conflicted {
                conflicts.push(path.clone());
            }
        }

        let deleted = resolutions
            .iter()
            .filter(|(_, resolution)| **resolution == Resolution::Deleted)
            .map(|(path, _)| path.as_str());
        self.workspace().prune_empty_dirs(deleted)?;

        index.discard_all();
        for (path, resolution) in &resolutions {
            if *resolution != Resolution::Deleted {
                self.stage_file(&mut index, path)?;
            }
        }
        index.write_updates()?;

        let tree_id = self.store_index_tree(&index)?;
        let message = message
            .map(str::to_string)
            .unwrap_or_else(|| format!("Merge: {current} {target}"));
        let commit_id = self.create_commit(&tree_id, &message, vec![current_tip, target_tip])?;
        self.refs().update_branch(&target, &commit_id)?;

        tracing::info!(commit = %commit_id, conflicts = conflicts.len(), "merge committed");
        writeln!(self.writer(), "{commit_id}")?;
        for path in &conflicts {
            writeln!(self.writer(), "CONFLICT (content): Merge conflict in {path}")?;
        }

        Ok(MergeOutcome::Merged {
            commit: commit_id,
            conflicts,
        })
    }

    fn fast_forward(
        &self,
        current: &BranchName,
        target_tip: ObjectId,
    ) -> anyhow::Result<MergeOutcome> {
        self.refs().update_branch(current, &target_tip)?;

        tracing::info!(branch = %current, tip = %target_tip, "fast-forwarded");
        writeln!(self.writer(), "Fast-forward")?;

        Ok(MergeOutcome::FastForward(target_tip))
    }

    /// Bring one path of the ancestor checkout to its merged state; returns whether
    /// conflict markers were written
    fn reconcile_path(
        &self,
        path: &str,
        resolution: &Resolution,
        sides: &MergeSides,
        current: &BranchName,
        target: &BranchName,
    ) -> anyhow::Result<bool> {
        match resolution {
            Resolution::Unchanged => {}
            Resolution::PatchOurs => self.patch_from_base(path, &sides.base, &sides.ours)?,
            Resolution::PatchTheirs => self.patch_from_base(path, &sides.base, &sides.theirs)?,
            Resolution::Add(oid) => {
                let blob = self.database().parse_blob(oid)?;
                self.workspace().write_file(path, blob.content())?;
            }
            Resolution::Deleted => self.workspace().remove_file(path)?,
            Resolution::MergeBoth | Resolution::AddBoth => {
                let input = MergeInput::new(
                    self.blob_content(sides.base.get(path))?.unwrap_or_default(),
                    self.blob_content(sides.ours.get(path))?.unwrap_or_default(),
                    self.blob_content(sides.theirs.get(path))?.unwrap_or_default(),
                    current.to_string(),
                    target.to_string(),
                );

                let merged = self.diff_tool().three_way_merge(&input)?;
                self.workspace().write_file(path, &merged.content)?;

                return Ok(merged.conflicted);
            }
        }

        Ok(false)
    }

    /// Replay one side's change to `path` onto the ancestor content in the working tree
    ///
    /// Patches are text, so content that is not UTF-8 is copied from the changed side
    /// as a whole; the ancestor is checked out, so the result is the same.
    fn patch_from_base(
        &self,
        path: &str,
        base: &BTreeMap<String, ObjectId>,
        side: &BTreeMap<String, ObjectId>,
    ) -> anyhow::Result<()> {
        let base_content = self.blob_content(base.get(path))?;
        let side_content = self.blob_content(side.get(path))?;

        let is_text = |content: &Option<Bytes>| {
            content
                .as_ref()
                .is_none_or(|bytes| std::str::from_utf8(bytes).is_ok())
        };
        if !is_text(&base_content) || !is_text(&side_content) {
            tracing::debug!(path, "copying one-sided change to binary content");
            return match side_content {
                Some(content) => self.workspace().write_file(path, &content),
                None => self.workspace().remove_file(path),
            };
        }

        let patch = self.diff_tool().compute_diff(
            &DiffSide::new(path.to_string(), base_content),
            &DiffSide::new(path.to_string(), side_content),
        )?;

        tracing::debug!(path, "applying one-sided change");
        self.diff_tool().apply_patch(self.path(), &patch)
    }

    /// Content of a blob, `None` for a path missing from a tree
    pub(crate) fn blob_content(&self, oid: Option<&ObjectId>) -> anyhow::Result<Option<Bytes>> {
        match oid {
            Some(oid) => Ok(Some(self.database().parse_blob(oid)?.content().clone())),
            None => Ok(None),
        }
    }
}
