//! Unified patch text
//!
//! Formatting covers a single old/new file pair; parsing and applying handle any
//! number of `diff --git` sections, stripping one leading path component (`a/`, `b/`).

use crate::artifacts::diff::hunk::Hunk;
use crate::artifacts::diff::myers::{DiffAlgorithm, Edit, MyersDiff};
use crate::artifacts::diff::{CONTEXT_LINES, NO_NEWLINE_MARKER, NULL_PATH, split_lines};
use anyhow::Context;
use std::fmt::Write;

/// Unified diff of one file; empty when both sides are equal
///
/// `None` content stands for a missing file (`/dev/null`).
pub fn format_patch(path: &str, old: Option<&[u8]>, new: Option<&[u8]>) -> String {
    if old == new {
        return String::new();
    }

    let a = split_lines(old.unwrap_or_default());
    let b = split_lines(new.unwrap_or_default());
    let edits = MyersDiff::new(&a, &b).diff();
    let hunks = Hunk::build(&edits, CONTEXT_LINES);

    let old_label = old.map_or_else(|| NULL_PATH.to_string(), |_| format!("a/{path}"));
    let new_label = new.map_or_else(|| NULL_PATH.to_string(), |_| format!("b/{path}"));

    let mut patch = String::new();
    let _ = writeln!(patch, "diff --git a/{path} b/{path}");
    let _ = writeln!(patch, "--- {old_label}");
    let _ = writeln!(patch, "+++ {new_label}");

    for hunk in hunks {
        let _ = writeln!(patch, "{}", hunk.header());
        for edit in &hunk.edits {
            let line = match *edit {
                Edit::Delete { a: i } | Edit::Equal { a: i, .. } => a[i],
                Edit::Insert { b: j } => b[j],
            };
            patch.push(edit.marker());
            patch.push_str(&String::from_utf8_lossy(line));
            if !line.ends_with(b"\n") {
                patch.push('\n');
                patch.push_str(NO_NEWLINE_MARKER);
                patch.push('\n');
            }
        }
    }

    patch
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchLine {
    pub marker: char,
    /// Line content including its newline unless the line ends the file
    pub text: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchHunk {
    pub a_start: usize,
    pub a_count: usize,
    pub lines: Vec<PatchLine>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePatch {
    /// `None` when the file is being created
    pub old_path: Option<String>,
    /// `None` when the file is being deleted
    pub new_path: Option<String>,
    pub hunks: Vec<PatchHunk>,
}

impl FilePatch {
    /// Split a multi-file unified diff into per-file patches
    pub fn parse_all(patch: &str) -> anyhow::Result<Vec<FilePatch>> {
        let mut files = Vec::new();
        let mut lines = patch.split_inclusive('\n').peekable();

        while let Some(line) = lines.next() {
            let Some(old) = line.strip_prefix("--- ") else {
                continue;
            };
            let new = lines
                .next()
                .and_then(|line| line.strip_prefix("+++ "))
                .context("patch has a `---` line without a matching `+++` line")?;

            let mut file = FilePatch {
                old_path: strip_path(old),
                new_path: strip_path(new),
                hunks: Vec::new(),
            };

            while let Some(header) = lines.next_if(|line| line.starts_with("@@ ")) {
                let ((a_start, a_count), (_, b_count)) = parse_ranges(&header[3..])?;

                let mut hunk = PatchHunk {
                    a_start,
                    a_count,
                    lines: Vec::new(),
                };
                let (mut old_left, mut new_left) = (a_count, b_count);

                while old_left > 0 || new_left > 0 {
                    let line = lines
                        .next()
                        .with_context(|| format!("hunk {header:?} is truncated"))?;
                    // some tools drop the space of an empty context line
                    let (marker, text) = match line {
                        "\n" => (" ", "\n"),
                        _ => line.split_at(line.chars().next().map_or(0, char::len_utf8)),
                    };
                    let marker = marker.chars().next().unwrap_or(' ');

                    match marker {
                        ' ' => {
                            old_left = old_left.saturating_sub(1);
                            new_left = new_left.saturating_sub(1);
                        }
                        '-' => old_left = old_left.saturating_sub(1),
                        '+' => new_left = new_left.saturating_sub(1),
                        _ => anyhow::bail!("unexpected line in hunk {header:?}: {line:?}"),
                    }
                    hunk.lines.push(PatchLine {
                        marker,
                        text: text.as_bytes().to_vec(),
                    });

                    if lines.next_if(|next| next.starts_with('\\')).is_some()
                        && let Some(last) = hunk.lines.last_mut()
                        && last.text.ends_with(b"\n")
                    {
                        last.text.pop();
                    }
                }
                file.hunks.push(hunk);
            }

            files.push(file);
        }

        Ok(files)
    }

    /// Apply the hunks to the old content, verifying every context and removed line
    pub fn apply(&self, old: &[u8]) -> anyhow::Result<Vec<u8>> {
        let source = split_lines(old);
        let mut result = Vec::with_capacity(old.len());
        let mut cursor = 0;

        for hunk in &self.hunks {
            // an empty old range names the line after which to insert
            let start = if hunk.a_count == 0 {
                hunk.a_start
            } else {
                hunk.a_start.saturating_sub(1)
            };
            if start < cursor || start > source.len() {
                anyhow::bail!("hunk at line {} is out of order or out of range", hunk.a_start);
            }

            for line in &source[cursor..start] {
                result.extend_from_slice(line);
            }
            cursor = start;

            for line in &hunk.lines {
                match line.marker {
                    '+' => result.extend_from_slice(&line.text),
                    _ => {
                        let original = source.get(cursor).with_context(|| {
                            format!("patch expects more than {} lines", source.len())
                        })?;
                        if *original != line.text.as_slice() {
                            anyhow::bail!(
                                "patch does not apply at line {}: expected {:?}",
                                cursor + 1,
                                String::from_utf8_lossy(&line.text)
                            );
                        }
                        if line.marker == ' ' {
                            result.extend_from_slice(original);
                        }
                        cursor += 1;
                    }
                }
            }
        }

        for line in &source[cursor..] {
            result.extend_from_slice(line);
        }

        Ok(result)
    }
}

fn strip_path(label: &str) -> Option<String> {
    let label = label.trim_end_matches(['\n', '\r']);
    let label = label.split('\t').next().unwrap_or(label);

    if label == NULL_PATH {
        return None;
    }

    Some(
        label
            .split_once('/')
            .map_or(label, |(_, rest)| rest)
            .to_string(),
    )
}

/// Old and new `start,count` pairs from a hunk header remainder such as `-3,4 +3,5 @@`
fn parse_ranges(header: &str) -> anyhow::Result<((usize, usize), (usize, usize))> {
    let mut ranges = header.split_whitespace();
    let old = ranges
        .next()
        .and_then(|range| range.strip_prefix('-'))
        .with_context(|| format!("malformed hunk header: {header:?}"))?;
    let new = ranges
        .next()
        .and_then(|range| range.strip_prefix('+'))
        .with_context(|| format!("malformed hunk header: {header:?}"))?;

    Ok((parse_range(old)?, parse_range(new)?))
}

fn parse_range(range: &str) -> anyhow::Result<(usize, usize)> {
    let (start, count) = range.split_once(',').unwrap_or((range, "1"));
    Ok((
        start.parse().with_context(|| format!("malformed hunk start: {start:?}"))?,
        count.parse().with_context(|| format!("malformed hunk count: {count:?}"))?,
    ))
}
