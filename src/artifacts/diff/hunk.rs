use crate::artifacts::diff::myers::Edit;

/// A run of edits with surrounding context, printed under one `@@` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    /// 0-based position of the first old line covered
    pub a_start: usize,
    pub a_count: usize,
    /// 0-based position of the first new line covered
    pub b_start: usize,
    pub b_count: usize,
    pub edits: Vec<Edit>,
}

impl Hunk {
    /// Group an edit script into hunks, merging changes whose gap is at most twice
    /// the context size
    pub fn build(edits: &[Edit], context: usize) -> Vec<Hunk> {
        // number of old/new lines consumed before each edit
        let mut offsets = Vec::with_capacity(edits.len() + 1);
        let (mut a_pos, mut b_pos) = (0, 0);
        for edit in edits {
            offsets.push((a_pos, b_pos));
            match edit {
                Edit::Delete { .. } => a_pos += 1,
                Edit::Insert { .. } => b_pos += 1,
                Edit::Equal { .. } => {
                    a_pos += 1;
                    b_pos += 1;
                }
            }
        }
        offsets.push((a_pos, b_pos));

        let changes = edits
            .iter()
            .enumerate()
            .filter(|(_, edit)| edit.is_change())
            .map(|(i, _)| i)
            .collect::<Vec<_>>();

        let mut hunks = Vec::new();
        let mut next = 0;
        while next < changes.len() {
            let first = changes[next];
            let mut last = first;
            next += 1;

            while next < changes.len() && changes[next] - last - 1 <= 2 * context {
                last = changes[next];
                next += 1;
            }

            let start = first.saturating_sub(context);
            let end = (last + 1 + context).min(edits.len());
            let slice = &edits[start..end];

            hunks.push(Hunk {
                a_start: offsets[start].0,
                a_count: slice.iter().filter(|e| !matches!(e, Edit::Insert { .. })).count(),
                b_start: offsets[start].1,
                b_count: slice.iter().filter(|e| !matches!(e, Edit::Delete { .. })).count(),
                edits: slice.to_vec(),
            });
        }

        hunks
    }

    /// `@@ -l,s +l,s @@` with 1-based line numbers; an empty side names the line before
    pub fn header(&self) -> String {
        format!(
            "@@ -{} +{} @@",
            Self::range(self.a_start, self.a_count),
            Self::range(self.b_start, self.b_count)
        )
    }

    fn range(start: usize, count: usize) -> String {
        if count == 0 {
            format!("{start},0")
        } else {
            format!("{},{count}", start + 1)
        }
    }
}
