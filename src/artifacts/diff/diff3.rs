//! Three-way line merge
//!
//! Lines of the base that both sides kept unchanged are stable; the runs between
//! stable lines become chunks. A chunk changed on one side only takes that side, a
//! chunk changed identically on both sides is taken once, and anything else is a
//! conflict.

use crate::artifacts::diff::myers::{DiffAlgorithm, Edit, MyersDiff};
use crate::artifacts::diff::split_lines;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Chunk<'m> {
    Clean(Vec<&'m [u8]>),
    Conflict {
        ours: Vec<&'m [u8]>,
        theirs: Vec<&'m [u8]>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Merge3Output {
    pub content: Vec<u8>,
    pub conflicted: bool,
}

pub struct Diff3<'m> {
    base: Vec<&'m [u8]>,
    ours: Vec<&'m [u8]>,
    theirs: Vec<&'m [u8]>,
    /// 1-based base line to 1-based ours line, for lines left unchanged
    match_ours: HashMap<usize, usize>,
    match_theirs: HashMap<usize, usize>,
    line_base: usize,
    line_ours: usize,
    line_theirs: usize,
    chunks: Vec<Chunk<'m>>,
}

impl<'m> Diff3<'m> {
    pub fn new(base: &'m [u8], ours: &'m [u8], theirs: &'m [u8]) -> Self {
        let base = split_lines(base);
        let ours = split_lines(ours);
        let theirs = split_lines(theirs);

        let match_ours = Self::matches(&base, &ours);
        let match_theirs = Self::matches(&base, &theirs);

        Diff3 {
            base,
            ours,
            theirs,
            match_ours,
            match_theirs,
            line_base: 0,
            line_ours: 0,
            line_theirs: 0,
            chunks: Vec::new(),
        }
    }

    fn matches(base: &[&[u8]], other: &[&[u8]]) -> HashMap<usize, usize> {
        MyersDiff::new(base, other)
            .diff()
            .into_iter()
            .filter_map(|edit| match edit {
                Edit::Equal { a, b } => Some((a + 1, b + 1)),
                _ => None,
            })
            .collect()
    }

    pub fn merge(mut self, ours_label: &str, theirs_label: &str) -> Merge3Output {
        loop {
            match self.find_next_mismatch() {
                Some(1) => match self.find_next_match() {
                    (o, Some(a), Some(b)) => self.emit_chunk(o, a, b),
                    _ => {
                        self.emit_final_chunk();
                        break;
                    }
                },
                Some(i) => self.emit_chunk(
                    self.line_base + i,
                    self.line_ours + i,
                    self.line_theirs + i,
                ),
                None => {
                    self.emit_final_chunk();
                    break;
                }
            }
        }

        self.render(ours_label, theirs_label)
    }

    fn find_next_mismatch(&self) -> Option<usize> {
        let mut i = 1;
        while self.in_bounds(i)
            && self.is_match(&self.match_ours, self.line_ours, i)
            && self.is_match(&self.match_theirs, self.line_theirs, i)
        {
            i += 1;
        }

        self.in_bounds(i).then_some(i)
    }

    fn in_bounds(&self, i: usize) -> bool {
        self.line_base + i <= self.base.len()
            || self.line_ours + i <= self.ours.len()
            || self.line_theirs + i <= self.theirs.len()
    }

    fn is_match(&self, matches: &HashMap<usize, usize>, offset: usize, i: usize) -> bool {
        matches.get(&(self.line_base + i)) == Some(&(offset + i))
    }

    fn find_next_match(&self) -> (usize, Option<usize>, Option<usize>) {
        let mut o = self.line_base + 1;
        while o <= self.base.len()
            && !(self.match_ours.contains_key(&o) && self.match_theirs.contains_key(&o))
        {
            o += 1;
        }

        (
            o,
            self.match_ours.get(&o).copied(),
            self.match_theirs.get(&o).copied(),
        )
    }

    fn emit_chunk(&mut self, o: usize, a: usize, b: usize) {
        self.write_chunk(
            self.base[self.line_base..o - 1].to_vec(),
            self.ours[self.line_ours..a - 1].to_vec(),
            self.theirs[self.line_theirs..b - 1].to_vec(),
        );
        (self.line_base, self.line_ours, self.line_theirs) = (o - 1, a - 1, b - 1);
    }

    fn emit_final_chunk(&mut self) {
        self.write_chunk(
            self.base[self.line_base..].to_vec(),
            self.ours[self.line_ours..].to_vec(),
            self.theirs[self.line_theirs..].to_vec(),
        );
    }

    fn write_chunk(&mut self, base: Vec<&'m [u8]>, ours: Vec<&'m [u8]>, theirs: Vec<&'m [u8]>) {
        let chunk = if ours == base || ours == theirs {
            Chunk::Clean(theirs)
        } else if theirs == base {
            Chunk::Clean(ours)
        } else {
            Chunk::Conflict { ours, theirs }
        };

        self.chunks.push(chunk);
    }

    fn render(self, ours_label: &str, theirs_label: &str) -> Merge3Output {
        let mut content = Vec::new();
        let mut conflicted = false;

        for chunk in self.chunks {
            match chunk {
                Chunk::Clean(lines) => lines.iter().for_each(|line| content.extend_from_slice(line)),
                Chunk::Conflict { ours, theirs } => {
                    conflicted = true;
                    content.extend_from_slice(format!("<<<<<<< {ours_label}\n").as_bytes());
                    Self::write_section(&mut content, &ours);
                    content.extend_from_slice(b"=======\n");
                    Self::write_section(&mut content, &theirs);
                    content.extend_from_slice(format!(">>>>>>> {theirs_label}\n").as_bytes());
                }
            }
        }

        Merge3Output {
            content,
            conflicted,
        }
    }

    /// Conflict sections always end in a newline so the markers stay on their own line
    fn write_section(content: &mut Vec<u8>, lines: &[&[u8]]) {
        for line in lines {
            content.extend_from_slice(line);
        }
        if lines.last().is_some_and(|line| !line.ends_with(b"\n")) {
            content.push(b'\n');
        }
    }
}
