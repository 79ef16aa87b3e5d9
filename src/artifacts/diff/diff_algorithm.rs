//! Myers' shortest-edit-script diff and hunk grouping.
//!
//! The forward pass records one furthest-reaching state per edit distance;
//! backtracking replays them into an edit script of deletions, insertions
//! and equal lines. Hunks keep up to three lines of context on each side
//! and merge when their context would overlap, which is what the
//! `@@ -a,b +c,d @@` headers describe.

use derive_new::new;
use std::fmt::Display;

/// Context lines kept around each change
const HUNK_CONTEXT: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Line<T> {
    number: usize,
    value: T,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit<T> {
    Delete { line: Line<T> },
    Insert { line: Line<T> },
    Equal { line_a: Line<T>, line_b: Line<T> },
}

impl<T> Edit<T> {
    fn is_equal(&self) -> bool {
        matches!(self, Edit::Equal { .. })
    }

    /// Line number on the old side, when this edit has one.
    fn a_number(&self) -> Option<usize> {
        match self {
            Edit::Delete { line } => Some(line.number),
            Edit::Equal { line_a, .. } => Some(line_a.number),
            Edit::Insert { .. } => None,
        }
    }

    /// Line number on the new side, when this edit has one.
    fn b_number(&self) -> Option<usize> {
        match self {
            Edit::Insert { line } => Some(line.number),
            Edit::Equal { line_b, .. } => Some(line_b.number),
            Edit::Delete { .. } => None,
        }
    }
}

impl<T: Clone + Into<String>> Edit<T> {
    pub fn as_string(&self) -> String {
        match self {
            Edit::Delete { line } => format!("-{}", line.value.clone().into()),
            Edit::Insert { line } => format!("+{}", line.value.clone().into()),
            Edit::Equal { line_a, .. } => format!(" {}", line_a.value.clone().into()),
        }
    }
}

impl<T: Clone + Into<String>> Display for Edit<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

/// A group of edits with its `@@` header coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk<T> {
    a_start: usize,
    b_start: usize,
    edits: Vec<Edit<T>>,
}

impl<T> Hunk<T> {
    pub fn a_start(&self) -> usize {
        self.a_start
    }

    pub fn b_start(&self) -> usize {
        self.b_start
    }

    pub fn edits(&self) -> &[Edit<T>] {
        &self.edits
    }

    pub fn a_size(&self) -> usize {
        self.edits
            .iter()
            .filter(|edit| matches!(edit, Edit::Delete { .. } | Edit::Equal { .. }))
            .count()
    }

    pub fn b_size(&self) -> usize {
        self.edits
            .iter()
            .filter(|edit| matches!(edit, Edit::Insert { .. } | Edit::Equal { .. }))
            .count()
    }
}

#[derive(Debug, Clone)]
pub struct MyersDiff<T> {
    a: Vec<Line<T>>,
    b: Vec<Line<T>>,
}

impl<T: Eq + Clone> MyersDiff<T> {
    pub fn new(a: &[T], b: &[T]) -> Self {
        MyersDiff {
            a: Self::lines(a),
            b: Self::lines(b),
        }
    }

    fn lines(document: &[T]) -> Vec<Line<T>> {
        document
            .iter()
            .enumerate()
            .map(|(i, value)| Line::new(i + 1, value.clone()))
            .collect()
    }

    /// One furthest-reaching `v` snapshot per edit distance, ending at the
    /// distance that reaches `(n, m)`.
    fn shortest_edit_trace(&self) -> Vec<Vec<isize>> {
        let (n, m) = (self.a.len() as isize, self.b.len() as isize);
        let max = n + m;
        let offset = max;

        let mut v = vec![0isize; (2 * max + 1) as usize];
        let mut trace = Vec::new();

        for d in 0..=max {
            trace.push(v.clone());

            for k in (-d..=d).step_by(2) {
                let idx = (offset + k) as usize;

                let mut x = if k == -d {
                    v[idx + 1]
                } else if k == d {
                    v[idx - 1] + 1
                } else if v[idx - 1] + 1 > v[idx + 1] {
                    v[idx - 1] + 1
                } else {
                    v[idx + 1]
                };
                let mut y = x - k;

                while x < n && y < m && self.a[x as usize].value == self.b[y as usize].value {
                    x += 1;
                    y += 1;
                }

                v[idx] = x;

                if x >= n && y >= m {
                    return trace;
                }
            }
        }

        trace
    }

    /// The shortest edit script, in order.
    pub fn diff(&self) -> Vec<Edit<T>> {
        if self.a.is_empty() && self.b.is_empty() {
            return Vec::new();
        }

        let (n, m) = (self.a.len() as isize, self.b.len() as isize);
        let offset = n + m;
        let trace = self.shortest_edit_trace();

        let mut edits = Vec::new();
        let (mut x, mut y) = (n, m);

        for (d, v) in trace.iter().enumerate().rev() {
            let d = d as isize;
            let k = x - y;

            let prev_k = if k == -d {
                k + 1
            } else if k == d {
                k - 1
            } else if v[(offset + k - 1) as usize] + 1 > v[(offset + k + 1) as usize] {
                k - 1
            } else {
                k + 1
            };
            let prev_x = v[(offset + prev_k) as usize];
            let prev_y = prev_x - prev_k;

            while x > prev_x && y > prev_y {
                edits.push(Edit::Equal {
                    line_a: self.a[(x - 1) as usize].clone(),
                    line_b: self.b[(y - 1) as usize].clone(),
                });
                x -= 1;
                y -= 1;
            }

            if d > 0 {
                if x == prev_x {
                    edits.push(Edit::Insert {
                        line: self.b[(y - 1) as usize].clone(),
                    });
                } else {
                    edits.push(Edit::Delete {
                        line: self.a[(x - 1) as usize].clone(),
                    });
                }
            }

            x = prev_x;
            y = prev_y;
        }

        edits.reverse();
        edits
    }

    /// The edit script grouped into context hunks.
    pub fn hunks(&self) -> Vec<Hunk<T>> {
        let edits = self.diff();
        let mut hunks = Vec::new();
        let mut i = 0;

        while i < edits.len() {
            if edits[i].is_equal() {
                i += 1;
                continue;
            }

            let start = i.saturating_sub(HUNK_CONTEXT);

            // extend over later changes whose context would overlap ours
            let mut end = i;
            loop {
                while end < edits.len() && !edits[end].is_equal() {
                    end += 1;
                }
                let mut gap = end;
                while gap < edits.len() && edits[gap].is_equal() {
                    gap += 1;
                }
                if gap < edits.len() && gap - end <= 2 * HUNK_CONTEXT {
                    end = gap;
                } else {
                    break;
                }
            }
            let stop = (end + HUNK_CONTEXT).min(edits.len());

            let hunk_edits = edits[start..stop].to_vec();
            let a_start = hunk_edits.iter().find_map(Edit::a_number).unwrap_or(0);
            let b_start = hunk_edits.iter().find_map(Edit::b_number).unwrap_or(0);
            hunks.push(Hunk {
                a_start,
                b_start,
                edits: hunk_edits,
            });

            i = stop;
        }

        hunks
    }
}
