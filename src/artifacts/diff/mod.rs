//! Line-based diffing: Myers' algorithm, hunk grouping, and the targets a
//! diff can be taken between (index blob, worktree file, nothing).

pub mod diff_algorithm;
pub mod diff_target;
