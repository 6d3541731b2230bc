//! Snapshot differencing

use std::collections::HashSet;

use crate::manifest::FileStateEntry;

use super::ProjectSnapshot;

/// Entries of `post` that do not appear, with identical state, in `pre`.
///
/// This yields files created or changed between the snapshots, sorted by
/// path. Files removed in between are not reported.
pub fn diff(pre: &ProjectSnapshot, post: &ProjectSnapshot) -> Vec<FileStateEntry> {
    let before: HashSet<&FileStateEntry> = pre.entries().iter().collect();

    let mut produced: Vec<FileStateEntry> = post
        .entries()
        .iter()
        .filter(|entry| !before.contains(entry))
        .cloned()
        .collect();
    produced.sort();
    produced.dedup();
    produced
}
