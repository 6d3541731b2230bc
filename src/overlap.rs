//! Overlap detection between a candidate bundle and the project
//!
//! Overlaps are advisory: they are reported before an install so the user
//! knows which installed bundles or untracked files the candidate would
//! touch, but they never block it.

use std::collections::BTreeSet;

use crate::manifest::BundleManifest;
use crate::snapshot::ProjectSnapshot;

/// An installed bundle sharing paths with the candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageOverlap {
    pub title: String,
    pub shared_paths: Vec<String>,
}

/// Everything a candidate collides with
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlapReport {
    /// Installed bundles whose canonical lists intersect the candidate's
    pub packages: Vec<PackageOverlap>,

    /// Untracked project files the candidate would also install
    pub loose_files: Vec<String>,
}

impl OverlapReport {
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty() && self.loose_files.is_empty()
    }
}

/// Compare a candidate against installed manifests and a live snapshot.
///
/// The installed manifest sharing the candidate's title is a re-install of
/// the same bundle and is not reported.
pub fn find_overlaps(
    candidate: &BundleManifest,
    installed: &[BundleManifest],
    live: &ProjectSnapshot,
) -> OverlapReport {
    let candidate_paths: BTreeSet<&str> = candidate
        .canonical_file_list
        .iter()
        .map(String::as_str)
        .collect();

    let packages = installed
        .iter()
        .filter(|m| m.title != candidate.title)
        .filter_map(|m| {
            let shared_paths: Vec<String> = m
                .canonical_file_list
                .iter()
                .filter(|p| candidate_paths.contains(p.as_str()))
                .cloned()
                .collect();
            (!shared_paths.is_empty()).then(|| PackageOverlap {
                title: m.title.clone(),
                shared_paths,
            })
        })
        .collect();

    let tracked: BTreeSet<&str> = installed
        .iter()
        .flat_map(|m| m.canonical_file_list.iter().map(String::as_str))
        .collect();

    let loose_files = live
        .paths()
        .into_iter()
        .filter(|p| !tracked.contains(p) && candidate_paths.contains(p))
        .map(str::to_string)
        .collect();

    let report = OverlapReport {
        packages,
        loose_files,
    };
    if !report.is_empty() {
        tracing::warn!(
            title = %candidate.title,
            packages = report.packages.len(),
            loose_files = report.loose_files.len(),
            "candidate overlaps existing files"
        );
    }
    report
}
