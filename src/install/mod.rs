//! Resumable installation
//!
//! An install runs as a sequence of phases:
//!
//! ```text
//! Idle -> CandidateBuilt -> PreSnapshotPersisted -> ExtractionTriggered
//!      -> ExtractionCompleted | ExtractionFailed | ExtractionCancelled
//!      -> PostDiffed -> Merged -> Persisted -> Idle
//! ```
//!
//! The install session is written before the extractor is invoked. If the
//! process is torn down while extraction runs, the next invocation finds the
//! session and finishes the install from it with [`Installer::resume`]; no
//! in-memory state is needed to do so.

use std::path::{Path, PathBuf};

use crate::error::{BundleError, Result};
use crate::extractor::{ExtractionEvent, Extractor};
use crate::manifest::{BundleManifest, FileStateEntry, ManifestBuilder, ManifestStore};
use crate::overlap::{OverlapReport, find_overlaps};
use crate::project::Project;
use crate::project::storage::json_bytes;
use crate::session::{InstallSession, SessionStore};
use crate::snapshot::{ProjectSnapshotter, diff};
use crate::transaction::Transaction;
use crate::vcs::{self, VersionControl};

/// Phase of the install state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallPhase {
    Idle,
    CandidateBuilt,
    PreSnapshotPersisted,
    ExtractionTriggered,
    ExtractionCompleted,
    ExtractionFailed,
    ExtractionCancelled,
    PostDiffed,
    Merged,
    Persisted,
}

/// Result of a completed install
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallSummary {
    /// Stored manifest after merging
    pub manifest: BundleManifest,

    /// Files this install created or changed
    pub produced: Vec<FileStateEntry>,

    /// Location of the manifest record
    pub record_path: PathBuf,
}

/// How an install step ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Extraction is still running; finish with [`Installer::resume`]
    Pending { title: String },
    Installed(InstallSummary),
    Failed { title: String, message: String },
    Cancelled { title: String },
}

/// Drives installs of one project
pub struct Installer<'a> {
    manifests: ManifestStore,
    sessions: SessionStore,
    snapshotter: ProjectSnapshotter,
    builder: ManifestBuilder,
    vcs: &'a dyn VersionControl,
    extractor: &'a dyn Extractor,
    phase: InstallPhase,
}

impl<'a> Installer<'a> {
    pub fn new(
        project: &Project,
        vcs: &'a dyn VersionControl,
        extractor: &'a dyn Extractor,
    ) -> Result<Self> {
        Ok(Self {
            manifests: ManifestStore::for_project(project),
            sessions: SessionStore::for_project(project),
            snapshotter: ProjectSnapshotter::for_project(project)?,
            builder: ManifestBuilder::new(project.config.meta_extension.clone()),
            vcs,
            extractor,
            phase: InstallPhase::Idle,
        })
    }

    pub fn phase(&self) -> InstallPhase {
        self.phase
    }

    /// Session of an unfinished install, if any
    pub fn pending(&self) -> Result<Option<InstallSession>> {
        self.sessions.load()
    }

    /// Build the candidate for `container` and report what it overlaps.
    ///
    /// Changes nothing on disk.
    pub fn preview(&self, container: &Path) -> Result<(BundleManifest, OverlapReport)> {
        let candidate = self.builder.build(container)?;
        let installed = self.manifests.list()?;
        let live = self.snapshotter.snapshot()?;
        let report = find_overlaps(&candidate, &installed, &live);
        Ok((candidate, report))
    }

    /// Start installing `container`.
    ///
    /// Fails with [`BundleError::SessionConflict`] before touching anything
    /// when another install is pending.
    pub fn begin(&mut self, container: &Path, interactive: bool) -> Result<InstallOutcome> {
        let candidate = self.builder.build(container)?;
        self.transition(InstallPhase::CandidateBuilt);

        if let Some(existing) = self.sessions.load()? {
            self.phase = InstallPhase::Idle;
            return Err(BundleError::SessionConflict {
                title: existing.title().to_string(),
            });
        }

        let pre = self.snapshotter.snapshot()?;
        let session = InstallSession::new(candidate, pre).with_container(container.display().to_string());
        self.sessions.save(&session)?;
        self.transition(InstallPhase::PreSnapshotPersisted);

        self.transition(InstallPhase::ExtractionTriggered);
        let event = self.extractor.extract(container, interactive);
        self.complete(&session, event)
    }

    /// Apply the extractor's report for `session`
    pub fn complete(&mut self, session: &InstallSession, event: ExtractionEvent) -> Result<InstallOutcome> {
        let title = session.title().to_string();
        match event {
            ExtractionEvent::Started => {
                tracing::debug!(title = %title, "extraction started, install pending");
                Ok(InstallOutcome::Pending { title })
            }
            ExtractionEvent::Failed(message) => {
                self.transition(InstallPhase::ExtractionFailed);
                self.sessions.purge()?;
                self.transition(InstallPhase::Idle);
                tracing::warn!(title = %title, message = %message, "extraction failed");
                Ok(InstallOutcome::Failed { title, message })
            }
            ExtractionEvent::Cancelled => {
                self.transition(InstallPhase::ExtractionCancelled);
                self.sessions.purge()?;
                self.transition(InstallPhase::Idle);
                tracing::info!(title = %title, "extraction cancelled");
                Ok(InstallOutcome::Cancelled { title })
            }
            ExtractionEvent::Completed => {
                self.transition(InstallPhase::ExtractionCompleted);
                self.resume()
            }
        }
    }

    /// Finish the pending install from its durable session
    pub fn resume(&mut self) -> Result<InstallOutcome> {
        let session = self.sessions.load()?.ok_or(BundleError::NoPendingSession)?;
        let title = session.title().to_string();

        let mut post = self.snapshotter.snapshot()?;
        post.sort();
        let produced = diff(&session.pre_install_snapshot, &post);
        self.transition(InstallPhase::PostDiffed);

        self.track_new_files(&session, &produced)?;

        let mut manifest = session.candidate_manifest.clone();
        manifest.installed_file_list = produced.clone();
        if let Some(previous) = self.manifests.load(&title)? {
            manifest.merge_from(&previous);
        }
        self.transition(InstallPhase::Merged);

        let record_path = self.persist(&manifest)?;
        self.transition(InstallPhase::Persisted);

        self.sessions.purge()?;
        self.transition(InstallPhase::Idle);

        tracing::info!(title = %title, files = produced.len(), "installed bundle");
        Ok(InstallOutcome::Installed(InstallSummary {
            manifest,
            produced,
            record_path,
        }))
    }

    /// Discard the pending session; returns its title.
    ///
    /// A session that can no longer be read is discarded too.
    pub fn abort(&mut self) -> Result<Option<String>> {
        let title = self.sessions.discard()?;
        self.phase = InstallPhase::Idle;
        Ok(title)
    }

    /// Add files that did not exist before extraction to version control
    fn track_new_files(&self, session: &InstallSession, produced: &[FileStateEntry]) -> Result<()> {
        let before = session.pre_install_snapshot.paths();
        let index = self.snapshotter.path_index()?;
        let created: Vec<PathBuf> = produced
            .iter()
            .filter(|e| !before.contains(e.path.as_str()))
            .filter_map(|e| index.files.get(&e.path).cloned())
            .collect();

        let untracked = vcs::untracked_paths(self.vcs, &created)?;
        if untracked.is_empty() {
            return Ok(());
        }
        self.vcs.add(&untracked)
    }

    /// Write the manifest record, keeping version control in step
    fn persist(&self, manifest: &BundleManifest) -> Result<PathBuf> {
        let record = self.manifests.record_path(&manifest.title);
        let existed = record.is_file();

        if existed && self.vcs.status(&record)?.is_tracked() {
            self.vcs.checkout(std::slice::from_ref(&record))?;
        }

        let mut transaction = Transaction::new();
        transaction.write_file(&record, &json_bytes(manifest)?)?;
        if !existed {
            // Dropping the transaction restores the store
            self.vcs.add(std::slice::from_ref(&record))?;
        }
        transaction.commit();

        Ok(record)
    }

    fn transition(&mut self, next: InstallPhase) {
        tracing::debug!(from = ?self.phase, to = ?next, "install phase");
        self.phase = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{
        BundleSpec, FakeVcs, ScriptedExtractor, create_project, create_test_files, write_bundle,
    };
    use crate::manifest::store::record_file_name;
    use crate::vcs::NoVcs;

    fn props_bundle(dir: &Path) -> PathBuf {
        write_bundle(
            dir,
            "props.unitypackage",
            &BundleSpec::titled("Props")
                .asset("Assets/Props/Crate.fbx", b"fbx")
                .asset("Assets/Props/Barrel.fbx", b"fbx"),
        )
    }

    fn installed(outcome: InstallOutcome) -> InstallSummary {
        match outcome {
            InstallOutcome::Installed(summary) => summary,
            other => panic!("expected an installed outcome, got {other:?}"),
        }
    }

    #[test]
    fn test_install_records_produced_files() {
        let (temp, project) = create_project();
        let container = props_bundle(temp.path());
        let extractor = ScriptedExtractor::new(&project.root, ExtractionEvent::Completed)
            .writes("Assets/Props/Crate.fbx", b"fbx")
            .writes("Assets/Props/Crate.fbx.meta", b"guid: 1");

        let mut installer = Installer::new(&project, &NoVcs, &extractor).unwrap();
        let summary = installed(installer.begin(&container, false).unwrap());

        assert_eq!(installer.phase(), InstallPhase::Idle);
        let paths: Vec<_> = summary.produced.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["assets/props/crate.fbx", "assets/props/crate.fbx.meta"]);
        assert_eq!(summary.manifest.canonical_file_list.len(), 4);

        let stored = ManifestStore::for_project(&project).get("Props").unwrap();
        assert_eq!(stored, summary.manifest);
        assert!(!SessionStore::for_project(&project).exists());
    }

    #[test]
    fn test_titles_sanitizing_alike_stay_separate_bundles() {
        let (temp, project) = create_project();
        let slash = write_bundle(
            temp.path(),
            "slash.unitypackage",
            &BundleSpec::titled("Tools/Editor").asset("Assets/a.cs", b"a"),
        );
        let colon = write_bundle(
            temp.path(),
            "colon.unitypackage",
            &BundleSpec::titled("Tools:Editor").asset("Assets/b.cs", b"b"),
        );

        let first = ScriptedExtractor::new(&project.root, ExtractionEvent::Completed)
            .writes("Assets/a.cs", b"a");
        installed(
            Installer::new(&project, &NoVcs, &first)
                .unwrap()
                .begin(&slash, false)
                .unwrap(),
        );
        let second = ScriptedExtractor::new(&project.root, ExtractionEvent::Completed)
            .writes("Assets/b.cs", b"b");
        installed(
            Installer::new(&project, &NoVcs, &second)
                .unwrap()
                .begin(&colon, false)
                .unwrap(),
        );

        let store = ManifestStore::for_project(&project);
        assert_eq!(store.list().unwrap().len(), 2);
        let installed_paths = |title: &str| -> Vec<String> {
            store
                .get(title)
                .unwrap()
                .installed_file_list
                .into_iter()
                .map(|e| e.path)
                .collect()
        };
        assert_eq!(installed_paths("Tools/Editor"), vec!["assets/a.cs"]);
        assert_eq!(installed_paths("Tools:Editor"), vec!["assets/b.cs"]);
    }

    #[test]
    fn test_failed_extraction_leaves_store_untouched() {
        let (temp, project) = create_project();
        let container = props_bundle(temp.path());
        let extractor =
            ScriptedExtractor::new(&project.root, ExtractionEvent::Failed("boom".to_string()));

        let mut installer = Installer::new(&project, &NoVcs, &extractor).unwrap();
        let outcome = installer.begin(&container, false).unwrap();

        assert_eq!(
            outcome,
            InstallOutcome::Failed {
                title: "Props".to_string(),
                message: "boom".to_string()
            }
        );
        assert!(ManifestStore::for_project(&project).list().unwrap().is_empty());
        assert!(!SessionStore::for_project(&project).exists());
    }

    #[test]
    fn test_cancelled_extraction_purges_session() {
        let (temp, project) = create_project();
        let container = props_bundle(temp.path());
        let extractor = ScriptedExtractor::new(&project.root, ExtractionEvent::Cancelled);

        let mut installer = Installer::new(&project, &NoVcs, &extractor).unwrap();
        let outcome = installer.begin(&container, false).unwrap();

        assert!(matches!(outcome, InstallOutcome::Cancelled { .. }));
        assert!(!SessionStore::for_project(&project).exists());
        assert!(!ManifestStore::for_project(&project).contains("Props"));
    }

    #[test]
    fn test_session_conflict_before_any_mutation() {
        let (temp, project) = create_project();
        let container = props_bundle(temp.path());
        let pending = ScriptedExtractor::new(&project.root, ExtractionEvent::Started);
        let mut first = Installer::new(&project, &NoVcs, &pending).unwrap();
        assert!(matches!(
            first.begin(&container, false).unwrap(),
            InstallOutcome::Pending { .. }
        ));

        let other = write_bundle(
            temp.path(),
            "tools.unitypackage",
            &BundleSpec::titled("Tools").asset("Assets/Tools/a.cs", b"a"),
        );
        let extractor = ScriptedExtractor::new(&project.root, ExtractionEvent::Completed);
        let mut second = Installer::new(&project, &NoVcs, &extractor).unwrap();
        let err = second.begin(&other, false).unwrap_err();

        assert!(matches!(err, BundleError::SessionConflict { ref title } if title == "Props"));
        assert_eq!(extractor.calls(), 0);
        assert_eq!(second.pending().unwrap().unwrap().title(), "Props");
    }

    #[test]
    fn test_resume_after_restart_matches_uninterrupted_diff() {
        let (temp, project) = create_project();
        let container = props_bundle(temp.path());
        create_test_files(&project.root, &[("Assets/Existing.cs", "keep")]);

        // First process: persist the session, then die while extracting
        let started = ScriptedExtractor::new(&project.root, ExtractionEvent::Started)
            .writes("Assets/Props/Crate.fbx", b"fbx");
        {
            let mut installer = Installer::new(&project, &NoVcs, &started).unwrap();
            assert!(matches!(
                installer.begin(&container, false).unwrap(),
                InstallOutcome::Pending { .. }
            ));
        }
        let session = SessionStore::for_project(&project).load().unwrap().unwrap();

        // Second process: reload and finish
        let idle = ScriptedExtractor::new(&project.root, ExtractionEvent::Completed);
        let mut installer = Installer::new(&project, &NoVcs, &idle).unwrap();
        let summary = installed(installer.resume().unwrap());

        let mut post = ProjectSnapshotter::for_project(&project).unwrap().snapshot().unwrap();
        post.sort();
        assert_eq!(summary.produced, diff(&session.pre_install_snapshot, &post));
        assert_eq!(summary.produced.len(), 1);
        assert_eq!(summary.produced[0].path, "assets/props/crate.fbx");
    }

    #[test]
    fn test_resume_without_session() {
        let (_temp, project) = create_project();
        let extractor = ScriptedExtractor::new(&project.root, ExtractionEvent::Completed);
        let mut installer = Installer::new(&project, &NoVcs, &extractor).unwrap();
        assert!(matches!(
            installer.resume().unwrap_err(),
            BundleError::NoPendingSession
        ));
    }

    #[test]
    fn test_reinstall_merges_installed_history() {
        let (temp, project) = create_project();
        let container = props_bundle(temp.path());

        let first = ScriptedExtractor::new(&project.root, ExtractionEvent::Completed)
            .writes("Assets/Props/Crate.fbx", b"fbx");
        Installer::new(&project, &NoVcs, &first)
            .unwrap()
            .begin(&container, false)
            .unwrap();

        let second = ScriptedExtractor::new(&project.root, ExtractionEvent::Completed)
            .writes("Assets/Props/Barrel.fbx", b"fbx");
        let summary = installed(
            Installer::new(&project, &NoVcs, &second)
                .unwrap()
                .begin(&container, false)
                .unwrap(),
        );

        let paths: Vec<_> = summary
            .manifest
            .installed_file_list
            .iter()
            .map(|e| e.path.as_str())
            .collect();
        assert_eq!(paths, vec!["assets/props/barrel.fbx", "assets/props/crate.fbx"]);
    }

    #[test]
    fn test_new_files_and_record_are_added_to_vcs() {
        let (temp, project) = create_project();
        let container = props_bundle(temp.path());
        let extractor = ScriptedExtractor::new(&project.root, ExtractionEvent::Completed)
            .writes("Assets/Props/Crate.fbx", b"fbx");
        let vcs = FakeVcs::default();

        Installer::new(&project, &vcs, &extractor)
            .unwrap()
            .begin(&container, false)
            .unwrap();

        assert_eq!(
            vcs.calls(),
            vec!["add:Crate.fbx".to_string(), format!("add:{}", record_file_name("Props"))]
        );
    }

    #[test]
    fn test_tracked_record_is_checked_out_before_overwrite() {
        let (temp, project) = create_project();
        let container = props_bundle(temp.path());
        let vcs = FakeVcs::default();
        let store = ManifestStore::for_project(&project);
        store
            .save(&BundleManifest::new("Props", "", Vec::new()))
            .unwrap();
        vcs.track(&store.record_path("Props"));

        let extractor = ScriptedExtractor::new(&project.root, ExtractionEvent::Completed);
        Installer::new(&project, &vcs, &extractor)
            .unwrap()
            .begin(&container, false)
            .unwrap();

        assert_eq!(vcs.calls(), vec![format!("checkout:{}", record_file_name("Props"))]);
    }

    #[test]
    fn test_failed_vcs_add_keeps_session_for_retry() {
        let (temp, project) = create_project();
        let container = props_bundle(temp.path());
        let extractor = ScriptedExtractor::new(&project.root, ExtractionEvent::Completed)
            .writes("Assets/Props/Crate.fbx", b"fbx");
        let vcs = FakeVcs::failing("add");

        let err = Installer::new(&project, &vcs, &extractor)
            .unwrap()
            .begin(&container, false)
            .unwrap_err();

        assert!(matches!(err, BundleError::VcsOperationFailed { .. }));
        assert!(SessionStore::for_project(&project).exists());
        assert!(!ManifestStore::for_project(&project).contains("Props"));

        // Retrying with a working backend finishes the same install
        let summary = installed(
            Installer::new(&project, &NoVcs, &extractor)
                .unwrap()
                .resume()
                .unwrap(),
        );
        assert_eq!(summary.produced.len(), 1);
    }

    #[test]
    fn test_failed_record_add_rolls_back_record() {
        let (temp, project) = create_project();
        let container = props_bundle(temp.path());
        let extractor = ScriptedExtractor::new(&project.root, ExtractionEvent::Completed);
        let vcs = FakeVcs::failing("add");

        // Nothing new on disk, so only the record add runs
        let err = Installer::new(&project, &vcs, &extractor)
            .unwrap()
            .begin(&container, false)
            .unwrap_err();

        assert!(matches!(err, BundleError::VcsOperationFailed { .. }));
        assert_eq!(vcs.calls(), vec![format!("add:{}", record_file_name("Props"))]);
        assert!(!ManifestStore::for_project(&project).record_path("Props").exists());
        assert!(SessionStore::for_project(&project).exists());
    }

    #[test]
    fn test_preview_reports_overlaps_without_mutation() {
        let (temp, project) = create_project();
        let container = props_bundle(temp.path());
        create_test_files(&project.root, &[("Assets/Props/Crate.fbx", "user file")]);
        let extractor = ScriptedExtractor::new(&project.root, ExtractionEvent::Completed);

        let installer = Installer::new(&project, &NoVcs, &extractor).unwrap();
        let (candidate, report) = installer.preview(&container).unwrap();

        assert_eq!(candidate.title, "Props");
        assert_eq!(report.loose_files, vec!["assets/props/crate.fbx"]);
        assert!(!SessionStore::for_project(&project).exists());
        assert_eq!(extractor.calls(), 0);
    }

    #[test]
    fn test_abort_purges_session() {
        let (temp, project) = create_project();
        let container = props_bundle(temp.path());
        let extractor = ScriptedExtractor::new(&project.root, ExtractionEvent::Started);
        let mut installer = Installer::new(&project, &NoVcs, &extractor).unwrap();
        installer.begin(&container, false).unwrap();

        assert_eq!(installer.abort().unwrap().as_deref(), Some("Props"));
        assert!(installer.pending().unwrap().is_none());
        assert_eq!(installer.abort().unwrap(), None);
    }
}
