//! Command helper utilities

use std::path::{Path, PathBuf};
use std::time::Duration;

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::error::{BundleError, Result};
use crate::install::InstallOutcome;
use crate::overlap::OverlapReport;
use crate::project::Project;

/// Resolve project path from optional argument
///
/// If a project path is provided, use it. Otherwise,
/// resolve to the current directory.
pub fn resolve_project_path(project: Option<PathBuf>) -> Result<PathBuf> {
    let path = match project {
        Some(path) => path,
        None => std::env::current_dir().map_err(|e| BundleError::IoError {
            message: format!("Failed to get current directory: {e}"),
        })?,
    };
    dunce::canonicalize(&path).map_err(|_| BundleError::ProjectNotFound {
        path: path.display().to_string(),
    })
}

/// Open the project containing the given (or current) directory
pub fn open_project(project: Option<PathBuf>) -> Result<Project> {
    let start = resolve_project_path(project)?;
    let root = Project::find_from(&start).ok_or_else(|| BundleError::ProjectNotFound {
        path: start.display().to_string(),
    })?;
    Project::open(&root)
}

/// Open the enclosing project, initializing one at the directory if none exists
pub fn open_or_init_project(project: Option<PathBuf>) -> Result<Project> {
    let start = resolve_project_path(project)?;
    match Project::find_from(&start) {
        Some(root) => Project::open(&root),
        None => Project::init(&start),
    }
}

/// Path relative to the project root for display
pub fn display_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}

/// Spinner shown while a long step runs
pub fn create_progress_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg}...") {
        pb.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

pub fn finish_progress_bar(pb: Option<ProgressBar>) {
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
}

/// Print overlap warnings for a candidate bundle
pub fn print_overlaps(title: &str, report: &OverlapReport) {
    if report.is_empty() {
        return;
    }
    let warn = Style::new().bold().yellow();

    for package in &report.packages {
        eprintln!(
            "{} '{}' shares {} file(s) with installed bundle '{}':",
            warn.apply_to("Warning:"),
            title,
            package.shared_paths.len(),
            package.title
        );
        for path in &package.shared_paths {
            eprintln!("    {path}");
        }
    }

    if !report.loose_files.is_empty() {
        eprintln!(
            "{} '{}' will overwrite {} file(s) not installed by any bundle:",
            warn.apply_to("Warning:"),
            title,
            report.loose_files.len()
        );
        for path in &report.loose_files {
            eprintln!("    {path}");
        }
    }
}

/// Print how an install step ended; a failed extraction is an error
pub fn report_outcome(outcome: InstallOutcome) -> Result<()> {
    match outcome {
        InstallOutcome::Installed(summary) => {
            println!(
                "{} {} ({} file(s) recorded)",
                Style::new().bold().green().apply_to("Installed"),
                Style::new().bold().yellow().apply_to(&summary.manifest.title),
                summary.produced.len()
            );
            Ok(())
        }
        InstallOutcome::Pending { title } => {
            println!(
                "Import of '{title}' is running. Run 'bundlekeeper resume' once it has finished."
            );
            Ok(())
        }
        InstallOutcome::Cancelled { title } => {
            println!("Install of '{title}' was cancelled. No changes were recorded.");
            Ok(())
        }
        InstallOutcome::Failed { title, message } => {
            Err(BundleError::ExtractionFailed { title, message })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::create_temp_dir;

    #[test]
    fn test_open_project_missing() {
        let temp = create_temp_dir();
        let err = open_project(Some(temp.path().to_path_buf())).unwrap_err();
        assert!(matches!(err, BundleError::ProjectNotFound { .. }));
    }

    #[test]
    fn test_open_project_from_subdirectory() {
        let temp = create_temp_dir();
        Project::init(temp.path()).unwrap();
        let nested = temp.path().join("Assets").join("Props");
        std::fs::create_dir_all(&nested).unwrap();

        let project = open_project(Some(nested)).unwrap();
        assert_eq!(project.root, dunce::canonicalize(temp.path()).unwrap());
    }

    #[test]
    fn test_open_or_init_creates_state_dir() {
        let temp = create_temp_dir();
        let project = open_or_init_project(Some(temp.path().to_path_buf())).unwrap();
        assert!(project.state_dir.is_dir());
    }

    #[test]
    fn test_resolve_missing_directory() {
        let temp = create_temp_dir();
        let err = resolve_project_path(Some(temp.path().join("missing"))).unwrap_err();
        assert!(matches!(err, BundleError::ProjectNotFound { .. }));
    }

    #[test]
    fn test_failed_outcome_is_error() {
        let err = report_outcome(InstallOutcome::Failed {
            title: "Props".to_string(),
            message: "boom".to_string(),
        })
        .unwrap_err();
        assert!(matches!(err, BundleError::ExtractionFailed { .. }));
    }

    #[test]
    fn test_display_path_strips_root() {
        let root = Path::new("/project");
        assert_eq!(
            display_path(root, &root.join("Assets").join("a.cs")),
            Path::new("Assets").join("a.cs").display().to_string()
        );
    }
}
