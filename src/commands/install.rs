//! Install command implementation
//!
//! A leftover session from an interrupted install is finished before the
//! new bundle is started (or discarded with `--force`). Overlaps with
//! installed bundles and untracked files are printed as warnings and never
//! block the install.

use std::path::PathBuf;

use crate::cli::InstallArgs;
use crate::commands::helpers::{
    create_progress_spinner, finish_progress_bar, open_or_init_project, print_overlaps,
    report_outcome,
};
use crate::error::Result;
use crate::extractor;
use crate::install::Installer;
use crate::vcs;

/// Run install command
pub fn run(project: Option<PathBuf>, args: InstallArgs) -> Result<()> {
    let project = open_or_init_project(project)?;
    let vcs = vcs::for_project(&project)?;
    let extractor = extractor::for_project(&project);
    let mut installer = Installer::new(&project, vcs.as_ref(), extractor.as_ref())?;

    finish_leftover_session(&mut installer, args.force)?;

    let (candidate, overlaps) = installer.preview(&args.container)?;
    print_overlaps(&candidate.title, &overlaps);

    let interactive = args.interactive || project.config.extractor.interactive;
    // The importer owns the terminal in interactive mode
    let pb = (!interactive).then(|| create_progress_spinner(&format!("Installing {}", candidate.title)));
    let outcome = installer.begin(&args.container, interactive);
    finish_progress_bar(pb);

    report_outcome(outcome?)
}

fn finish_leftover_session(installer: &mut Installer<'_>, force: bool) -> Result<()> {
    if force {
        if let Some(title) = installer.abort()? {
            println!("Discarded pending install of '{title}'.");
        }
        return Ok(());
    }

    if let Some(session) = installer.pending()? {
        println!("Finishing interrupted install of '{}'...", session.title());
        report_outcome(installer.resume()?)?;
    }
    Ok(())
}
