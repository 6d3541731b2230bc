//! Resume command implementation

use std::path::PathBuf;

use crate::commands::helpers::{open_project, report_outcome};
use crate::error::Result;
use crate::extractor;
use crate::install::Installer;
use crate::vcs;

/// Run resume command
pub fn run(project: Option<PathBuf>) -> Result<()> {
    let project = open_project(project)?;
    let vcs = vcs::for_project(&project)?;
    let extractor = extractor::for_project(&project);
    let mut installer = Installer::new(&project, vcs.as_ref(), extractor.as_ref())?;

    report_outcome(installer.resume()?)
}
