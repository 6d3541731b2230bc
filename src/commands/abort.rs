//! Abort command implementation

use std::path::PathBuf;

use crate::commands::helpers::open_project;
use crate::error::Result;
use crate::session::SessionStore;

/// Run abort command
pub fn run(project: Option<PathBuf>) -> Result<()> {
    let project = open_project(project)?;
    let sessions = SessionStore::for_project(&project);

    if !sessions.exists() {
        println!("No install is pending.");
        return Ok(());
    }

    match sessions.discard()? {
        Some(title) => println!("Discarded pending install of '{title}'."),
        None => println!("Discarded unreadable install session."),
    }
    Ok(())
}
