//! Status command implementation

use std::path::PathBuf;

use console::Style;

use crate::commands::helpers::open_project;
use crate::error::Result;
use crate::manifest::ManifestStore;
use crate::session::SessionStore;

/// Run status command
pub fn run(project: Option<PathBuf>) -> Result<()> {
    let project = open_project(project)?;
    let installed = ManifestStore::for_project(&project).list()?;

    println!(
        "{} {}",
        Style::new().bold().apply_to("Project:"),
        project.root.display()
    );
    println!(
        "{} {}",
        Style::new().bold().apply_to("Installed bundles:"),
        installed.len()
    );

    match SessionStore::for_project(&project).load()? {
        Some(session) => {
            println!(
                "{} {}",
                Style::new().bold().apply_to("Pending install:"),
                Style::new().bold().yellow().apply_to(session.title())
            );
            if let Some(container) = &session.container {
                println!("    {} {}", Style::new().bold().apply_to("container:"), container);
            }
            println!(
                "    {} {} file(s)",
                Style::new().bold().apply_to("snapshot:"),
                session.pre_install_snapshot.len()
            );
            println!("Run 'bundlekeeper resume' to finish it or 'bundlekeeper abort' to discard it.");
        }
        None => println!("No install is pending."),
    }
    Ok(())
}
