//! List command implementation
//!
//! Lists installed bundles with their file counts.

use std::path::PathBuf;

use console::Style;

use crate::cli::ListArgs;
use crate::commands::helpers::open_project;
use crate::error::Result;
use crate::manifest::{BundleManifest, ManifestStore};

/// Run list command
pub fn run(project: Option<PathBuf>, args: ListArgs) -> Result<()> {
    let project = open_project(project)?;
    let manifests = ManifestStore::for_project(&project).list()?;

    if manifests.is_empty() {
        println!("No bundles installed.");
        return Ok(());
    }

    println!("Installed bundles ({}):", manifests.len());
    println!();

    for manifest in &manifests {
        display_bundle(manifest, args.detailed);
    }
    Ok(())
}

fn display_bundle(manifest: &BundleManifest, detailed: bool) {
    println!("  {}", Style::new().bold().yellow().apply_to(&manifest.title));
    println!(
        "    {} {} installed, {} in bundle",
        Style::new().bold().apply_to("Files:"),
        manifest.installed_file_list.len(),
        manifest.canonical_file_list.len()
    );

    if detailed {
        for path in manifest.tracked_paths() {
            println!("      {path}");
        }
        println!();
    }
}
