//! Inspect command implementation
//!
//! Reads only the container header and marker entries; nothing is written.
//! Works outside a project, using the default metadata extension.

use std::path::PathBuf;

use console::Style;

use crate::cli::InspectArgs;
use crate::commands::helpers::open_project;
use crate::error::Result;
use crate::manifest::{BundleManifest, ManifestBuilder};

/// Run inspect command
pub fn run(project: Option<PathBuf>, args: InspectArgs) -> Result<()> {
    let builder = match open_project(project) {
        Ok(project) => ManifestBuilder::new(project.config.meta_extension),
        Err(_) => ManifestBuilder::default(),
    };
    let manifest = builder.build(&args.container)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&manifest)?);
    } else {
        print_manifest(&manifest);
    }
    Ok(())
}

fn print_manifest(manifest: &BundleManifest) {
    println!("{}", Style::new().bold().yellow().apply_to(&manifest.title));
    println!(
        "  {} ({}):",
        Style::new().bold().apply_to("Files"),
        manifest.canonical_file_list.len()
    );
    for path in &manifest.canonical_file_list {
        println!("    {path}");
    }
}
