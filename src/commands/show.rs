//! Show command implementation

use std::path::PathBuf;

use console::Style;

use crate::cli::ShowArgs;
use crate::commands::helpers::{display_path, open_project};
use crate::error::Result;
use crate::manifest::ManifestStore;

pub fn run(project: Option<PathBuf>, args: ShowArgs) -> Result<()> {
    let project = open_project(project)?;
    let store = ManifestStore::for_project(&project);
    let manifest = store.get(&args.title)?;
    let bold = Style::new().bold();

    println!("{}", Style::new().bold().yellow().apply_to(&manifest.title));
    println!(
        "  {} {}",
        bold.apply_to("Record:"),
        display_path(&project.root, &store.record_path(&manifest.title))
    );
    println!(
        "  {} {}",
        bold.apply_to("Bundle files:"),
        manifest.canonical_file_list.len()
    );

    if manifest.installed_file_list.is_empty() {
        println!("  {} none recorded", bold.apply_to("Installed files:"));
    } else {
        println!(
            "  {} ({}):",
            bold.apply_to("Installed files"),
            manifest.installed_file_list.len()
        );
        for entry in &manifest.installed_file_list {
            match &entry.content_hash {
                Some(hash) => println!("    {} ({} bytes, {})", entry.path, entry.size, short_hash(hash)),
                None => println!("    {} ({} bytes)", entry.path, entry.size),
            }
        }
    }

    if args.metadata {
        println!("  {}", bold.apply_to("Metadata:"));
        println!("    {}", manifest.raw_metadata);
    }
    Ok(())
}

fn short_hash(hash: &str) -> &str {
    hash.get(..12).unwrap_or(hash)
}
