//! Uninstall command implementation

use std::path::PathBuf;

use console::Style;
use inquire::Confirm;

use crate::cli::UninstallArgs;
use crate::commands::helpers::{display_path, open_project};
use crate::error::{BundleError, Result};
use crate::project::Project;
use crate::session::SessionStore;
use crate::uninstall::{UninstallPlan, UninstallPlanner, execute_uninstall};
use crate::vcs;

/// Run uninstall command
pub fn run(project: Option<PathBuf>, args: UninstallArgs) -> Result<()> {
    let project = open_project(project)?;

    // Removing files mid-install would corrupt the pending diff
    if let Some(session) = SessionStore::for_project(&project).load()? {
        return Err(BundleError::SessionConflict {
            title: session.title().to_string(),
        });
    }

    let plan = UninstallPlanner::new(&project)?.plan_title(&args.title)?;

    if args.dry_run {
        println!("[DRY RUN] Would uninstall '{}'", plan.title);
        print_plan(&project, &plan);
        return Ok(());
    }

    if !args.yes && !confirm_uninstall(&project, &plan)? {
        println!("Uninstall cancelled. No changes were made.");
        return Ok(());
    }

    let vcs = vcs::for_project(&project)?;
    let report = execute_uninstall(&plan, vcs.as_ref())?;

    println!(
        "{} {} ({} file(s), {} directory(ies) removed)",
        Style::new().bold().green().apply_to("Uninstalled"),
        Style::new().bold().yellow().apply_to(&report.title),
        report.files_removed,
        report.directories_removed
    );
    Ok(())
}

fn print_plan(project: &Project, plan: &UninstallPlan) {
    for file in &plan.files {
        println!("  - {}", display_path(&project.root, file));
    }
    for dir in &plan.directories {
        println!("  - {}/", display_path(&project.root, dir));
    }
    for (path, titles) in &plan.shared {
        println!(
            "  {} {} is also installed by {}",
            Style::new().bold().yellow().apply_to("shared:"),
            path,
            titles.join(", ")
        );
    }
}

/// Confirm uninstallation with user, showing what would be done
fn confirm_uninstall(project: &Project, plan: &UninstallPlan) -> Result<bool> {
    println!("\nThe following will be removed for '{}':", plan.title);
    print_plan(project, plan);
    println!();

    Confirm::new("Proceed with uninstall?")
        .with_default(true)
        .with_help_message("Press Enter to confirm, or 'n' to cancel")
        .prompt()
        .map_err(|e| BundleError::IoError {
            message: format!("Failed to read confirmation: {e}"),
        })
}
