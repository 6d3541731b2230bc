//! CLI definitions using clap derive API
//!
//! This module is organized into submodules for each command's argument types:
//! - inspect: Inspect command arguments
//! - install: Install command arguments
//! - uninstall: Uninstall command arguments
//! - list: List command arguments
//! - show: Show command arguments
//! - completions: Completions command arguments

use clap::builder::{Styles, styling::AnsiColor};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

pub mod completions;
pub mod inspect;
pub mod install;
pub mod list;
pub mod show;
pub mod uninstall;

pub use completions::CompletionsArgs;
pub use inspect::InspectArgs;
pub use install::InstallArgs;
pub use list::ListArgs;
pub use show::ShowArgs;
pub use uninstall::UninstallArgs;

/// Bundlekeeper - resumable asset bundle installer
///
/// Install archive-distributed asset bundles into a project and track exactly
/// which files each bundle produced.
#[derive(Parser, Debug)]
#[command(
    name = "bundlekeeper",
    author,
    version,
    color = clap::ColorChoice::Auto,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Resumable installer and tracker for asset bundles",
    long_about = "Bundlekeeper installs gzip/TAR asset bundles into a project tree, records \
                  which files each install produced, survives the importer restarting mid-install, \
                  and uninstalls bundles without touching unrelated files.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  bundlekeeper inspect props.unitypackage   \x1b[90m# Show the bundle's file list\x1b[0m\n   \
                  bundlekeeper install props.unitypackage   \x1b[90m# Install and record a bundle\x1b[0m\n   \
                  bundlekeeper resume                       \x1b[90m# Finish an interrupted install\x1b[0m\n   \
                  bundlekeeper list                         \x1b[90m# List installed bundles\x1b[0m\n   \
                  bundlekeeper uninstall Props              \x1b[90m# Remove a bundle's files\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Project directory (defaults to current directory)
    #[arg(long, short = 'p', global = true, env = "BUNDLEKEEPER_PROJECT")]
    pub project: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show a bundle's metadata and file list without installing it
    Inspect(InspectArgs),

    /// Install a bundle into the project
    Install(InstallArgs),

    /// Finish an interrupted install
    Resume,

    /// Discard a pending install
    Abort,

    /// Show whether an install is pending
    Status,

    /// List installed bundles
    List(ListArgs),

    /// Show an installed bundle
    Show(ShowArgs),

    /// Remove an installed bundle
    Uninstall(UninstallArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}
