use clap::Parser;

/// Arguments for the uninstall command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Uninstall a bundle:\n    bundlekeeper uninstall Props\n\n\
                  Uninstall without confirmation:\n    bundlekeeper uninstall Props -y\n\n\
                  Show what would be removed:\n    bundlekeeper uninstall Props --dry-run")]
pub struct UninstallArgs {
    /// Title of the installed bundle
    pub title: String,

    /// Skip confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Show what would be uninstalled without actually uninstalling
    #[arg(long)]
    pub dry_run: bool,
}
