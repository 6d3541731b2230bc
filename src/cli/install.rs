use clap::Parser;
use std::path::PathBuf;

/// Arguments for the install command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Install a bundle:\n    bundlekeeper install props.unitypackage\n\n\
                  Let the importer ask which files to import:\n    bundlekeeper install props.unitypackage --interactive\n\n\
                  Discard a stale pending install first:\n    bundlekeeper install props.unitypackage --force")]
pub struct InstallArgs {
    /// Bundle container (gzip-compressed TAR)
    pub container: PathBuf,

    /// Run the importer in interactive mode
    #[arg(long, short = 'i')]
    pub interactive: bool,

    /// Discard a pending install instead of finishing it first
    #[arg(long, short = 'f')]
    pub force: bool,
}
