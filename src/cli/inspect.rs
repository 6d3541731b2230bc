use clap::Parser;
use std::path::PathBuf;

/// Arguments for the inspect command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Show a bundle's title and files:\n    bundlekeeper inspect props.unitypackage\n\n\
                  Print the manifest as JSON:\n    bundlekeeper inspect props.unitypackage --json")]
pub struct InspectArgs {
    /// Bundle container (gzip-compressed TAR)
    pub container: PathBuf,

    /// Print the candidate manifest as JSON
    #[arg(long)]
    pub json: bool,
}
