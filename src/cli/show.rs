use clap::Parser;

/// Arguments for the show command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Show an installed bundle:\n    bundlekeeper show Props\n\n\
                  Include the raw bundle metadata:\n    bundlekeeper show Props --metadata")]
pub struct ShowArgs {
    /// Title of the installed bundle
    pub title: String,

    /// Print the raw metadata embedded in the bundle
    #[arg(long)]
    pub metadata: bool,
}
