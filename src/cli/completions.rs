use clap::Parser;

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    bundlekeeper completions --shell bash > ~/.bash_completion.d/bundlekeeper\n\n\
                  Generate zsh completions:\n    bundlekeeper completions --shell zsh > ~/.zfunc/_bundlekeeper\n\n\
                  Generate fish completions:\n    bundlekeeper completions --shell fish > ~/.config/fish/completions/bundlekeeper.fish\n\n\
                  Generate PowerShell completions:\n    bundlekeeper completions --shell powershell")]
pub struct CompletionsArgs {
    /// Shell type (bash, elvish, fish, powershell, zsh)
    #[arg(long, short = 's')]
    pub shell: String,
}
