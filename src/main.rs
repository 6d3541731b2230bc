//! Bundlekeeper - resumable installer and tracker for asset bundles
//!
//! Installs archive-distributed asset bundles into a project tree and tracks
//! which files on disk came from which bundle.

use clap::Parser;
use miette::Diagnostic;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use bundlekeeper::cli::{Cli, Commands};
use bundlekeeper::commands;
use bundlekeeper::error::{BundleError, Result};

/// Environment variable holding a `tracing` filter directive
const LOG_ENV: &str = "BUNDLEKEEPER_LOG";

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .with_env_var(LOG_ENV)
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Inspect(args) => commands::inspect::run(cli.project, args),
        Commands::Install(args) => commands::install::run(cli.project, args),
        Commands::Resume => commands::resume::run(cli.project),
        Commands::Abort => commands::abort::run(cli.project),
        Commands::Status => commands::status::run(cli.project),
        Commands::List(args) => commands::list::run(cli.project, args),
        Commands::Show(args) => commands::show::run(cli.project, args),
        Commands::Uninstall(args) => commands::uninstall::run(cli.project, args),
        Commands::Completions(args) => commands::completions::run(args),
    }
}

fn report_error(err: &BundleError) {
    eprintln!("Error: {err}");
    if let Some(help) = err.help() {
        eprintln!("  help: {help}");
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        report_error(&e);
        std::process::exit(1);
    }
}
