//! ObjectSwatch - template catalog browser and placement tool
//!
//! Scans a template library into swatches, searches it, and runs placement
//! sessions against an in-memory scene.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use objswatch::cli::{
    CliResult, ConfigArgs, PlaceArgs, ScanArgs, SearchArgs, SectionsArgs,
};

/// ObjectSwatch - browse template libraries and place copies into a scene
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan a library and print its swatches
    Scan(ScanArgs),
    /// List the sections of a library
    Sections(SectionsArgs),
    /// Search a library by template name
    Search(SearchArgs),
    /// Place templates into an in-memory scene
    Place(PlaceArgs),
    /// Show or change the configuration
    Config(ConfigArgs),
}

impl Command {
    fn execute(&self) -> CliResult<()> {
        match self {
            Self::Scan(args) => args.execute(),
            Self::Sections(args) => args.execute(),
            Self::Search(args) => args.execute(),
            Self::Place(args) => args.execute(),
            Self::Config(args) => args.execute(),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize tracing; stdout is reserved for command output
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = cli.command.execute() {
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code());
    }
}
