//! addonpack CLI - Add-on package builder
//!
//! Validates `manifest.json`, selects the git-tracked files that belong in the
//! add-on, writes them to a `.ankiaddon` archive and verifies the result.

use clap::Parser;
use std::path::PathBuf;

mod config;
mod package;

#[derive(Parser)]
#[command(name = "addonpack")]
#[command(author, version, about = "Build an installable add-on package", long_about = None)]
struct Cli {
    /// Output archive path (default: <root>/dist/addon.ankiaddon)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Repository root (default: top level of the current git checkout)
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// TOML file overriding the packaging policy
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log each selected and excluded file
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    package::run(package::Options {
        output: cli.output,
        root: cli.root,
        config: cli.config,
    })
}

/// Install a stderr subscriber; stdout is reserved for the summary line.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::new(if verbose { "debug" } else { "warn" });
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    let _ = tracing::subscriber::set_global_default(subscriber);
}
