//! keyring-pem - export key pairs from a key database as PEM
//!
//! This tool provides functionality for:
//! - Exporting a labelled key pair as PKCS#12 and DER
//! - Converting both to PEM for standard TLS tooling
//! - Importing PKCS#12 files into a key database
//! - Listing key database records

use clap::Parser;
use console::style;
use keyring_pem::cli::{Cli, Commands};
use keyring_pem::{config, runner};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if cli.no_color {
        console::set_colors_enabled(false);
    }

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = config::load_config(cli.config.as_deref())?;

    match &cli.command {
        Commands::Export(args) => runner::run_export(args, settings),
        Commands::Import(args) => runner::run_import(args),
        Commands::Labels(args) => runner::run_labels(args),
    }
}
