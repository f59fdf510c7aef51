//! CLI argument definitions using clap

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "keyring-pem")]
#[command(version)]
#[command(
    about = "Export key pairs from a key database and convert them to PEM",
    long_about = None
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to a settings file (default: config/default.toml if present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export a labelled key pair as .p12/.der and convert both to PEM
    Export(ExportArgs),

    /// Import the key pair of a PKCS#12 file into a key database
    Import(ImportArgs),

    /// List the record labels of a key database
    Labels(LabelsArgs),
}

#[derive(Args, Debug)]
pub struct DatabaseArgs {
    /// Key database file (PKCS#12)
    #[arg(short, long, value_name = "FILE")]
    pub database: PathBuf,

    /// Key database password (prompted when omitted)
    #[arg(long, value_name = "PASSWORD", env = "KEYRING_PEM_DATABASE_PASSWORD")]
    pub database_password: Option<String>,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub db: DatabaseArgs,

    /// Label of the key pair record
    #[arg(short, long)]
    pub label: String,

    /// Certificate file name, without extension
    #[arg(long, value_name = "NAME")]
    pub cert_name: String,

    /// Key container file name, without extension
    #[arg(long, value_name = "NAME")]
    pub key_name: String,

    /// Password for the exported .p12 container (prompted when omitted)
    #[arg(long, value_name = "PASSWORD", env = "KEYRING_PEM_KEY_PASSWORD")]
    pub key_password: Option<String>,

    /// Directory for the exported files
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// File name of the extracted private key (default: key.pem)
    #[arg(long, value_name = "NAME")]
    pub key_out: Option<String>,

    /// Remove already written files when a later step fails
    #[arg(long)]
    pub rollback: bool,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    #[command(flatten)]
    pub db: DatabaseArgs,

    /// Label for the new record
    #[arg(short, long)]
    pub label: String,

    /// PKCS#12 file to import
    #[arg(long, value_name = "FILE")]
    pub p12: PathBuf,

    /// Password of the PKCS#12 file (prompted when omitted)
    #[arg(long, value_name = "PASSWORD")]
    pub p12_password: Option<String>,

    /// Create the key database instead of updating an existing one
    #[arg(long)]
    pub create: bool,
}

#[derive(Args, Debug)]
pub struct LabelsArgs {
    #[command(flatten)]
    pub db: DatabaseArgs,
}
