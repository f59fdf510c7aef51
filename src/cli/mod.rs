//! Command-line interface module
//!
//! This module handles CLI argument parsing using Clap.

pub mod args;

pub use args::{Cli, Commands, DatabaseArgs, ExportArgs, ImportArgs, LabelsArgs};
