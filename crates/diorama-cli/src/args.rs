//! Command-line argument definitions for the Diorama CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control the scenario and output paths,
//! configuration file selection, and logging verbosity.

use clap::Parser;

/// Command-line arguments for the Diorama scenario runner
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input scenario file
    #[arg(help = "Path to the scenario file (TOML)")]
    pub input: String,

    /// Path to the output file; the diagram tree is printed to stdout when
    /// omitted
    #[arg(short, long)]
    pub output: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
