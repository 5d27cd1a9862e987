// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! NOTE: this expects `clap` to be built with the `derive` feature, e.g.:
//! `clap = { version = "4.5.53", features = ["derive"] }` in `Cargo.toml`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `pipegen`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "pipegen",
    version,
    about = "Generate a deterministic CI pipeline from a build/test matrix.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Pipegen.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Pipegen.toml")]
    pub config: String,

    /// Where to write the rendered pipeline document.
    ///
    /// Overrides `[output].path` from the config file.
    #[arg(long, value_name = "PATH")]
    pub output: Option<String>,

    /// Print the rendered document to stdout instead of writing a file.
    #[arg(long)]
    pub stdout: bool,

    /// Load the config, build and validate the job graph, then stop.
    ///
    /// No document is rendered and no file is written.
    #[arg(long)]
    pub check: bool,

    /// Print the ordered job plan (name, target, dependencies) and stop.
    #[arg(long)]
    pub plan: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PIPEGEN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
