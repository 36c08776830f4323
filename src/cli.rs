// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `testorch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "testorch",
    version,
    about = "Inspect test-case filters and run settings the way the request orchestrator does.",
    long_about = None
)]
pub struct CliArgs {
    /// Orchestrator options file (TOML). Defaults apply when omitted.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TESTORCH_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Parse and evaluate test-case filters.
    Filter {
        #[command(subcommand)]
        action: FilterCommand,
    },
    /// Work with run-settings XML.
    Settings {
        #[command(subcommand)]
        action: SettingsCommand,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum FilterCommand {
    /// Parse a filter and print its shape (fast path or tree).
    Check {
        expression: String,
    },
    /// Evaluate a filter against the given properties.
    Eval {
        expression: String,

        /// Property as NAME=VALUE; repeat a name for multi-valued properties.
        #[arg(long = "prop", value_name = "NAME=VALUE")]
        props: Vec<String>,

        /// Regex applied to values on the fast path.
        #[arg(long, value_name = "REGEX")]
        regex: Option<String>,

        /// Replacement for `--regex` matches.
        #[arg(long, value_name = "TEXT", requires = "regex")]
        replacement: Option<String>,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum SettingsCommand {
    /// Print run settings with the ambient defaults injected.
    Merge {
        file: PathBuf,
    },
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
