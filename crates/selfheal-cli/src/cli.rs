//! CLI argument definitions for `selfheal`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "selfheal",
    version,
    about = "Resolve stale or mistyped slugs to their canonical form",
    long_about = "Resolve stale or mistyped slugs to their canonical form.\n\n\
                  Resolvers (alias tables, candidate lists, slug files, route lists) are\n\
                  read from a TOML file and tried in order; the first match wins.\n\n\
                  Exit status: 0 when everything resolved, 2 when something did not,\n\
                  1 on error."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Resolver configuration file.
    #[arg(
        short = 'c',
        long = "config",
        value_name = "PATH",
        default_value = "selfheal.toml",
        global = true
    )]
    pub config: PathBuf,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Resolve one or more slugs through the resolver chain.
    Resolve(ResolveArgs),

    /// Show every strategy each resolver tried for a slug.
    Explain(ExplainArgs),

    /// Turn failed request paths into redirect locations.
    Heal(HealArgs),

    /// Validate the configuration and list the resolver chain.
    Check,
}

#[derive(Args)]
pub struct ResolveArgs {
    #[arg(value_name = "SLUG", required = true)]
    pub inputs: Vec<String>,

    #[arg(long = "output", value_enum, default_value = "table")]
    pub output: OutputArg,
}

#[derive(Args)]
pub struct ExplainArgs {
    #[arg(value_name = "SLUG")]
    pub input: String,

    /// Print the explanations as JSON instead of text.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args)]
pub struct HealArgs {
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<String>,

    #[arg(long = "output", value_enum, default_value = "table")]
    pub output: OutputArg,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputArg {
    Table,
    /// One line per input, tab separated.
    Plain,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
