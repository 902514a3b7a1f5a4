//! Command-line argument definitions.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tablelens_core::logging::LogFormat;

#[derive(Debug, Parser)]
#[command(name = "tablelens")]
#[command(about = "Column profiling and data-quality assessment")]
#[command(version)]
#[command(long_about = "
TableLens - column profiling and data-quality assessment

Profiles every column of a result set (null and distinct counts, inferred
type, numeric distribution or top values) and scores tables with
completeness and uniqueness checks computed by the query engine.

SUPPORTED ENGINES:
- SQLite (sqlite:// or .db/.sqlite files)
- HTTP query service (http:// or https://)

EXAMPLES:
  tablelens --database-url sqlite://warehouse.db profile --query 'SELECT * FROM orders'
  tablelens profile --input rows.json --format json
  tablelens --database-url http://localhost:3001 assess orders customers
")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Profile every column of a result set
    Profile(ProfileArgs),
    /// Assess data quality of one or more tables
    Assess(AssessArgs),
    /// Test engine connection
    Test,
    /// List supported engines
    List,
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv, -vvv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true, help = "Suppress all log output except errors")]
    pub quiet: bool,

    /// Log line format
    #[arg(long, global = true, value_enum, default_value_t = LogFormatArg::Pretty)]
    pub log_format: LogFormatArg,

    /// Engine connection URL
    #[arg(
        long,
        global = true,
        env = "DATABASE_URL",
        help = "Engine connection string (credentials will be sanitized in logs)"
    )]
    pub database_url: Option<String>,
}

#[derive(Debug, Args)]
#[command(group(
    clap::ArgGroup::new("source")
        .required(true)
        .args(["query", "input"]),
))]
pub struct ProfileArgs {
    /// Query whose result set is profiled
    #[arg(long, help = "SQL query to run against the engine")]
    pub query: Option<String>,

    /// JSON file holding an array of row objects
    #[arg(long, value_name = "FILE", help = "JSON array of row objects to profile")]
    pub input: Option<PathBuf>,

    /// Fail when a row's columns differ from the first row's
    #[arg(long, help = "Abort on rows whose columns differ from the first row")]
    pub reject_drift: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args)]
pub struct AssessArgs {
    /// Tables to assess
    #[arg(required = true, value_name = "TABLE")]
    pub tables: Vec<String>,

    /// Tables assessed at once when several are given
    #[arg(long, default_value = "4", value_parser = clap::value_parser!(u16).range(1..))]
    pub concurrency: u16,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args)]
pub struct OutputArgs {
    /// Rendering of the result
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Write the result here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables
    Text,
    /// Pretty-printed JSON
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    /// Single-line human-readable logs
    Pretty,
    /// One JSON object per log line
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Pretty => Self::Pretty,
            LogFormatArg::Json => Self::Json,
        }
    }
}
