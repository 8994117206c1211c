//! Command-line interface definitions using clap derive macros.
//!
//! Contains the top-level [`Cli`] parser, the [`Commands`] enum for
//! subcommands (run, check, status, init, validate), and their
//! associated argument structs. Every flag has an environment variable
//! equivalent for container deployments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "handover",
    version,
    about = "Failover configuration controller for redundant secret providers",
    propagate_version = true,
    after_help = "\x1b[1mQuick start:\x1b[0m\n  \
        handover init                        Create a starter bootstrap file\n  \
        handover run                         Start with ./handover.yaml\n  \
        handover check                       Dry-run resolution of every provider"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the controller and diagnostics endpoint
    Run(Box<RunArgs>),

    /// Dry-run resolution of every declared provider
    Check(CheckArgs),

    /// Query a running instance's status endpoint
    Status(StatusArgs),

    /// Generate a starter bootstrap file
    Init(InitArgs),

    /// Validate a bootstrap file without starting
    Validate(ValidateArgs),
}

#[derive(Args)]
#[command(after_help = "\x1b[1mExamples:\x1b[0m\n  \
        handover run                                  Auto-detect bootstrap file\n  \
        handover run -c providers.yaml                Specific bootstrap file\n  \
        handover run -c providers.yaml --pretty       Local dev mode\n  \
        handover run --monitor-interval 60            Slower background checks")]
pub struct RunArgs {
    /// Bootstrap file path (.yaml, .json, .toml)
    #[arg(short, long, env = "HANDOVER_BOOTSTRAP")]
    pub config: Option<PathBuf>,

    /// Status endpoint port
    #[arg(short, long, env = "PORT", default_value_t = 7070)]
    pub port: u16,

    /// Status endpoint address
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    // -- Logging --
    /// Log level
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Force pretty (human-readable) log output
    #[arg(long)]
    pub pretty: bool,

    /// Force JSON log output (overrides TTY detection)
    #[arg(long, conflicts_with = "pretty")]
    pub json: bool,

    // -- Observability --
    /// Sentry DSN (enables error tracking)
    #[cfg(feature = "sentry-integration")]
    #[arg(long, env = "SENTRY_DSN", help_heading = "Observability")]
    pub sentry_dsn: Option<String>,

    /// Sentry environment tag
    #[cfg(feature = "sentry-integration")]
    #[arg(long, env = "SENTRY_ENVIRONMENT", help_heading = "Observability")]
    pub sentry_environment: Option<String>,

    // -- Tuning --
    /// Background health check interval in seconds
    #[arg(
        long,
        env = "MONITOR_INTERVAL_SECS",
        default_value_t = 30,
        help_heading = "Tuning"
    )]
    pub monitor_interval: u64,
}

#[derive(Args)]
#[command(after_help = "\x1b[1mExamples:\x1b[0m\n  \
        handover check                       Report fetch+probe result per provider\n  \
        handover check --format json         Machine-readable report")]
pub struct CheckArgs {
    /// Bootstrap file path (.yaml, .json, .toml)
    #[arg(short, long, env = "HANDOVER_BOOTSTRAP")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: ReportFormat,
}

#[derive(Args)]
pub struct StatusArgs {
    /// URL of the running instance
    #[arg(default_value = "http://localhost:7070")]
    pub url: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct InitArgs {
    /// Output format
    #[arg(short, long, default_value = "yaml")]
    pub format: BootstrapFormat,

    /// Output file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Bootstrap file to validate
    #[arg(default_value = "handover.yaml")]
    pub config: PathBuf,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: ReportFormat,
}

#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Clone, Debug, ValueEnum)]
pub enum BootstrapFormat {
    Yaml,
    Json,
    Toml,
}

impl BootstrapFormat {
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::Json => "json",
            Self::Toml => "toml",
        }
    }
}

#[derive(Clone, Debug, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}
