//! boxel CLI Binary
//!
//! Lowers dynamic-language mid-level IR modules into typed LIR programs that
//! call into a boxed-value runtime.
//!
//! # Usage
//!
//! ```bash
//! # Lower a module with the bundled runtime definition
//! boxel lower demos/round_trip.json
//!
//! # Lower against a custom runtime, failing on placeholders
//! boxel lower app.json --runtime vm_runtime.json --deny-unsupported
//!
//! # Show what a runtime definition provides
//! boxel check-runtime --runtime vm_runtime.json
//! ```

use std::path::PathBuf;

use boxel_cli::{
    commands::{self, check_runtime::CheckRuntimeArgs, lower::LowerArgs},
    config::CliConfig,
    diagnostics::{render_cli_error, setup_error_reporting},
    Result,
};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info};

#[derive(Parser)]
#[command(
    name = "boxel",
    version = env!("CARGO_PKG_VERSION"),
    about = "boxel: instruction selection from dynamic-language IR to a typed LIR",
    long_about = r#"
boxel lowers mid-level IR modules (JSON) into typed control-flow graphs whose
every dynamic operation is a call into a boxed-value runtime.

EXAMPLES:
    boxel lower module.json                     # Print the lowered program
    boxel lower module.json --emit input        # Print the parsed input IR
    boxel check-runtime --runtime rt.json       # Inspect a runtime definition
    "#
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Raise the log level: -v info, -vv debug, -vvv trace
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Explicit log level; wins over -v and -q
    #[arg(long, global = true, value_enum)]
    log: Option<LogLevel>,

    /// Log line format on stderr
    #[arg(long, global = true, value_enum, default_value = "pretty")]
    log_format: LogFormat,

    /// Configuration file path (defaults to ./boxel.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn from_flags(verbose: u8, quiet: bool) -> Self {
        match (quiet, verbose) {
            (true, _) => LogLevel::Error,
            (false, 0) => LogLevel::Warn,
            (false, 1) => LogLevel::Info,
            (false, 2) => LogLevel::Debug,
            (false, _) => LogLevel::Trace,
        }
    }

    fn directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Lower an input module to the target representation
    Lower(LowerArgs),

    /// Link a runtime definition and report the resolved types and helpers
    CheckRuntime(CheckRuntimeArgs),
}

fn main() {
    let cli = Cli::parse();
    let verbose = cli.verbose > 0;

    if let Err(e) = run(cli) {
        render_cli_error(e);
        std::process::exit(1);
    }
    if verbose {
        info!("Command completed successfully");
    }
}

fn run(cli: Cli) -> Result<()> {
    setup_error_reporting()?;
    setup_logging(cli.verbose, cli.quiet, cli.log, cli.log_format);

    let config = CliConfig::load(cli.config.as_deref())?;
    debug!(?config, "effective configuration");

    match cli.command {
        Commands::Lower(args) => commands::lower_command(args, &config, cli.verbose > 0),
        Commands::CheckRuntime(args) => commands::check_runtime_command(args, &config),
    }
}

fn setup_logging(verbose: u8, quiet: bool, log_level: Option<LogLevel>, log_format: LogFormat) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let level = log_level.unwrap_or_else(|| LogLevel::from_flags(verbose, quiet));
    let filter = EnvFilter::new(level.directive());

    // stdout carries the lowered program.
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_timer(tracing_subscriber::fmt::time::uptime());
    let registry = tracing_subscriber::registry().with(filter);

    match log_format {
        LogFormat::Pretty => registry.with(layer).init(),
        LogFormat::Json => registry.with(layer.json()).init(),
    }
}
