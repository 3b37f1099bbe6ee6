//! tplc — compiles report templates and keeps their build artifacts fresh.
//!
//! Provides `tplc build` to compile every stale report source in a workspace
//! and `tplc status` to list which artifacts need rebuilding.

#![warn(missing_docs)]

mod build;
mod compiler;
mod project;
mod status;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

/// tplc — a build-artifact cache for compiled report templates.
#[derive(Parser, Debug)]
#[command(name = "tplc", version, about = "Report template compile cache")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a `tplc.toml` file or the directory containing it.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile stale report sources.
    Build(BuildArgs),
    /// List report sources and whether their artifacts are fresh.
    Status(StatusArgs),
}

/// Arguments for the `tplc build` subcommand.
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Specific sources to build instead of the whole search directory.
    pub files: Vec<PathBuf>,

    /// Search directory, relative to the configuration directory.
    #[arg(long)]
    pub dir: Option<String>,

    /// Stop starting new compiles after this many seconds.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Output format for the build summary.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Arguments for the `tplc status` subcommand.
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Search directory, relative to the configuration directory.
    #[arg(long)]
    pub dir: Option<String>,

    /// Output format for the listing.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Summary output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a custom config file or directory.
    pub config: Option<PathBuf>,
}

/// Exit code for a run stopped by `--timeout`.
pub const EXIT_CANCELLED: i32 = 2;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };

    let result = match cli.command {
        Command::Build(ref args) => build::run(args, &global),
        Command::Status(ref args) => status::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e:#}");
            process::exit(1);
        }
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` takes precedence over the
/// level implied by `--quiet` / `--verbose`.
fn init_logging(quiet: bool, verbose: bool) {
    let default_level = log_level(quiet, verbose);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn log_level(quiet: bool, verbose: bool) -> &'static str {
    if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    }
}
