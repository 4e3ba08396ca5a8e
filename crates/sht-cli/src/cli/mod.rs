mod commands;
mod helpers;

use clap::Parser;
use sht_core::ShtError;
use sht_core::common::config::ConfigFileError;
use tracing_subscriber::EnvFilter;

pub fn run_from_env() -> i32 {
    init_tracing();
    let args: Vec<String> = std::env::args().skip(1).collect();

    match run(args) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("{}", error.diagnostic_line());
            eprintln!("{}", error.fatal_exit_line());
            error.exit_code()
        }
    }
}

pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let full_args = std::iter::once("sht-rs".to_string())
        .chain(args.into_iter().map(Into::into))
        .collect::<Vec<_>>();
    parse_and_dispatch(full_args)
}

/// Log events go to stderr, filtered by `RUST_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => dispatch_parsed(cli.command),
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

#[derive(Parser)]
#[command(name = "sht-rs", version, about = "Spherical harmonic transform engine")]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Print the resolved transform configuration and grid
    Info(commands::InfoArgs),
    /// Time synthesis/analysis round trips and report their errors
    Bench(commands::BenchArgs),
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Info(args) => commands::run_info_command(args),
        CliCommand::Bench(args) => commands::run_bench_command(args),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Config(#[from] ConfigFileError),
    #[error(transparent)]
    Compute(#[from] ShtError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_) | Self::Config(_) => 2,
            Self::Compute(error) => error.exit_code(),
            Self::Internal(_) => 7,
        }
    }

    pub fn diagnostic_line(&self) -> String {
        match self {
            Self::Usage(message) => format!("ERROR: [Usage] {}", message.trim_end()),
            Self::Config(error) => format!("ERROR: [ConfigurationError] {error}"),
            Self::Compute(error) => error.diagnostic_line(),
            Self::Internal(error) => format!("ERROR: [IoError] {error:#}"),
        }
    }

    pub fn fatal_exit_line(&self) -> String {
        match self {
            Self::Compute(error) => error.fatal_exit_line(),
            _ => format!("FATAL EXIT CODE: {}", self.exit_code()),
        }
    }
}
