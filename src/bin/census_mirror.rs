use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use census_mirror::archive::ZipExtractor;
use census_mirror::catalog::Catalog;
use census_mirror::config::{ConfigLoader, MirrorConfig};
use census_mirror::controller::RunController;
use census_mirror::error::MirrorError;
use census_mirror::fetch::HttpFetcher;
use census_mirror::output::{JsonOutput, OutputMode, TextOutput};
use census_mirror::verify::verify_mirror;

const EXIT_INCOMPLETE: u8 = 4;

#[derive(Parser)]
#[command(name = "census-mirror")]
#[command(about = "Mirror Census building-permit, population and crosswalk files locally")]
#[command(version, author)]
struct Cli {
    /// JSON configuration overriding the built-in one
    #[arg(long, global = true)]
    config: Option<String>,

    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Wipe the mirror root and download everything (default)")]
    Run,
    #[command(about = "Print every resource that would be fetched")]
    Plan,
    #[command(about = "Report expected files missing from the mirror")]
    Verify,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(report) => {
            eprintln!("{report:?}");
            if let Some(err) = report.downcast_ref::<MirrorError>() {
                return ExitCode::from(map_exit_code(err));
            }
            ExitCode::from(1)
        }
    }
}

fn map_exit_code(error: &MirrorError) -> u8 {
    match error {
        MirrorError::ConfigRead(_)
        | MirrorError::ConfigParse(_)
        | MirrorError::InvalidConfig(_)
        | MirrorError::InvalidMonth { .. }
        | MirrorError::InvalidLocator(_)
        | MirrorError::RegionRequired(_) => 2,
        _ => 1,
    }
}

fn run() -> miette::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };
    let config = ConfigLoader::resolve(cli.config.as_deref())?;

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run_mirror(config, output_mode),
        Command::Plan => {
            let plans = Catalog::new(&config).plan()?;
            match output_mode {
                OutputMode::Json => JsonOutput::print_plan(&plans).into_diagnostic()?,
                OutputMode::Text => TextOutput::print_plan(&plans).into_diagnostic()?,
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Verify => {
            let report = verify_mirror(&config)?;
            match output_mode {
                OutputMode::Json => JsonOutput::print_verify(&report).into_diagnostic()?,
                OutputMode::Text => TextOutput::print_verify(&report).into_diagnostic()?,
            }
            if report.is_complete() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::from(EXIT_INCOMPLETE))
            }
        }
    }
}

/// Transfer failures are reported but never change the exit code.
fn run_mirror(config: MirrorConfig, output_mode: OutputMode) -> miette::Result<ExitCode> {
    let fetcher = HttpFetcher::new(config.transfer_timeout_secs.map(Duration::from_secs))?;
    let controller = RunController::new(config, fetcher, ZipExtractor)?;
    let handle = controller.run()?;
    // Returning from main would kill transfers still in flight.
    let summary = handle.wait();
    match output_mode {
        OutputMode::Json => JsonOutput::print_run(&summary).into_diagnostic()?,
        OutputMode::Text => TextOutput::print_run(&summary).into_diagnostic()?,
    }
    Ok(ExitCode::SUCCESS)
}
