use anyhow::{Context, Result};
use clap::Parser;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, warn};

use event_mapper::app::normalize_use_case::NormalizeUseCase;
use event_mapper::config::{Config, Profile};
use event_mapper::infra::JsonOutputAdapter;
use event_mapper::observability;

#[derive(Parser)]
#[command(name = "event_mapper")]
#[command(about = "Map scraped event JSON into the canonical import schema")]
#[command(version = "0.1.0")]
struct Cli {
    /// Input JSON file holding one event object or an array of them. Reads stdin when omitted or "-"
    input: Option<PathBuf>,

    /// Write the mapped array to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Mapping profile (overrides the config file)
    #[arg(long, value_enum)]
    profile: Option<Profile>,

    /// Read ambiguous numeric dates as day/month/year
    #[arg(long)]
    day_first: bool,

    /// Print a per-record discard summary to stderr
    #[arg(long)]
    report: bool,

    /// Normalize and report, but write no output
    #[arg(long)]
    dry_run: bool,

    /// Also write JSON logs to this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error processing JSON: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;

    let log_dir = cli.log_dir.clone().or_else(|| config.log_dir.clone());
    observability::init_logging(cli.verbose, log_dir.as_deref())?;
    debug!(profile = %config.profile, day_first = config.day_first, "Configuration loaded");

    let input = read_input(cli.input.as_deref())?;

    let adapter = match &cli.output {
        Some(path) => JsonOutputAdapter::file(path),
        None => JsonOutputAdapter::stdout(),
    };
    let use_case = NormalizeUseCase::with_config(&config, Box::new(adapter));

    let report = if cli.dry_run {
        use_case.normalize_input(&input)?
    } else {
        use_case.run(&input)?
    };

    if report.discarded_count() > 0 {
        warn!("Skipped {} of {} records", report.discarded_count(), report.total());
    }
    if cli.report || cli.dry_run {
        eprint!("{}", report.render_details());
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    if let Some(profile) = cli.profile {
        config.profile = profile;
    }
    if cli.day_first {
        config.day_first = true;
    }

    Ok(config)
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        _ => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("failed to read stdin")?;
            Ok(input)
        }
    }
}
