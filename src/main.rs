//! `catalog-batcher` command-line driver.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

use catalog_batcher::{CATALOG_BATCHER_VERSION, Config, GenreStatus, Pipeline};

#[derive(Debug, Parser)]
#[command(name = "catalog-batcher", version, about = "Batch catalog keywords for ad upload")]
struct Cli {
    /// TOML config file; built-in defaults are used when omitted.
    #[arg(long, short, env = "CATALOG_BATCHER_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Overrides `base_path` from the config.
    #[arg(long, env = "CATALOG_BATCHER_BASE_PATH", global = true)]
    base_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Merge new records for the selected genres (all by default).
    Run {
        #[arg(long = "genre")]
        genres: Vec<String>,
    },
    /// Create empty index files that do not exist yet.
    Init {
        #[arg(long = "genre")]
        genres: Vec<String>,
    },
    /// Check batch capacity and uniqueness invariants.
    Verify {
        #[arg(long = "genre")]
        genres: Vec<String>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(base_path) = &cli.base_path {
        config.base_path.clone_from(base_path);
    }
    Ok(config)
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(&cli)?;
    let pipeline = Pipeline::new(config).context("invalid configuration")?;
    tracing::info!(
        version = CATALOG_BATCHER_VERSION,
        base_path = %pipeline.config().base_path.display(),
        "catalog-batcher starting"
    );

    match cli.command.unwrap_or(Command::Run { genres: Vec::new() }) {
        Command::Run { genres } => {
            let selected = pipeline.select_genres(&genres)?;
            let report = pipeline.run_selected(selected);
            for outcome in &report.outcomes {
                match &outcome.result {
                    Ok(GenreStatus::Skipped) => {
                        tracing::info!(genre = %outcome.genre, "skipped (empty input)");
                    }
                    Ok(GenreStatus::Completed(kinds)) => {
                        for kind in kinds {
                            tracing::info!(
                                genre = %outcome.genre,
                                kind = %kind.kind,
                                new = kind.merge.delta,
                                batches_created = kind.merge.created_batches.len(),
                                "done"
                            );
                        }
                    }
                    Err(_) => {}
                }
            }
            for (genre, err) in report.failures() {
                eprintln!("genre {genre} failed: {err}");
            }
            Ok(if report.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Init { genres } => {
            let selected = pipeline.select_genres(&genres)?;
            for path in pipeline.init_stores(&selected)? {
                tracing::info!(index = %path.display(), "created");
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Verify { genres } => {
            let mut clean = true;
            for genre in pipeline.select_genres(&genres)? {
                for report in pipeline
                    .verify_genre(genre)
                    .with_context(|| format!("verifying genre {}", genre.id))?
                {
                    tracing::info!(
                        index = %report.index.display(),
                        batches = report.stats.batches,
                        records = report.stats.records,
                        violations = report.violations.len(),
                        "verified"
                    );
                    for violation in &report.violations {
                        eprintln!("{}: {violation}", report.index.display());
                    }
                    clean &= report.is_clean();
                }
            }
            Ok(if clean {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "catalog-batcher failed");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
