mod cli;
mod commands;
mod config;
mod format;
mod util;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use sensordb_store::Reading;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, ConfigAction};
use commands::{
    HistoryArgs, cmd_config, cmd_history, cmd_info, cmd_ingest, cmd_latest, cmd_log,
};
use config::{Config, default_config_path};
use format::FormatOptions;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // When quiet mode is enabled, suppress info-level logging
    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let config = match Config::load_validated(cli.config.as_deref()) {
        Ok(config) => config,
        // `config path` and `config init` work even when the file is unusable
        Err(e)
            if matches!(
                cli.command,
                Commands::Config {
                    action: ConfigAction::Path | ConfigAction::Init
                }
            ) =>
        {
            tracing::debug!("Ignoring unusable config: {}", e);
            Config::default()
        }
        Err(e) => return Err(e).context("Failed to load configuration"),
    };
    let db = config.resolve_db_path(cli.db.as_deref());

    run(
        cli.command,
        &config,
        &config_path,
        &db,
        cli.output.as_ref(),
        cli.quiet,
    )
}

fn run(
    command: Commands,
    config: &Config,
    config_path: &Path,
    db: &Path,
    output: Option<&PathBuf>,
    quiet: bool,
) -> Result<()> {
    let storage = &config.storage;

    match command {
        Commands::Log {
            bmp280_temp,
            bmp280_pressure,
            htu21d_temp,
            htu21d_humidity,
            producer,
        } => {
            let reading = Reading::new(bmp280_temp, bmp280_pressure, htu21d_temp, htu21d_humidity);
            cmd_log(db, storage, reading, producer.retention, quiet)
        }
        Commands::Ingest { input, producer } => {
            cmd_ingest(db, storage, input, producer.retention, quiet)
        }
        Commands::Latest { output: args } => {
            let format = config.output.resolve_format(args.format);
            let opts = FormatOptions::default().with_compact(args.compact);
            cmd_latest(db, storage, format, output, &opts)
        }
        Commands::History {
            count,
            oldest_first,
            output: args,
        } => {
            let format = config.output.resolve_format(args.format);
            let opts = FormatOptions::default().with_compact(args.compact);
            cmd_history(
                db,
                storage,
                HistoryArgs {
                    count,
                    oldest_first,
                    format,
                    output,
                    opts: &opts,
                },
            )
        }
        Commands::Info => cmd_info(db, storage),
        Commands::Config { action } => cmd_config(action, config_path, config),
    }
}
