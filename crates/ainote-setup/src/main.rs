mod check;
mod download;
mod output;
mod services;
mod setup;

use std::{path::PathBuf, process::ExitCode};

use ainote_common::config::{Config, DEFAULT_CONFIG_FILE};
use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(author, version, about = "Check the AI Note ONNX model setup", long_about = None)]
struct Cli {
    /// Path to the configuration file. Defaults are used when it does not exist.
    #[clap(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Output machine-readable JSON.
    #[clap(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check preconditions and the model artifact, printing instructions when it is absent.
    Setup(setup::SetupArgs),

    /// Check the model artifact only. Exits with status 2 when it is not ready.
    Check(check::CheckArgs),

    /// Print manual download instructions for the model.
    Download(download::DownloadArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            error!("{:#}", err);
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = Config::load(&cli.config)
        .with_context(|| format!("Invalid configuration in {}", cli.config.display()))?;

    let code = match &cli.command {
        None => setup::main(&config, &setup::SetupArgs::default(), cli.json)?,
        Some(Commands::Setup(args)) => setup::main(&config, args, cli.json)?,
        Some(Commands::Check(args)) => check::main(&config, args, cli.json)?,
        Some(Commands::Download(args)) => download::main(&config, args, cli.json)?,
    };
    Ok(code)
}
