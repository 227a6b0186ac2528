use std::process::ExitCode;

use ainote_common::config::Config;
use clap::Args;
use serde::Serialize;
use tracing::info;

use crate::{output::Reporter, services::instructions};

#[derive(Args)]
pub struct DownloadArgs {}

#[derive(Serialize)]
struct DownloadReport {
    path: String,
    source_url: String,
    model_info: String,
    instructions: String,
}

/// The model is never fetched over the network, only described.
pub fn main(config: &Config, _args: &DownloadArgs, json: bool) -> anyhow::Result<ExitCode> {
    let out = Reporter::new(json);
    let rendered = instructions::render(config)?;
    info!(
        "Model {} must be downloaded manually to {}",
        config.model.name,
        config.model.path.display()
    );

    out.line(&rendered.model_info);
    out.blank();
    out.line(&rendered.download);

    out.finish(
        true,
        DownloadReport {
            path: config.model.path.display().to_string(),
            source_url: config.model.source_url.clone(),
            model_info: rendered.model_info,
            instructions: rendered.download,
        },
    )?;
    Ok(ExitCode::SUCCESS)
}
