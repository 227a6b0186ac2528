use std::{path::PathBuf, process::ExitCode};

use ainote_common::config::Config;
use clap::Args;
use serde::Serialize;

use crate::{
    output::Reporter,
    services::model::{self, format_size, Status},
};

/// Exit status when the artifact is not ready.
const NOT_READY: u8 = 2;

#[derive(Args)]
pub struct CheckArgs {
    /// Model path to check, overriding `model.path` from the config.
    #[clap(long)]
    model: Option<PathBuf>,
}

#[derive(Serialize)]
struct CheckReport<'a> {
    path: &'a PathBuf,
    #[serde(flatten)]
    status: &'a Status,
}

pub fn main(config: &Config, args: &CheckArgs, json: bool) -> anyhow::Result<ExitCode> {
    let out = Reporter::new(json);
    let path = args.model.as_ref().unwrap_or(&config.model.path);
    let status = model::check_model(&config.model, path);

    match &status {
        Status::Missing => out.line(format!("missing\t{}", path.display())),
        Status::TooSmall { size } => out.line(format!(
            "too_small\t{}\t{}",
            path.display(),
            format_size(*size)
        )),
        Status::BadSignature { cause, .. } => {
            out.line(format!("bad_signature\t{}\t{}", path.display(), cause))
        }
        Status::Ready { size } => out.line(format!(
            "ready\t{}\t{}",
            path.display(),
            format_size(*size)
        )),
    }

    out.finish(
        status.is_ready(),
        CheckReport {
            path,
            status: &status,
        },
    )?;

    Ok(if status.is_ready() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(NOT_READY)
    })
}
