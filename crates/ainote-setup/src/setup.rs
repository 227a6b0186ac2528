use std::{path::PathBuf, process::ExitCode};

use ainote_common::{config::Config, manifest, runtime};
use anyhow::Context;
use clap::Args;
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    output::Reporter,
    services::{
        instructions,
        model::{self, format_size, Status},
    },
};

const RULE: &str = "==================================================";

#[derive(Args, Default)]
pub struct SetupArgs {
    /// Model path to check, overriding `model.path` from the config.
    #[clap(long)]
    model: Option<PathBuf>,

    /// Do not create the models directory when it is absent.
    #[clap(long)]
    no_create_dir: bool,
}

#[derive(Serialize, Default)]
struct SetupReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    runtime: Option<runtime::Version>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    models_dir_created: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<Status>,
}

pub fn main(config: &Config, args: &SetupArgs, json: bool) -> anyhow::Result<ExitCode> {
    let config = &merge_args(config, args);
    let out = Reporter::new(json);
    let mut report = SetupReport::default();

    out.line(format!("AI Note Extension - {} Model Setup", config.model.name));
    out.line(RULE);
    out.blank();

    if let Some(requirement) = &config.runtime {
        match runtime::check(requirement) {
            Ok(version) => {
                out.line(format!("[ok] {} {} detected", requirement.command, version));
                report.runtime = Some(version);
            }
            Err(err) => return precondition_failed(&out, report, "Runtime check failed", err),
        }
    } else {
        debug!("No runtime requirement configured, skipping runtime check");
    }

    out.line("Checking dependencies...");
    if let Err(err) = manifest::check_dependency(&config.manifest.path, &config.manifest.dependency)
    {
        return precondition_failed(&out, report, "Dependencies check failed", err);
    }
    out.line(format!(
        "[ok] {} dependency found in {}",
        config.manifest.dependency,
        config.manifest.path.display()
    ));

    let path = &config.model.path;
    let models_dir = config.model.models_dir();
    if !args.no_create_dir {
        let created = model::ensure_models_dir(&models_dir).with_context(|| {
            format!("Failed to create models directory {}", models_dir.display())
        })?;
        out.line(if created {
            "Created models directory"
        } else {
            "Models directory already exists"
        });
        report.models_dir_created = Some(created);
    }

    let status = model::check_model(&config.model, path);
    match &status {
        Status::Ready { size } => {
            out.line(format!("[ok] Model file found: {}", path.display()));
            out.line(format!("   Size: {}", format_size(*size)));
            out.line("[ok] Model file appears to be a valid ONNX file");
            out.blank();
            out.line("ONNX model setup is complete!");
            out.line("   You can now build and test the extension");
        }
        Status::BadSignature { size, cause } => {
            if let Some(size) = size {
                out.line(format!("[ok] Model file found: {}", path.display()));
                out.line(format!("   Size: {}", format_size(*size)));
            }
            out.line(format!("[fail] {}", cause));
            out.blank();
            out.line("Model file verification failed");
            out.line("   Please check if you have the correct model file");
        }
        Status::Missing | Status::TooSmall { .. } => {
            if let Status::TooSmall { size } = &status {
                out.line(format!("[ok] Model file found: {}", path.display()));
                out.line(format!("   Size: {}", format_size(*size)));
                out.line(format!(
                    "[warn] Model file seems too small (< {})",
                    format_size(config.model.min_size_bytes)
                ));
                out.line("   This might not be the correct model file");
            } else {
                out.line(format!("[fail] Model file not found: {}", path.display()));
                out.line(format!(
                    "   Please download the model and place it in the {}/ directory",
                    models_dir.display()
                ));
            }
            let instructions = instructions::render(config)?;
            out.blank();
            out.line(instructions.model_info);
            out.blank();
            out.line(instructions.download);
        }
    }

    out.blank();
    out.line(RULE);
    out.line("Setup completed");

    info!("Model status: {}", status.label());
    let ready = status.is_ready();
    report.model = Some(status);
    out.finish(ready, report)?;
    Ok(ExitCode::SUCCESS)
}

fn merge_args(config: &Config, args: &SetupArgs) -> Config {
    let mut config = config.clone();
    if let Some(model) = &args.model {
        info!(
            "Overriding model path {} with {}",
            config.model.path.display(),
            model.display()
        );
        config.model.path = model.clone();
    }
    config
}

fn precondition_failed(
    out: &Reporter,
    mut report: SetupReport,
    headline: &str,
    err: impl std::fmt::Display,
) -> anyhow::Result<ExitCode> {
    out.line(format!("[fail] {}", err));
    out.blank();
    out.line(headline);
    report.error = Some(format!("{}: {}", headline, err));
    out.finish(false, report)?;
    Ok(ExitCode::from(1))
}
