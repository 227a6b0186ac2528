use std::collections::HashMap;

use ainote_common::config::Config;
use anyhow::{Context, Result};
use strfmt::strfmt;

pub struct Instructions {
    pub model_info: String,
    pub download: String,
}

pub fn render(config: &Config) -> Result<Instructions> {
    let vars = template_vars(config);
    let model_info = strfmt(&config.instructions.model_info, &vars)
        .context("Failed to render `instructions.model_info` template")?;
    let download = strfmt(&config.instructions.download, &vars)
        .context("Failed to render `instructions.download` template")?;
    Ok(Instructions {
        model_info,
        download,
    })
}

fn template_vars(config: &Config) -> HashMap<String, String> {
    let model = &config.model;
    HashMap::from([
        ("name".to_owned(), model.name.clone()),
        ("file".to_owned(), model.file_name()),
        ("size_hint".to_owned(), model.size_hint.clone()),
        ("source_url".to_owned(), model.source_url.clone()),
        ("license".to_owned(), model.license.clone()),
        (
            "models_dir".to_owned(),
            model.models_dir().display().to_string(),
        ),
    ])
}
