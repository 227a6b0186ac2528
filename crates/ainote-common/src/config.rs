use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::{
    readiness::{Policy, DEFAULT_MIN_SIZE_BYTES, DEFAULT_SIGNATURE, SIGNATURE_PREFIX_LEN},
    runtime::RuntimeRequirement,
};

pub const DEFAULT_CONFIG_FILE: &str = "ainote.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serdeconv::Error,
    },
    #[error("Signature must be between 1 and {max} bytes, got {len}")]
    InvalidSignature { len: usize, max: usize },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub manifest: ManifestConfig,

    /// No runtime requirement unless configured.
    #[serde(default)]
    pub runtime: Option<RuntimeRequirement>,

    #[serde(default)]
    pub instructions: InstructionsConfig,
}

impl Config {
    /// Load the config at `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config = if path.exists() {
            serdeconv::from_toml_file(path).map_err(|source| ConfigError::Parse {
                path: path.to_owned(),
                source,
            })?
        } else {
            debug!("Config file {} not found, using defaults", path.display());
            Config::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let len = self.model.signature.as_bytes().len();
        if len == 0 || len > SIGNATURE_PREFIX_LEN {
            return Err(ConfigError::InvalidSignature {
                len,
                max: SIGNATURE_PREFIX_LEN,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    /// Human readable model name, e.g. `Flan-T5-small`.
    #[serde(default = "default_model_name")]
    pub name: String,

    #[serde(default = "default_model_path")]
    pub path: PathBuf,

    #[serde(default = "default_min_size_bytes")]
    pub min_size_bytes: u64,

    #[serde(default = "default_signature")]
    pub signature: Signature,

    #[serde(default = "default_size_hint")]
    pub size_hint: String,

    #[serde(default = "default_source_url")]
    pub source_url: String,

    #[serde(default = "default_license")]
    pub license: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model_name(),
            path: default_model_path(),
            min_size_bytes: default_min_size_bytes(),
            signature: default_signature(),
            size_hint: default_size_hint(),
            source_url: default_source_url(),
            license: default_license(),
        }
    }
}

impl ModelConfig {
    pub fn policy(&self) -> Policy {
        Policy {
            min_size_bytes: self.min_size_bytes,
            signature: self.signature.as_bytes().to_vec(),
        }
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub fn models_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_owned(),
            _ => PathBuf::from("."),
        }
    }
}

fn default_model_name() -> String {
    "Flan-T5-small".to_owned()
}

fn default_model_path() -> PathBuf {
    PathBuf::from("models").join("flan-t5-small.onnx")
}

fn default_min_size_bytes() -> u64 {
    DEFAULT_MIN_SIZE_BYTES
}

fn default_signature() -> Signature {
    Signature::Bytes(DEFAULT_SIGNATURE.to_vec())
}

/// Leading bytes of the artifact, written either as text (`"ONNX"`) or as a
/// byte array (`[0x08, 0x07, 0x12]`) for tags that are not valid UTF-8.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Signature {
    Text(String),
    Bytes(Vec<u8>),
}

impl Signature {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Signature::Text(text) => text.as_bytes(),
            Signature::Bytes(bytes) => bytes,
        }
    }
}

fn default_size_hint() -> String {
    "~301 MB".to_owned()
}

fn default_source_url() -> String {
    "https://huggingface.co/google/flan-t5-small".to_owned()
}

fn default_license() -> String {
    "Apache 2.0".to_owned()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestConfig {
    #[serde(default = "default_manifest_path")]
    pub path: PathBuf,

    #[serde(default = "default_dependency")]
    pub dependency: String,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            path: default_manifest_path(),
            dependency: default_dependency(),
        }
    }
}

fn default_manifest_path() -> PathBuf {
    PathBuf::from("package.json")
}

fn default_dependency() -> String {
    "onnxruntime-web".to_owned()
}

/// Templates rendered with `{name}`, `{file}`, `{size_hint}`, `{source_url}`,
/// `{license}` and `{models_dir}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstructionsConfig {
    #[serde(default = "default_model_info_template")]
    pub model_info: String,

    #[serde(default = "default_download_template")]
    pub download: String,
}

impl Default for InstructionsConfig {
    fn default() -> Self {
        Self {
            model_info: default_model_info_template(),
            download: default_download_template(),
        }
    }
}

fn default_model_info_template() -> String {
    "Model Download Information:
   - Model: {name} (ONNX format)
   - Size: {size_hint}
   - Source: {source_url}
   - License: {license}

Note: You need to manually download the model file.
   The model file should be placed in the '{models_dir}/' directory
   as '{file}'"
        .to_owned()
}

fn default_download_template() -> String {
    "Download Instructions:
1. Visit: {source_url}
2. Look for the ONNX model file ({file})
3. Download the file (should be {size_hint})
4. Place it in the '{models_dir}/' directory
5. Run this command again to verify

Alternative sources:
- ONNX Model Zoo: https://github.com/onnx/models
- Hugging Face ONNX Models: https://huggingface.co/models?search=onnx"
        .to_owned()
}
