use std::{fs, io, path::Path};

use ainote_common::{config::ModelConfig, readiness};
use tracing::{info, warn};

pub use readiness::Status;

pub fn check_model(config: &ModelConfig, path: &Path) -> Status {
    let status = readiness::check(path, &config.policy());
    match &status {
        Status::Ready { size } => info!(
            "Model {} is ready at local path {} ({})",
            config.name,
            path.display(),
            format_size(*size)
        ),
        Status::Missing => warn!("Model not found at local path: {}", path.display()),
        Status::TooSmall { size } => warn!(
            "Model at {} seems too small: {} < {}",
            path.display(),
            format_size(*size),
            format_size(config.min_size_bytes)
        ),
        Status::BadSignature { cause, .. } => {
            warn!("Model at {} failed verification: {}", path.display(), cause)
        }
    }
    status
}

/// Returns `true` when the directory had to be created.
pub fn ensure_models_dir(dir: &Path) -> io::Result<bool> {
    if dir.is_dir() {
        return Ok(false);
    }
    fs::create_dir_all(dir)?;
    info!("Created models directory {}", dir.display());
    Ok(true)
}

pub fn format_size(bytes: u64) -> String {
    format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
}
