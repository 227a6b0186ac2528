use std::{
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("{} not found - are you in the right directory?", .0.display())]
    NotFound(PathBuf),
    #[error("Error reading manifest: {0}")]
    Io(#[from] io::Error),
    #[error("{dependency} dependency not found in {}", .manifest.display())]
    DependencyMissing {
        dependency: String,
        manifest: PathBuf,
    },
}

/// Check that the manifest at `path` mentions `dependency` anywhere in its content.
pub fn check_dependency(path: &Path, dependency: &str) -> Result<(), ManifestError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(ManifestError::NotFound(path.to_owned()))
        }
        Err(err) => return Err(err.into()),
    };

    if content.contains(dependency) {
        Ok(())
    } else {
        Err(ManifestError::DependencyMissing {
            dependency: dependency.to_owned(),
            manifest: path.to_owned(),
        })
    }
}
