use std::{
    fs::{self, File},
    io::{self, Read},
    path::Path,
};

use serde::Serialize;
use strum::IntoStaticStr;
use tracing::debug;

/// Number of leading bytes read from the artifact for the signature sniff.
pub const SIGNATURE_PREFIX_LEN: usize = 8;

/// 100 MiB.
pub const DEFAULT_MIN_SIZE_BYTES: u64 = 100 * 1024 * 1024;

pub const DEFAULT_SIGNATURE: &[u8] = b"ONNX";

/// Heuristic plausibility policy for a model artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    pub min_size_bytes: u64,
    pub signature: Vec<u8>,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            min_size_bytes: DEFAULT_MIN_SIZE_BYTES,
            signature: DEFAULT_SIGNATURE.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, IntoStaticStr)]
#[serde(tag = "status", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Status {
    Missing,
    TooSmall { size: u64 },
    /// `size` is absent when the file could not even be stat'ed.
    BadSignature {
        #[serde(skip_serializing_if = "Option::is_none")]
        size: Option<u64>,
        cause: String,
    },
    Ready { size: u64 },
}

impl Status {
    pub fn is_ready(&self) -> bool {
        matches!(self, Status::Ready { .. })
    }

    pub fn label(&self) -> &'static str {
        self.into()
    }
}

/// Decide whether the file at `path` looks like a usable model artifact.
///
/// Only the metadata and the first [`SIGNATURE_PREFIX_LEN`] bytes are read.
/// I/O failures are folded into [`Status::BadSignature`] with the cause attached.
pub fn check(path: &Path, policy: &Policy) -> Status {
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if is_absent(&err) => return Status::Missing,
        Err(err) => {
            return Status::BadSignature {
                size: None,
                cause: format!("failed to stat {}: {}", path.display(), err),
            }
        }
    };

    if !metadata.is_file() {
        debug!("{} exists but is not a regular file", path.display());
        return Status::Missing;
    }

    let size = metadata.len();
    if size < policy.min_size_bytes {
        return Status::TooSmall { size };
    }

    match_prefix(path, size, policy, read_prefix(path))
}

/// A missing file, or a path component that is a regular file rather than a directory.
fn is_absent(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}

fn match_prefix(path: &Path, size: u64, policy: &Policy, prefix: io::Result<Vec<u8>>) -> Status {
    match prefix {
        Ok(prefix) if prefix.starts_with(&policy.signature) => Status::Ready { size },
        Ok(prefix) => Status::BadSignature {
            size: Some(size),
            cause: format!(
                "expected leading bytes \"{}\", found \"{}\"",
                policy.signature.escape_ascii(),
                prefix.escape_ascii()
            ),
        },
        Err(err) => Status::BadSignature {
            size: Some(size),
            cause: format!("failed to read {}: {}", path.display(), err),
        },
    }
}

fn read_prefix(path: &Path) -> io::Result<Vec<u8>> {
    let mut prefix = Vec::with_capacity(SIGNATURE_PREFIX_LEN);
    File::open(path)?
        .take(SIGNATURE_PREFIX_LEN as u64)
        .read_to_end(&mut prefix)?;
    Ok(prefix)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use assert_matches::assert_matches;
    use temp_testdir::TempDir;

    use super::*;

    fn write_sparse(path: &Path, prefix: &[u8], len: u64) {
        let mut file = File::create(path).unwrap();
        file.write_all(prefix).unwrap();
        file.set_len(len).unwrap();
    }

    #[test]
    fn test_missing_file() {
        let tmp_dir = TempDir::default();
        let status = check(&tmp_dir.join("nope.onnx"), &Policy::default());
        assert_eq!(status, Status::Missing);
    }

    #[test]
    fn test_directory_is_missing() {
        let tmp_dir = TempDir::default();
        let dir = tmp_dir.join("model.onnx");
        fs::create_dir_all(&dir).unwrap();
        assert_eq!(check(&dir, &Policy::default()), Status::Missing);
    }

    #[test]
    fn test_too_small_regardless_of_content() {
        let tmp_dir = TempDir::default();
        let path = tmp_dir.join("model.onnx");
        write_sparse(&path, b"ONNX", 1024);

        assert_matches!(
            check(&path, &Policy::default()),
            Status::TooSmall { size: 1024 }
        );
    }

    #[test]
    fn test_just_below_threshold() {
        let tmp_dir = TempDir::default();
        let path = tmp_dir.join("model.onnx");
        write_sparse(&path, b"ONNX", DEFAULT_MIN_SIZE_BYTES - 1);

        assert_matches!(
            check(&path, &Policy::default()),
            Status::TooSmall { .. }
        );
    }

    #[test]
    fn test_bad_signature() {
        let tmp_dir = TempDir::default();
        let path = tmp_dir.join("model.onnx");
        write_sparse(&path, b"\x08\x07\x12\x07pytorch", DEFAULT_MIN_SIZE_BYTES);

        let status = check(&path, &Policy::default());
        assert_matches!(status, Status::BadSignature { size, ref cause } => {
            assert_eq!(size, Some(DEFAULT_MIN_SIZE_BYTES));
            assert!(cause.contains("expected leading bytes"));
        });
        assert_eq!(status.label(), "bad_signature");
    }

    #[test]
    fn test_ready_at_threshold() {
        let tmp_dir = TempDir::default();
        let path = tmp_dir.join("model.onnx");
        write_sparse(&path, b"ONNX\x00\x01", DEFAULT_MIN_SIZE_BYTES);

        let status = check(&path, &Policy::default());
        assert!(status.is_ready());
        assert_eq!(
            status,
            Status::Ready {
                size: DEFAULT_MIN_SIZE_BYTES
            }
        );
    }

    #[test]
    fn test_custom_policy() {
        let tmp_dir = TempDir::default();
        let path = tmp_dir.join("model.gguf");
        write_sparse(&path, b"GGUF", 16);

        let policy = Policy {
            min_size_bytes: 8,
            signature: b"GGUF".to_vec(),
        };
        assert_matches!(check(&path, &policy), Status::Ready { size: 16 });
    }

    #[test]
    fn test_file_shorter_than_signature() {
        let tmp_dir = TempDir::default();
        let path = tmp_dir.join("model.onnx");
        write_sparse(&path, b"ON", 2);

        let policy = Policy {
            min_size_bytes: 0,
            signature: b"ONNX".to_vec(),
        };
        assert_matches!(check(&path, &policy), Status::BadSignature { size: Some(2), .. });
    }

    #[test]
    fn test_parent_is_regular_file_is_missing() {
        let tmp_dir = TempDir::default();
        let models = tmp_dir.join("models");
        fs::write(&models, b"not a directory").unwrap();

        let status = check(&models.join("flan-t5-small.onnx"), &Policy::default());
        assert_eq!(status, Status::Missing);
    }

    #[test]
    fn test_prefix_read_error_keeps_cause() {
        let policy = Policy::default();
        let err = io::Error::new(io::ErrorKind::PermissionDenied, "Permission denied");

        let status = match_prefix(
            Path::new("models/flan-t5-small.onnx"),
            DEFAULT_MIN_SIZE_BYTES,
            &policy,
            Err(err),
        );
        assert_matches!(status, Status::BadSignature { size: Some(DEFAULT_MIN_SIZE_BYTES), ref cause } => {
            assert!(cause.contains("failed to read"));
            assert!(cause.contains("Permission denied"));
        });
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_parent_has_no_size() {
        use std::os::unix::fs::PermissionsExt;

        let tmp_dir = TempDir::default();
        let models = tmp_dir.join("models");
        fs::create_dir_all(&models).unwrap();
        let path = models.join("flan-t5-small.onnx");
        write_sparse(&path, b"ONNX", DEFAULT_MIN_SIZE_BYTES);

        fs::set_permissions(&models, fs::Permissions::from_mode(0o000)).unwrap();
        let status = check(&path, &Policy::default());
        fs::set_permissions(&models, fs::Permissions::from_mode(0o755)).unwrap();

        // permission bits do not apply to root
        if status.is_ready() {
            return;
        }
        assert_matches!(status, Status::BadSignature { size: None, ref cause } => {
            assert!(cause.contains("failed to stat"));
        });
    }
}
