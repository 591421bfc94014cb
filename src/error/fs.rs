//! File system errors

use std::path::Path;

use super::MirrorError;

/// Creates a file read failed error
pub fn read_failed(path: &Path, err: impl std::fmt::Display) -> MirrorError {
    MirrorError::FileReadFailed {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

/// Creates a file write failed error
pub fn write_failed(path: &Path, err: impl std::fmt::Display) -> MirrorError {
    MirrorError::FileWriteFailed {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

