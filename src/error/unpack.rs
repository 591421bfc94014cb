//! Decompression and integrity errors

use std::path::Path;

use super::MirrorError;

/// Creates an unsupported format error
pub fn unsupported_format(filename: impl Into<String>) -> MirrorError {
    MirrorError::UnsupportedFormat {
        filename: filename.into(),
    }
}

/// Creates an unpack failed error
pub fn failed(path: &Path, reason: impl std::fmt::Display) -> MirrorError {
    MirrorError::UnpackFailed {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Creates a checksum mismatch error
pub fn checksum_mismatch(
    path: &Path,
    expected: impl Into<String>,
    actual: impl Into<String>,
) -> MirrorError {
    MirrorError::ChecksumMismatch {
        path: path.display().to_string(),
        expected: expected.into(),
        actual: actual.into(),
    }
}
