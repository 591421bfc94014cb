//! Remote listing and transfer errors

use super::MirrorError;

/// Creates an invalid URL error
pub fn invalid_url(url: impl Into<String>, reason: impl std::fmt::Display) -> MirrorError {
    MirrorError::InvalidUrl {
        url: url.into(),
        reason: reason.to_string(),
    }
}

/// Creates a request failed error
pub fn request_failed(url: impl Into<String>, reason: impl std::fmt::Display) -> MirrorError {
    MirrorError::RequestFailed {
        url: url.into(),
        reason: reason.to_string(),
    }
}

/// Creates a transfer incomplete error
pub fn incomplete(filename: impl Into<String>, expected: u64, received: u64) -> MirrorError {
    MirrorError::TransferIncomplete {
        filename: filename.into(),
        expected,
        received,
    }
}
