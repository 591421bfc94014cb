//! Configuration errors

use super::MirrorError;

/// Creates a config parse failed error
pub fn parse_failed(path: impl Into<String>, reason: impl Into<String>) -> MirrorError {
    MirrorError::ConfigParseFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates an invalid config error
pub fn invalid(message: impl Into<String>) -> MirrorError {
    MirrorError::ConfigInvalid {
        message: message.into(),
    }
}

/// Creates a config already exists error
pub fn exists(path: impl Into<String>) -> MirrorError {
    MirrorError::ConfigExists { path: path.into() }
}

/// Creates a logging initialization error
pub fn logging_failed(reason: impl std::fmt::Display) -> MirrorError {
    MirrorError::LoggingInitFailed {
        reason: reason.to_string(),
    }
}
