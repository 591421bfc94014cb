//! Error types and handling for dumpmirror
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`config`]: Configuration errors
//! - [`remote`]: Listing, probe and transfer errors
//! - [`unpack`]: Decompression and integrity errors
//! - [`fs`]: File system errors

pub mod config;
pub mod fs;
pub mod remote;
pub mod unpack;


use miette::Diagnostic;
use thiserror::Error;

/// Main error type for dumpmirror operations
#[derive(Error, Diagnostic, Debug)]
pub enum MirrorError {
    // Configuration errors
    #[error("Failed to parse configuration file: {path}: {reason}")]
    #[diagnostic(code(dumpmirror::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(dumpmirror::config::invalid))]
    ConfigInvalid { message: String },

    #[error("Configuration file already exists: {path}")]
    #[diagnostic(
        code(dumpmirror::config::exists),
        help("Pass --force to overwrite the existing file")
    )]
    ConfigExists { path: String },

    #[error("Failed to initialize logging: {reason}")]
    #[diagnostic(code(dumpmirror::config::logging_failed))]
    LoggingInitFailed { reason: String },

    // Remote errors
    #[error("Invalid URL '{url}': {reason}")]
    #[diagnostic(
        code(dumpmirror::remote::invalid_url),
        help("URL templates must expand to an absolute http(s) URL")
    )]
    InvalidUrl { url: String, reason: String },

    #[error("Request to {url} failed: {reason}")]
    #[diagnostic(code(dumpmirror::remote::request_failed))]
    RequestFailed { url: String, reason: String },

    #[error("Transfer of '{filename}' incomplete: received {received} of {expected} bytes")]
    #[diagnostic(code(dumpmirror::remote::incomplete))]
    TransferIncomplete {
        filename: String,
        expected: u64,
        received: u64,
    },

    // Unpack and integrity errors
    #[error("Unsupported compression format: {filename}")]
    #[diagnostic(
        code(dumpmirror::unpack::unsupported_format),
        help("Supported suffixes: .gz, .bz2")
    )]
    UnsupportedFormat { filename: String },

    #[error("Failed to unpack {path}: {reason}")]
    #[diagnostic(code(dumpmirror::unpack::failed))]
    UnpackFailed { path: String, reason: String },

    #[error("Checksum mismatch for {path}")]
    #[diagnostic(
        code(dumpmirror::unpack::checksum_mismatch),
        help("expected {expected}, got {actual}; the file will be downloaded again next cycle")
    )]
    ChecksumMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    // Cycle errors
    #[error("Synchronization failed: {succeeded}/{total} files up to date")]
    #[diagnostic(
        code(dumpmirror::sync::failed),
        help("See the log output above for the per-file failures")
    )]
    SyncFailed { succeeded: usize, total: usize },

    // Command line errors
    #[error("Unsupported shell: {shell}")]
    #[diagnostic(
        code(dumpmirror::cli::unsupported_shell),
        help("Supported shells: bash, elvish, fish, powershell, zsh")
    )]
    UnsupportedShell { shell: String },

    // File system errors
    #[error("Failed to read file: {path}: {reason}")]
    #[diagnostic(code(dumpmirror::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file: {path}: {reason}")]
    #[diagnostic(code(dumpmirror::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(dumpmirror::fs::io_error))]
    IoError { message: String },
}

impl From<std::io::Error> for MirrorError {
    fn from(err: std::io::Error) -> Self {
        MirrorError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for MirrorError {
    fn from(err: serde_yaml::Error) -> Self {
        MirrorError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for MirrorError {
    fn from(err: serde_json::Error) -> Self {
        MirrorError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for MirrorError {
    fn from(err: reqwest::Error) -> Self {
        MirrorError::RequestFailed {
            url: err
                .url()
                .map_or_else(|| "unknown".to_string(), ToString::to_string),
            reason: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, MirrorError>;
