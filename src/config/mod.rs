//! Configuration file handling for dumpmirror
//!
//! The configuration is a single YAML document. Every section has defaults,
//! so a missing file (or a missing section) falls back to built-in values.
//! Each pipeline component is constructed from its own section only.

mod sections;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{self, MirrorError, Result};

pub use sections::{
    DigestAlgorithm, DownloadConfig, Frequency, IntegrityConfig, LogRotation, LoggingConfig,
    PathsConfig, ResourcesConfig, RetentionConfig, ScheduleConfig, SourceConfig, UnpackConfig,
};

/// Directory name under the user's config and data directories
pub const APP_DIR: &str = "dumpmirror";

/// Configuration file name
pub const CONFIG_FILE: &str = "config.yaml";

/// Complete dumpmirror configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub paths: PathsConfig,
    pub download: DownloadConfig,
    pub integrity: IntegrityConfig,
    pub unpack: UnpackConfig,
    pub schedule: ScheduleConfig,
    pub retention: RetentionConfig,
    pub resources: ResourcesConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Parse configuration from YAML string
    #[cfg(test)]
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Serialize configuration to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Load and validate the configuration at `path`.
    ///
    /// A missing file is not an error: the built-in defaults are used and
    /// nothing is written. Use [`Config::write_default`] to materialize them.
    pub fn load(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let yaml = fs::read_to_string(path).map_err(|e| error::fs::read_failed(path, e))?;
            serde_yaml::from_str::<Self>(&yaml).map_err(|e| {
                error::config::parse_failed(path.display().to_string(), e.to_string())
            })?
        } else {
            tracing::debug!(path = %path.display(), "configuration file missing, using defaults");
            Self::default()
        };

        config.validate()?;
        Ok(config)
    }

    /// Write the default configuration to `path`.
    ///
    /// Refuses to overwrite an existing file unless `force` is set.
    pub fn write_default(path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            return Err(error::config::exists(path.display().to_string()));
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| error::fs::write_failed(parent, e))?;
        }

        let yaml = Self::default().to_yaml()?;
        fs::write(path, yaml).map_err(|e| error::fs::write_failed(path, e))?;
        Ok(())
    }

    /// Check cross-field constraints that serde cannot express
    pub fn validate(&self) -> Result<()> {
        self.source.validate()?;
        self.integrity.validate(&self.source.locale)?;
        self.schedule.validate()?;
        self.logging.validate()?;

        if self.download.chunk_size == 0 {
            return Err(error::config::invalid("download.chunk_size must be > 0"));
        }
        if self.download.timeout_secs == 0 {
            return Err(error::config::invalid("download.timeout_secs must be > 0"));
        }

        Ok(())
    }

    /// Settings that are valid but likely unintended, reported once logging is up
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        let patterns = self.source.files.len();
        if self.retention.cleanup_after_sync && self.retention.keep_versions < patterns {
            warnings.push(format!(
                "retention.keep_versions ({}) is below the number of source.files patterns ({patterns}); \
                 retention will delete current archives and the next cycle will download them again",
                self.retention.keep_versions
            ));
        }
        warnings
    }
}

/// Default configuration file location: `<config dir>/dumpmirror/config.yaml`
pub fn default_config_path() -> Result<PathBuf> {
    let base = dirs::config_dir().ok_or_else(|| MirrorError::ConfigInvalid {
        message: "Could not determine the user configuration directory; pass --config"
            .to_string(),
    })?;
    Ok(base.join(APP_DIR).join(CONFIG_FILE))
}

/// Resolve the configuration path from the command line (or environment)
pub fn resolve_config_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path),
        None => default_config_path(),
    }
}
