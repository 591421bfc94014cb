//! Configuration sections, one per pipeline component

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{NaiveTime, Weekday};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;

use super::APP_DIR;
use crate::error::{self, Result};

/// Placeholder replaced by the locale code in URL templates
pub const LOCALE_PLACEHOLDER: &str = "{locale}";

/// Expand a `{locale}` URL template into an absolute URL
fn expand_template(template: &str, locale: &str) -> Result<Url> {
    let expanded = template.replace(LOCALE_PLACEHOLDER, locale);
    Url::parse(&expanded).map_err(|e| error::remote::invalid_url(expanded, e))
}

/// Remote listing location and the files to mirror from it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SourceConfig {
    /// Language / locale code substituted into `listing_url`
    pub locale: String,
    /// Listing page URL template, must contain `{locale}`
    pub listing_url: String,
    /// Allow-list of filename substrings; a link matches if it contains any of them
    pub files: Vec<String>,
    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            locale: "en".to_string(),
            listing_url: "https://dumps.wikimedia.org/{locale}wiki/latest/".to_string(),
            files: [
                "pages-articles.xml.bz2",
                "pages-articles-multistream.xml.bz2",
                "pages-meta-current.xml.bz2",
                "page.sql.gz",
                "categorylinks.sql.gz",
                "langlinks.sql.gz",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            user_agent: format!("dumpmirror/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl SourceConfig {
    /// Listing URL for the configured locale.
    ///
    /// Always ends with `/` so relative links resolve inside the listing directory.
    pub fn listing_url_for(&self, locale: &str) -> Result<Url> {
        let mut url = expand_template(&self.listing_url, locale)?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    pub(super) fn validate(&self) -> Result<()> {
        if self.locale.trim().is_empty() {
            return Err(error::config::invalid("source.locale must not be empty"));
        }
        if !self.listing_url.contains(LOCALE_PLACEHOLDER) {
            return Err(error::config::invalid(format!(
                "source.listing_url must contain '{LOCALE_PLACEHOLDER}'"
            )));
        }
        if self.files.iter().all(|f| f.trim().is_empty()) {
            return Err(error::config::invalid(
                "source.files must list at least one filename pattern",
            ));
        }
        self.listing_url_for(&self.locale)?;
        Ok(())
    }
}

/// The four directories owned by dumpmirror
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PathsConfig {
    /// Completed compressed archives
    pub compressed: PathBuf,
    /// In-progress downloads
    pub temp: PathBuf,
    /// Decompressed working copies
    pub unpacked: PathBuf,
    /// One current decompressed file per logical archive name
    pub canonical: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        let base = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("/var/lib"))
            .join(APP_DIR);
        Self {
            compressed: base.join("compressed"),
            temp: base.join("temp"),
            unpacked: base.join("unpacked"),
            canonical: base.join("canonical"),
        }
    }
}

impl PathsConfig {
    /// Create every managed directory that does not exist yet
    pub fn ensure_all(&self) -> Result<()> {
        for dir in [&self.compressed, &self.temp, &self.unpacked, &self.canonical] {
            std::fs::create_dir_all(dir).map_err(|e| error::fs::write_failed(dir, e))?;
        }
        Ok(())
    }

    /// Directory whose volume the disk-space check is evaluated against
    pub fn download_volume(&self) -> &Path {
        &self.compressed
    }
}

/// Transfer tuning
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DownloadConfig {
    /// Read/write buffer size in bytes
    pub chunk_size: usize,
    /// Network timeout in seconds
    pub timeout_secs: u64,
    /// Attempts per file per cycle (0 is treated as 1)
    pub retry_attempts: u32,
    /// Pause between attempts in seconds
    pub retry_delay_secs: u64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            chunk_size: 64 * 1024,
            timeout_secs: 300,
            retry_attempts: 3,
            retry_delay_secs: 60,
        }
    }
}

impl DownloadConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    pub fn attempts(&self) -> u32 {
        self.retry_attempts.max(1)
    }
}

/// Digest used for checksum manifests
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    /// `*-md5sums.txt`, as published by Wikimedia dumps
    Md5,
    /// `*-sha1sums.txt`
    Sha1,
    #[default]
    Sha256,
    Blake3,
}

/// Optional checksum verification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IntegrityConfig {
    pub verify_checksums: bool,
    pub algorithm: DigestAlgorithm,
    /// Manifest URL template (`{locale}` allowed) listing `<digest>  <filename>` lines.
    /// Without one, verification has nothing to compare against and is skipped.
    pub manifest_url: Option<String>,
}

impl Default for IntegrityConfig {
    fn default() -> Self {
        Self {
            verify_checksums: true,
            algorithm: DigestAlgorithm::Sha256,
            manifest_url: None,
        }
    }
}

impl IntegrityConfig {
    /// Manifest URL for the locale, if verification is enabled and a manifest is configured
    pub fn manifest_url_for(&self, locale: &str) -> Result<Option<Url>> {
        if !self.verify_checksums {
            return Ok(None);
        }
        self.manifest_url
            .as_deref()
            .map(|template| expand_template(template, locale))
            .transpose()
    }

    pub(super) fn validate(&self, locale: &str) -> Result<()> {
        self.manifest_url_for(locale).map(|_| ())
    }
}

/// Decompression toggle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UnpackConfig {
    pub enabled: bool,
}

impl Default for UnpackConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// How often the service triggers a cycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

/// Service cadence
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScheduleConfig {
    pub frequency: Frequency,
    /// Local time of day, `HH:MM`
    pub time: String,
    /// Day of the week for `weekly`
    pub weekday: Weekday,
    /// Day of the month for `monthly` (1-28)
    pub day_of_month: u32,
    /// Seconds between trigger checks
    pub poll_interval_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            frequency: Frequency::Daily,
            time: "02:00".to_string(),
            weekday: Weekday::Sun,
            day_of_month: 1,
            poll_interval_secs: 3600,
        }
    }
}

impl ScheduleConfig {
    /// Parsed trigger time of day
    pub fn trigger_time(&self) -> Result<NaiveTime> {
        NaiveTime::parse_from_str(self.time.trim(), "%H:%M").map_err(|e| {
            error::config::invalid(format!(
                "schedule.time '{}' is not HH:MM: {e}",
                self.time
            ))
        })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub(super) fn validate(&self) -> Result<()> {
        self.trigger_time()?;
        if !(1..=28).contains(&self.day_of_month) {
            return Err(error::config::invalid(
                "schedule.day_of_month must be between 1 and 28",
            ));
        }
        if self.poll_interval_secs == 0 {
            return Err(error::config::invalid(
                "schedule.poll_interval_secs must be > 0",
            ));
        }
        Ok(())
    }
}

/// Count- and age-based pruning of compressed and unpacked files
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetentionConfig {
    /// Newest files kept per directory, across all allow-listed names
    pub keep_versions: usize,
    /// Files older than this are removed regardless of rank
    pub max_age_days: u64,
    /// Run retention at the end of every cycle
    pub cleanup_after_sync: bool,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            // Two releases of the default allow-list
            keep_versions: 12,
            max_age_days: 30,
            cleanup_after_sync: true,
        }
    }
}

/// Host thresholds checked before a cycle starts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ResourcesConfig {
    pub min_available_memory_mb: u64,
    pub min_free_disk_gb: u64,
}

impl Default for ResourcesConfig {
    fn default() -> Self {
        Self {
            min_available_memory_mb: 2048,
            min_free_disk_gb: 10,
        }
    }
}

impl ResourcesConfig {
    pub fn min_memory_bytes(&self) -> u64 {
        self.min_available_memory_mb.saturating_mul(1024 * 1024)
    }

    pub fn min_disk_bytes(&self) -> u64 {
        self.min_free_disk_gb.saturating_mul(1024 * 1024 * 1024)
    }
}

/// Log file rotation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Never,
    Hourly,
    #[default]
    Daily,
}

/// Log level and optional file sink
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Log file; stderr only when unset
    pub file: Option<PathBuf>,
    pub rotation: LogRotation,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            rotation: LogRotation::Daily,
        }
    }
}

impl LoggingConfig {
    pub fn level_filter(&self) -> Result<LevelFilter> {
        self.level.trim().parse::<LevelFilter>().map_err(|_| {
            error::config::invalid(format!(
                "logging.level '{}' must be one of off, error, warn, info, debug, trace",
                self.level
            ))
        })
    }

    pub(super) fn validate(&self) -> Result<()> {
        self.level_filter().map(|_| ())
    }
}
