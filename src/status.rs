//! Read-only mirror status
//!
//! Summarizes what is on disk without touching the network or creating any
//! directory. Missing directories count as empty.

use std::time::SystemTime;

use chrono::{DateTime, Local, NaiveDateTime};
use serde::Serialize;

use crate::common::fs::{ManagedFile, list_managed_files};
use crate::common::size::format_size;
use crate::config::Config;
use crate::error::Result;
use crate::resources::SystemProbe;
use crate::scheduler::Schedule;

/// File count and total size of one managed directory
#[derive(Debug, Default, Clone, Serialize, PartialEq, Eq)]
pub struct KindSummary {
    pub files: usize,
    pub total_bytes: u64,
}

impl KindSummary {
    fn from_files(files: &[ManagedFile]) -> Self {
        Self {
            files: files.len(),
            total_bytes: files.iter().map(|f| f.size).sum(),
        }
    }

    pub fn formatted_size(&self) -> String {
        format_size(self.total_bytes)
    }
}

/// Snapshot of the mirror
#[derive(Debug, Clone, Serialize)]
pub struct MirrorStatus {
    pub compressed: KindSummary,
    pub unpacked: KindSummary,
    pub canonical: KindSummary,
    /// Names of the current canonical files, sorted
    pub canonical_files: Vec<String>,
    /// Newest modification time across all managed files
    pub last_sync: Option<DateTime<Local>>,
    /// Free space on the compressed-archive volume
    pub free_disk_bytes: Option<u64>,
    pub next_sync: Option<NaiveDateTime>,
}

/// Collect the status as of `now`
pub fn collect<P: SystemProbe + ?Sized>(
    config: &Config,
    probe: &P,
    now: NaiveDateTime,
) -> Result<MirrorStatus> {
    let paths = &config.paths;
    let compressed = list_managed_files(&paths.compressed)?;
    let unpacked = list_managed_files(&paths.unpacked)?;
    let canonical = list_managed_files(&paths.canonical)?;

    let last_sync = compressed
        .iter()
        .chain(&unpacked)
        .chain(&canonical)
        .map(|f| f.modified)
        .filter(|modified| *modified > SystemTime::UNIX_EPOCH)
        .max()
        .map(DateTime::<Local>::from);

    let mut canonical_files: Vec<String> = canonical.iter().map(|f| f.name.clone()).collect();
    canonical_files.sort();

    let next_sync = Schedule::from_config(&config.schedule)?.next_after(now);

    Ok(MirrorStatus {
        compressed: KindSummary::from_files(&compressed),
        unpacked: KindSummary::from_files(&unpacked),
        canonical: KindSummary::from_files(&canonical),
        canonical_files,
        last_sync,
        free_disk_bytes: probe.available_disk(paths.download_volume()),
        next_sync,
    })
}
