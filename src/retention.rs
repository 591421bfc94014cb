//! Retention policy enforcement
//!
//! Compressed and unpacked directories are pruned independently: first by
//! rank (newest `keep_versions` survive), then by age. Canonical files are
//! never passed here.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::common::fs::{ManagedFile, list_managed_files};
use crate::common::size::format_size;
use crate::config::RetentionConfig;

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Which managed directory a retention pass runs over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Compressed,
    Unpacked,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compressed => write!(f, "compressed"),
            Self::Unpacked => write!(f, "unpacked"),
        }
    }
}

/// Why a file was removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionReason {
    /// Ranked beyond `keep_versions`
    Excess,
    /// Older than `max_age_days`
    Expired,
}

impl fmt::Display for DeletionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Excess => write!(f, "beyond keep_versions"),
            Self::Expired => write!(f, "older than max_age_days"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Deletion {
    pub path: PathBuf,
    pub size: u64,
    pub reason: DeletionReason,
}

/// Outcome of one retention pass over a directory
#[derive(Debug, Clone)]
pub struct RetentionReport {
    pub kind: ArtifactKind,
    pub examined: usize,
    pub deleted: Vec<Deletion>,
    /// Files that could not be removed, with the error message
    pub failed: Vec<(PathBuf, String)>,
}

impl RetentionReport {
    fn new(kind: ArtifactKind) -> Self {
        Self {
            kind,
            examined: 0,
            deleted: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn reclaimed_bytes(&self) -> u64 {
        self.deleted.iter().map(|d| d.size).sum()
    }
}

pub struct RetentionManager<'a> {
    policy: &'a RetentionConfig,
}

impl<'a> RetentionManager<'a> {
    pub fn new(policy: &'a RetentionConfig) -> Self {
        Self { policy }
    }

    /// Enforce the policy over `dir` as of now
    pub fn enforce(&self, dir: &Path, kind: ArtifactKind) -> RetentionReport {
        self.enforce_at(dir, kind, SystemTime::now())
    }

    /// Enforce the policy over `dir` as of `now`
    pub fn enforce_at(&self, dir: &Path, kind: ArtifactKind, now: SystemTime) -> RetentionReport {
        match list_managed_files(dir) {
            Ok(files) => self.prune(files, kind, now),
            Err(e) => {
                tracing::error!(%kind, dir = %dir.display(), error = %e, "cannot list directory for retention");
                RetentionReport::new(kind)
            }
        }
    }

    /// Apply the policy to an already listed set of files
    fn prune(
        &self,
        mut files: Vec<ManagedFile>,
        kind: ArtifactKind,
        now: SystemTime,
    ) -> RetentionReport {
        let mut report = RetentionReport::new(kind);
        report.examined = files.len();

        files.sort_by(|a, b| b.modified.cmp(&a.modified));
        let keep = self.policy.keep_versions.min(files.len());
        let excess = files.split_off(keep);
        let kept = files;

        for file in &excess {
            remove(file, DeletionReason::Excess, &mut report);
        }

        let max_age = Duration::from_secs(self.policy.max_age_days.saturating_mul(SECS_PER_DAY));
        let cutoff = now.checked_sub(max_age).unwrap_or(SystemTime::UNIX_EPOCH);
        for file in kept.iter().filter(|f| f.modified < cutoff) {
            remove(file, DeletionReason::Expired, &mut report);
        }

        if !report.deleted.is_empty() {
            tracing::info!(
                %kind,
                deleted = report.deleted.len(),
                reclaimed = %format_size(report.reclaimed_bytes()),
                "retention pass complete"
            );
        }
        report
    }
}

fn remove(file: &ManagedFile, reason: DeletionReason, report: &mut RetentionReport) {
    match std::fs::remove_file(&file.path) {
        Ok(()) => {
            tracing::info!(path = %file.path.display(), ?reason, "deleted old file");
            report.deleted.push(Deletion {
                path: file.path.clone(),
                size: file.size,
                reason,
            });
        }
        Err(e) => {
            tracing::error!(path = %file.path.display(), error = %e, "failed to delete old file");
            report.failed.push((file.path.clone(), e.to_string()));
        }
    }
}
