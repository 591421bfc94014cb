//! Synchronization cycle
//!
//! One cycle runs, in order: resource gate, directory setup, orphaned temp
//! sweep, catalog resolution, then for each descriptor size check, download
//! with retries, checksum verification, promotion and unpack. Retention runs
//! last. Only the gate and catalog can abort a cycle; every per-file failure
//! is recorded and the cycle moves on to the next file.

mod outcome;

use std::fs;
use std::path::Path;
use std::thread;

pub use outcome::{CycleAbort, FileOutcome, FileState, SyncReport};

use crate::catalog::{CatalogResolver, RemoteDumpDescriptor};
use crate::common::fs::promote;
use crate::common::size::format_size;
use crate::config::Config;
use crate::error::Result;
use crate::fetch::Fetcher;
use crate::hash::{self, ChecksumManifest};
use crate::remote::Remote;
use crate::resources::{ResourceGate, SystemProbe};
use crate::retention::{ArtifactKind, RetentionManager};
use crate::unpack::{Unpacker, canonical_is_stale};

/// Runs synchronization cycles against one configuration
pub struct Orchestrator<'a, R: Remote + ?Sized, P: SystemProbe + ?Sized> {
    config: &'a Config,
    remote: &'a R,
    probe: &'a P,
}

impl<'a, R: Remote + ?Sized, P: SystemProbe + ?Sized> Orchestrator<'a, R, P> {
    pub fn new(config: &'a Config, remote: &'a R, probe: &'a P) -> Self {
        Self {
            config,
            remote,
            probe,
        }
    }

    /// Run one full cycle
    pub fn run(&self) -> SyncReport {
        let config = self.config;
        let paths = &config.paths;
        tracing::info!(locale = %config.source.locale, "starting synchronization");

        let gate = ResourceGate::new(&config.resources, paths.download_volume(), self.probe);
        if !gate.check() {
            return self.abort(CycleAbort::InsufficientResources);
        }

        if let Err(e) = paths.ensure_all() {
            return self.abort(CycleAbort::DirectoriesUnavailable(e.to_string()));
        }

        let swept = sweep_orphans(&paths.temp);

        let catalog = CatalogResolver::new(&config.source, self.remote).resolve(&config.source.locale);
        if catalog.is_empty() {
            return self.abort(CycleAbort::EmptyCatalog);
        }

        let manifest = self.load_manifest();
        let outcomes = catalog
            .values()
            .map(|descriptor| self.process(descriptor, manifest.as_ref()))
            .collect();

        let mut report = SyncReport {
            outcomes,
            swept,
            ..SyncReport::default()
        };

        if config.retention.cleanup_after_sync {
            let retention = RetentionManager::new(&config.retention);
            report
                .retention
                .push(retention.enforce(&paths.compressed, ArtifactKind::Compressed));
            report
                .retention
                .push(retention.enforce(&paths.unpacked, ArtifactKind::Unpacked));
        }

        for failed in report.failed() {
            tracing::error!(
                filename = %failed.filename,
                state = %failed.state,
                error = failed.error.as_deref().unwrap_or("incomplete"),
                "file not synchronized"
            );
        }
        tracing::info!(
            succeeded = report.succeeded(),
            total = report.total(),
            downloaded = report.downloaded(),
            "synchronization completed"
        );
        report
    }

    fn abort(&self, reason: CycleAbort) -> SyncReport {
        tracing::error!(reason = %reason, "synchronization aborted");
        SyncReport::aborted(reason)
    }

    /// Fetch the checksum manifest for this cycle, if one is configured
    fn load_manifest(&self) -> Option<ChecksumManifest> {
        let integrity = &self.config.integrity;
        let url = match integrity.manifest_url_for(&self.config.source.locale) {
            Ok(Some(url)) => url,
            Ok(None) => {
                tracing::debug!("no checksum manifest configured, relying on size checks");
                return None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "invalid checksum manifest URL, verification skipped");
                return None;
            }
        };

        match self.remote.fetch_text(&url) {
            Ok(text) => {
                let manifest = ChecksumManifest::parse(&text);
                if manifest.is_empty() {
                    tracing::warn!(url = %url, "checksum manifest has no entries, verification skipped");
                    return None;
                }
                tracing::info!(url = %url, entries = manifest.len(), "loaded checksum manifest");
                Some(manifest)
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "failed to fetch checksum manifest, verification skipped");
                None
            }
        }
    }

    /// Drive one descriptor through the per-file states
    fn process(
        &self,
        descriptor: &RemoteDumpDescriptor,
        manifest: Option<&ChecksumManifest>,
    ) -> FileOutcome {
        let paths = &self.config.paths;
        let mut outcome = FileOutcome::new(&descriptor.filename);
        let local = paths.compressed.join(&descriptor.filename);

        let up_to_date = descriptor.size_bytes > 0
            && fs::metadata(&local)
                .map(|meta| meta.is_file() && meta.len() == descriptor.size_bytes)
                .unwrap_or(false);
        outcome.state = FileState::SizeChecked;

        if up_to_date {
            tracing::info!(filename = %descriptor.filename, "file already up to date");
            outcome.state = FileState::SkippedUpToDate;
        } else {
            tracing::info!(
                filename = %descriptor.filename,
                size = %format_size(descriptor.size_bytes),
                "downloading"
            );
            match self.download(descriptor, &local, manifest) {
                Ok(bytes) => {
                    tracing::info!(filename = %descriptor.filename, "successfully downloaded");
                    outcome.state = FileState::Downloaded;
                    outcome.downloaded = Some(bytes);
                }
                Err(e) => {
                    outcome.error = Some(e.to_string());
                    return outcome;
                }
            }
        }

        if self.config.unpack.enabled {
            match self.unpack_if_stale(&local) {
                Ok(true) => outcome.state = FileState::Unpacked,
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(filename = %descriptor.filename, error = %e, "unpack failed");
                    outcome.error = Some(e.to_string());
                }
            }
        }

        outcome
    }

    /// Fetch into the temp directory with retries, verify, then promote
    fn download(
        &self,
        descriptor: &RemoteDumpDescriptor,
        local: &Path,
        manifest: Option<&ChecksumManifest>,
    ) -> Result<u64> {
        let download = &self.config.download;
        let temp_path = self.config.paths.temp.join(&descriptor.filename);
        let fetcher = Fetcher::new(self.remote, download.chunk_size);
        let attempts = download.attempts();

        let mut attempt = 1;
        let bytes = loop {
            match fetcher.fetch(descriptor, &temp_path) {
                Ok(bytes) => break bytes,
                Err(e) if attempt < attempts => {
                    tracing::warn!(
                        filename = %descriptor.filename,
                        attempt,
                        attempts,
                        error = %e,
                        "download failed, retrying"
                    );
                    discard(&temp_path);
                    thread::sleep(download.retry_delay());
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!(filename = %descriptor.filename, attempts, error = %e, "download failed");
                    discard(&temp_path);
                    return Err(e);
                }
            }
        };

        if let Err(e) = self.verify(descriptor, &temp_path, manifest) {
            tracing::error!(filename = %descriptor.filename, error = %e, "integrity check failed");
            discard(&temp_path);
            return Err(e);
        }

        promote(&temp_path, local, download.chunk_size).inspect_err(|_| discard(&temp_path))?;
        Ok(bytes)
    }

    fn verify(
        &self,
        descriptor: &RemoteDumpDescriptor,
        path: &Path,
        manifest: Option<&ChecksumManifest>,
    ) -> Result<()> {
        let Some(expected) = manifest.and_then(|m| m.expected(&descriptor.filename)) else {
            tracing::debug!(filename = %descriptor.filename, "no expected checksum, skipping verification");
            return Ok(());
        };
        hash::verify(path, expected, self.config.integrity.algorithm)?;
        tracing::debug!(filename = %descriptor.filename, "checksum verified");
        Ok(())
    }

    /// Unpack `archive` when its canonical copy is missing or older.
    /// Returns whether an unpack ran.
    fn unpack_if_stale(&self, archive: &Path) -> Result<bool> {
        let paths = &self.config.paths;
        if !canonical_is_stale(archive, &paths.canonical)? {
            tracing::debug!(archive = %archive.display(), "canonical copy is current");
            return Ok(false);
        }
        let artifact = Unpacker::new(self.config.download.chunk_size).unpack(
            archive,
            &paths.unpacked,
            &paths.canonical,
        )?;
        tracing::debug!(
            name = %artifact.name,
            bytes = artifact.bytes,
            working = %artifact.working_path.display(),
            canonical = %artifact.canonical_path.display(),
            "unpacked artifact published"
        );
        Ok(true)
    }
}

fn discard(path: &Path) {
    match fs::remove_file(path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove temp file");
        }
        _ => {}
    }
}

/// Remove files an interrupted earlier run left in the temp directory
fn sweep_orphans(temp_dir: &Path) -> usize {
    let entries = match fs::read_dir(temp_dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(dir = %temp_dir.display(), error = %e, "cannot list temp directory");
            return 0;
        }
    };

    let mut removed = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        if !entry.file_type().is_ok_and(|t| t.is_file()) {
            continue;
        }
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "removed orphaned temp file");
                removed += 1;
            }
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to remove orphaned temp file"),
        }
    }
    removed
}
