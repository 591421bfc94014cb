//! Host resource gate
//!
//! A point-in-time check of available memory and free disk space, evaluated
//! fresh before every cycle.

use std::path::{Path, PathBuf};

use sysinfo::{Disks, System};

use crate::common::size::format_size;
use crate::config::ResourcesConfig;

/// Source of host resource readings
pub trait SystemProbe {
    /// Memory available for new allocations, in bytes
    fn available_memory(&self) -> u64;

    /// Free space on the volume holding `path`, in bytes; `None` if unknown
    fn available_disk(&self, path: &Path) -> Option<u64>;
}

/// [`SystemProbe`] backed by `sysinfo`
#[derive(Debug, Default)]
pub struct HostProbe;

impl SystemProbe for HostProbe {
    fn available_memory(&self) -> u64 {
        let mut system = System::new();
        system.refresh_memory();
        system.available_memory()
    }

    fn available_disk(&self, path: &Path) -> Option<u64> {
        let target = existing_ancestor(path);
        let disks = Disks::new_with_refreshed_list();

        // The volume is the disk with the longest mount point containing the path
        disks
            .list()
            .iter()
            .filter(|disk| target.starts_with(disk.mount_point()))
            .max_by_key(|disk| disk.mount_point().as_os_str().len())
            .map(sysinfo::Disk::available_space)
    }
}

/// Nearest ancestor of `path` that exists, canonicalized when possible
fn existing_ancestor(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    absolute
        .ancestors()
        .find(|candidate| candidate.exists())
        .map(|found| found.canonicalize().unwrap_or_else(|_| found.to_path_buf()))
        .unwrap_or(absolute)
}

/// Checks configured minimums before a cycle may proceed
pub struct ResourceGate<'a, P: SystemProbe + ?Sized> {
    limits: &'a ResourcesConfig,
    volume: &'a Path,
    probe: &'a P,
}

impl<'a, P: SystemProbe + ?Sized> ResourceGate<'a, P> {
    pub fn new(limits: &'a ResourcesConfig, volume: &'a Path, probe: &'a P) -> Self {
        Self {
            limits,
            volume,
            probe,
        }
    }

    /// `true` if memory and disk are both at or above their thresholds
    pub fn check(&self) -> bool {
        let memory = self.probe.available_memory();
        if memory < self.limits.min_memory_bytes() {
            tracing::warn!(
                available = %format_size(memory),
                required = %format_size(self.limits.min_memory_bytes()),
                "insufficient memory"
            );
            return false;
        }

        match self.probe.available_disk(self.volume) {
            Some(free) if free < self.limits.min_disk_bytes() => {
                tracing::warn!(
                    volume = %self.volume.display(),
                    available = %format_size(free),
                    required = %format_size(self.limits.min_disk_bytes()),
                    "insufficient disk space"
                );
                false
            }
            Some(_) => true,
            None => {
                tracing::warn!(
                    volume = %self.volume.display(),
                    "could not determine free disk space"
                );
                self.limits.min_disk_bytes() == 0
            }
        }
    }
}
