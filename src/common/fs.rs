//! Common file system operations with unified error handling

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use walkdir::WalkDir;

use crate::error::{self, Result};

/// A regular file directly inside a managed directory
#[derive(Debug, Clone)]
pub struct ManagedFile {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
    pub modified: SystemTime,
}

/// Dotfiles are in-progress temporaries or foreign files, never managed artifacts
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// List the non-hidden regular files directly inside `dir`.
///
/// A missing directory is an empty listing. Entries that vanish or cannot be
/// inspected while listing are skipped.
pub fn list_managed_files(dir: &Path) -> Result<Vec<ManagedFile>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(error::fs::read_failed(dir, e)),
            Err(e) => {
                tracing::debug!(dir = %dir.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if is_hidden(&name) {
            continue;
        }
        let Ok(metadata) = entry.metadata() else {
            continue;
        };

        files.push(ManagedFile {
            path: entry.path().to_path_buf(),
            name,
            size: metadata.len(),
            modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
        });
    }

    Ok(files)
}

/// Copy `src` to `dest` so that readers of `dest` only ever see the old file
/// or the complete new one.
///
/// The data is written to a hidden temporary file next to `dest` and renamed
/// over it once flushed.
pub fn publish_copy(src: &Path, dest: &Path, buffer_size: usize) -> Result<()> {
    let dir = dest
        .parent()
        .ok_or_else(|| error::fs::write_failed(dest, "destination has no parent directory"))?;

    let mut staged = tempfile::Builder::new()
        .prefix(".")
        .suffix(".partial")
        .tempfile_in(dir)
        .map_err(|e| error::fs::write_failed(dir, e))?;

    {
        let input = File::open(src).map_err(|e| error::fs::read_failed(src, e))?;
        let mut reader = BufReader::with_capacity(buffer_size, input);
        let mut writer = BufWriter::with_capacity(buffer_size, staged.as_file_mut());
        io::copy(&mut reader, &mut writer).map_err(|e| error::fs::write_failed(dest, e))?;
        writer.flush().map_err(|e| error::fs::write_failed(dest, e))?;
    }
    staged
        .as_file()
        .sync_all()
        .map_err(|e| error::fs::write_failed(dest, e))?;

    staged
        .persist(dest)
        .map_err(|e| error::fs::write_failed(dest, e.error))?;
    Ok(())
}

/// Move a finished file into place.
///
/// Uses a rename when `src` and `dest` share a volume; otherwise falls back
/// to [`publish_copy`] and removes the source.
pub fn promote(src: &Path, dest: &Path, buffer_size: usize) -> Result<()> {
    match fs::rename(src, dest) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            publish_copy(src, dest, buffer_size)?;
            fs::remove_file(src).map_err(|e| error::fs::write_failed(src, e))?;
            Ok(())
        }
        Err(e) => Err(error::fs::write_failed(dest, e)),
    }
}
