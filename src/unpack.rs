//! Decompression of downloaded archives
//!
//! An archive `X.gz` or `X.bz2` is decompressed to `X` in the unpacked
//! working directory, then republished as the canonical `X`. Readers of the
//! canonical directory only ever observe a complete file.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use bzip2::read::MultiBzDecoder;
use flate2::read::MultiGzDecoder;

use crate::common::fs::publish_copy;
use crate::error::{self, Result};

/// Compression formats recognized by suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Gzip,
    Bzip2,
}

impl Compression {
    /// Detect the format from `filename`'s suffix
    pub fn from_filename(filename: &str) -> Result<Self> {
        if filename.ends_with(".gz") {
            Ok(Self::Gzip)
        } else if filename.ends_with(".bz2") {
            Ok(Self::Bzip2)
        } else {
            Err(error::unpack::unsupported_format(filename))
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            Self::Gzip => ".gz",
            Self::Bzip2 => ".bz2",
        }
    }

    fn decoder<'r>(self, input: impl Read + 'r) -> Box<dyn Read + 'r> {
        match self {
            Self::Gzip => Box::new(MultiGzDecoder::new(input)),
            Self::Bzip2 => Box::new(MultiBzDecoder::new(input)),
        }
    }
}

/// Logical name of an archive: its filename minus the compression suffix
pub fn unpacked_name(archive_name: &str) -> Result<String> {
    let format = Compression::from_filename(archive_name)?;
    match archive_name.strip_suffix(format.suffix()) {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(error::unpack::unsupported_format(archive_name)),
    }
}

/// Result of a successful unpack
#[derive(Debug, Clone)]
pub struct UnpackedArtifact {
    /// Logical name shared by the working copy and the canonical file
    pub name: String,
    pub working_path: PathBuf,
    pub canonical_path: PathBuf,
    pub bytes: u64,
}

/// Whether the canonical copy of `archive` is missing or older than it
pub fn canonical_is_stale(archive: &Path, canonical_dir: &Path) -> Result<bool> {
    let name = archive
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let canonical = canonical_dir.join(unpacked_name(&name)?);

    let Ok(canonical_meta) = fs::metadata(&canonical) else {
        return Ok(true);
    };
    let archive_meta = fs::metadata(archive).map_err(|e| error::fs::read_failed(archive, e))?;

    match (archive_meta.modified(), canonical_meta.modified()) {
        (Ok(archive_time), Ok(canonical_time)) => Ok(canonical_time < archive_time),
        _ => Ok(true),
    }
}

/// Streams compressed archives into the working and canonical directories
pub struct Unpacker {
    buffer_size: usize,
}

impl Unpacker {
    pub fn new(buffer_size: usize) -> Self {
        Self {
            buffer_size: buffer_size.max(1),
        }
    }

    /// Decompress `compressed_path` into `working_dir`, then atomically
    /// replace the same-named file in `canonical_dir`.
    ///
    /// The working copy stays in place after promotion.
    pub fn unpack(
        &self,
        compressed_path: &Path,
        working_dir: &Path,
        canonical_dir: &Path,
    ) -> Result<UnpackedArtifact> {
        let archive_name = compressed_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| error::unpack::failed(compressed_path, "path has no file name"))?;
        let format = Compression::from_filename(&archive_name)?;
        let name = unpacked_name(&archive_name)?;

        let working_path = working_dir.join(&name);
        let canonical_path = canonical_dir.join(&name);

        tracing::info!(archive = %archive_name, ?format, "unpacking");
        let bytes = self.decompress(compressed_path, format, &working_path)?;

        publish_copy(&working_path, &canonical_path, self.buffer_size)?;
        tracing::info!(
            name = %name,
            bytes,
            canonical = %canonical_path.display(),
            "canonical copy updated"
        );

        Ok(UnpackedArtifact {
            name,
            working_path,
            canonical_path,
            bytes,
        })
    }

    /// Decompress into a hidden sibling of `output`, renaming it over
    /// `output` only once the whole stream decoded.
    fn decompress(&self, input_path: &Path, format: Compression, output: &Path) -> Result<u64> {
        let dir = output
            .parent()
            .ok_or_else(|| error::fs::write_failed(output, "destination has no parent directory"))?;

        let input = File::open(input_path).map_err(|e| error::fs::read_failed(input_path, e))?;
        let mut decoder = format.decoder(BufReader::with_capacity(self.buffer_size, input));

        let mut staged = tempfile::Builder::new()
            .prefix(".")
            .suffix(".partial")
            .tempfile_in(dir)
            .map_err(|e| error::fs::write_failed(dir, e))?;

        let bytes = {
            let mut writer = BufWriter::with_capacity(self.buffer_size, staged.as_file_mut());
            let bytes = copy_chunked(&mut decoder, &mut writer, self.buffer_size)
                .map_err(|e| error::unpack::failed(input_path, e))?;
            writer
                .flush()
                .map_err(|e| error::fs::write_failed(output, e))?;
            bytes
        };

        staged
            .persist(output)
            .map_err(|e| error::fs::write_failed(output, e.error))?;
        Ok(bytes)
    }
}

fn copy_chunked(reader: &mut dyn Read, writer: &mut impl Write, chunk: usize) -> io::Result<u64> {
    let mut buffer = vec![0u8; chunk];
    let mut total = 0u64;
    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => return Ok(total),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        writer.write_all(&buffer[..n])?;
        total += n as u64;
    }
}
