//! Streaming checksums for downloaded archives
//!
//! Expected digests come from an optional checksum manifest published next
//! to the dumps. Without a manifest entry there is nothing to compare
//! against; callers then rely on the size match alone.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::config::DigestAlgorithm;
use crate::error::{self, Result};

/// Read buffer size for hashing
const HASH_BUFFER: usize = 64 * 1024;

enum Hasher {
    Md5(Md5),
    Sha1(Sha1),
    Sha256(Sha256),
    Blake3(Box<blake3::Hasher>),
}

impl Hasher {
    fn new(algorithm: DigestAlgorithm) -> Self {
        match algorithm {
            DigestAlgorithm::Md5 => Self::Md5(Md5::new()),
            DigestAlgorithm::Sha1 => Self::Sha1(Sha1::new()),
            DigestAlgorithm::Sha256 => Self::Sha256(Sha256::new()),
            DigestAlgorithm::Blake3 => Self::Blake3(Box::new(blake3::Hasher::new())),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Md5(h) => h.update(data),
            Self::Sha1(h) => h.update(data),
            Self::Sha256(h) => h.update(data),
            Self::Blake3(h) => {
                h.update(data);
            }
        }
    }

    fn finalize_hex(self) -> String {
        match self {
            Self::Md5(h) => hex::encode(h.finalize()),
            Self::Sha1(h) => hex::encode(h.finalize()),
            Self::Sha256(h) => hex::encode(h.finalize()),
            Self::Blake3(h) => h.finalize().to_hex().to_string(),
        }
    }
}

/// Hex digest of a file, computed over fixed-size reads
pub fn hash_file(path: &Path, algorithm: DigestAlgorithm) -> Result<String> {
    let file = File::open(path).map_err(|e| error::fs::read_failed(path, e))?;

    let mut reader = BufReader::new(file);
    let mut hasher = Hasher::new(algorithm);
    let mut buffer = vec![0u8; HASH_BUFFER];

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|e| error::fs::read_failed(path, e))?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize_hex())
}

/// Compare two hex digests, ignoring case and surrounding whitespace
pub fn digests_match(expected: &str, actual: &str) -> bool {
    expected.trim().eq_ignore_ascii_case(actual.trim())
}

/// Verify `path` against `expected`, returning a mismatch error on failure
pub fn verify(path: &Path, expected: &str, algorithm: DigestAlgorithm) -> Result<()> {
    let actual = hash_file(path, algorithm)?;
    if digests_match(expected, &actual) {
        Ok(())
    } else {
        Err(error::unpack::checksum_mismatch(
            path,
            expected.trim().to_ascii_lowercase(),
            actual,
        ))
    }
}

/// Expected digests by filename
#[derive(Debug, Default, Clone)]
pub struct ChecksumManifest {
    digests: HashMap<String, String>,
}

impl ChecksumManifest {
    /// Parse `md5sum`/`sha1sum`/`sha256sum`-style lines: `<hex>  <filename>` (a `*` binary marker
    /// before the filename is accepted). Unparseable lines are ignored.
    pub fn parse(text: &str) -> Self {
        let digests = text
            .lines()
            .filter_map(|line| {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    return None;
                }
                let (digest, name) = line.split_once(char::is_whitespace)?;
                let name = name.trim_start().trim_start_matches('*');
                let name = name.rsplit('/').next().unwrap_or(name);
                if name.is_empty() || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
                    return None;
                }
                Some((name.to_string(), digest.to_ascii_lowercase()))
            })
            .collect();
        Self { digests }
    }

    /// Expected digest for `filename`, if listed
    pub fn expected(&self, filename: &str) -> Option<&str> {
        self.digests.get(filename).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.digests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }
}
