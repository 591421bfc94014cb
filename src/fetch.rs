//! Streaming download of a single remote file into a temporary path

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

use crate::catalog::RemoteDumpDescriptor;
use crate::error::{self, Result};
use crate::progress::TransferProgress;
use crate::remote::Remote;

/// Downloads one descriptor at a time in bounded chunks.
///
/// The fetcher never touches final locations: it only writes `temp_path`,
/// and a failed transfer leaves whatever was written there for the caller
/// to discard.
pub struct Fetcher<'a, R: Remote + ?Sized> {
    remote: &'a R,
    chunk_size: usize,
}

impl<'a, R: Remote + ?Sized> Fetcher<'a, R> {
    pub fn new(remote: &'a R, chunk_size: usize) -> Self {
        Self {
            remote,
            chunk_size: chunk_size.max(1),
        }
    }

    /// Stream `descriptor` into `temp_path`, returning the bytes written.
    ///
    /// When the descriptor's size is known, a body of any other length is a
    /// failed transfer.
    pub fn fetch(&self, descriptor: &RemoteDumpDescriptor, temp_path: &Path) -> Result<u64> {
        let mut body = self.remote.open(&descriptor.url)?;
        let file = File::create(temp_path).map_err(|e| error::fs::write_failed(temp_path, e))?;
        let mut writer = BufWriter::with_capacity(self.chunk_size, file);

        let progress = TransferProgress::new(&descriptor.filename, descriptor.size_bytes);
        let mut buffer = vec![0u8; self.chunk_size];
        let mut written: u64 = 0;

        let result = loop {
            let read = match body.read(&mut buffer) {
                Ok(0) => break Ok(()),
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => break Err(error::remote::request_failed(descriptor.url.as_str(), e)),
            };
            if let Err(e) = writer.write_all(&buffer[..read]) {
                break Err(error::fs::write_failed(temp_path, e));
            }
            written += read as u64;
            progress.advance(read as u64);
        };

        let result = result.and_then(|()| {
            writer
                .into_inner()
                .map_err(|e| error::fs::write_failed(temp_path, e.error()))?
                .sync_all()
                .map_err(|e| error::fs::write_failed(temp_path, e))
        });

        if let Err(e) = result {
            progress.abandon();
            return Err(e);
        }
        progress.finish();

        if descriptor.size_bytes > 0 && written != descriptor.size_bytes {
            return Err(error::remote::incomplete(
                descriptor.filename.clone(),
                descriptor.size_bytes,
                written,
            ));
        }

        tracing::debug!(filename = %descriptor.filename, bytes = written, "transfer complete");
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MirrorError;
    use crate::remote::fake::FakeRemote;
    use reqwest::Url;
    use tempfile::TempDir;

    const URL: &str = "https://dumps.example.org/enwiki/latest/page.sql.gz";

    fn descriptor(size_bytes: u64) -> RemoteDumpDescriptor {
        RemoteDumpDescriptor {
            filename: "page.sql.gz".to_string(),
            url: Url::parse(URL).unwrap(),
            size_bytes,
            published_at: None,
        }
    }

    #[test]
    fn test_fetch_streams_body_in_small_chunks() {
        let temp = TempDir::new().unwrap();
        let body: Vec<u8> = (0..10_000u32).map(|i| (i % 7) as u8).collect();
        let remote = FakeRemote::new().with_file(URL, &body);
        let target = temp.path().join("page.sql.gz");

        let written = Fetcher::new(&remote, 333)
            .fetch(&descriptor(body.len() as u64), &target)
            .unwrap();

        assert_eq!(written, body.len() as u64);
        assert_eq!(std::fs::read(&target).unwrap(), body);
    }

    #[test]
    fn test_fetch_unknown_size_accepts_any_length() {
        let temp = TempDir::new().unwrap();
        let remote = FakeRemote::new().with_file(URL, b"abc");
        let target = temp.path().join("page.sql.gz");

        assert_eq!(
            Fetcher::new(&remote, 1024)
                .fetch(&descriptor(0), &target)
                .unwrap(),
            3
        );
    }

    #[test]
    fn test_fetch_short_body_is_incomplete() {
        let temp = TempDir::new().unwrap();
        let remote = FakeRemote::new().with_file(URL, b"abc");
        let target = temp.path().join("page.sql.gz");

        let err = Fetcher::new(&remote, 1024)
            .fetch(&descriptor(500), &target)
            .unwrap_err();
        assert!(matches!(
            err,
            MirrorError::TransferIncomplete {
                expected: 500,
                received: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_fetch_transport_error_reports_failure() {
        let temp = TempDir::new().unwrap();
        let remote = FakeRemote::new().with_failure(URL);
        let target = temp.path().join("page.sql.gz");

        let err = Fetcher::new(&remote, 1024)
            .fetch(&descriptor(10), &target)
            .unwrap_err();
        assert!(matches!(err, MirrorError::RequestFailed { .. }));
    }
}
