//! Remote transport primitives
//!
//! The sync pipeline only needs four things from the network: fetch a small
//! text document, list the links on a page, probe a file's size, and open a
//! file's body as a byte stream. [`Remote`] captures exactly that, so the
//! pipeline can be exercised against an in-memory listing in tests.

mod http;
mod links;

use std::io::Read;

use reqwest::Url;

use crate::error::Result;

pub use http::HttpRemote;
pub use links::extract_hrefs;

/// Byte stream of a remote file body
pub type RemoteBody = Box<dyn Read + Send>;

/// Network access used by the catalog resolver, fetcher and manifest loader
pub trait Remote {
    /// Fetch a (small) document as text
    fn fetch_text(&self, url: &Url) -> Result<String>;

    /// Size of the remote file in bytes, from a metadata probe
    fn probe_size(&self, url: &Url) -> Result<u64>;

    /// Open the remote file body for streaming
    fn open(&self, url: &Url) -> Result<RemoteBody>;

    /// Targets of every anchor link on the page at `url`, in document order
    fn list_links(&self, url: &Url) -> Result<Vec<String>> {
        let html = self.fetch_text(url)?;
        Ok(extract_hrefs(&html))
    }
}

#[cfg(test)]
pub mod fake {
    //! In-memory [`Remote`] for pipeline tests

    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::io::Cursor;

    use super::{Remote, RemoteBody};
    use crate::error::{self, Result};
    use reqwest::Url;

    /// Serves fixed bodies by URL and records what was downloaded
    #[derive(Default)]
    pub struct FakeRemote {
        pages: HashMap<String, String>,
        files: HashMap<String, Vec<u8>>,
        /// Advertised sizes that differ from the real body length
        sizes: HashMap<String, u64>,
        failing: Vec<String>,
        pub opened: RefCell<Vec<String>>,
    }

    impl FakeRemote {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_page(mut self, url: &str, html: &str) -> Self {
            self.pages.insert(url.to_string(), html.to_string());
            self
        }

        pub fn with_file(mut self, url: &str, body: &[u8]) -> Self {
            self.files.insert(url.to_string(), body.to_vec());
            self
        }

        pub fn with_advertised_size(mut self, url: &str, size: u64) -> Self {
            self.sizes.insert(url.to_string(), size);
            self
        }

        /// Make every request to `url` fail
        pub fn with_failure(mut self, url: &str) -> Self {
            self.failing.push(url.to_string());
            self
        }

        pub fn download_count(&self) -> usize {
            self.opened.borrow().len()
        }

        fn check(&self, url: &Url) -> Result<()> {
            if self.failing.iter().any(|u| u == url.as_str()) {
                return Err(error::remote::request_failed(url.as_str(), "connection reset"));
            }
            Ok(())
        }
    }

    impl Remote for FakeRemote {
        fn fetch_text(&self, url: &Url) -> Result<String> {
            self.check(url)?;
            self.pages
                .get(url.as_str())
                .cloned()
                .ok_or_else(|| error::remote::request_failed(url.as_str(), "HTTP 404"))
        }

        fn probe_size(&self, url: &Url) -> Result<u64> {
            self.check(url)?;
            if let Some(size) = self.sizes.get(url.as_str()) {
                return Ok(*size);
            }
            self.files
                .get(url.as_str())
                .map(|body| body.len() as u64)
                .ok_or_else(|| error::remote::request_failed(url.as_str(), "HTTP 404"))
        }

        fn open(&self, url: &Url) -> Result<RemoteBody> {
            self.check(url)?;
            let body = self
                .files
                .get(url.as_str())
                .cloned()
                .ok_or_else(|| error::remote::request_failed(url.as_str(), "HTTP 404"))?;
            self.opened.borrow_mut().push(url.to_string());
            Ok(Box::new(Cursor::new(body)))
        }
    }
}
