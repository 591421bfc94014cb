//! Dump catalog discovery
//!
//! Turns the remote listing page for a locale into the set of files this
//! cycle should mirror. Descriptors are rebuilt from scratch every cycle and
//! never persisted.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use reqwest::Url;

use crate::config::SourceConfig;
use crate::error::Result;
use crate::remote::Remote;

/// One remote file discovered in the listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteDumpDescriptor {
    pub filename: String,
    pub url: Url,
    /// Size from the metadata probe; `0` means unknown
    pub size_bytes: u64,
    /// Date embedded in the filename, if any
    pub published_at: Option<NaiveDate>,
}

/// Resolved catalog, keyed (and ordered) by filename
pub type Catalog = BTreeMap<String, RemoteDumpDescriptor>;

/// Date patterns tried in order; the first that matches and parses wins
#[allow(clippy::unwrap_used)]
static DATE_PATTERNS: LazyLock<[(Regex, &'static str); 2]> = LazyLock::new(|| {
    [
        (Regex::new(r"(\d{8})").unwrap(), "%Y%m%d"),
        (Regex::new(r"(\d{4}-\d{2}-\d{2})").unwrap(), "%Y-%m-%d"),
    ]
});

/// Extract a publication date from a dump filename
pub fn extract_date(filename: &str) -> Option<NaiveDate> {
    DATE_PATTERNS.iter().find_map(|(pattern, format)| {
        let candidate = pattern.captures(filename)?.get(1)?.as_str();
        NaiveDate::parse_from_str(candidate, format).ok()
    })
}

/// Last path segment of a link target, without query or fragment
fn link_filename(href: &str) -> Option<&str> {
    let path = href.split(['?', '#']).next().unwrap_or(href);
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty() && *name != "..")
}

/// Resolves the remote listing into descriptors
pub struct CatalogResolver<'a, R: Remote + ?Sized> {
    source: &'a SourceConfig,
    remote: &'a R,
}

impl<'a, R: Remote + ?Sized> CatalogResolver<'a, R> {
    pub fn new(source: &'a SourceConfig, remote: &'a R) -> Self {
        Self { source, remote }
    }

    fn is_wanted(&self, filename: &str) -> bool {
        self.source
            .files
            .iter()
            .filter(|pattern| !pattern.is_empty())
            .any(|pattern| filename.contains(pattern.as_str()))
    }

    /// Resolve the catalog for `locale`.
    ///
    /// A listing failure is logged and yields an empty catalog, which the
    /// orchestrator treats as a failed cycle.
    pub fn resolve(&self, locale: &str) -> Catalog {
        match self.try_resolve(locale) {
            Ok(catalog) => catalog,
            Err(e) => {
                tracing::error!(locale, error = %e, "failed to fetch dump listing");
                Catalog::new()
            }
        }
    }

    fn try_resolve(&self, locale: &str) -> Result<Catalog> {
        let listing = self.source.listing_url_for(locale)?;
        tracing::info!(url = %listing, "fetching dump listing");

        let mut catalog = Catalog::new();
        for href in self.remote.list_links(&listing)? {
            let Some(filename) = link_filename(&href) else {
                continue;
            };
            if !self.is_wanted(filename) || catalog.contains_key(filename) {
                continue;
            }

            let url = match listing.join(&href) {
                Ok(url) => url,
                Err(e) => {
                    tracing::warn!(href = %href, error = %e, "skipping unresolvable link");
                    continue;
                }
            };

            let size_bytes = self.remote.probe_size(&url).unwrap_or_else(|e| {
                tracing::warn!(filename, error = %e, "size probe failed, size unknown");
                0
            });

            let descriptor = RemoteDumpDescriptor {
                filename: filename.to_string(),
                url,
                size_bytes,
                published_at: extract_date(filename),
            };
            tracing::debug!(
                filename,
                size_bytes,
                published_at = ?descriptor.published_at,
                "discovered dump"
            );
            catalog.insert(descriptor.filename.clone(), descriptor);
        }

        tracing::info!(count = catalog.len(), "dump listing resolved");
        Ok(catalog)
    }
}
