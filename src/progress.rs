//! Progress bar display for downloads and unpacking

use indicatif::{ProgressBar, ProgressStyle};

/// Progress display for one transfer
///
/// Draws to stderr and stays hidden when stderr is not a terminal, so
/// service logs are not interleaved with bar redraws.
pub struct TransferProgress {
    bar: ProgressBar,
}

impl TransferProgress {
    /// Create a byte progress bar; `total_bytes == 0` shows a spinner instead
    pub fn new(label: &str, total_bytes: u64) -> Self {
        let bar = if total_bytes > 0 {
            let bar = ProgressBar::new(total_bytes);
            if let Ok(style) = ProgressStyle::default_bar().template(
                "{msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})",
            ) {
                bar.set_style(style.progress_chars("#>-"));
            }
            bar
        } else {
            let bar = ProgressBar::new_spinner();
            if let Ok(style) =
                ProgressStyle::default_spinner().template("{spinner} {msg} {bytes} ({bytes_per_sec})")
            {
                bar.set_style(style);
            }
            bar
        };

        bar.set_message(truncate_label(label));
        Self { bar }
    }

    /// Record `bytes` more transferred
    pub fn advance(&self, bytes: u64) {
        self.bar.inc(bytes);
    }

    /// Finish and clear the bar
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    /// Abandon on error, leaving the last state visible
    pub fn abandon(&self) {
        self.bar.abandon();
    }

    #[cfg(test)]
    fn position(&self) -> u64 {
        self.bar.position()
    }
}

/// Truncate long file names for display
fn truncate_label(label: &str) -> String {
    let chars: Vec<char> = label.chars().collect();
    if chars.len() > 40 {
        let tail: String = chars[chars.len() - 37..].iter().collect();
        format!("...{tail}")
    } else {
        label.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_label() {
        assert_eq!(truncate_label("page.sql.gz"), "page.sql.gz");
        let long = "enwiki-20261001-pages-articles-multistream-index.txt.bz2";
        let shown = truncate_label(long);
        assert!(shown.starts_with("..."));
        assert_eq!(shown.chars().count(), 40);
        assert!(shown.ends_with("index.txt.bz2"));
    }

    #[test]
    fn test_advance_accumulates() {
        let progress = TransferProgress::new("page.sql.gz", 100);
        progress.advance(40);
        progress.advance(60);
        assert_eq!(progress.position(), 100);
        progress.finish();
    }

    #[test]
    fn test_unknown_size_uses_spinner() {
        let progress = TransferProgress::new("page.sql.gz", 0);
        progress.advance(10);
        assert_eq!(progress.position(), 10);
        progress.abandon();
    }
}
