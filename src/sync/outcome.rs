//! Per-file and per-cycle results

use std::fmt;

use crate::retention::RetentionReport;

/// Progress of one descriptor through a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    Pending,
    SizeChecked,
    SkippedUpToDate,
    Downloaded,
    Unpacked,
}

impl fmt::Display for FileState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::SizeChecked => "size checked",
            Self::SkippedUpToDate => "up to date",
            Self::Downloaded => "downloaded",
            Self::Unpacked => "unpacked",
        };
        f.write_str(label)
    }
}

/// What happened to one descriptor
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub filename: String,
    /// Last state reached
    pub state: FileState,
    /// Bytes transferred, if the file was downloaded this cycle
    pub downloaded: Option<u64>,
    /// Set when the file failed at any stage
    pub error: Option<String>,
}

impl FileOutcome {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            state: FileState::Pending,
            downloaded: None,
            error: None,
        }
    }

    /// The compressed archive is current and any required unpack succeeded
    pub fn is_success(&self) -> bool {
        self.error.is_none()
            && matches!(
                self.state,
                FileState::SkippedUpToDate | FileState::Downloaded | FileState::Unpacked
            )
    }
}

/// Why a cycle stopped before touching any descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleAbort {
    InsufficientResources,
    DirectoriesUnavailable(String),
    EmptyCatalog,
}

impl fmt::Display for CycleAbort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientResources => write!(f, "insufficient system resources"),
            Self::DirectoriesUnavailable(reason) => {
                write!(f, "managed directories unavailable: {reason}")
            }
            Self::EmptyCatalog => write!(f, "no dump information available"),
        }
    }
}

/// Aggregate result of one synchronization cycle
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub outcomes: Vec<FileOutcome>,
    pub aborted: Option<CycleAbort>,
    /// Orphaned temp files removed before the cycle started
    pub swept: usize,
    pub retention: Vec<RetentionReport>,
}

impl SyncReport {
    pub fn aborted(reason: CycleAbort) -> Self {
        Self {
            aborted: Some(reason),
            ..Self::default()
        }
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn downloaded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.downloaded.is_some())
            .count()
    }

    /// Every descriptor was materialized and the cycle was not aborted
    pub fn is_success(&self) -> bool {
        self.aborted.is_none() && self.total() > 0 && self.succeeded() == self.total()
    }
}
