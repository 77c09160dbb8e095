use std::fmt;
use std::path::PathBuf;

use review_core::{
    DecisionAction, DecisionSets, FieldLabel, FieldRow, JobProgress, LocateOutcome, SearchState,
    SessionEpoch,
};

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Folded progress sample; phases never move backwards within a job.
    Progress {
        epoch: SessionEpoch,
        progress: JobProgress,
    },
    /// A single poll failed; polling continues.
    PollFailed { epoch: SessionEpoch, error: JobError },
    JobRows {
        epoch: SessionEpoch,
        result: Result<Vec<FieldRow>, JobError>,
    },
    /// Both phases finished and the settle delay elapsed. Sent once per job.
    JobComplete { epoch: SessionEpoch },
    Located {
        epoch: SessionEpoch,
        field: FieldLabel,
        outcome: LocateOutcome,
        search: SearchState,
    },
    FilesListed(Result<Vec<String>, JobError>),
    DecisionsLoaded(DecisionSets),
    DocumentSaved {
        name: String,
        result: Result<PathBuf, String>,
    },
}

/// Review time sent to the backend when a decision is made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeReport {
    pub filename: String,
    pub duration_secs: u64,
    pub action: DecisionAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobError {
    pub kind: FailureKind,
    pub message: String,
}

impl JobError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for JobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            // Backend messages are shown to the reviewer as-is.
            FailureKind::Backend => write!(f, "{}", self.message),
            _ => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for JobError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    /// Response body did not match the expected JSON shape.
    Decode,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    /// Backend answered with an `{ "error": ... }` object.
    Backend,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "malformed response"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Backend => write!(f, "backend error"),
        }
    }
}
