use crate::{DecisionAction, FieldLabel, SessionEpoch};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    ListFiles,
    /// Reset backend progress, start the job and poll it under `epoch`.
    StartJob { epoch: SessionEpoch, filename: String },
    /// Stop polling for the current job; its late responses are ignored.
    CancelJob,
    /// Highlight `value` in the document; the result is tagged with `epoch`.
    Locate {
        epoch: SessionEpoch,
        field: FieldLabel,
        value: String,
    },
    /// Drop highlights and search state.
    ResetLocator,
    /// Show another document; implies a locator reset.
    LoadDocument { filename: String },
    /// Save the document and its debug image locally.
    DownloadDocument { filename: String },
    ResumeTimer { filename: String },
    PauseTimer { filename: String },
    PersistDecision { filename: String, action: DecisionAction },
    /// Send and clear the accumulated review time.
    FlushElapsed { filename: String, action: DecisionAction },
}
