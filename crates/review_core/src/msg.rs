use crate::{
    DecisionAction, DecisionSets, FieldLabel, FieldRow, JobProgress, LocateOutcome, SearchState,
    SessionEpoch,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User asked for the list of documents available for review.
    RefreshFiles,
    /// Backend listed the documents available for review.
    FilesListed(Vec<String>),
    /// Restore persisted accept/reject decisions.
    RestoreDecisions(DecisionSets),
    /// User picked a document; any running session is abandoned.
    DocumentSelected(String),
    /// User asked for a local copy of the selected document.
    DownloadClicked,
    /// User started the extraction for the selected document.
    StartClicked,
    /// Poll loop sample for a session.
    ProgressPolled {
        epoch: SessionEpoch,
        progress: JobProgress,
    },
    /// Extraction finished and returned its rows.
    JobRowsArrived {
        epoch: SessionEpoch,
        rows: Vec<FieldRow>,
    },
    /// Extraction backend reported an error for the job.
    JobFailed { epoch: SessionEpoch, message: String },
    /// Both phases reached 100% and the settle delay elapsed.
    JobCompleted { epoch: SessionEpoch },
    /// User clicked the locate button of a row.
    LocateClicked(FieldLabel),
    /// Locator finished working on a field.
    LocateFinished {
        epoch: SessionEpoch,
        field: FieldLabel,
        outcome: LocateOutcome,
        search: SearchState,
    },
    /// User navigated to the review page of the current document.
    ReviewPageEntered,
    /// User navigated away from the review page.
    ReviewPageLeft,
    /// User accepted or rejected the document.
    DecisionClicked(DecisionAction),
    /// UI/render tick to coalesce rendering.
    Tick,
}
