use crate::{Decision, FieldLabel, LocateGate, ProgressView, SessionState};

/// Locate button label before the field's value is highlighted.
pub const LOCATE_LABEL: &str = "Hop til";
/// Locate button label while the field's value is highlighted.
pub const NEXT_LABEL: &str = "Næste";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub session: SessionState,
    pub filename: Option<String>,
    pub files: Vec<FileRowView>,
    /// Present while the extraction job runs.
    pub progress: Option<ProgressView>,
    pub rows: Vec<FieldRowView>,
    pub job_error: Option<String>,
    pub notice: Option<String>,
    pub decision: Decision,
    pub on_review_page: bool,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRowView {
    pub name: String,
    pub decision: Decision,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRowView {
    pub field: FieldLabel,
    pub expected: String,
    pub received: String,
    pub confidence: String,
    pub gate: LocateGate,
    pub locate_label: &'static str,
}
