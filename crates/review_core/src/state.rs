use crate::view_model::{AppViewModel, FieldRowView, FileRowView, LOCATE_LABEL, NEXT_LABEL};
use crate::{
    merge_rows, placeholder_rows, Decision, DecisionAction, DecisionSets, FieldLabel, FieldRow,
    JobProgress, LocateGate, LocateThresholds, ProgressView, SearchState,
};

/// Monotonic counter identifying one run of the extraction job. Messages
/// tagged with an older epoch belong to a superseded session.
pub type SessionEpoch = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Running,
    FieldsReady,
    Locating(FieldLabel),
    Decided(Decision),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    session: SessionState,
    thresholds: LocateThresholds,
    filename: Option<String>,
    files: Vec<String>,
    epoch: SessionEpoch,
    progress: JobProgress,
    progress_settled: bool,
    rows_arrived: bool,
    rows: Vec<FieldRow>,
    job_error: Option<String>,
    notice: Option<String>,
    search: SearchState,
    decisions: DecisionSets,
    on_review_page: bool,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            session: SessionState::Idle,
            thresholds: LocateThresholds::default(),
            filename: None,
            files: Vec::new(),
            epoch: 0,
            progress: JobProgress::default(),
            progress_settled: false,
            rows_arrived: false,
            rows: placeholder_rows(),
            job_error: None,
            notice: None,
            search: SearchState::default(),
            decisions: DecisionSets::new(),
            on_review_page: false,
            dirty: false,
        }
    }

    pub fn with_thresholds(thresholds: LocateThresholds) -> Self {
        Self {
            thresholds,
            ..Self::new()
        }
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub fn epoch(&self) -> SessionEpoch {
        self.epoch
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn rows(&self) -> &[FieldRow] {
        &self.rows
    }

    pub fn search(&self) -> &SearchState {
        &self.search
    }

    pub fn decisions(&self) -> &DecisionSets {
        &self.decisions
    }

    pub fn is_on_review_page(&self) -> bool {
        self.on_review_page
    }

    pub fn view(&self) -> AppViewModel {
        let decision = self
            .filename
            .as_deref()
            .map_or(Decision::Pending, |name| self.decisions.status(name));
        let progress = match self.session {
            SessionState::Running => Some(ProgressView::derive(&self.progress)),
            _ => None,
        };

        AppViewModel {
            session: self.session,
            filename: self.filename.clone(),
            files: self
                .files
                .iter()
                .map(|name| FileRowView {
                    name: name.clone(),
                    decision: self.decisions.status(name),
                })
                .collect(),
            progress,
            rows: self.rows.iter().map(|row| self.row_view(row)).collect(),
            job_error: self.job_error.clone(),
            notice: self.notice.clone(),
            decision,
            on_review_page: self.on_review_page,
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_files(&mut self, files: Vec<String>) {
        self.files = files;
        self.mark_dirty();
    }

    pub(crate) fn restore_decisions(&mut self, decisions: DecisionSets) {
        self.decisions = decisions;
        self.mark_dirty();
    }

    /// Switches to another document. Returns the previous filename.
    pub(crate) fn select_document(&mut self, filename: String) -> Option<String> {
        let previous = self.filename.replace(filename);
        self.epoch += 1;
        self.session = SessionState::Idle;
        self.clear_job();
        self.mark_dirty();
        previous
    }

    /// Begins a new session epoch in `Running`.
    pub(crate) fn start_session(&mut self) -> SessionEpoch {
        self.epoch += 1;
        self.session = SessionState::Running;
        self.clear_job();
        self.progress = JobProgress::starting();
        self.mark_dirty();
        self.epoch
    }

    pub(crate) fn accepts(&self, epoch: SessionEpoch) -> bool {
        epoch == self.epoch && self.session == SessionState::Running
    }

    pub(crate) fn apply_progress(&mut self, sample: &JobProgress) {
        self.progress.apply_sample(sample);
        self.mark_dirty();
    }

    pub(crate) fn apply_rows(&mut self, rows: &[FieldRow]) {
        merge_rows(&mut self.rows, rows);
        self.rows_arrived = true;
        self.promote_when_ready();
        self.mark_dirty();
    }

    pub(crate) fn settle_progress(&mut self) {
        self.progress_settled = true;
        self.promote_when_ready();
        self.mark_dirty();
    }

    pub(crate) fn fail_job(&mut self, message: String) {
        self.job_error = Some(message);
        self.mark_dirty();
    }

    pub(crate) fn row(&self, field: FieldLabel) -> Option<&FieldRow> {
        self.rows.iter().find(|row| row.id == field)
    }

    pub(crate) fn gate(&self, field: FieldLabel) -> LocateGate {
        self.row(field)
            .map_or(LocateGate::Disabled, |row| self.thresholds.gate(row.confidence))
    }

    pub(crate) fn begin_locate(&mut self, field: FieldLabel) {
        self.session = SessionState::Locating(field);
        self.notice = None;
        self.mark_dirty();
    }

    /// Locate results from another document or session are stale.
    pub(crate) fn awaits_locate(&self, epoch: SessionEpoch, field: FieldLabel) -> bool {
        epoch == self.epoch && self.session == SessionState::Locating(field)
    }

    pub(crate) fn finish_locate(&mut self, search: SearchState) {
        self.session = SessionState::FieldsReady;
        self.search = search;
        self.mark_dirty();
    }

    pub(crate) fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
        self.mark_dirty();
    }

    pub(crate) fn decide(&mut self, action: DecisionAction) {
        if let Some(filename) = self.filename.as_deref() {
            self.decisions.record(filename, action);
        }
        self.session = SessionState::Decided(action.decision());
        self.on_review_page = false;
        self.mark_dirty();
    }

    pub(crate) fn set_on_review_page(&mut self, on_page: bool) {
        self.on_review_page = on_page;
        self.mark_dirty();
    }

    fn promote_when_ready(&mut self) {
        if self.session == SessionState::Running && self.progress_settled && self.rows_arrived {
            self.session = SessionState::FieldsReady;
        }
    }

    fn clear_job(&mut self) {
        self.progress = JobProgress::default();
        self.progress_settled = false;
        self.rows_arrived = false;
        self.rows = placeholder_rows();
        self.job_error = None;
        self.notice = None;
        self.search.clear();
    }

    fn row_view(&self, row: &FieldRow) -> FieldRowView {
        let locate_label = if self.search.active_field == Some(row.id) {
            NEXT_LABEL
        } else {
            LOCATE_LABEL
        };
        FieldRowView {
            field: row.id,
            expected: row.expected.clone(),
            received: row.received.clone(),
            confidence: row.confidence.to_string(),
            gate: self.thresholds.gate(row.confidence),
            locate_label,
        }
    }
}
