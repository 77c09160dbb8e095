//! Review core: pure state machine, OCR confusion model and view-model helpers.
mod confusion;
mod decision;
mod effect;
mod elapsed;
mod field;
mod locator;
mod msg;
mod progress;
mod state;
mod update;
mod view_model;

pub use confusion::{
    build_fuzzy_pattern, confusion_class, generate_candidates, CONFUSION_CLASSES, MAX_CANDIDATES,
};
pub use decision::{Decision, DecisionAction, DecisionSets};
pub use effect::Effect;
pub use elapsed::ElapsedTime;
pub use field::{
    merge_rows, placeholder_rows, Confidence, FieldLabel, FieldRow, LocateGate, LocateThresholds,
};
pub use locator::{
    clean_search_term, plan_locate, search_queries, LocateOutcome, LocatePlan, SearchQuery,
    SearchState,
};
pub use msg::Msg;
pub use progress::{
    JobProgress, PhaseIndicator, PhaseProgress, PhaseView, ProgressView, MAIN_WAITING_STATUS,
    OCR_STARTING_STATUS,
};
pub use state::{AppState, SessionEpoch, SessionState};
pub use update::update;
pub use view_model::{AppViewModel, FieldRowView, FileRowView, LOCATE_LABEL, NEXT_LABEL};
