use std::sync::Once;

use pretty_assertions::assert_eq;
use review_core::{
    update, AppState, Confidence, Decision, DecisionAction, DecisionSets, Effect, FieldLabel,
    FieldRow, JobProgress, LocateGate, LocateOutcome, Msg, PhaseIndicator, PhaseProgress,
    SearchQuery, SearchState, SessionState, LOCATE_LABEL, NEXT_LABEL,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(review_logging::initialize_for_tests);
}

fn row(id: FieldLabel, received: &str, confidence: f64) -> FieldRow {
    FieldRow {
        id,
        expected: received.to_string(),
        received: received.to_string(),
        confidence: Confidence::Percent(confidence),
    }
}

fn done() -> JobProgress {
    JobProgress::new(
        PhaseProgress::new(1.0, "Scanning Færdig"),
        PhaseProgress::new(1.0, "Færdig"),
    )
}

fn started(filename: &str) -> (AppState, u64) {
    let (state, _) = update(AppState::new(), Msg::DocumentSelected(filename.to_string()));
    let (state, effects) = update(state, Msg::StartClicked);
    let epoch = effects
        .iter()
        .find_map(|effect| match effect {
            Effect::StartJob { epoch, .. } => Some(*epoch),
            _ => None,
        })
        .expect("start effect");
    (state, epoch)
}

fn ready(filename: &str, rows: Vec<FieldRow>) -> AppState {
    let (state, epoch) = started(filename);
    let (state, _) = update(state, Msg::JobRowsArrived { epoch, rows });
    let (state, _) = update(state, Msg::JobCompleted { epoch });
    assert_eq!(state.session(), SessionState::FieldsReady);
    state
}

#[test]
fn start_requires_a_document() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::StartClicked);
    assert_eq!(state.session(), SessionState::Idle);
    assert!(effects.is_empty());
}

#[test]
fn start_emits_job_effect_and_shows_initial_progress() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::DocumentSelected("case1.pdf".into()));
    let (mut state, effects) = update(state, Msg::StartClicked);

    assert_eq!(
        effects,
        vec![
            Effect::ResetLocator,
            Effect::StartJob {
                epoch: 2,
                filename: "case1.pdf".into()
            }
        ]
    );
    let view = state.view();
    assert_eq!(view.session, SessionState::Running);
    let progress = view.progress.expect("progress view while running");
    assert_eq!(progress.ocr.status, "Starter...");
    assert_eq!(progress.main.indicator, PhaseIndicator::Held);
    assert!(state.consume_dirty());
}

#[test]
fn fields_ready_needs_rows_and_completion() {
    init_logging();
    let (state, epoch) = started("case1.pdf");

    let (state, _) = update(state, Msg::JobCompleted { epoch });
    assert_eq!(state.session(), SessionState::Running);

    let (state, _) = update(
        state,
        Msg::JobRowsArrived {
            epoch,
            rows: vec![row(FieldLabel::City, "Aalborg", 99.0)],
        },
    );
    assert_eq!(state.session(), SessionState::FieldsReady);
    assert_eq!(state.rows()[2].received, "Aalborg");
    assert!(state.view().progress.is_none());
}

#[test]
fn rows_alone_do_not_finish_the_session() {
    init_logging();
    let (state, epoch) = started("case1.pdf");
    let (state, _) = update(state, Msg::ProgressPolled { epoch, progress: done() });
    let (state, _) = update(
        state,
        Msg::JobRowsArrived {
            epoch,
            rows: vec![row(FieldLabel::Area, "50m2", 99.0)],
        },
    );
    assert_eq!(state.session(), SessionState::Running);
}

#[test]
fn stale_epoch_messages_are_ignored() {
    init_logging();
    let (state, old_epoch) = started("case1.pdf");
    let (state, effects) = update(state, Msg::StartClicked);
    assert!(matches!(effects.last(), Some(Effect::StartJob { epoch, .. }) if *epoch == old_epoch + 1));

    let before = state.view();
    let (state, _) = update(
        state,
        Msg::ProgressPolled {
            epoch: old_epoch,
            progress: done(),
        },
    );
    let (state, _) = update(state, Msg::JobCompleted { epoch: old_epoch });
    let (state, _) = update(
        state,
        Msg::JobRowsArrived {
            epoch: old_epoch,
            rows: vec![row(FieldLabel::City, "Aarhus", 99.0)],
        },
    );

    assert_eq!(state.session(), SessionState::Running);
    assert_eq!(state.view().progress, before.progress);
    assert_eq!(state.rows()[2].received, "");
}

#[test]
fn job_error_is_reported_and_blocks_population() {
    init_logging();
    let (state, epoch) = started("case1.pdf");
    let (state, effects) = update(
        state,
        Msg::JobFailed {
            epoch,
            message: "Output file not found".into(),
        },
    );
    assert!(effects.is_empty());
    let (state, _) = update(state, Msg::JobCompleted { epoch });

    let view = state.view();
    assert_eq!(view.session, SessionState::Running);
    assert_eq!(view.job_error.as_deref(), Some("Output file not found"));
}

#[test]
fn low_confidence_row_cannot_be_located() {
    init_logging();
    let state = ready(
        "case1.pdf",
        vec![
            row(FieldLabel::Address, "Urbansgade 26", 65.0),
            row(FieldLabel::Area, "198 m2", 92.0),
        ],
    );
    let view = state.view();
    assert_eq!(view.rows[0].gate, LocateGate::Disabled);
    assert_eq!(view.rows[1].gate, LocateGate::Unreliable);

    let (state, effects) = update(state, Msg::LocateClicked(FieldLabel::Address));
    assert!(effects.is_empty());
    assert_eq!(state.session(), SessionState::FieldsReady);
    assert!(state.view().notice.is_some());
}

#[test]
fn locate_round_trip_switches_label_to_next() {
    init_logging();
    let state = ready("case1.pdf", vec![row(FieldLabel::Area, "198 m2", 92.0)]);

    let epoch = state.epoch();
    let (state, effects) = update(state, Msg::LocateClicked(FieldLabel::Area));
    assert_eq!(
        effects,
        vec![Effect::Locate {
            epoch,
            field: FieldLabel::Area,
            value: "198 m2".into()
        }]
    );
    assert_eq!(state.session(), SessionState::Locating(FieldLabel::Area));

    // A second click while the first is in flight is ignored.
    let (state, effects) = update(state, Msg::LocateClicked(FieldLabel::Area));
    assert!(effects.is_empty());

    let (state, _) = update(
        state,
        Msg::LocateFinished {
            epoch,
            field: FieldLabel::Area,
            outcome: LocateOutcome::Found {
                query: SearchQuery::Literal("198".into()),
            },
            search: SearchState::active(FieldLabel::Area, "198"),
        },
    );
    let view = state.view();
    assert_eq!(view.session, SessionState::FieldsReady);
    assert_eq!(view.rows[1].locate_label, NEXT_LABEL);
    assert_eq!(view.rows[0].locate_label, LOCATE_LABEL);
}

#[test]
fn exhausted_locate_restores_default_label() {
    init_logging();
    let state = ready("case1.pdf", vec![row(FieldLabel::City, "Aalborg", 99.0)]);
    let epoch = state.epoch();
    let (state, _) = update(state, Msg::LocateClicked(FieldLabel::City));
    let (state, _) = update(
        state,
        Msg::LocateFinished {
            epoch,
            field: FieldLabel::City,
            outcome: LocateOutcome::Exhausted,
            search: SearchState::default(),
        },
    );
    let view = state.view();
    assert_eq!(view.rows[2].locate_label, LOCATE_LABEL);
    assert!(view.notice.is_none());
}

#[test]
fn late_locate_result_does_not_leak_into_next_document() {
    init_logging();
    let state = ready("case1.pdf", vec![row(FieldLabel::Area, "198 m2", 92.0)]);
    let epoch = state.epoch();
    let (state, _) = update(state, Msg::LocateClicked(FieldLabel::Area));
    let (state, _) = update(state, Msg::DocumentSelected("case2.pdf".into()));

    let (state, effects) = update(
        state,
        Msg::LocateFinished {
            epoch,
            field: FieldLabel::Area,
            outcome: LocateOutcome::Found {
                query: SearchQuery::Literal("198".into()),
            },
            search: SearchState::active(FieldLabel::Area, "198"),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.filename(), Some("case2.pdf"));
    assert_eq!(state.session(), SessionState::Idle);
    assert_eq!(state.search(), &SearchState::default());
    assert!(state
        .view()
        .rows
        .iter()
        .all(|row| row.locate_label == LOCATE_LABEL));
}

#[test]
fn locate_result_for_another_field_is_ignored() {
    init_logging();
    let state = ready(
        "case1.pdf",
        vec![
            row(FieldLabel::Area, "198 m2", 92.0),
            row(FieldLabel::City, "Aalborg", 99.0),
        ],
    );
    let epoch = state.epoch();
    let (state, _) = update(state, Msg::LocateClicked(FieldLabel::City));

    let (state, _) = update(
        state,
        Msg::LocateFinished {
            epoch,
            field: FieldLabel::Area,
            outcome: LocateOutcome::Exhausted,
            search: SearchState::active(FieldLabel::Area, "198"),
        },
    );

    assert_eq!(state.session(), SessionState::Locating(FieldLabel::City));
    assert_eq!(state.search(), &SearchState::default());
}

#[test]
fn decision_persists_and_flushes_exactly_once() {
    init_logging();
    let state = ready("case1.pdf", vec![row(FieldLabel::City, "Aalborg", 99.0)]);
    let (state, effects) = update(state, Msg::DecisionClicked(DecisionAction::Accept));
    assert_eq!(
        effects,
        vec![
            Effect::PersistDecision {
                filename: "case1.pdf".into(),
                action: DecisionAction::Accept
            },
            Effect::FlushElapsed {
                filename: "case1.pdf".into(),
                action: DecisionAction::Accept
            },
        ]
    );
    assert_eq!(state.session(), SessionState::Decided(Decision::Accepted));
    assert_eq!(state.view().decision, Decision::Accepted);

    let (state, effects) = update(state, Msg::DecisionClicked(DecisionAction::Reject));
    assert!(effects.is_empty());
    assert_eq!(state.session(), SessionState::Decided(Decision::Accepted));
}

#[test]
fn accepting_previously_rejected_document_moves_it() {
    init_logging();
    let restored = DecisionSets::from_lists(Vec::new(), vec!["case1.pdf".to_string()]);
    let (state, _) = update(AppState::new(), Msg::RestoreDecisions(restored));
    assert_eq!(state.decisions().status("case1.pdf"), Decision::Rejected);

    let (state, _) = update(state, Msg::DocumentSelected("case1.pdf".into()));
    let (state, epoch) = {
        let (state, effects) = update(state, Msg::StartClicked);
        match effects.last() {
            Some(Effect::StartJob { epoch, .. }) => (state, *epoch),
            other => panic!("unexpected effects {other:?}"),
        }
    };
    let (state, _) = update(state, Msg::JobRowsArrived { epoch, rows: Vec::new() });
    let (state, _) = update(state, Msg::JobCompleted { epoch });
    let (state, _) = update(state, Msg::DecisionClicked(DecisionAction::Accept));

    let decisions = state.decisions();
    assert_eq!(decisions.accepted().collect::<Vec<_>>(), vec!["case1.pdf"]);
    assert_eq!(decisions.rejected().count(), 0);
}

#[test]
fn review_page_transitions_pause_and_resume_timer() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::DocumentSelected("a.pdf".into()));
    let (state, effects) = update(state, Msg::ReviewPageEntered);
    assert_eq!(effects, vec![Effect::ResumeTimer { filename: "a.pdf".into() }]);

    let (state, effects) = update(state, Msg::ReviewPageEntered);
    assert!(effects.is_empty());

    let (state, effects) = update(state, Msg::DocumentSelected("b.pdf".into()));
    assert_eq!(
        effects,
        vec![
            Effect::CancelJob,
            Effect::LoadDocument {
                filename: "b.pdf".into()
            },
            Effect::PauseTimer { filename: "a.pdf".into() },
            Effect::ResumeTimer { filename: "b.pdf".into() },
        ]
    );

    let (_state, effects) = update(state, Msg::ReviewPageLeft);
    assert_eq!(effects, vec![Effect::PauseTimer { filename: "b.pdf".into() }]);
}

#[test]
fn download_needs_a_selected_document() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::DownloadClicked);
    assert!(effects.is_empty());

    let (state, _) = update(state, Msg::DocumentSelected("case1.pdf".into()));
    let (_state, effects) = update(state, Msg::DownloadClicked);
    assert_eq!(
        effects,
        vec![Effect::DownloadDocument {
            filename: "case1.pdf".into()
        }]
    );
}

#[test]
fn files_listing_shows_decision_status() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::RefreshFiles);
    assert_eq!(effects, vec![Effect::ListFiles]);

    let mut decisions = DecisionSets::new();
    decisions.record("b.pdf", DecisionAction::Reject);
    let (state, _) = update(state, Msg::RestoreDecisions(decisions));
    let (state, _) = update(state, Msg::FilesListed(vec!["a.pdf".into(), "b.pdf".into()]));

    let files = state.view().files;
    assert_eq!(files[0].decision, Decision::Pending);
    assert_eq!(files[1].decision, Decision::Rejected);
}
