use crate::{AppState, Effect, LocateGate, Msg, SessionState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::RefreshFiles => vec![Effect::ListFiles],
        Msg::FilesListed(files) => {
            state.set_files(files);
            Vec::new()
        }
        Msg::RestoreDecisions(decisions) => {
            state.restore_decisions(decisions);
            Vec::new()
        }
        Msg::DocumentSelected(filename) => {
            let busy = matches!(
                state.session(),
                SessionState::Running | SessionState::FieldsReady | SessionState::Locating(_)
            );
            if busy && state.filename() == Some(filename.as_str()) {
                return (state, Vec::new());
            }
            let timing = state.is_on_review_page();
            let previous = state.select_document(filename.clone());

            let mut effects = vec![
                Effect::CancelJob,
                Effect::LoadDocument {
                    filename: filename.clone(),
                },
            ];
            if timing {
                if let Some(previous) = previous {
                    effects.push(Effect::PauseTimer { filename: previous });
                }
                effects.push(Effect::ResumeTimer { filename });
            }
            effects
        }
        Msg::DownloadClicked => match state.filename() {
            Some(filename) => vec![Effect::DownloadDocument {
                filename: filename.to_owned(),
            }],
            None => Vec::new(),
        },
        Msg::StartClicked => {
            let Some(filename) = state.filename().map(ToOwned::to_owned) else {
                return (state, Vec::new());
            };
            match state.session() {
                SessionState::Idle | SessionState::Running | SessionState::FieldsReady => {}
                SessionState::Locating(_) | SessionState::Decided(_) => {
                    return (state, Vec::new());
                }
            }
            let epoch = state.start_session();
            vec![Effect::ResetLocator, Effect::StartJob { epoch, filename }]
        }
        Msg::ProgressPolled { epoch, progress } => {
            if state.accepts(epoch) {
                state.apply_progress(&progress);
            }
            Vec::new()
        }
        Msg::JobRowsArrived { epoch, rows } => {
            if state.accepts(epoch) {
                state.apply_rows(&rows);
            }
            Vec::new()
        }
        Msg::JobFailed { epoch, message } => {
            if state.accepts(epoch) {
                state.fail_job(message);
            }
            Vec::new()
        }
        Msg::JobCompleted { epoch } => {
            if state.accepts(epoch) {
                state.settle_progress();
            }
            Vec::new()
        }
        Msg::LocateClicked(field) => {
            if state.session() != SessionState::FieldsReady {
                return (state, Vec::new());
            }
            let gate = state.gate(field);
            let value = state.row(field).map(|row| row.received.clone());
            match (gate, value) {
                (LocateGate::Disabled, _) | (_, None) => {
                    state.set_notice(format!("{field} confidence too low to locate"));
                    Vec::new()
                }
                (_, Some(value)) => {
                    state.begin_locate(field);
                    vec![Effect::Locate {
                        epoch: state.epoch(),
                        field,
                        value,
                    }]
                }
            }
        }
        Msg::LocateFinished {
            epoch,
            field,
            outcome: _,
            search,
        } => {
            if state.awaits_locate(epoch, field) {
                state.finish_locate(search);
            }
            Vec::new()
        }
        Msg::ReviewPageEntered => {
            let filename = state.filename().map(ToOwned::to_owned);
            match (filename, state.session()) {
                (_, SessionState::Decided(_)) | (None, _) => Vec::new(),
                (Some(_), _) if state.is_on_review_page() => Vec::new(),
                (Some(filename), _) => {
                    state.set_on_review_page(true);
                    vec![Effect::ResumeTimer { filename }]
                }
            }
        }
        Msg::ReviewPageLeft => {
            let filename = state.filename().map(ToOwned::to_owned);
            match filename {
                Some(filename) if state.is_on_review_page() => {
                    state.set_on_review_page(false);
                    vec![Effect::PauseTimer { filename }]
                }
                _ => Vec::new(),
            }
        }
        Msg::DecisionClicked(action) => {
            if state.session() != SessionState::FieldsReady {
                return (state, Vec::new());
            }
            let Some(filename) = state.filename().map(ToOwned::to_owned) else {
                return (state, Vec::new());
            };
            state.decide(action);
            vec![
                Effect::PersistDecision {
                    filename: filename.clone(),
                    action,
                },
                Effect::FlushElapsed { filename, action },
            ]
        }
        Msg::Tick => Vec::new(),
    };

    (state, effects)
}
