use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use review_core::{Effect, Msg};
use review_engine::{EngineCommand, EngineEvent, EngineEvents, EngineHandle};
use review_logging::{review_debug, review_info, review_warn};

use super::app::Input;
use super::documents::load_document_text;

/// Executes controller effects on the engine.
pub struct EffectRunner {
    engine: EngineHandle,
    text_dir: Option<PathBuf>,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, text_dir: Option<PathBuf>) -> Self {
        Self { engine, text_dir }
    }

    pub fn load_decisions(&self) {
        self.engine.send(EngineCommand::LoadDecisions);
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            review_debug!("effect {:?}", effect);
            self.engine.send(self.command_for(effect));
        }
    }

    fn command_for(&self, effect: Effect) -> EngineCommand {
        match effect {
            Effect::ListFiles => EngineCommand::ListFiles,
            Effect::StartJob { epoch, filename } => {
                review_info!("starting extraction of {} (session {})", filename, epoch);
                EngineCommand::StartJob { epoch, filename }
            }
            Effect::CancelJob => EngineCommand::CancelJob,
            Effect::Locate {
                epoch,
                field,
                value,
            } => EngineCommand::Locate {
                epoch,
                field,
                value,
            },
            Effect::ResetLocator => EngineCommand::ResetLocator,
            Effect::LoadDocument { filename } => EngineCommand::LoadDocumentText(
                self.text_dir
                    .as_deref()
                    .and_then(|dir| load_document_text(dir, &filename))
                    .unwrap_or_default(),
            ),
            Effect::DownloadDocument { filename } => EngineCommand::SaveDocument { filename },
            Effect::ResumeTimer { filename } => EngineCommand::ResumeTimer { filename },
            Effect::PauseTimer { filename } => EngineCommand::PauseTimer { filename },
            Effect::PersistDecision { filename, action } => {
                EngineCommand::PersistDecision { filename, action }
            }
            Effect::FlushElapsed { filename, action } => {
                EngineCommand::FlushElapsed { filename, action }
            }
        }
    }
}

/// Forwards engine events to the app loop until the app stops listening.
pub fn spawn_event_loop(events: EngineEvents, input_tx: mpsc::Sender<Input>) {
    thread::spawn(move || {
        while let Some(event) = events.recv() {
            if let Some(input) = event_to_input(event) {
                if input_tx.send(input).is_err() {
                    break;
                }
            }
        }
    });
}

pub(crate) fn event_to_input(event: EngineEvent) -> Option<Input> {
    let msg = match event {
        EngineEvent::Progress { epoch, progress } => Msg::ProgressPolled { epoch, progress },
        EngineEvent::PollFailed { .. } => return None,
        EngineEvent::JobRows { epoch, result } => match result {
            Ok(rows) => Msg::JobRowsArrived { epoch, rows },
            Err(err) => Msg::JobFailed {
                epoch,
                message: err.to_string(),
            },
        },
        EngineEvent::JobComplete { epoch } => Msg::JobCompleted { epoch },
        EngineEvent::Located {
            epoch,
            field,
            outcome,
            search,
        } => Msg::LocateFinished {
            epoch,
            field,
            outcome,
            search,
        },
        EngineEvent::FilesListed(Ok(files)) => Msg::FilesListed(files),
        EngineEvent::FilesListed(Err(err)) => {
            return Some(Input::Status(format!("Could not list documents: {err}")));
        }
        EngineEvent::DecisionsLoaded(sets) => Msg::RestoreDecisions(sets),
        EngineEvent::DocumentSaved { name, result } => {
            let line = match result {
                Ok(path) => format!("Saved {name} to {}", path.display()),
                Err(err) => {
                    review_warn!("download of {} failed: {}", name, err);
                    format!("Could not save {name}: {err}")
                }
            };
            return Some(Input::Status(line));
        }
    };
    Some(Input::Msg(msg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use review_engine::{FailureKind, JobError};

    #[test]
    fn backend_error_becomes_job_failure_message() {
        let input = event_to_input(EngineEvent::JobRows {
            epoch: 3,
            result: Err(JobError {
                kind: FailureKind::Backend,
                message: "Output file not found".into(),
            }),
        });
        assert_eq!(
            input,
            Some(Input::Msg(Msg::JobFailed {
                epoch: 3,
                message: "Output file not found".into()
            }))
        );
    }

    #[test]
    fn poll_failures_stay_in_the_engine() {
        let input = event_to_input(EngineEvent::PollFailed {
            epoch: 1,
            error: JobError {
                kind: FailureKind::Timeout,
                message: "slow".into(),
            },
        });
        assert_eq!(input, None);
    }
}
