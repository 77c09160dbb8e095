use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

use review_core::{DecisionAction, DecisionSets, FieldLabel, SessionEpoch};
use review_logging::{review_error, review_info, review_warn};
use thiserror::Error;
use tokio::runtime::Runtime;
use tokio::sync::mpsc as async_mpsc;
use tokio_util::sync::CancellationToken;

use crate::persist::write_atomically;
use crate::tracker::{track_job, ChannelProgressSink, TrackerSettings};
use crate::{
    debug_image_name, BackendSettings, DecisionStore, DocumentSource, EngineEvent, FuzzyLocator,
    HttpBackend, JobControl, JobError, KeyValueStore, LocatorSettings, MemoryStore, RonFileStore,
    TextRenderer, TimeReporter, TimerStore,
};

/// Milliseconds since the Unix epoch.
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

#[derive(Clone)]
pub struct EngineConfig {
    pub backend: BackendSettings,
    pub tracker: TrackerSettings,
    pub locator: LocatorSettings,
    /// RON file holding decisions and timers; `None` keeps them in memory.
    pub state_file: Option<PathBuf>,
    pub download_dir: PathBuf,
    pub clock: Clock,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            backend: BackendSettings::default(),
            tracker: TrackerSettings::default(),
            locator: LocatorSettings::default(),
            state_file: None,
            download_dir: PathBuf::from("."),
            clock: Arc::new(system_millis),
        }
    }
}

impl fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineConfig")
            .field("backend", &self.backend)
            .field("tracker", &self.tracker)
            .field("locator", &self.locator)
            .field("state_file", &self.state_file)
            .field("download_dir", &self.download_dir)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("invalid backend settings: {0}")]
    Backend(#[from] JobError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    ListFiles,
    /// Cancels any running job first.
    StartJob {
        epoch: SessionEpoch,
        filename: String,
    },
    CancelJob,
    Locate {
        epoch: SessionEpoch,
        field: FieldLabel,
        value: String,
    },
    ResetLocator,
    /// Replaces the searchable document text and resets the locator.
    LoadDocumentText(String),
    /// Saves the document and its debug image into the download directory.
    SaveDocument {
        filename: String,
    },
    LoadDecisions,
    PersistDecision {
        filename: String,
        action: DecisionAction,
    },
    ResumeTimer {
        filename: String,
    },
    PauseTimer {
        filename: String,
    },
    /// Finalizes the review time and reports it to the backend once.
    FlushElapsed {
        filename: String,
        action: DecisionAction,
    },
}

enum LocatorCommand {
    Locate {
        epoch: SessionEpoch,
        field: FieldLabel,
        value: String,
    },
    Reset,
    LoadText(String),
}

/// Sends commands to the engine thread.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

/// Receives events from the engine thread.
pub struct EngineEvents {
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    /// Starts the engine thread with its own tokio runtime.
    pub fn spawn(config: EngineConfig) -> Result<(EngineHandle, EngineEvents), EngineError> {
        let runtime = Runtime::new()?;
        let backend = Arc::new(HttpBackend::new(config.backend.clone())?);
        let store: Box<dyn KeyValueStore> = match &config.state_file {
            Some(path) => Box::new(RonFileStore::new(path.clone())),
            None => Box::new(MemoryStore::new()),
        };
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let mut worker = Worker::new(config, runtime, backend, store, event_tx);
            while let Ok(command) = cmd_rx.recv() {
                worker.handle(command);
            }
            worker.shutdown();
        });

        Ok((EngineHandle { cmd_tx }, EngineEvents { event_rx }))
    }

    pub fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            review_warn!("engine thread is gone; command dropped");
        }
    }
}

impl EngineEvents {
    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Blocks until the next event; `None` once the engine thread has exited.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: std::time::Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

struct Worker {
    config: EngineConfig,
    runtime: Runtime,
    backend: Arc<HttpBackend>,
    store: Box<dyn KeyValueStore>,
    event_tx: mpsc::Sender<EngineEvent>,
    locator_tx: async_mpsc::UnboundedSender<LocatorCommand>,
    job_cancel: Option<CancellationToken>,
}

impl Worker {
    fn new(
        config: EngineConfig,
        runtime: Runtime,
        backend: Arc<HttpBackend>,
        store: Box<dyn KeyValueStore>,
        event_tx: mpsc::Sender<EngineEvent>,
    ) -> Self {
        let (locator_tx, locator_rx) = async_mpsc::unbounded_channel();
        let locator = FuzzyLocator::new(TextRenderer::default(), config.locator.clone());
        runtime.spawn(run_locator(locator, locator_rx, event_tx.clone()));
        Self {
            config,
            runtime,
            backend,
            store,
            event_tx,
            locator_tx,
            job_cancel: None,
        }
    }

    fn handle(&mut self, command: EngineCommand) {
        match command {
            EngineCommand::ListFiles => {
                let backend = self.backend.clone();
                let event_tx = self.event_tx.clone();
                self.runtime.spawn(async move {
                    let result = backend.list_files().await;
                    if let Err(err) = &result {
                        review_warn!("listing files failed: {err}");
                    }
                    let _ = event_tx.send(EngineEvent::FilesListed(result));
                });
            }
            EngineCommand::StartJob { epoch, filename } => {
                self.cancel_job();
                let cancel = CancellationToken::new();
                self.job_cancel = Some(cancel.clone());
                let backend = self.backend.clone();
                let sink =
                    ChannelProgressSink::new(self.event_tx.clone()).cancel_on_hangup(cancel.clone());
                let settings = self.config.tracker.clone();
                self.runtime.spawn(async move {
                    track_job(backend.as_ref(), &filename, epoch, &settings, &sink, &cancel).await;
                });
            }
            EngineCommand::CancelJob => self.cancel_job(),
            EngineCommand::Locate {
                epoch,
                field,
                value,
            } => {
                self.send_locator(LocatorCommand::Locate {
                    epoch,
                    field,
                    value,
                });
            }
            EngineCommand::ResetLocator => self.send_locator(LocatorCommand::Reset),
            EngineCommand::LoadDocumentText(text) => {
                self.send_locator(LocatorCommand::LoadText(text));
            }
            EngineCommand::SaveDocument { filename } => {
                let backend = self.backend.clone();
                let event_tx = self.event_tx.clone();
                let dir = self.config.download_dir.clone();
                self.runtime.spawn(async move {
                    for name in [filename.clone(), debug_image_name(&filename)] {
                        let result = save_document(backend.as_ref(), &name, &dir).await;
                        let _ = event_tx.send(EngineEvent::DocumentSaved { name, result });
                    }
                });
            }
            EngineCommand::LoadDecisions => {
                let sets = DecisionStore::new(self.store.as_mut())
                    .load()
                    .unwrap_or_else(|err| {
                        review_error!("failed to load decisions: {err}");
                        DecisionSets::new()
                    });
                let _ = self.event_tx.send(EngineEvent::DecisionsLoaded(sets));
            }
            EngineCommand::PersistDecision { filename, action } => {
                if let Err(err) = DecisionStore::new(self.store.as_mut()).record(&filename, action)
                {
                    review_error!("failed to persist decision for {filename}: {err}");
                }
            }
            EngineCommand::ResumeTimer { filename } => {
                let now = (self.config.clock)();
                if let Err(err) = TimerStore::new(self.store.as_mut()).resume(&filename, now) {
                    review_warn!("failed to resume timer for {filename}: {err}");
                }
            }
            EngineCommand::PauseTimer { filename } => {
                let now = (self.config.clock)();
                if let Err(err) = TimerStore::new(self.store.as_mut()).pause(&filename, now) {
                    review_warn!("failed to pause timer for {filename}: {err}");
                }
            }
            EngineCommand::FlushElapsed { filename, action } => {
                let now = (self.config.clock)();
                let report = match TimerStore::new(self.store.as_mut()).finalize(&filename, action, now)
                {
                    Ok(report) => report,
                    Err(err) => {
                        review_error!("failed to finalize timer for {filename}: {err}");
                        return;
                    }
                };
                let backend = self.backend.clone();
                self.runtime.spawn(async move {
                    match backend.report_time(&report).await {
                        Ok(()) => review_info!(
                            "reported {}s for {} ({})",
                            report.duration_secs,
                            report.filename,
                            report.action.wire_name()
                        ),
                        Err(err) => review_error!(
                            "time report for {} lost: {err}",
                            report.filename
                        ),
                    }
                });
            }
        }
    }

    fn cancel_job(&mut self) {
        if let Some(cancel) = self.job_cancel.take() {
            cancel.cancel();
        }
    }

    fn send_locator(&self, command: LocatorCommand) {
        if self.locator_tx.send(command).is_err() {
            review_warn!("locator task is gone; command dropped");
        }
    }

    fn shutdown(&mut self) {
        self.cancel_job();
    }
}

async fn run_locator(
    mut locator: FuzzyLocator<TextRenderer>,
    mut commands: async_mpsc::UnboundedReceiver<LocatorCommand>,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    while let Some(command) = commands.recv().await {
        match command {
            LocatorCommand::Locate {
                epoch,
                field,
                value,
            } => {
                let outcome = locator.locate(field, &value).await;
                let _ = event_tx.send(EngineEvent::Located {
                    epoch,
                    field,
                    outcome,
                    search: locator.state().clone(),
                });
            }
            LocatorCommand::Reset => locator.reset().await,
            LocatorCommand::LoadText(text) => {
                locator.renderer().replace_text(text).await;
                locator.reset().await;
            }
        }
    }
}

async fn save_document(
    source: &dyn DocumentSource,
    name: &str,
    dir: &Path,
) -> Result<PathBuf, String> {
    let bytes = source.fetch_document(name).await.map_err(|err| {
        review_warn!("download of {name} failed: {err}");
        err.to_string()
    })?;
    let file_name = Path::new(name)
        .file_name()
        .map_or_else(|| name.to_string(), |file| file.to_string_lossy().into_owned());
    let path = write_atomically(&dir.join(file_name), &bytes).map_err(|err| {
        review_error!("saving {name} failed: {err}");
        err.to_string()
    })?;
    review_info!("saved {name} to {}", path.display());
    Ok(path)
}

fn system_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
}
