//! Review engine: backend IO, progress tracking, document search and
//! persistence, driven from a background thread.
mod backend;
mod decisions;
mod engine;
mod locator;
mod persist;
mod store;
mod text_renderer;
mod timer;
mod tracker;
mod types;
mod wire;

pub use backend::{
    debug_image_name, BackendSettings, DocumentSource, HttpBackend, JobControl, TimeReporter,
    DEBUG_IMAGE_SUFFIX,
};
pub use decisions::DecisionStore;
pub use engine::{Clock, EngineCommand, EngineConfig, EngineError, EngineEvents, EngineHandle};
pub use locator::{FuzzyLocator, LocatorSettings, RenderError, RendererSearch};
pub use persist::{ensure_dir, write_atomically, PersistError};
pub use store::{KeyValueStore, MemoryStore, RonFileStore, StoreError};
pub use text_renderer::{CurrentMatch, TextRenderer};
pub use timer::TimerStore;
pub use tracker::{
    poll_progress, track_job, ChannelProgressSink, PollEnd, ProgressSink, TrackerSettings,
};
pub use types::{EngineEvent, FailureKind, JobError, TimeReport};
