//! Progress tracking for one extraction job.
//!
//! [`track_job`] resets the backend progress, then runs the job start and the
//! poll loop side by side. Every event carries the session epoch the job was
//! started under; the controller drops events from superseded epochs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::time::Duration;

use log::Level;
use review_core::{JobProgress, SessionEpoch};
use review_logging::{review_debug, review_session};
use tokio_util::sync::CancellationToken;

use crate::{EngineEvent, JobControl};

#[derive(Debug, Clone)]
pub struct TrackerSettings {
    pub poll_interval: Duration,
    /// Pause between observing 100/100 and announcing completion.
    pub settle_delay: Duration,
    /// Stop polling when the job start fails instead of waiting for 100/100.
    pub stop_polling_on_start_error: bool,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(200),
            settle_delay: Duration::from_secs(1),
            stop_polling_on_start_error: true,
        }
    }
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

/// Forwards events to the app. Once the receiver is gone the job is cancelled.
pub struct ChannelProgressSink {
    tx: mpsc::Sender<EngineEvent>,
    job: Option<CancellationToken>,
    hung_up: AtomicBool,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self {
            tx,
            job: None,
            hung_up: AtomicBool::new(false),
        }
    }

    /// Cancels `job` when the receiving side hangs up.
    pub fn cancel_on_hangup(mut self, job: CancellationToken) -> Self {
        self.job = Some(job);
        self
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        if self.tx.send(event).is_ok() || self.hung_up.swap(true, Ordering::Relaxed) {
            return;
        }
        review_debug!("event receiver is gone; stopping job");
        if let Some(job) = &self.job {
            job.cancel();
        }
    }
}

/// How a poll loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollEnd {
    Completed,
    Cancelled,
}

/// Resets progress, then starts the job while polling it.
///
/// Emits `Progress`/`PollFailed` per poll, `JobRows` once the start call
/// returns and `JobComplete` once after the settle delay.
pub async fn track_job(
    control: &dyn JobControl,
    filename: &str,
    epoch: SessionEpoch,
    settings: &TrackerSettings,
    sink: &dyn ProgressSink,
    cancel: &CancellationToken,
) {
    review_session!(Level::Info, epoch, "starting job for {filename}");
    if let Err(err) = control.reset_progress().await {
        review_session!(Level::Warn, epoch, "progress reset failed: {err}");
    }
    if cancel.is_cancelled() {
        return;
    }

    let poll_cancel = cancel.child_token();
    let poll = poll_progress(control, Some(filename), epoch, settings, sink, &poll_cancel);
    let start = async {
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            result = control.start_job(filename) => result,
        };
        match &result {
            Ok(rows) => review_session!(Level::Info, epoch, "job returned {} rows", rows.len()),
            Err(err) => {
                review_session!(Level::Warn, epoch, "job start failed: {err}");
                if settings.stop_polling_on_start_error {
                    poll_cancel.cancel();
                }
            }
        }
        sink.emit(EngineEvent::JobRows { epoch, result });
    };

    let (end, ()) = tokio::join!(poll, start);
    if end == PollEnd::Completed {
        review_session!(Level::Info, epoch, "job complete");
    }
}

/// Polls sequentially every `poll_interval` until both phases complete or
/// `cancel` fires. The first poll is issued immediately. Failed polls are
/// logged and retried on the same schedule.
pub async fn poll_progress(
    control: &dyn JobControl,
    filename: Option<&str>,
    epoch: SessionEpoch,
    settings: &TrackerSettings,
    sink: &dyn ProgressSink,
    cancel: &CancellationToken,
) -> PollEnd {
    let mut latest = JobProgress::default();
    loop {
        let sample = tokio::select! {
            biased;
            _ = cancel.cancelled() => return PollEnd::Cancelled,
            sample = control.get_progress(filename) => sample,
        };

        match sample {
            Ok(sample) => {
                latest.apply_sample(&sample);
                sink.emit(EngineEvent::Progress {
                    epoch,
                    progress: latest.clone(),
                });
                if latest.is_terminal() {
                    if !pause(settings.settle_delay, cancel).await {
                        return PollEnd::Cancelled;
                    }
                    sink.emit(EngineEvent::JobComplete { epoch });
                    return PollEnd::Completed;
                }
            }
            Err(error) => {
                review_session!(Level::Warn, epoch, "progress poll failed: {error}");
                sink.emit(EngineEvent::PollFailed { epoch, error });
            }
        }

        if !pause(settings.poll_interval, cancel).await {
            return PollEnd::Cancelled;
        }
    }
}

/// Sleeps for `duration`; returns `false` if cancelled first.
async fn pause(duration: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(duration) => true,
    }
}
