/// Status text shown under the OCR indicator when a job starts.
pub const OCR_STARTING_STATUS: &str = "Starter...";
/// Status text shown under the analysis indicator when a job starts.
pub const MAIN_WAITING_STATUS: &str = "Venter på scanning...";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PhaseProgress {
    /// Fraction in `[0, 1]`.
    pub progress: f64,
    pub status: String,
}

impl PhaseProgress {
    pub fn new(progress: f64, status: impl Into<String>) -> Self {
        Self {
            progress: sanitize(progress),
            status: status.into(),
        }
    }

    /// Whole percent, rounded.
    pub fn percent(&self) -> u8 {
        (sanitize(self.progress) * 100.0).round() as u8
    }

    pub fn is_complete(&self) -> bool {
        self.progress >= 1.0
    }

    fn absorb(&mut self, sample: &PhaseProgress) {
        self.progress = self.progress.max(sanitize(sample.progress));
        self.status.clone_from(&sample.status);
    }
}

/// Progress of the two backend phases. `main` only means something once
/// `ocr` has completed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JobProgress {
    pub ocr: PhaseProgress,
    pub main: PhaseProgress,
}

impl JobProgress {
    pub fn new(ocr: PhaseProgress, main: PhaseProgress) -> Self {
        Self { ocr, main }
    }

    /// Both phases at zero with the initial status texts.
    pub fn starting() -> Self {
        Self {
            ocr: PhaseProgress::new(0.0, OCR_STARTING_STATUS),
            main: PhaseProgress::new(0.0, MAIN_WAITING_STATUS),
        }
    }

    /// Folds a poll sample in. Progress never moves backwards within a session.
    pub fn apply_sample(&mut self, sample: &JobProgress) {
        self.ocr.absorb(&sample.ocr);
        self.main.absorb(&sample.main);
    }

    pub fn is_terminal(&self) -> bool {
        self.ocr.is_complete() && self.main.is_complete()
    }
}

/// Visual state of one phase indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseIndicator {
    /// Busy spinner; the percent is informational only.
    Indeterminate { percent: u8 },
    /// Full inert ring labelled "0%" while the previous phase is running.
    Held,
    Complete,
}

impl PhaseIndicator {
    pub fn label(&self) -> String {
        match self {
            PhaseIndicator::Indeterminate { percent } => format!("{percent}%"),
            PhaseIndicator::Held => "0%".to_string(),
            PhaseIndicator::Complete => "100%".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseView {
    pub indicator: PhaseIndicator,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressView {
    pub ocr: PhaseView,
    pub main: PhaseView,
}

impl ProgressView {
    pub fn derive(progress: &JobProgress) -> Self {
        let ocr = if progress.ocr.is_complete() {
            PhaseIndicator::Complete
        } else {
            PhaseIndicator::Indeterminate {
                percent: progress.ocr.percent(),
            }
        };

        // Analysis is held until OCR is done, whatever the backend reports.
        let main = if !progress.ocr.is_complete() {
            PhaseIndicator::Held
        } else if progress.main.is_complete() {
            PhaseIndicator::Complete
        } else {
            PhaseIndicator::Indeterminate {
                percent: progress.main.percent(),
            }
        };

        Self {
            ocr: PhaseView {
                indicator: ocr,
                status: progress.ocr.status.clone(),
            },
            main: PhaseView {
                indicator: main,
                status: progress.main.status.clone(),
            },
        }
    }
}

fn sanitize(progress: f64) -> f64 {
    if progress.is_finite() {
        progress.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
