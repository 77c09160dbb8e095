/// Review time accumulated for one document across page visits.
///
/// Timestamps are milliseconds from an arbitrary epoch supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ElapsedTime {
    /// Start of the currently running interval, if any.
    pub started_at: Option<i64>,
    pub accumulated_ms: u64,
}

impl ElapsedTime {
    /// Starts a new interval. A running interval is left untouched.
    pub fn resume(&mut self, now: i64) {
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
    }

    /// Folds the running interval into the total.
    pub fn pause(&mut self, now: i64) {
        if let Some(start) = self.started_at.take() {
            self.accumulated_ms += interval_ms(start, now);
        }
    }

    pub fn total_ms(&self, now: i64) -> u64 {
        self.accumulated_ms + self.started_at.map_or(0, |start| interval_ms(start, now))
    }

    /// Total elapsed whole seconds; the accumulator is cleared.
    pub fn finalize(&mut self, now: i64) -> u64 {
        let total = self.total_ms(now);
        *self = Self::default();
        total / 1000
    }
}

fn interval_ms(start: i64, end: i64) -> u64 {
    u64::try_from(end.saturating_sub(start)).unwrap_or(0)
}
