use review_core::{DecisionAction, ElapsedTime};

use crate::{KeyValueStore, StoreError, TimeReport};

/// Per-document review time kept in a [`KeyValueStore`] as a running start
/// timestamp plus an accumulated total, both in milliseconds.
pub struct TimerStore<'a> {
    store: &'a mut dyn KeyValueStore,
}

impl<'a> TimerStore<'a> {
    pub fn new(store: &'a mut dyn KeyValueStore) -> Self {
        Self { store }
    }

    pub fn resume(&mut self, filename: &str, now_ms: i64) -> Result<(), StoreError> {
        let mut elapsed = self.load(filename)?;
        elapsed.resume(now_ms);
        self.save(filename, &elapsed)
    }

    pub fn pause(&mut self, filename: &str, now_ms: i64) -> Result<(), StoreError> {
        let mut elapsed = self.load(filename)?;
        elapsed.pause(now_ms);
        self.save(filename, &elapsed)
    }

    /// Ends timing for `filename` and clears its keys. The returned report is
    /// the only record of the time; it is not stored again.
    pub fn finalize(
        &mut self,
        filename: &str,
        action: DecisionAction,
        now_ms: i64,
    ) -> Result<TimeReport, StoreError> {
        let mut elapsed = self.load(filename)?;
        let duration_secs = elapsed.finalize(now_ms);
        self.store.merge(vec![
            (start_key(filename), None),
            (accumulated_key(filename), None),
        ])?;
        Ok(TimeReport {
            filename: filename.to_string(),
            duration_secs,
            action,
        })
    }

    pub fn elapsed(&self, filename: &str) -> Result<ElapsedTime, StoreError> {
        self.load(filename)
    }

    fn load(&self, filename: &str) -> Result<ElapsedTime, StoreError> {
        let started_at = self
            .store
            .get(&start_key(filename))?
            .and_then(|raw| raw.trim().parse::<i64>().ok());
        let accumulated_ms = self
            .store
            .get(&accumulated_key(filename))?
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .unwrap_or(0);
        Ok(ElapsedTime {
            started_at,
            accumulated_ms,
        })
    }

    fn save(&mut self, filename: &str, elapsed: &ElapsedTime) -> Result<(), StoreError> {
        self.store.merge(vec![
            (
                start_key(filename),
                elapsed.started_at.map(|start| start.to_string()),
            ),
            (
                accumulated_key(filename),
                Some(elapsed.accumulated_ms.to_string()),
            ),
        ])
    }
}

fn start_key(filename: &str) -> String {
    format!("timer.{filename}.start")
}

fn accumulated_key(filename: &str) -> String {
    format!("timer.{filename}.accumulated")
}
