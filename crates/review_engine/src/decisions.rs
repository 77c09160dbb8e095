use review_core::{DecisionAction, DecisionSets};
use review_logging::review_info;

use crate::{KeyValueStore, StoreError};

const ACCEPTED_KEY: &str = "accepted";
const REJECTED_KEY: &str = "rejected";

/// Accepted/rejected filename sets kept in a [`KeyValueStore`].
pub struct DecisionStore<'a> {
    store: &'a mut dyn KeyValueStore,
}

impl<'a> DecisionStore<'a> {
    pub fn new(store: &'a mut dyn KeyValueStore) -> Self {
        Self { store }
    }

    pub fn load(&self) -> Result<DecisionSets, StoreError> {
        Ok(DecisionSets::from_lists(
            self.read_list(ACCEPTED_KEY)?,
            self.read_list(REJECTED_KEY)?,
        ))
    }

    /// Records `action` for `filename`, moving it out of the other set.
    pub fn record(
        &mut self,
        filename: &str,
        action: DecisionAction,
    ) -> Result<DecisionSets, StoreError> {
        let mut sets = self.load()?;
        sets.record(filename, action);
        let accepted: Vec<&str> = sets.accepted().collect();
        let rejected: Vec<&str> = sets.rejected().collect();
        self.store.merge(vec![
            (ACCEPTED_KEY.to_string(), Some(ron::to_string(&accepted)?)),
            (REJECTED_KEY.to_string(), Some(ron::to_string(&rejected)?)),
        ])?;
        review_info!("recorded {} for {filename}", action.wire_name());
        Ok(sets)
    }

    fn read_list(&self, key: &str) -> Result<Vec<String>, StoreError> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(Vec::new());
        };
        ron::from_str(&raw).map_err(|err| StoreError::Deserialize {
            origin: format!("key {key}"),
            message: err.to_string(),
        })
    }
}
