use std::collections::BTreeSet;

/// Review outcome of one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Decision {
    Accepted,
    Rejected,
    #[default]
    Pending,
}

/// Terminal reviewer action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionAction {
    Accept,
    Reject,
}

impl DecisionAction {
    /// Action name understood by the time-tracking endpoint.
    pub fn wire_name(self) -> &'static str {
        match self {
            DecisionAction::Accept => "accepter",
            DecisionAction::Reject => "afvis",
        }
    }

    pub fn decision(self) -> Decision {
        match self {
            DecisionAction::Accept => Decision::Accepted,
            DecisionAction::Reject => Decision::Rejected,
        }
    }
}

/// Accepted and rejected filenames. A filename is never in both sets.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecisionSets {
    accepted: BTreeSet<String>,
    rejected: BTreeSet<String>,
}

impl DecisionSets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds sets from persisted lists. A filename present in both lists is
    /// treated as accepted.
    pub fn from_lists(
        accepted: impl IntoIterator<Item = String>,
        rejected: impl IntoIterator<Item = String>,
    ) -> Self {
        let accepted: BTreeSet<String> = accepted.into_iter().collect();
        let rejected = rejected
            .into_iter()
            .filter(|name| !accepted.contains(name))
            .collect();
        Self { accepted, rejected }
    }

    pub fn record(&mut self, filename: &str, action: DecisionAction) {
        let (add, remove) = match action {
            DecisionAction::Accept => (&mut self.accepted, &mut self.rejected),
            DecisionAction::Reject => (&mut self.rejected, &mut self.accepted),
        };
        remove.remove(filename);
        add.insert(filename.to_string());
    }

    pub fn status(&self, filename: &str) -> Decision {
        if self.accepted.contains(filename) {
            Decision::Accepted
        } else if self.rejected.contains(filename) {
            Decision::Rejected
        } else {
            Decision::Pending
        }
    }

    pub fn accepted(&self) -> impl Iterator<Item = &str> {
        self.accepted.iter().map(String::as_str)
    }

    pub fn rejected(&self) -> impl Iterator<Item = &str> {
        self.rejected.iter().map(String::as_str)
    }
}
