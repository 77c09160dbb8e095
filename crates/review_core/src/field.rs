use std::fmt;

/// Domain fields shown in the review table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldLabel {
    Address,
    Area,
    City,
}

impl FieldLabel {
    pub const ALL: [FieldLabel; 3] = [FieldLabel::Address, FieldLabel::Area, FieldLabel::City];

    /// Identifier used by the extraction backend.
    pub fn wire_id(self) -> &'static str {
        match self {
            FieldLabel::Address => "Adresse:",
            FieldLabel::Area => "Areal:",
            FieldLabel::City => "By:",
        }
    }

    /// Accepts the backend's labels as well as plain English aliases.
    pub fn from_wire(raw: &str) -> Option<Self> {
        let key = raw.trim().trim_end_matches(':').to_lowercase();
        match key.as_str() {
            "adresse" | "address" => Some(FieldLabel::Address),
            "areal" | "area" => Some(FieldLabel::Area),
            "by" | "city" => Some(FieldLabel::City),
            _ => None,
        }
    }

    /// Fields whose value carries a unit that must be stripped before searching.
    pub fn is_numeric_with_unit(self) -> bool {
        matches!(self, FieldLabel::Area)
    }
}

impl fmt::Display for FieldLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_id())
    }
}

/// Extraction confidence as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Confidence {
    Percent(f64),
    #[default]
    NotComputed,
}

impl Confidence {
    /// Parses `"92%"`, `"92"`, `"N/A"` or an empty string.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim().trim_end_matches('%').trim();
        match trimmed.replace(',', ".").parse::<f64>() {
            Ok(value) => Self::from_number(value),
            Err(_) => Confidence::NotComputed,
        }
    }

    pub fn from_number(value: f64) -> Self {
        if value.is_finite() {
            Confidence::Percent(value)
        } else {
            Confidence::NotComputed
        }
    }

    pub fn percent(self) -> Option<f64> {
        match self {
            Confidence::Percent(value) => Some(value),
            Confidence::NotComputed => None,
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::Percent(value) if value.fract() == 0.0 => write!(f, "{value:.0}%"),
            Confidence::Percent(value) => write!(f, "{value:.1}%"),
            Confidence::NotComputed => f.write_str("N/A"),
        }
    }
}

/// Whether the locate action is offered for a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocateGate {
    Disabled,
    /// Enabled, but the extracted value may be wrong.
    Unreliable,
    Reliable,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocateThresholds {
    pub disable_below: f64,
    pub reliable_at: f64,
}

impl Default for LocateThresholds {
    fn default() -> Self {
        Self {
            disable_below: 80.0,
            reliable_at: 95.0,
        }
    }
}

impl LocateThresholds {
    pub fn gate(&self, confidence: Confidence) -> LocateGate {
        match confidence.percent() {
            Some(value) if value >= self.reliable_at => LocateGate::Reliable,
            Some(value) if value >= self.disable_below => LocateGate::Unreliable,
            _ => LocateGate::Disabled,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldRow {
    pub id: FieldLabel,
    pub expected: String,
    pub received: String,
    pub confidence: Confidence,
}

impl FieldRow {
    pub fn placeholder(id: FieldLabel) -> Self {
        Self {
            id,
            expected: String::new(),
            received: String::new(),
            confidence: Confidence::NotComputed,
        }
    }
}

/// One empty row per known field, in table order.
pub fn placeholder_rows() -> Vec<FieldRow> {
    FieldLabel::ALL.into_iter().map(FieldRow::placeholder).collect()
}

/// Replaces each row with the incoming row carrying the same id. Rows the
/// backend did not report keep their placeholder values; unknown ids are dropped.
pub fn merge_rows(rows: &mut [FieldRow], incoming: &[FieldRow]) {
    for row in rows.iter_mut() {
        if let Some(update) = incoming.iter().find(|candidate| candidate.id == row.id) {
            *row = update.clone();
        }
    }
}
