//! Planning half of the fuzzy field locator. Everything here is pure; the
//! engine drives a renderer with the plans produced by [`plan_locate`].

use std::sync::LazyLock;

use regex::Regex;

use crate::confusion::{build_fuzzy_pattern, confusion_class, generate_candidates};
use crate::FieldLabel;

/// Values the backend uses for "nothing extracted".
const EMPTY_SENTINELS: &[&str] = &["", "N/A", "-"];

static UNIT_TOKENS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)kvadratmeter|square\s*meters?|sqm|kvm|m²|m\^2|m2|m\?|~")
        .expect("unit pattern is valid")
});

static NUMERIC_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("numeric pattern is valid"));

/// Which field's value is currently highlighted in the document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchState {
    pub active_field: Option<FieldLabel>,
    pub last_term: Option<String>,
}

impl SearchState {
    pub fn active(field: FieldLabel, term: impl Into<String>) -> Self {
        Self {
            active_field: Some(field),
            last_term: Some(term.into()),
        }
    }

    pub fn is_active(&self, field: FieldLabel, term: &str) -> bool {
        self.active_field == Some(field) && self.last_term.as_deref() == Some(term)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// One highlight request sent to the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    Literal(String),
    Pattern(String),
}

/// What a locate invocation ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocateOutcome {
    /// Value was empty or a sentinel; the renderer was not touched.
    Skipped,
    JumpedToNext,
    Found { query: SearchQuery },
    Exhausted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocatePlan {
    Skip,
    JumpToNext,
    Search {
        term: String,
        clear_first: bool,
        queries: Vec<SearchQuery>,
    },
}

/// Reduces a field value to the term searched for in the document.
///
/// Unit-decorated fields lose their unit tokens and keep only the first run
/// of digits. Returns `None` for sentinel values.
pub fn clean_search_term(field: FieldLabel, value: &str) -> Option<String> {
    if EMPTY_SENTINELS.contains(&value.trim()) {
        return None;
    }
    if !field.is_numeric_with_unit() {
        return Some(value.to_string());
    }
    let stripped = UNIT_TOKENS.replace_all(value, " ");
    NUMERIC_RUN
        .find(&stripped)
        .map(|run| run.as_str().to_string())
}

/// Exact term, then confusion variants, then one bracket-class pattern.
pub fn search_queries(term: &str) -> Vec<SearchQuery> {
    let mut queries: Vec<SearchQuery> = generate_candidates(term)
        .into_iter()
        .map(SearchQuery::Literal)
        .collect();
    if term.chars().any(|c| confusion_class(c).is_some()) {
        queries.push(SearchQuery::Pattern(build_fuzzy_pattern(term)));
    }
    queries
}

pub fn plan_locate(state: &SearchState, field: FieldLabel, value: &str) -> LocatePlan {
    let Some(term) = clean_search_term(field, value) else {
        return LocatePlan::Skip;
    };
    if state.is_active(field, &term) {
        return LocatePlan::JumpToNext;
    }
    LocatePlan::Search {
        queries: search_queries(&term),
        clear_first: state.active_field.is_some(),
        term,
    }
}
