use std::sync::{Mutex, Once};

use pretty_assertions::assert_eq;
use review_core::{FieldLabel, LocateOutcome, SearchQuery, SearchState};
use review_engine::{
    FuzzyLocator, LocatorSettings, RenderError, RendererSearch, TextRenderer,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(review_logging::initialize_for_tests);
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Highlight(SearchQuery),
    Clear,
    Jump,
}

/// Renderer that records calls and reports highlights only for `visible`.
struct RecordingRenderer {
    visible: Vec<SearchQuery>,
    calls: Mutex<Vec<Call>>,
    current: Mutex<Option<SearchQuery>>,
}

impl RecordingRenderer {
    fn showing(visible: Vec<SearchQuery>) -> Self {
        Self {
            visible,
            calls: Mutex::new(Vec::new()),
            current: Mutex::new(None),
        }
    }

    fn take_calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().drain(..).collect()
    }
}

#[async_trait::async_trait]
impl RendererSearch for RecordingRenderer {
    async fn highlight(&self, query: &SearchQuery) -> Result<(), RenderError> {
        self.calls.lock().unwrap().push(Call::Highlight(query.clone()));
        *self.current.lock().unwrap() = Some(query.clone());
        Ok(())
    }

    async fn clear_highlights(&self) -> Result<(), RenderError> {
        self.calls.lock().unwrap().push(Call::Clear);
        *self.current.lock().unwrap() = None;
        Ok(())
    }

    async fn jump_to_next_match(&self) -> Result<(), RenderError> {
        self.calls.lock().unwrap().push(Call::Jump);
        Ok(())
    }

    async fn highlight_count(&self) -> usize {
        match self.current.lock().unwrap().as_ref() {
            Some(query) if self.visible.contains(query) => 1,
            _ => 0,
        }
    }
}

fn literal(term: &str) -> SearchQuery {
    SearchQuery::Literal(term.to_string())
}

fn locator(visible: Vec<SearchQuery>) -> FuzzyLocator<RecordingRenderer> {
    FuzzyLocator::new(RecordingRenderer::showing(visible), LocatorSettings::default())
}

#[tokio::test(start_paused = true)]
async fn sentinel_values_touch_nothing() {
    init_logging();
    let mut locator = locator(vec![literal("N/A")]);
    for value in ["N/A", "-", ""] {
        assert_eq!(locator.locate(FieldLabel::City, value).await, LocateOutcome::Skipped);
    }
    assert!(locator.renderer().take_calls().is_empty());
    assert_eq!(locator.state(), &SearchState::default());
}

#[tokio::test(start_paused = true)]
async fn area_value_is_found_by_its_number() {
    init_logging();
    let mut locator = locator(vec![literal("198")]);

    let outcome = locator.locate(FieldLabel::Area, "198 m2").await;

    assert_eq!(outcome, LocateOutcome::Found { query: literal("198") });
    assert_eq!(
        locator.renderer().take_calls(),
        vec![Call::Highlight(literal("198")), Call::Jump]
    );
    assert_eq!(locator.state(), &SearchState::active(FieldLabel::Area, "198"));
}

#[tokio::test(start_paused = true)]
async fn repeat_click_jumps_without_new_search() {
    init_logging();
    let mut locator = locator(vec![literal("198")]);
    locator.locate(FieldLabel::Area, "198 m2").await;
    locator.renderer().take_calls();

    let outcome = locator.locate(FieldLabel::Area, "198 m2").await;

    assert_eq!(outcome, LocateOutcome::JumpedToNext);
    assert_eq!(locator.renderer().take_calls(), vec![Call::Jump]);
}

#[tokio::test(start_paused = true)]
async fn ocr_variant_is_tried_after_exact_term() {
    init_logging();
    let mut locator = locator(vec![literal("5O")]);

    let outcome = locator.locate(FieldLabel::Area, "50 m2").await;

    assert_eq!(outcome, LocateOutcome::Found { query: literal("5O") });
    assert_eq!(
        locator.renderer().take_calls(),
        vec![
            Call::Highlight(literal("50")),
            Call::Highlight(literal("S0")),
            Call::Highlight(literal("5O")),
            Call::Jump,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn switching_field_clears_previous_highlights_first() {
    init_logging();
    let mut locator = locator(vec![literal("198"), literal("Aarhus")]);
    locator.locate(FieldLabel::Area, "198 m2").await;
    locator.renderer().take_calls();

    let outcome = locator.locate(FieldLabel::City, "Aarhus").await;

    assert_eq!(outcome, LocateOutcome::Found { query: literal("Aarhus") });
    assert_eq!(
        locator.renderer().take_calls(),
        vec![Call::Clear, Call::Highlight(literal("Aarhus")), Call::Jump]
    );
    assert_eq!(locator.state(), &SearchState::active(FieldLabel::City, "Aarhus"));
}

#[tokio::test(start_paused = true)]
async fn exhausted_search_clears_state_and_highlights() {
    init_logging();
    let mut locator = locator(vec![literal("198")]);
    locator.locate(FieldLabel::Area, "198 m2").await;

    let outcome = locator.locate(FieldLabel::City, "Odense").await;

    assert_eq!(outcome, LocateOutcome::Exhausted);
    let calls = locator.renderer().take_calls();
    assert_eq!(calls.last(), Some(&Call::Clear));
    assert!(!calls.contains(&Call::Jump));
    assert_eq!(locator.state(), &SearchState::default());
}

#[tokio::test(start_paused = true)]
async fn two_substitution_variant_found_in_text() {
    init_logging();
    let renderer = TextRenderer::new("Boligareal: SO m2\nGrund: 812 m2\n");
    let mut locator = FuzzyLocator::new(renderer, LocatorSettings::default());

    let outcome = locator.locate(FieldLabel::Area, "50 m2").await;

    assert_eq!(outcome, LocateOutcome::Found { query: literal("SO") });
    let current = locator.renderer().current_match().await.expect("current match");
    assert_eq!(current.line, 1);
    assert_eq!(current.text, "SO");
}

#[tokio::test(start_paused = true)]
async fn bracket_pattern_catches_what_capped_candidates_miss() {
    init_logging();
    // Every digit misread; far beyond the candidate cap.
    let renderer = TextRenderer::new("Areal: IOlOIOlO m2");
    let mut locator = FuzzyLocator::new(renderer, LocatorSettings::default());

    let outcome = locator.locate(FieldLabel::Area, "10101010 m2").await;

    assert_eq!(
        outcome,
        LocateOutcome::Found {
            query: SearchQuery::Pattern("[1Il][0O][1Il][0O][1Il][0O][1Il][0O]".into())
        }
    );
    assert_eq!(locator.renderer().current_match().await.unwrap().text, "IOlOIOlO");
}

#[tokio::test(start_paused = true)]
async fn reset_forces_a_fresh_search_for_the_same_field() {
    init_logging();
    let mut locator = locator(vec![literal("198")]);
    locator.locate(FieldLabel::Area, "198 m2").await;
    locator.renderer().take_calls();

    locator.reset().await;
    assert_eq!(locator.renderer().take_calls(), vec![Call::Clear]);
    assert_eq!(locator.state(), &SearchState::default());

    let outcome = locator.locate(FieldLabel::Area, "198 m2").await;

    assert_eq!(outcome, LocateOutcome::Found { query: literal("198") });
    assert_eq!(
        locator.renderer().take_calls(),
        vec![Call::Highlight(literal("198")), Call::Jump]
    );
}

#[tokio::test(start_paused = true)]
async fn new_document_text_is_searched_from_scratch() {
    init_logging();
    let renderer = TextRenderer::new("Areal: 198 m2\n");
    let mut locator = FuzzyLocator::new(renderer, LocatorSettings::default());
    locator.locate(FieldLabel::Area, "198 m2").await;

    locator
        .renderer()
        .replace_text("Grund: 812 m2\nBoligareal: 198 m2\n")
        .await;
    locator.reset().await;
    assert_eq!(locator.renderer().highlight_count().await, 0);
    assert_eq!(locator.renderer().current_match().await, None);

    let outcome = locator.locate(FieldLabel::Area, "198 m2").await;

    assert_eq!(outcome, LocateOutcome::Found { query: literal("198") });
    let current = locator.renderer().current_match().await.expect("current match");
    assert_eq!((current.line, current.total), (2, 1));
}
