use std::time::Duration;

use review_core::{plan_locate, FieldLabel, LocateOutcome, LocatePlan, SearchQuery, SearchState};
use review_logging::{review_debug, review_info, review_warn};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid search pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
    #[error("no highlighted matches")]
    NoMatches,
}

/// Search capability of the document renderer.
#[async_trait::async_trait]
pub trait RendererSearch: Send + Sync {
    /// Highlights every match of `query`, replacing earlier highlights.
    async fn highlight(&self, query: &SearchQuery) -> Result<(), RenderError>;

    async fn clear_highlights(&self) -> Result<(), RenderError>;

    /// Scrolls to the next highlighted match, wrapping around.
    async fn jump_to_next_match(&self) -> Result<(), RenderError>;

    /// Highlights currently visible in the rendered output.
    async fn highlight_count(&self) -> usize;
}

#[derive(Debug, Clone)]
pub struct LocatorSettings {
    /// Wait after a highlight request before counting highlights.
    pub render_settle: Duration,
}

impl Default for LocatorSettings {
    fn default() -> Self {
        Self {
            render_settle: Duration::from_millis(150),
        }
    }
}

/// Finds field values in the rendered document, tolerating OCR confusions.
///
/// Owns the [`SearchState`]; a repeated locate of the same field and term
/// advances to the next match instead of searching again.
pub struct FuzzyLocator<R> {
    renderer: R,
    settings: LocatorSettings,
    state: SearchState,
}

impl<R: RendererSearch> FuzzyLocator<R> {
    pub fn new(renderer: R, settings: LocatorSettings) -> Self {
        Self {
            renderer,
            settings,
            state: SearchState::default(),
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// Forgets the active search and its highlights.
    pub async fn reset(&mut self) {
        if let Err(err) = self.renderer.clear_highlights().await {
            review_warn!("clearing highlights failed: {err}");
        }
        self.state.clear();
    }

    pub async fn locate(&mut self, field: FieldLabel, value: &str) -> LocateOutcome {
        match plan_locate(&self.state, field, value) {
            LocatePlan::Skip => LocateOutcome::Skipped,
            LocatePlan::JumpToNext => match self.renderer.jump_to_next_match().await {
                Ok(()) => LocateOutcome::JumpedToNext,
                Err(err) => {
                    review_warn!("jump to next match failed for {field}: {err}; searching again");
                    self.state.clear();
                    match plan_locate(&self.state, field, value) {
                        LocatePlan::Search { term, queries, .. } => {
                            self.search(field, term, true, queries).await
                        }
                        _ => LocateOutcome::Skipped,
                    }
                }
            },
            LocatePlan::Search {
                term,
                clear_first,
                queries,
            } => self.search(field, term, clear_first, queries).await,
        }
    }

    async fn search(
        &mut self,
        field: FieldLabel,
        term: String,
        clear_first: bool,
        queries: Vec<SearchQuery>,
    ) -> LocateOutcome {
        if clear_first {
            self.reset().await;
        }

        for query in queries {
            if !self.try_query(&query).await {
                continue;
            }
            if let Err(err) = self.renderer.jump_to_next_match().await {
                review_warn!("jump to first match failed for {field}: {err}");
            }
            review_info!("located {field} via {query:?}");
            self.state = SearchState::active(field, term);
            return LocateOutcome::Found { query };
        }

        review_info!("no match for {field} term {term:?}");
        self.reset().await;
        LocateOutcome::Exhausted
    }

    /// One candidate trial: highlight, let rendering settle, count highlights.
    async fn try_query(&self, query: &SearchQuery) -> bool {
        review_debug!("trying {query:?}");
        if let Err(err) = self.renderer.highlight(query).await {
            review_debug!("highlight rejected {query:?}: {err}");
            return false;
        }
        tokio::time::sleep(self.settings.render_settle).await;
        self.renderer.highlight_count().await > 0
    }
}
