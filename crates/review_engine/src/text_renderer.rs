use std::ops::Range;

use regex::Regex;
use review_core::SearchQuery;
use tokio::sync::Mutex;

use crate::{RenderError, RendererSearch};

/// Renderer over the plain text of a document.
///
/// Highlights are the non-overlapping matches of the last query; the cursor
/// cycles through them.
#[derive(Debug, Default)]
pub struct TextRenderer {
    view: Mutex<TextView>,
}

#[derive(Debug, Default)]
struct TextView {
    text: String,
    matches: Vec<Range<usize>>,
    cursor: Option<usize>,
}

/// The match the cursor is on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentMatch {
    /// 1-based position among all highlights.
    pub index: usize,
    pub total: usize,
    /// 1-based line of the match.
    pub line: usize,
    pub text: String,
    /// The whole line containing the match.
    pub excerpt: String,
}

impl TextRenderer {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            view: Mutex::new(TextView {
                text: text.into(),
                ..TextView::default()
            }),
        }
    }

    /// Shows another document. Highlights are dropped.
    pub async fn replace_text(&self, text: impl Into<String>) {
        let mut view = self.view.lock().await;
        *view = TextView {
            text: text.into(),
            ..TextView::default()
        };
    }

    pub async fn current_match(&self) -> Option<CurrentMatch> {
        let view = self.view.lock().await;
        let index = view.cursor?;
        let range = view.matches.get(index)?.clone();
        let line_start = view.text[..range.start].rfind('\n').map_or(0, |pos| pos + 1);
        let line_end = view.text[range.end..]
            .find('\n')
            .map_or(view.text.len(), |pos| range.end + pos);
        Some(CurrentMatch {
            index: index + 1,
            total: view.matches.len(),
            line: view.text[..range.start].matches('\n').count() + 1,
            text: view.text[range.clone()].to_string(),
            excerpt: view.text[line_start..line_end].trim().to_string(),
        })
    }
}

#[async_trait::async_trait]
impl RendererSearch for TextRenderer {
    async fn highlight(&self, query: &SearchQuery) -> Result<(), RenderError> {
        let mut view = self.view.lock().await;
        let matches = match query {
            SearchQuery::Literal(term) if term.is_empty() => Vec::new(),
            SearchQuery::Literal(term) => view
                .text
                .match_indices(term.as_str())
                .map(|(start, found)| start..start + found.len())
                .collect(),
            SearchQuery::Pattern(pattern) => Regex::new(pattern)?
                .find_iter(&view.text)
                .filter(|found| !found.is_empty())
                .map(|found| found.range())
                .collect(),
        };
        view.matches = matches;
        view.cursor = None;
        Ok(())
    }

    async fn clear_highlights(&self) -> Result<(), RenderError> {
        let mut view = self.view.lock().await;
        view.matches.clear();
        view.cursor = None;
        Ok(())
    }

    async fn jump_to_next_match(&self) -> Result<(), RenderError> {
        let mut view = self.view.lock().await;
        if view.matches.is_empty() {
            return Err(RenderError::NoMatches);
        }
        let next = view.cursor.map_or(0, |index| (index + 1) % view.matches.len());
        view.cursor = Some(next);
        Ok(())
    }

    async fn highlight_count(&self) -> usize {
        self.view.lock().await.matches.len()
    }
}
