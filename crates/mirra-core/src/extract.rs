//! Tolerant field extraction over mirror markup.
//!
//! Each field has a priority-ordered list of selector candidates. Mirror
//! software versions mark up the same content differently, so the first
//! candidate that matches wins and a field nobody matches is left empty.
//! Posts are the exception: every candidate contributes, and matches are
//! collected in document order.

use scraper::{ElementRef, Html, Selector};

use crate::config::{SelectorCandidate, SelectorConfig};
use crate::error::AppError;
use crate::models::{ExtractedFields, RawDocument};

const ZERO_TEXT: &str = "0";

#[derive(Debug, Clone)]
struct CompiledCandidate {
    selector: Selector,
    index: usize,
}

impl CompiledCandidate {
    fn compile(candidate: &SelectorCandidate) -> Result<Self, AppError> {
        let selector = Selector::parse(&candidate.css).map_err(|e| {
            AppError::ConfigError(format!("Invalid selector '{}': {e}", candidate.css))
        })?;
        Ok(Self {
            selector,
            index: candidate.index,
        })
    }
}

/// Compiled form of a [`SelectorConfig`].
#[derive(Debug, Clone)]
pub struct SelectorTable {
    name: Vec<CompiledCandidate>,
    bio: Vec<CompiledCandidate>,
    followers: Vec<CompiledCandidate>,
    following: Vec<CompiledCandidate>,
    posts: Vec<CompiledCandidate>,
}

impl SelectorTable {
    /// Parse every candidate up front so bad selectors fail at startup.
    pub fn compile(config: &SelectorConfig) -> Result<Self, AppError> {
        fn group(candidates: &[SelectorCandidate]) -> Result<Vec<CompiledCandidate>, AppError> {
            candidates.iter().map(CompiledCandidate::compile).collect()
        }

        Ok(Self {
            name: group(&config.name)?,
            bio: group(&config.bio)?,
            followers: group(&config.followers)?,
            following: group(&config.following)?,
            posts: group(&config.posts)?,
        })
    }
}

/// Turns a validated document into [`ExtractedFields`]. Never fails.
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    table: SelectorTable,
    repost_prefix: String,
}

impl FieldExtractor {
    pub fn new(table: SelectorTable, repost_prefix: impl Into<String>) -> Self {
        Self {
            table,
            repost_prefix: repost_prefix.into(),
        }
    }

    pub fn extract(&self, document: &RawDocument) -> ExtractedFields {
        let html = Html::parse_document(document.as_str());

        let name = first_match(&html, &self.table.name).unwrap_or_default();
        let bio = first_match(&html, &self.table.bio).unwrap_or_default();
        let followers_text =
            first_match(&html, &self.table.followers).unwrap_or_else(|| ZERO_TEXT.to_string());
        let following_text =
            first_match(&html, &self.table.following).unwrap_or_else(|| ZERO_TEXT.to_string());
        let posts = self.collect_posts(&html);

        if name.is_empty() {
            tracing::debug!("No name candidate matched");
        }
        tracing::debug!(posts = posts.len(), "Fields extracted");

        ExtractedFields {
            name,
            bio,
            followers_text,
            following_text,
            posts,
        }
    }

    /// Union of all post candidates, document order, reposts and blanks dropped.
    fn collect_posts(&self, html: &Html) -> Vec<String> {
        if self.table.posts.is_empty() {
            return Vec::new();
        }

        html.root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|el| self.table.posts.iter().any(|c| c.selector.matches(el)))
            .map(element_text)
            .filter(|text| !text.is_empty() && !self.is_repost(text))
            .collect()
    }

    fn is_repost(&self, text: &str) -> bool {
        !self.repost_prefix.is_empty() && text.starts_with(self.repost_prefix.as_str())
    }
}

/// Trimmed text of the first candidate that matches, in priority order.
fn first_match(html: &Html, candidates: &[CompiledCandidate]) -> Option<String> {
    candidates.iter().find_map(|candidate| {
        html.select(&candidate.selector)
            .nth(candidate.index)
            .map(element_text)
    })
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
