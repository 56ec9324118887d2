//! Locating the structured payload inside a page
//!
//! The harvesting stages only depend on the [`PayloadExtractor`] trait, so the
//! embedding convention can be swapped without touching the pipeline.

use scraper::{Html, Selector};
use serde_json::Value;

/// Pulls a structured payload out of raw page text
///
/// Returns `None` when the payload is absent or cannot be parsed. Both cases
/// mean the same thing to callers: this page has nothing to extract.
pub trait PayloadExtractor: Send + Sync {
    fn extract(&self, page: &str) -> Option<Value>;
}

/// Extracts the JSON from `<script id="__NEXT_DATA__">`
#[derive(Debug, Clone, Copy, Default)]
pub struct NextDataExtractor;

impl NextDataExtractor {
    const SELECTOR: &'static str = "script#__NEXT_DATA__";
}

impl PayloadExtractor for NextDataExtractor {
    fn extract(&self, page: &str) -> Option<Value> {
        let document = Html::parse_document(page);
        let selector = Selector::parse(Self::SELECTOR).ok()?;

        let script = document.select(&selector).next()?;
        let raw = script.text().collect::<String>();

        match serde_json::from_str(raw.trim()) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!("Embedded payload is not valid JSON: {}", e);
                None
            }
        }
    }
}
