//! Paginated bibliographic record sources
//!
//! Provides a unified interface over:
//! - The OpenAlex works endpoint (cursor pagination, rate limited, retried)
//! - Recorded pages replayed from memory or a JSON file
//!
//! Pages are pulled one at a time; callers never see overlapping fetches,
//! so the order in which works arrive is the order in which they were
//! published by the source.

mod openalex;

pub use openalex::OpenAlexSource;

use crate::errors::{AppError, Result};
use crate::records::{RawWork, WorksPage};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::VecDeque;
use std::path::Path;

/// Trait for paginated record sources
#[async_trait]
pub trait RecordSource: Send {
    /// Fetch the next page; `None` once the source is exhausted
    async fn next_page(&mut self) -> Result<Option<Vec<RawWork>>>;

    /// Short name used in logs
    fn name(&self) -> &str;
}

/// In-memory source serving pre-recorded pages in order
#[derive(Debug, Default, Clone)]
pub struct StaticSource {
    pages: VecDeque<Vec<RawWork>>,
    served: usize,
}

/// Accepted page layouts in replay files
#[derive(Deserialize)]
#[serde(untagged)]
enum RecordedPage {
    Bare(Vec<RawWork>),
    Response(WorksPage),
}

impl StaticSource {
    /// Create a source from pages
    pub fn new(pages: Vec<Vec<RawWork>>) -> Self {
        Self {
            pages: pages.into(),
            served: 0,
        }
    }

    /// Load recorded pages from a JSON file
    ///
    /// The file holds an array of pages; each page is either an array of
    /// works or a raw API response with a `results` array.
    pub async fn from_json_file(path: &Path) -> Result<Self> {
        let body = tokio::fs::read_to_string(path).await?;
        Self::from_json_str(&body).map_err(|e| AppError::InvalidFormat {
            message: format!("{}: {}", path.display(), e),
        })
    }

    /// Parse recorded pages from a JSON string
    pub fn from_json_str(body: &str) -> Result<Self> {
        let recorded: Vec<RecordedPage> = serde_json::from_str(body)?;

        let pages = recorded
            .into_iter()
            .map(|page| match page {
                RecordedPage::Bare(works) => works,
                RecordedPage::Response(response) => response.results,
            })
            .collect();

        Ok(Self::new(pages))
    }

    /// Number of pages handed out so far
    pub fn pages_served(&self) -> usize {
        self.served
    }

    /// Number of pages still queued
    pub fn remaining(&self) -> usize {
        self.pages.len()
    }
}

#[async_trait]
impl RecordSource for StaticSource {
    async fn next_page(&mut self) -> Result<Option<Vec<RawWork>>> {
        let page = self.pages.pop_front();
        if page.is_some() {
            self.served += 1;
        }
        Ok(page)
    }

    fn name(&self) -> &str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_static_source_order() {
        let mut source = StaticSource::new(vec![
            vec![RawWork::new("W1", &["A", "B"])],
            vec![RawWork::new("W2", &["B", "C"])],
        ]);

        let first = source.next_page().await.unwrap().unwrap();
        assert_eq!(first[0].title_or_placeholder(), "W1");
        let second = source.next_page().await.unwrap().unwrap();
        assert_eq!(second[0].title_or_placeholder(), "W2");
        assert!(source.next_page().await.unwrap().is_none());
        assert_eq!(source.pages_served(), 2);
    }

    #[test]
    fn test_mixed_page_layouts() {
        let body = r#"[
            [{"title": "Bare", "authorships": []}],
            {"meta": {"next_cursor": null}, "results": [{"title": "Wrapped"}]}
        ]"#;

        let source = StaticSource::from_json_str(body).unwrap();
        assert_eq!(source.remaining(), 2);
    }

    #[test]
    fn test_replay_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[[{{"title": "W1", "authorships": [{{"author": {{"display_name": "A"}}}}]}}]]"#).unwrap();

        let mut source = tokio_test::block_on(StaticSource::from_json_file(file.path())).unwrap();
        let page = tokio_test::block_on(source.next_page()).unwrap().unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].authorships[0].identified_author(), Some(("A", None)));
    }

    #[test]
    fn test_invalid_replay_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();

        let err = tokio_test::block_on(StaticSource::from_json_file(file.path())).unwrap_err();
        assert!(matches!(err, AppError::InvalidFormat { .. }));
    }
}
