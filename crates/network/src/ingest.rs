//! Bounded ingestion of paginated records
//!
//! Pages are pulled from a [`RecordSource`] one at a time through a single
//! cursor that checks every configured bound once per page, before the next
//! fetch. A bound reached in the middle of a page therefore lets that page
//! finish; caps are resource limits with page granularity, not exact counts.

use crate::registry::Corpus;
use collabnet_common::config::IngestionConfig;
use collabnet_common::errors::Result;
use collabnet_common::metrics::{record_ingestion, StageTimer};
use collabnet_common::records::RawWork;
use collabnet_common::source::RecordSource;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Why ingestion stopped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The source had no more pages
    #[default]
    SourceExhausted,
    /// Distinct-author cap reached
    AuthorCap,
    /// Work cap reached
    WorkCap,
    /// Page cap reached
    PageCap,
}

impl StopReason {
    /// True when a configured bound, not the source, ended ingestion
    pub fn is_bound(&self) -> bool {
        !matches!(self, StopReason::SourceExhausted)
    }
}

/// Resource bounds for one ingestion run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestBounds {
    pub max_authors: Option<usize>,
    pub max_works: Option<usize>,
    pub max_pages: Option<usize>,
}

impl From<&IngestionConfig> for IngestBounds {
    fn from(config: &IngestionConfig) -> Self {
        Self {
            max_authors: Some(config.max_authors),
            max_works: config.max_works,
            max_pages: config.max_pages,
        }
    }
}

impl IngestBounds {
    /// No bounds; read the source to the end
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// First bound met by `outcome`, if any
    pub fn reached(&self, outcome: &IngestOutcome) -> Option<StopReason> {
        let hit = |limit: Option<usize>, value: usize| limit.is_some_and(|l| value >= l);

        if hit(self.max_authors, outcome.authors) {
            Some(StopReason::AuthorCap)
        } else if hit(self.max_works, outcome.works) {
            Some(StopReason::WorkCap)
        } else if hit(self.max_pages, outcome.pages) {
            Some(StopReason::PageCap)
        } else {
            None
        }
    }
}

/// Summary of an ingestion run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestOutcome {
    /// Pages consumed
    pub pages: usize,

    /// Works observed, including ones whose title collided
    pub works: usize,

    /// Authorship entries skipped for missing author data
    pub authorships_skipped: usize,

    /// Distinct authors registered
    pub authors: usize,

    pub stop_reason: StopReason,
}

impl IngestOutcome {
    /// True when a cap ended ingestion
    pub fn bound_reached(&self) -> bool {
        self.stop_reason.is_bound()
    }
}

/// Page cursor enforcing [`IngestBounds`]
pub struct IngestCursor<'a, S: RecordSource + ?Sized> {
    source: &'a mut S,
    bounds: IngestBounds,
    outcome: IngestOutcome,
    done: bool,
}

impl<'a, S: RecordSource + ?Sized> IngestCursor<'a, S> {
    pub fn new(source: &'a mut S, bounds: IngestBounds) -> Self {
        Self {
            source,
            bounds,
            outcome: IngestOutcome::default(),
            done: false,
        }
    }

    /// Next page, or `None` once a bound is met or the source is exhausted
    pub async fn next_page(&mut self) -> Result<Option<Vec<RawWork>>> {
        if self.done {
            return Ok(None);
        }

        if let Some(reason) = self.bounds.reached(&self.outcome) {
            self.stop(reason);
            return Ok(None);
        }

        match self.source.next_page().await? {
            Some(page) => {
                self.outcome.pages += 1;
                Ok(Some(page))
            }
            None => {
                self.stop(StopReason::SourceExhausted);
                Ok(None)
            }
        }
    }

    fn stop(&mut self, reason: StopReason) {
        self.done = true;
        self.outcome.stop_reason = reason;
    }

    /// Account for a processed page
    pub fn record(&mut self, works: usize, skipped: usize, authors: usize) {
        self.outcome.works += works;
        self.outcome.authorships_skipped += skipped;
        self.outcome.authors = authors;
    }

    pub fn outcome(&self) -> &IngestOutcome {
        &self.outcome
    }

    pub fn finish(self) -> IngestOutcome {
        self.outcome
    }
}

/// Drain `source` into `corpus` within `bounds`
#[instrument(skip(source, corpus), fields(source_name = source.name()))]
pub async fn ingest<S: RecordSource + ?Sized>(
    source: &mut S,
    corpus: &mut Corpus,
    bounds: IngestBounds,
) -> Result<IngestOutcome> {
    let timer = StageTimer::start("ingest");
    let mut cursor = IngestCursor::new(source, bounds);

    while let Some(page) = cursor.next_page().await? {
        let mut new_authors = 0;
        let mut skipped = 0;

        for work in &page {
            let observation = corpus.observe_work(work);
            new_authors += observation.new_authors;
            skipped += observation.skipped_authorships;
        }

        cursor.record(page.len(), skipped, corpus.authors.len());
        record_ingestion(page.len(), skipped, new_authors);

        if skipped > 0 {
            warn!(skipped, page = cursor.outcome().pages, "Skipped authorships without author data");
        }

        debug!(
            page = cursor.outcome().pages,
            works = page.len(),
            new_authors,
            total_authors = corpus.authors.len(),
            "Page ingested"
        );
    }

    let outcome = cursor.finish();
    let elapsed = timer.finish();

    info!(
        pages = outcome.pages,
        works = outcome.works,
        authors = outcome.authors,
        distinct_titles = corpus.works.len(),
        skipped = outcome.authorships_skipped,
        stop_reason = ?outcome.stop_reason,
        elapsed_secs = elapsed,
        "Ingestion finished"
    );

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use collabnet_common::errors::AppError;
    use collabnet_common::records::RawAuthorship;
    use collabnet_common::StaticSource;

    fn pages() -> Vec<Vec<RawWork>> {
        vec![
            vec![RawWork::new("W1", &["A", "B"]), RawWork::new("W2", &["C"])],
            vec![RawWork::new("W3", &["D", "E"])],
            vec![RawWork::new("W4", &["F"])],
        ]
    }

    #[tokio::test]
    async fn test_unbounded_reads_everything() {
        let mut source = StaticSource::new(pages());
        let mut corpus = Corpus::new();

        let outcome = ingest(&mut source, &mut corpus, IngestBounds::unbounded())
            .await
            .unwrap();

        assert_eq!(outcome.pages, 3);
        assert_eq!(outcome.works, 4);
        assert_eq!(outcome.authors, 6);
        assert_eq!(outcome.stop_reason, StopReason::SourceExhausted);
        assert!(!outcome.bound_reached());
    }

    #[tokio::test]
    async fn test_author_cap_checked_per_page() {
        let mut source = StaticSource::new(pages());
        let mut corpus = Corpus::new();
        let bounds = IngestBounds {
            max_authors: Some(2),
            ..Default::default()
        };

        let outcome = ingest(&mut source, &mut corpus, bounds).await.unwrap();

        // The cap is crossed inside page 1, which still completes
        assert_eq!(outcome.pages, 1);
        assert_eq!(outcome.authors, 3);
        assert_eq!(outcome.stop_reason, StopReason::AuthorCap);
        assert!(outcome.bound_reached());
        assert_eq!(source.remaining(), 2);
    }

    #[tokio::test]
    async fn test_work_and_page_caps() {
        let mut corpus = Corpus::new();
        let bounds = IngestBounds {
            max_works: Some(3),
            ..Default::default()
        };
        let outcome = ingest(&mut StaticSource::new(pages()), &mut corpus, bounds)
            .await
            .unwrap();
        assert_eq!(outcome.stop_reason, StopReason::WorkCap);
        assert_eq!(outcome.pages, 2);

        let mut corpus = Corpus::new();
        let bounds = IngestBounds {
            max_pages: Some(1),
            ..Default::default()
        };
        let outcome = ingest(&mut StaticSource::new(pages()), &mut corpus, bounds)
            .await
            .unwrap();
        assert_eq!(outcome.stop_reason, StopReason::PageCap);
        assert_eq!(corpus.works.len(), 2);
    }

    #[tokio::test]
    async fn test_skipped_authorships_counted() {
        let mut work = RawWork::new("W", &["A"]);
        work.authorships.push(RawAuthorship::unresolved());
        let mut source = StaticSource::new(vec![vec![work]]);
        let mut corpus = Corpus::new();

        let outcome = ingest(&mut source, &mut corpus, IngestBounds::unbounded())
            .await
            .unwrap();
        assert_eq!(outcome.authorships_skipped, 1);
        assert_eq!(outcome.authors, 1);
    }

    #[test]
    fn test_bounds_from_config() {
        let config = IngestionConfig {
            max_authors: 10,
            max_works: Some(5),
            max_pages: None,
        };
        let bounds = IngestBounds::from(&config);
        assert_eq!(bounds.max_authors, Some(10));
        assert_eq!(bounds.max_works, Some(5));

        let outcome = IngestOutcome {
            authors: 10,
            works: 5,
            ..Default::default()
        };
        // Author cap takes precedence when several bounds are met
        assert_eq!(bounds.reached(&outcome), Some(StopReason::AuthorCap));
    }

    struct FailingSource {
        served: bool,
    }

    #[async_trait]
    impl RecordSource for FailingSource {
        async fn next_page(&mut self) -> Result<Option<Vec<RawWork>>> {
            if self.served {
                return Err(AppError::RecordSource {
                    status: 503,
                    message: "unavailable".to_string(),
                });
            }
            self.served = true;
            Ok(Some(vec![RawWork::new("W", &["A", "B"])]))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    #[test]
    fn test_source_error_propagates() {
        let mut source = FailingSource { served: false };
        let mut corpus = Corpus::new();

        let result = tokio_test::block_on(ingest(&mut source, &mut corpus, IngestBounds::unbounded()));
        assert!(matches!(result, Err(AppError::RecordSource { status: 503, .. })));
        // The first page is kept
        assert_eq!(corpus.authors.len(), 2);
    }
}
