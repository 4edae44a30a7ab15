//! OpenAlex works endpoint client
//!
//! Walks `/works` with cursor pagination. Requests are paced by a token
//! bucket and transient failures (timeouts, 429, 5xx) are retried with
//! exponential backoff up to `max_retries` times.

use super::RecordSource;
use crate::config::SourceConfig;
use crate::errors::{AppError, Result};
use crate::metrics::record_page;
use crate::records::{RawWork, WorksPage};
use async_trait::async_trait;
use backoff::{future::retry, ExponentialBackoff};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Cursor value requesting the first page
const INITIAL_CURSOR: &str = "*";

/// Longest error body kept in error messages
const MAX_ERROR_BODY: usize = 512;

/// Cut an error body to at most `max` bytes on a character boundary
fn truncate_body(mut body: String, max: usize) -> String {
    if body.len() > max {
        let mut end = max;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body.truncate(end);
    }
    body
}

/// OpenAlex record source
pub struct OpenAlexSource {
    client: reqwest::Client,
    config: SourceConfig,
    limiter: DefaultDirectRateLimiter,
    cursor: Option<String>,
    pages_fetched: usize,
}

impl OpenAlexSource {
    /// Create a new client starting at the first page
    pub fn new(config: SourceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("collabnet/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let rate = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let limiter = RateLimiter::direct(Quota::per_second(rate));

        info!(
            base_url = %config.base_url,
            per_page = config.per_page,
            title_search = %config.title_search,
            "OpenAlex source initialized"
        );

        Ok(Self {
            client,
            config,
            limiter,
            cursor: Some(INITIAL_CURSOR.to_string()),
            pages_fetched: 0,
        })
    }

    /// Query parameters for the page at `cursor`
    fn query(&self, cursor: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("per-page", self.config.per_page.to_string()),
            ("cursor", cursor.to_string()),
        ];

        if !self.config.title_search.is_empty() {
            params.push(("filter", format!("title.search:{}", self.config.title_search)));
        }

        if let Some(mailto) = &self.config.mailto {
            params.push(("mailto", mailto.clone()));
        }

        params
    }

    fn backoff_policy(&self) -> ExponentialBackoff {
        let timeout = self.config.request_timeout();
        ExponentialBackoff {
            initial_interval: Duration::from_millis(500),
            max_interval: Duration::from_secs(10),
            max_elapsed_time: Some(timeout * (self.config.max_retries + 1)),
            ..Default::default()
        }
    }

    /// Single request without retry
    async fn fetch_once(&self, cursor: &str) -> Result<WorksPage> {
        self.limiter.until_ready().await;

        let timeout_ms = self.config.request_timeout().as_millis() as u64;
        let classify = move |e: reqwest::Error| {
            if e.is_timeout() {
                AppError::RecordSourceTimeout { timeout_ms }
            } else {
                AppError::HttpClient(e)
            }
        };

        let url = format!("{}/works", self.config.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .query(&self.query(cursor))
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::RecordSource {
                status: status.as_u16(),
                message: truncate_body(body, MAX_ERROR_BODY),
            });
        }

        response.json::<WorksPage>().await.map_err(classify)
    }

    /// Fetch with retry on transient failures
    async fn fetch_with_retry(&self, cursor: &str) -> Result<WorksPage> {
        let max_retries = self.config.max_retries;
        let mut attempt = 0u32;

        retry(self.backoff_policy(), || {
            attempt += 1;
            let current = attempt;
            async move {
                match self.fetch_once(cursor).await {
                    Ok(page) => Ok(page),
                    Err(e) if e.is_transient() && current <= max_retries => {
                        warn!(
                            attempt = current,
                            max_retries,
                            error = %e,
                            "Page request failed, retrying"
                        );
                        Err(backoff::Error::transient(e))
                    }
                    Err(e) => Err(backoff::Error::permanent(e)),
                }
            }
        })
        .await
    }
}

#[async_trait]
impl RecordSource for OpenAlexSource {
    async fn next_page(&mut self) -> Result<Option<Vec<RawWork>>> {
        let Some(cursor) = self.cursor.take() else {
            return Ok(None);
        };

        let start = Instant::now();
        let page = match self.fetch_with_retry(&cursor).await {
            Ok(page) => page,
            Err(e) => {
                record_page(start.elapsed().as_secs_f64(), 0, false);
                // Keep the cursor so the caller may try the same page again
                self.cursor = Some(cursor);
                return Err(e);
            }
        };

        record_page(start.elapsed().as_secs_f64(), page.results.len(), true);
        self.pages_fetched += 1;

        debug!(
            page = self.pages_fetched,
            works = page.results.len(),
            total = ?page.meta.count,
            "Fetched works page"
        );

        if page.results.is_empty() {
            return Ok(None);
        }

        self.cursor = page.meta.next_cursor.filter(|c| !c.is_empty());
        Ok(Some(page.results))
    }

    fn name(&self) -> &str {
        "openalex"
    }
}
