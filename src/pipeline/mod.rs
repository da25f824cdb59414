//! Pagination driver: walks directory pages and accumulates listings.
//!
//! ## Termination
//!
//! The loop starts at page 1 and stops on the first of:
//!   1. a fetch failure of any kind (404 included),
//!   2. `max_empty_pages` consecutive pages with zero listing nodes,
//!   3. the optional `max_pages` cap.
//!
//! Between pages it sleeps for the configured delay. Nothing is retried here;
//! transient-failure retries belong to the page source.

use crate::config::AppConfig;
use crate::config::PaginationConfig;
use crate::error::{FetchError, ScrapeError};
use crate::models::{RunState, ScrapeReport, StopReason};
use crate::scraper::{Document, HttpFetcher, ListingExtractor, PageSource};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

pub struct Pipeline<S> {
    source: S,
    extractor: ListingExtractor,
    pagination: PaginationConfig,
    delay: Duration,
}

impl Pipeline<HttpFetcher> {
    /// Pipeline over the live site described by `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self, ScrapeError> {
        Ok(Self::new(
            HttpFetcher::new(&config.scraper)?,
            ListingExtractor::new(&config.extractor)?,
            config.pagination.clone(),
            Duration::from_millis(config.scraper.request_delay_ms),
        ))
    }
}

impl<S: PageSource> Pipeline<S> {
    pub fn new(
        source: S,
        extractor: ListingExtractor,
        pagination: PaginationConfig,
        delay: Duration,
    ) -> Self {
        Self {
            source,
            extractor,
            pagination,
            delay,
        }
    }

    pub async fn run(&self) -> ScrapeReport {
        let mut state = RunState::default();
        let mut pages_fetched = 0u32;
        let mut skipped_listings = 0usize;

        let stop_reason = loop {
            let page = state.current_page;

            let nodes = {
                let doc = match self.source.fetch(page).await {
                    Ok(doc) => doc,
                    Err(e) => {
                        info!("No content found for page {}", page);
                        break match e {
                            FetchError::NotFound { .. } => StopReason::NotFound { page },
                            _ => StopReason::FetchFailed { page },
                        };
                    }
                };
                pages_fetched += 1;

                let (nodes, skipped) = self.collect_page(&doc, &mut state);
                skipped_listings += skipped;
                nodes
            };

            if nodes == 0 {
                state.consecutive_empty_pages += 1;
                debug!(
                    "Page {} had no listings ({} in a row)",
                    page, state.consecutive_empty_pages
                );
                if state.consecutive_empty_pages >= self.pagination.max_empty_pages {
                    info!(
                        "No more listings after {} empty pages",
                        self.pagination.max_empty_pages
                    );
                    break StopReason::EmptyPages { page };
                }
            } else {
                state.consecutive_empty_pages = 0;
            }

            if self.pagination.max_pages.is_some_and(|max| page >= max) {
                warn!("Reached page limit ({}), stopping", page);
                break StopReason::PageLimit { page };
            }

            state.current_page += 1;

            debug!("Waiting {:?} before page {}", self.delay, state.current_page);
            sleep(self.delay).await;
        };

        ScrapeReport {
            listings: state.accumulated_listings,
            pages_fetched,
            skipped_listings,
            stop_reason,
        }
    }

    /// Extract every listing node on one page into `state`.
    /// Returns (listing nodes seen, extraction failures).
    fn collect_page(&self, doc: &Document, state: &mut RunState) -> (usize, usize) {
        let mut nodes = 0;
        let mut skipped = 0;

        for node in self.extractor.listings(doc) {
            nodes += 1;
            match self.extractor.extract(node) {
                Some(listing) => {
                    info!(
                        "  Found: {} - {}",
                        listing.name,
                        listing.address_or("No address")
                    );
                    state.accumulated_listings.push(listing);
                }
                None => {
                    debug!("Skipping listing without a usable heading");
                    skipped += 1;
                }
            }
        }

        (nodes, skipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractorConfig;
    use crate::models::Listing;
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::collections::HashMap;
    use std::sync::Mutex;

    enum Scripted {
        Html(String),
        NotFound,
        ServerError,
    }

    /// In-memory page source. Pages without a script entry answer 404.
    struct ScriptedSource {
        pages: HashMap<u32, Scripted>,
        requested: Mutex<Vec<u32>>,
    }

    impl ScriptedSource {
        fn new(pages: Vec<(u32, Scripted)>) -> Self {
            Self {
                pages: pages.into_iter().collect(),
                requested: Mutex::new(Vec::new()),
            }
        }

        fn requested(&self) -> Vec<u32> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageSource for ScriptedSource {
        async fn fetch(&self, page: u32) -> Result<Document, FetchError> {
            self.requested.lock().unwrap().push(page);
            let url = format!("test://page/{}", page);
            match self.pages.get(&page) {
                Some(Scripted::Html(body)) => Ok(Document::parse(body)),
                Some(Scripted::ServerError) => Err(FetchError::Status {
                    url,
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                }),
                Some(Scripted::NotFound) | None => Err(FetchError::NotFound { url }),
            }
        }
    }

    fn html(articles: &[&str]) -> Scripted {
        Scripted::Html(format!("<html><body>{}</body></html>", articles.concat()))
    }

    fn article(name: &str, address: &str) -> String {
        format!(
            "<article><h2><a href=\"#\">{}</a></h2><div class=\"textof\"><p>{}</p></div></article>",
            name, address
        )
    }

    fn pipeline(source: ScriptedSource, pagination: PaginationConfig) -> Pipeline<ScriptedSource> {
        Pipeline::new(
            source,
            ListingExtractor::new(&ExtractorConfig::default()).unwrap(),
            pagination,
            Duration::ZERO,
        )
    }

    fn names(listings: &[Listing]) -> Vec<&str> {
        listings.iter().map(|l| l.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_accumulates_in_page_then_document_order() {
        let source = ScriptedSource::new(vec![
            (1, html(&[&article("Uno", "Calle 1"), &article("Dos", "")])),
            (2, html(&[&article("Tres", "Calle 3"), &article("Uno", "Calle 1")])),
        ]);
        let p = pipeline(source, PaginationConfig::default());

        let report = p.run().await;

        assert_eq!(names(&report.listings), vec!["Uno", "Dos", "Tres", "Uno"]);
        assert_eq!(report.listings[0].address, "Calle 1");
        assert_eq!(report.listings[1].address, "");
        assert_eq!(report.pages_fetched, 2);
        assert_eq!(report.stop_reason, StopReason::NotFound { page: 3 });
        assert_eq!(p.source.requested(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_two_empty_pages_stop_without_third_fetch() {
        let source = ScriptedSource::new(vec![
            (1, html(&[])),
            (2, html(&[])),
            (3, html(&[&article("Never", "")])),
        ]);
        let p = pipeline(source, PaginationConfig::default());

        let report = p.run().await;

        assert!(report.listings.is_empty());
        assert_eq!(report.stop_reason, StopReason::EmptyPages { page: 2 });
        assert_eq!(p.source.requested(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_non_empty_page_resets_empty_counter() {
        let source = ScriptedSource::new(vec![
            (1, html(&[])),
            (2, html(&[&article("Dos", "")])),
            (3, html(&[])),
            (4, html(&[&article("Cuatro", "")])),
            (5, html(&[])),
            (6, html(&[])),
        ]);
        let p = pipeline(source, PaginationConfig::default());

        let report = p.run().await;

        assert_eq!(names(&report.listings), vec!["Dos", "Cuatro"]);
        assert_eq!(report.stop_reason, StopReason::EmptyPages { page: 6 });
        assert_eq!(p.source.requested(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[tokio::test]
    async fn test_404_halts_regardless_of_empty_counter() {
        let source = ScriptedSource::new(vec![(1, html(&[])), (2, Scripted::NotFound)]);
        let p = pipeline(source, PaginationConfig::default());

        let report = p.run().await;

        assert_eq!(report.stop_reason, StopReason::NotFound { page: 2 });
        assert_eq!(report.pages_fetched, 1);
        assert_eq!(p.source.requested(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_404_on_first_page_yields_nothing() {
        let p = pipeline(ScriptedSource::new(vec![]), PaginationConfig::default());

        let report = p.run().await;

        assert!(report.listings.is_empty());
        assert_eq!(report.pages_fetched, 0);
        assert_eq!(report.stop_reason, StopReason::NotFound { page: 1 });
    }

    #[tokio::test]
    async fn test_fetch_failure_stops_and_keeps_earlier_results() {
        let source = ScriptedSource::new(vec![
            (1, html(&[&article("Uno", "")])),
            (2, Scripted::ServerError),
            (3, html(&[&article("Tres", "")])),
        ]);
        let p = pipeline(source, PaginationConfig::default());

        let report = p.run().await;

        assert_eq!(names(&report.listings), vec!["Uno"]);
        assert_eq!(report.stop_reason, StopReason::FetchFailed { page: 2 });
        assert_eq!(p.source.requested(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_extraction_failures_are_skipped_not_fatal() {
        let source = ScriptedSource::new(vec![(
            1,
            html(&[
                "<article><p>no heading here</p></article>",
                &article("Bien", "Calle Bien 1"),
            ]),
        )]);
        let p = pipeline(source, PaginationConfig::default());

        let report = p.run().await;

        assert_eq!(names(&report.listings), vec!["Bien"]);
        assert_eq!(report.skipped_listings, 1);
        assert_eq!(report.stop_reason, StopReason::NotFound { page: 2 });
    }

    #[tokio::test]
    async fn test_page_with_only_failed_listings_is_not_empty() {
        let source = ScriptedSource::new(vec![
            (1, html(&[])),
            (2, html(&["<article><p>no heading</p></article>"])),
            (3, html(&[])),
            (4, html(&[&article("Cuatro", "")])),
        ]);
        let p = pipeline(source, PaginationConfig::default());

        let report = p.run().await;

        assert_eq!(names(&report.listings), vec!["Cuatro"]);
        assert_eq!(p.source.requested(), vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_max_pages_caps_the_run() {
        let pages = (1..=10)
            .map(|n| (n, html(&[&article(&format!("Bar {}", n), "")])))
            .collect();
        let p = pipeline(
            ScriptedSource::new(pages),
            PaginationConfig {
                max_pages: Some(3),
                ..Default::default()
            },
        );

        let report = p.run().await;

        assert_eq!(names(&report.listings), vec!["Bar 1", "Bar 2", "Bar 3"]);
        assert_eq!(report.stop_reason, StopReason::PageLimit { page: 3 });
        assert_eq!(p.source.requested(), vec![1, 2, 3]);
    }

    #[test]
    fn test_custom_empty_threshold() {
        let source = ScriptedSource::new(vec![(1, html(&[])), (2, html(&[&article("Dos", "")]))]);
        let p = pipeline(
            source,
            PaginationConfig {
                max_empty_pages: 1,
                ..Default::default()
            },
        );

        let report = tokio_test::block_on(p.run());

        assert!(report.listings.is_empty());
        assert_eq!(report.stop_reason, StopReason::EmptyPages { page: 1 });
    }
}
