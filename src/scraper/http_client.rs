use crate::config::ScraperConfig;
use crate::error::{FetchError, ScrapeError};
use crate::scraper::{Document, PageSource};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{info, warn};
use url::Url;

/// URL for a directory page: page 1 is the bare category URL,
/// later pages live under `page/<n>/`.
pub fn page_url(category_url: &Url, page: u32) -> String {
    if page <= 1 {
        category_url.to_string()
    } else {
        format!("{}page/{}/", category_url, page)
    }
}

pub struct HttpFetcher {
    inner: reqwest::Client,
    category_url: Url,
    max_retries: usize,
    retry_backoff_ms: u64,
}

impl HttpFetcher {
    pub fn new(config: &ScraperConfig) -> Result<Self, ScrapeError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .gzip(true)
            .cookie_store(true);

        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            inner: builder.build()?,
            category_url: config.category_url()?,
            max_retries: config.max_retries,
            retry_backoff_ms: config.retry_backoff_ms,
        })
    }

    pub fn page_url(&self, page: u32) -> String {
        page_url(&self.category_url, page)
    }

    /// Single GET. 404 maps to `NotFound`; anything else non-2xx to `Status`.
    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let resp = self
            .inner
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        resp.text().await.map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl PageSource for HttpFetcher {
    async fn fetch(&self, page: u32) -> Result<Document, FetchError> {
        let url = self.page_url(page);
        info!("Fetching page {}: {}", page, url);

        // Delays grow 2x, 4x, 8x ... the backoff unit.
        let strategy = ExponentialBackoff::from_millis(2)
            .factor(self.retry_backoff_ms)
            .map(jitter)
            .take(self.max_retries);

        let mut attempt = 0u32;
        let body = RetryIf::spawn(
            strategy,
            || {
                attempt += 1;
                if attempt > 1 {
                    warn!("Retrying page {} (attempt {})", page, attempt);
                }
                self.get_text(&url)
            },
            |e: &FetchError| e.is_transient(),
        )
        .await
        .inspect_err(|e| {
            if !matches!(e, FetchError::NotFound { .. }) {
                warn!("Error fetching page {}: {}", page, e);
            }
        })?;

        Ok(Document::parse(&body))
    }
}
