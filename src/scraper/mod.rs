pub mod cleaner;
pub mod http_client;
pub mod parsers;

use crate::error::FetchError;
use ::scraper::Html;
use async_trait::async_trait;

pub use self::http_client::HttpFetcher;
pub use self::parsers::ListingExtractor;

// ── Document ──────────────────────────────────────────────────────────────────

/// Parsed markup of one fetched page.
pub struct Document {
    html: Html,
}

impl Document {
    pub fn parse(body: &str) -> Self {
        Self {
            html: Html::parse_document(body),
        }
    }

    pub fn html(&self) -> &Html {
        &self.html
    }
}

// ── Source trait ──────────────────────────────────────────────────────────────

/// Swappable page source. Page indices start at 1.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, page: u32) -> Result<Document, FetchError>;
}
