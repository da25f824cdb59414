use crate::error::ScrapeError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub extractor: ExtractorConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// HTTP fetch configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScraperConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Unset means the HTTP client's own default.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// Retries for transient failures only; 404 is never retried.
    #[serde(default)]
    pub max_retries: usize,

    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

/// Site template rules used by the listing extractor
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractorConfig {
    #[serde(default = "default_listing_selector")]
    pub listing_selector: String,

    #[serde(default = "default_heading_tags")]
    pub heading_tags: Vec<String>,

    #[serde(default = "default_link_tag")]
    pub link_tag: String,

    #[serde(default = "default_paragraph_tag")]
    pub paragraph_tag: String,

    /// Class markers the paragraph's immediate parent must carry.
    #[serde(default = "default_container_classes")]
    pub container_classes: Vec<String>,
}

/// Pagination termination rules
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaginationConfig {
    #[serde(default = "default_max_empty_pages")]
    pub max_empty_pages: u32,

    /// Optional safety cap on the page index. Unbounded when unset.
    #[serde(default)]
    pub max_pages: Option<u32>,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: PathBuf,

    #[serde(default = "default_preview_count")]
    pub preview_count: usize,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_base_url() -> String {
    "https://redsevillasingluten.org/category/establecimientos-de-la-red/".to_string()
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/91.0.4472.124 Safari/537.36"
        .to_string()
}
fn default_request_delay_ms() -> u64 {
    2000
}
fn default_retry_backoff_ms() -> u64 {
    500
}
fn default_listing_selector() -> String {
    "article".to_string()
}
fn default_heading_tags() -> Vec<String> {
    vec!["h2".to_string(), "h3".to_string()]
}
fn default_link_tag() -> String {
    "a".to_string()
}
fn default_paragraph_tag() -> String {
    "p".to_string()
}
fn default_container_classes() -> Vec<String> {
    ["textof", "entry-content", "entry-summary"]
        .into_iter()
        .map(String::from)
        .collect()
}
fn default_max_empty_pages() -> u32 {
    2
}
fn default_output_path() -> PathBuf {
    PathBuf::from("businesses.csv")
}
fn default_preview_count() -> usize {
    5
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            timeout_secs: None,
            request_delay_ms: default_request_delay_ms(),
            max_retries: 0,
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            listing_selector: default_listing_selector(),
            heading_tags: default_heading_tags(),
            link_tag: default_link_tag(),
            paragraph_tag: default_paragraph_tag(),
            container_classes: default_container_classes(),
        }
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            max_empty_pages: default_max_empty_pages(),
            max_pages: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            preview_count: default_preview_count(),
        }
    }
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self, ScrapeError> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("SCRAPER").separator("__"))
            .build()?;

        let app_cfg: AppConfig = cfg.try_deserialize()?;
        app_cfg.validate()?;
        Ok(app_cfg)
    }

    /// Reject values that would make the run meaningless before any request goes out.
    pub fn validate(&self) -> Result<(), ScrapeError> {
        self.scraper.category_url()?;

        if self.pagination.max_empty_pages == 0 {
            return Err(ScrapeError::InvalidConfig(
                "pagination.max_empty_pages must be at least 1".into(),
            ));
        }
        if self.pagination.max_pages == Some(0) {
            return Err(ScrapeError::InvalidConfig(
                "pagination.max_pages must be at least 1 when set".into(),
            ));
        }
        if self.extractor.heading_tags.is_empty() {
            return Err(ScrapeError::InvalidConfig(
                "extractor.heading_tags must name at least one tag".into(),
            ));
        }
        Ok(())
    }
}

impl ScraperConfig {
    /// Parsed category URL, always ending in `/` so page paths join beneath it.
    pub fn category_url(&self) -> Result<Url, ScrapeError> {
        let raw = self.base_url.trim();
        let normalised = if raw.ends_with('/') {
            raw.to_string()
        } else {
            format!("{}/", raw)
        };
        Url::parse(&normalised).map_err(|source| ScrapeError::InvalidUrl {
            url: raw.to_string(),
            source,
        })
    }
}
