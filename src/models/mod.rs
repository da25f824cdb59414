use serde::{Deserialize, Serialize};
use std::fmt;

// ── Listing ───────────────────────────────────────────────────────────────────

/// One business entry. Field names double as the CSV header.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Listing {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Address")]
    pub address: String, // empty when no address paragraph matched
}

impl Listing {
    /// Address for display, with a placeholder when none was found.
    pub fn address_or<'a>(&'a self, placeholder: &'a str) -> &'a str {
        if self.address.is_empty() {
            placeholder
        } else {
            &self.address
        }
    }
}

// ── Run state ─────────────────────────────────────────────────────────────────

/// Mutable state of a single pagination run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunState {
    pub current_page: u32,
    pub accumulated_listings: Vec<Listing>,
    pub consecutive_empty_pages: u32,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            current_page: 1,
            accumulated_listings: Vec::new(),
            consecutive_empty_pages: 0,
        }
    }
}

// ── Report ────────────────────────────────────────────────────────────────────

/// Why pagination ended. `page` is the page on which the decision was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// HTTP 404
    NotFound { page: u32 },
    /// Status or transport failure (after any retries)
    FetchFailed { page: u32 },
    /// Consecutive-empty threshold reached
    EmptyPages { page: u32 },
    /// Configured page cap reached
    PageLimit { page: u32 },
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::NotFound { page } => write!(f, "page {} not found", page),
            StopReason::FetchFailed { page } => write!(f, "page {} could not be fetched", page),
            StopReason::EmptyPages { page } => write!(f, "no listings up to page {}", page),
            StopReason::PageLimit { page } => write!(f, "page limit {} reached", page),
        }
    }
}

#[derive(Debug)]
pub struct ScrapeReport {
    pub listings: Vec<Listing>,
    pub pages_fetched: u32,
    pub skipped_listings: usize,
    pub stop_reason: StopReason,
}
