use crate::config::ExtractorConfig;
use crate::error::ScrapeError;
use crate::models::Listing;
use crate::scraper::Document;
use crate::scraper::cleaner::{clean_text, first_line};
use ::scraper::{ElementRef, Selector};

fn compile(selector: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(selector).map_err(|e| ScrapeError::Selector {
        selector: selector.to_string(),
        reason: format!("{:?}", e),
    })
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>()
}

// ── Listing extractor ─────────────────────────────────────────────────────────

/// Pulls a name and a best-effort address out of one listing node,
/// following the template rules in [`ExtractorConfig`].
pub struct ListingExtractor {
    listing: Selector,
    heading: Selector,
    link: Selector,
    paragraph: Selector,
    container_classes: Vec<String>,
}

impl ListingExtractor {
    pub fn new(config: &ExtractorConfig) -> Result<Self, ScrapeError> {
        Ok(Self {
            listing: compile(&config.listing_selector)?,
            heading: compile(&config.heading_tags.join(", "))?,
            link: compile(&config.link_tag)?,
            paragraph: compile(&config.paragraph_tag)?,
            container_classes: config.container_classes.clone(),
        })
    }

    /// Listing nodes of a page, in document order.
    pub fn listings<'a>(&'a self, doc: &'a Document) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        doc.html().select(&self.listing)
    }

    /// `None` when the listing has no heading or the heading yields an empty name.
    pub fn extract(&self, node: ElementRef<'_>) -> Option<Listing> {
        let name = self.extract_name(node)?;
        let address = self.extract_address(node);
        Some(Listing { name, address })
    }

    fn extract_name(&self, node: ElementRef<'_>) -> Option<String> {
        let heading = node.select(&self.heading).next()?;
        // A link inside the heading wins even when its own text is blank.
        let source = heading.select(&self.link).next().unwrap_or(heading);
        let name = clean_text(&element_text(source));

        if name.is_empty() { None } else { Some(name) }
    }

    fn extract_address(&self, node: ElementRef<'_>) -> String {
        node.select(&self.paragraph)
            .filter(|p| self.in_content_container(*p))
            .find_map(|p| first_line(&element_text(p)))
            .unwrap_or_default()
    }

    fn in_content_container(&self, p: ElementRef<'_>) -> bool {
        p.parent()
            .and_then(ElementRef::wrap)
            .is_some_and(|parent| {
                parent
                    .value()
                    .classes()
                    .any(|class| self.container_classes.iter().any(|c| c == class))
            })
    }
}
