//! CSV output for scraped listings.

use crate::error::ScrapeError;
use crate::models::Listing;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Header row plus one row per listing, in input order.
/// An empty slice writes nothing at all.
pub fn write_listings<W: Write>(listings: &[Listing], writer: W) -> Result<usize, ScrapeError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for listing in listings {
        wtr.serialize(listing)?;
    }
    wtr.flush()?;
    Ok(listings.len())
}

/// Save listings to `path`. Returns the number of data rows written;
/// with no listings, no file is created and 0 is returned.
pub fn save_csv(listings: &[Listing], path: &Path) -> Result<usize, ScrapeError> {
    if listings.is_empty() {
        info!("No businesses to save");
        return Ok(0);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    let n = write_listings(listings, file)?;
    info!("Saved {} businesses to {}", n, path.display());
    Ok(n)
}
