mod config;
mod error;
mod models;
mod pipeline;
mod scraper;
mod storage;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::AppConfig;
use crate::models::Listing;
use crate::pipeline::Pipeline;

/// Scrape a paginated business directory into a CSV file.
#[derive(Parser)]
#[command(name = "directory-scraper", about = "Business directory scraper", version)]
struct Cli {
    /// Output CSV path (overrides output.path)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Stop after this many pages (overrides pagination.max_pages)
    #[arg(long)]
    max_pages: Option<u32>,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "directory_scraper=info,warn",
        1 => "directory_scraper=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::new(filter))
        .init();

    let mut config = AppConfig::load().context("Failed to load configuration")?;
    if let Some(path) = cli.output {
        config.output.path = path;
    }
    if cli.max_pages.is_some() {
        config.pagination.max_pages = cli.max_pages;
    }
    config.validate()?;

    info!("Starting directory scraper for {}", config.scraper.base_url);

    let report = {
        let _t = utils::Timer::start("Directory scrape");
        Pipeline::from_config(&config)
            .context("Failed to build pipeline")?
            .run()
            .await
    };

    info!(
        "Stopped: {} ({} pages fetched, {} listings skipped)",
        report.stop_reason, report.pages_fetched, report.skipped_listings
    );

    storage::save_csv(&report.listings, &config.output.path)
        .with_context(|| format!("Failed to write {}", config.output.path.display()))?;

    print_summary(&report.listings, config.output.preview_count);
    Ok(())
}

fn print_summary(listings: &[Listing], preview: usize) {
    println!();
    println!("Total businesses scraped: {}", utils::fmt_number(listings.len()));

    if listings.is_empty() || preview == 0 {
        return;
    }

    println!();
    println!("First {} businesses:", preview.min(listings.len()));
    for (i, listing) in listings.iter().take(preview).enumerate() {
        println!("{}. {}", i + 1, listing.name);
        println!("   Address: {}", listing.address_or("Not found"));
    }
}
