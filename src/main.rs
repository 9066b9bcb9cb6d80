use anyhow::Result;
use scamtracker::{categorize, logging, plot, scrape, Config};
use tracing::{info, warn};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    logging::init();
    info!("startup");

    // ─── 2) configuration ────────────────────────────────────────────
    let config = Config::load()?;

    // ─── 3) scrape the tracker table ─────────────────────────────────
    let scraped = scrape::run(&config)?;
    if scraped.is_empty() {
        let existing = config.paths.scraped_csv();
        if existing.exists() {
            warn!(file = %existing.display(), "scrape came back empty; categorizing previous data");
        } else {
            warn!("scrape came back empty and there is no previous data; nothing to do");
            return Ok(());
        }
    }

    // ─── 4) split, explode, count ────────────────────────────────────
    categorize::run(&config)?;

    // ─── 5) chart ────────────────────────────────────────────────────
    plot::run(&config)?;

    info!("all done");
    Ok(())
}
