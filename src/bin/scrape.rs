use anyhow::Result;
use scamtracker::{logging, scrape, Config};
use tracing::info;

fn main() -> Result<()> {
    logging::init();
    let config = Config::load()?;

    let records = scrape::run(&config)?;
    info!(records = records.len(), "scrape finished");
    Ok(())
}
