use anyhow::{Context, Result};
use scamtracker::{categorize, logging, Config};

fn main() -> Result<()> {
    logging::init();
    let config = Config::load()?;

    categorize::run(&config)
        .with_context(|| format!("categorizing {}", config.paths.scraped_csv().display()))?;
    Ok(())
}
