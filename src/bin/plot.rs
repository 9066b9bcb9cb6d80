use anyhow::Result;
use scamtracker::{logging, plot, Config};

fn main() -> Result<()> {
    logging::init();
    let config = Config::load()?;
    plot::run(&config)
}
