// src/plot.rs
use anyhow::{anyhow, Context, Result};
use plotters::prelude::*;
use std::{fs, path::Path};
use tracing::{info, warn};

use crate::{
    categorize::tally,
    config::Config,
    model::{CountRow, ExplodedRecord},
    store,
};

pub const TITLE: &str = "Distribution of Scam Types";
const SIZE: (u32, u32) = (1000, 800);

fn draw_err(e: impl std::fmt::Display) -> anyhow::Error {
    anyhow!("drawing chart: {e}")
}

/// Label frequencies from the exploded table, most common first.
pub fn counts_from_exploded(exploded: &[ExplodedRecord]) -> Vec<CountRow> {
    tally(exploded.iter().map(|e| e.scam_type_list.as_str()))
}

/// Bars in bottom-to-top drawing order, so the most frequent label ends up on
/// top. `counts` holds data rows only; the total is never part of it.
pub fn bar_order(counts: &[CountRow]) -> Vec<&CountRow> {
    let mut bars: Vec<&CountRow> = counts.iter().collect();
    bars.sort_by(|a, b| a.count.cmp(&b.count).then_with(|| b.scam_type.cmp(&a.scam_type)));
    bars
}

/// Horizontal bar chart of `counts` as a PNG at `path`.
pub fn plot_counts(counts: &[CountRow], path: &Path, title: &str) -> Result<()> {
    let bars = bar_order(counts);
    if bars.is_empty() {
        warn!("nothing to plot");
        return Ok(());
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }

    let max = bars.iter().map(|c| c.count).max().unwrap_or(0);
    let labels: Vec<&str> = bars.iter().map(|c| c.scam_type.as_str()).collect();

    let root = BitMapBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(260)
        .build_cartesian_2d(0u64..(max + max / 10 + 1), (0usize..bars.len()).into_segmented())
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .x_desc("Count")
        .y_labels(bars.len())
        .y_label_formatter(&|v: &SegmentValue<usize>| match v {
            SegmentValue::Exact(i) | SegmentValue::CenterOf(i) => {
                labels.get(*i).map(|l| l.to_string()).unwrap_or_default()
            }
            SegmentValue::Last => String::new(),
        })
        .draw()
        .map_err(draw_err)?;

    chart
        .draw_series(
            Histogram::horizontal(&chart)
                .style(BLUE.mix(0.7).filled())
                .margin(6)
                .data(bars.iter().enumerate().map(|(i, c)| (i, c.count))),
        )
        .map_err(draw_err)?;

    root.present().map_err(draw_err)?;
    Ok(())
}

/// Plotter stage: exploded CSV in, PNG out.
pub fn run(config: &Config) -> Result<()> {
    let input = config.paths.exploded_csv();
    let exploded = store::read_exploded(&input)?;
    let counts = counts_from_exploded(&exploded);
    let out = config.paths.chart_png();
    plot_counts(&counts, &out, TITLE)?;
    info!(file = %out.display(), bars = bar_order(&counts).len(), "saved plot");
    Ok(())
}
