// src/scrape/mod.rs
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use rand::Rng;
use scraper::{ElementRef, Html, Selector};
use std::{fs, path::Path, thread, time::Duration};
use tracing::{debug, error, info, warn};

use crate::{
    config::{Config, ScrapeConfig, SourceKind},
    model::{ScamRecord, RECORD_HEADERS},
    store,
};

pub mod chrome;
pub mod http;

pub use chrome::ChromeSource;
pub use http::HttpSource;

/// The narrow capability the scraper needs from a browser: load a page, wait
/// for it, page through the results table and hand back markup.
pub trait PageSource {
    fn open(&mut self, url: &str) -> Result<()>;

    /// `Ok(false)` when `selector` did not appear within `timeout`.
    fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<bool>;

    fn set_page_size(&mut self, size: u32) -> Result<()>;

    fn page_html(&mut self) -> Result<String>;

    /// Advance to the next results page. `Ok(false)` when the "next" control is
    /// disabled or absent, i.e. the current page is the last.
    fn next_page(&mut self) -> Result<bool>;
}

struct RowSelectors {
    row: Selector,
    cells: [Selector; 4],
}

static SELECTORS: Lazy<RowSelectors> = Lazy::new(|| {
    let cell = |n: usize| {
        Selector::parse(&format!("td.column-{n}")).expect("CSS selector for table cells should be valid")
    };
    RowSelectors {
        row: Selector::parse("tr").expect("CSS selector for table rows should be valid"),
        cells: [cell(1), cell(2), cell(3), cell(4)],
    }
});

/// Text of an element with each text node trimmed and the pieces joined
/// without a separator.
fn cell_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<String>()
}

/// Every table row on the page that carries a `td.column-1` cell.
///
/// `None` when the page has no such cell at all, which means the table is not
/// the shape we expect.
pub fn parse_rows(html: &str) -> Option<Vec<ScamRecord>> {
    let doc = Html::parse_document(html);
    let sel = &*SELECTORS;
    doc.select(&sel.cells[0]).next()?;

    let rows = doc
        .select(&sel.row)
        .filter_map(|tr| {
            let [subject, narrative, scam_type, website] = sel
                .cells
                .each_ref()
                .map(|s| tr.select(s).next().map(cell_text));
            let primary_subject = subject?;
            Some(ScamRecord {
                primary_subject,
                complaint_narrative: narrative.unwrap_or_default(),
                scam_type: scam_type.filter(|t| !t.is_empty()),
                website: website.unwrap_or_default(),
            })
        })
        .collect();
    Some(rows)
}

/// Random sleep between page interactions.
#[derive(Debug, Clone, Copy)]
pub struct Pacer {
    min_ms: u64,
    max_ms: u64,
}

impl Pacer {
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min_ms,
            max_ms: max_ms.max(min_ms),
        }
    }

    pub fn delay(&self) -> Duration {
        if self.max_ms > self.min_ms {
            Duration::from_millis(rand::thread_rng().gen_range(self.min_ms..=self.max_ms))
        } else {
            Duration::from_millis(self.min_ms)
        }
    }

    pub fn pause(&self) {
        let d = self.delay();
        if !d.is_zero() {
            thread::sleep(d);
        }
    }
}

/// Drive `source` through the whole results table.
///
/// A table that never shows up is not an error: the page markup goes to
/// `debug_dump` and the result is empty. Neither is a table without the
/// expected columns, which is logged and also yields nothing.
pub fn scrape_table<S>(source: &mut S, cfg: &ScrapeConfig, debug_dump: &Path) -> Result<Vec<ScamRecord>>
where
    S: PageSource + ?Sized,
{
    info!(url = %cfg.url, "opening tracker page");
    source
        .open(cfg.url.as_str())
        .with_context(|| format!("opening {}", cfg.url))?;
    if !cfg.settle().is_zero() {
        thread::sleep(cfg.settle());
    }

    info!(selector = %cfg.table_selector, timeout = ?cfg.wait_timeout(), "waiting for data to load");
    if !source.wait_for(&cfg.table_selector, cfg.wait_timeout())? {
        dump_page(source, debug_dump);
        return Ok(Vec::new());
    }

    source.set_page_size(cfg.page_size)?;
    let pacer = Pacer::new(cfg.pace_min_ms, cfg.pace_max_ms);
    pacer.pause();

    let mut records = Vec::new();
    let mut page = 1;
    loop {
        let html = source.page_html()?;
        let Some(rows) = parse_rows(&html) else {
            warn!(page, "no td.column-1 elements found; check the page structure");
            return Ok(Vec::new());
        };
        debug!(page, rows = rows.len(), "extracted page");
        records.extend(rows);

        if page >= cfg.max_pages {
            warn!(max_pages = cfg.max_pages, "page limit reached; stopping early");
            break;
        }
        if !source.next_page()? {
            break;
        }
        page += 1;
        pacer.pause();
    }

    info!(pages = page, records = records.len(), "scrape complete");
    Ok(records)
}

fn dump_page<S: PageSource + ?Sized>(source: &mut S, path: &Path) {
    let written = source
        .page_html()
        .and_then(|html| fs::write(path, html).with_context(|| format!("writing {}", path.display())));
    match written {
        Ok(()) => warn!(
            path = %path.display(),
            "timed out waiting for data; saved page source for inspection"
        ),
        Err(e) => error!(error = %e, "timed out waiting for data; could not save page source"),
    }
}

/// Scraper stage. Writes the scraped CSV unless nothing was scraped, in which
/// case any earlier file is left alone. Returns the scraped records.
pub fn run(config: &Config) -> Result<Vec<ScamRecord>> {
    let cfg = &config.scrape;
    let dump = &config.paths.debug_dump;
    let records = match cfg.source {
        SourceKind::Chrome => {
            let mut source = ChromeSource::launch(cfg)?;
            scrape_table(&mut source, cfg, dump)?
        }
        SourceKind::Http => {
            let mut source = HttpSource::new(cfg.wait_timeout())?;
            scrape_table(&mut source, cfg, dump)?
        }
    };

    let out = config.paths.scraped_csv();
    if records.is_empty() {
        warn!(file = %out.display(), "no records scraped; leaving existing data untouched");
        return Ok(records);
    }
    store::write_csv(&out, RECORD_HEADERS, &records)?;
    info!(records = records.len(), file = %out.display(), "saved scraped records");
    Ok(records)
}
