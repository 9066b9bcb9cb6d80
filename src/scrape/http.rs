// src/scrape/http.rs
use anyhow::{anyhow, Context, Result};
use reqwest::blocking::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::debug;

use super::PageSource;

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0 Safari/537.36";

/// Plain GET of the tracker page. The table markup is complete in the
/// response and only paginated client-side, so there is a single page and
/// nothing to wait for.
pub struct HttpSource {
    client: Client,
    body: String,
}

impl HttpSource {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .cookie_store(true)
            .timeout(timeout.max(Duration::from_secs(1)))
            .build()
            .context("building HTTP client")?;
        Ok(Self {
            client,
            body: String::new(),
        })
    }
}

impl PageSource for HttpSource {
    fn open(&mut self, url: &str) -> Result<()> {
        debug!("Fetching text from {}", url);
        self.body = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("GET {} failed", url))?
            .error_for_status()
            .with_context(|| format!("Non-success status {}", url))?
            .text()
            .with_context(|| format!("Reading text from {}", url))?;
        Ok(())
    }

    fn wait_for(&mut self, selector: &str, _timeout: Duration) -> Result<bool> {
        let sel = Selector::parse(selector)
            .map_err(|e| anyhow!("invalid selector {selector:?}: {e:?}"))?;
        Ok(Html::parse_document(&self.body).select(&sel).next().is_some())
    }

    fn set_page_size(&mut self, _size: u32) -> Result<()> {
        Ok(())
    }

    fn page_html(&mut self) -> Result<String> {
        Ok(self.body.clone())
    }

    fn next_page(&mut self) -> Result<bool> {
        Ok(false)
    }
}
