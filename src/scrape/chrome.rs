// src/scrape/chrome.rs
use anyhow::{anyhow, Context, Result};
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::{sync::Arc, time::Duration};
use tracing::{debug, warn};

use super::PageSource;
use crate::config::ScrapeConfig;

const PAGE_SIZE_SELECT: &str = "select.dt-input";
const NEXT_BUTTON: &str = "button.dt-paging-button.next";

/// Headless Chrome session. The browser process is shut down when this is
/// dropped, so on every exit path.
pub struct ChromeSource {
    // dropped before the browser
    tab: Arc<Tab>,
    _browser: Browser,
}

impl ChromeSource {
    pub fn launch(cfg: &ScrapeConfig) -> Result<Self> {
        // keep the idle watchdog well above the longest wait we make
        let idle = cfg.wait_timeout() + cfg.settle() + Duration::from_secs(60);
        let options = LaunchOptions::default_builder()
            .headless(cfg.headless)
            .window_size(Some((1366, 900)))
            .idle_browser_timeout(idle)
            .build()
            .map_err(|e| anyhow!("building chrome launch options: {e}"))?;
        let browser = Browser::new(options).context("launching chrome")?;
        let tab = browser.new_tab().context("opening browser tab")?;
        Ok(Self {
            tab,
            _browser: browser,
        })
    }

    fn eval_bool(&self, script: &str) -> Result<bool> {
        let obj = self
            .tab
            .evaluate(script, false)
            .context("evaluating page script")?;
        Ok(obj.value.and_then(|v| v.as_bool()).unwrap_or(false))
    }
}

impl PageSource for ChromeSource {
    fn open(&mut self, url: &str) -> Result<()> {
        self.tab
            .navigate_to(url)
            .with_context(|| format!("navigating to {url}"))?
            .wait_until_navigated()
            .with_context(|| format!("loading {url}"))?;
        Ok(())
    }

    fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<bool> {
        match self.tab.wait_for_element_with_custom_timeout(selector, timeout) {
            Ok(_) => Ok(true),
            Err(e) => {
                debug!(selector, error = %e, "element wait gave up");
                Ok(false)
            }
        }
    }

    fn set_page_size(&mut self, size: u32) -> Result<()> {
        let script = format!(
            r#"(() => {{
                const s = document.querySelector('{PAGE_SIZE_SELECT}');
                if (!s) return false;
                s.value = '{size}';
                s.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return s.value === '{size}';
            }})()"#
        );
        if !self.eval_bool(&script)? {
            warn!(size, "page-size selector missing or rejected the value");
        }
        Ok(())
    }

    fn page_html(&mut self) -> Result<String> {
        self.tab.get_content().context("reading page source")
    }

    fn next_page(&mut self) -> Result<bool> {
        let script = format!(
            r#"(() => {{
                const b = document.querySelector('{NEXT_BUTTON}');
                if (!b || b.disabled || b.classList.contains('disabled')) return false;
                b.click();
                return true;
            }})()"#
        );
        self.eval_bool(&script)
    }
}
