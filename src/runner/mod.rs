use crate::collector::{Collection, Collector, Pacing};
use crate::config::{BrowserConfig, Config};
use crate::dom::{DomAccess, PageDom};
use crate::table::expected_total;
use crate::{Error, Result};
use eoka::{Browser, Page};
use tracing::{debug, info, warn};

/// A browser session that harvests tables.
pub struct Harvester {
    browser: Browser,
    page: Page,
}

impl Harvester {
    /// Launch a browser with the given config.
    pub async fn new(config: &BrowserConfig) -> Result<Self> {
        let stealth = eoka::StealthConfig {
            headless: config.headless,
            proxy: config.proxy.clone(),
            user_agent: config.user_agent.clone(),
            viewport_width: config.viewport.as_ref().map(|v| v.width).unwrap_or(1280),
            viewport_height: config.viewport.as_ref().map(|v| v.height).unwrap_or(720),
            ..Default::default()
        };

        debug!(
            "Launching browser (headless: {}, proxy: {:?})",
            config.headless, config.proxy
        );
        let browser = Browser::launch_with_config(stealth).await?;
        let page = browser.new_page("about:blank").await?;

        Ok(Self { browser, page })
    }

    /// Get a reference to the page.
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Navigate to the config's target and collect its table.
    pub async fn harvest(&self, config: &Config) -> Result<Collection> {
        info!("Navigating to: {}", config.target.url);
        self.page.goto(&config.target.url).await?;
        self.collect_current(config).await
    }

    /// Collect the table of whatever page is loaded.
    pub async fn collect_current(&self, config: &Config) -> Result<Collection> {
        let dom = PageDom::new(&self.page);
        let collect = &config.collect;

        if !dom.wait_for_table(collect.table_timeout_ms).await? {
            return Err(Error::TableNotFound {
                timeout_ms: collect.table_timeout_ms,
            });
        }

        let (min_wait, max_wait) = collect.wait_range();
        let pacing = Pacing::new(min_wait, max_wait);
        pacing.pause().await;

        let expected = expected_total(&dom).await;
        if let Some(total) = expected {
            info!("Page advertises {} results", total);
        }

        Collector::new(&dom, collect)
            .with_pacing(pacing)
            .run(expected)
            .await
    }

    /// Close the browser.
    pub async fn close(self) -> Result<()> {
        self.browser.close().await?;
        Ok(())
    }
}

/// Launch, harvest and close. The browser is closed whether or not the
/// harvest succeeds. A failed close is logged and never replaces the harvest's
/// own outcome, so collected rows survive it.
pub async fn harvest_url(config: &Config) -> Result<Collection> {
    let harvester = Harvester::new(&config.browser).await?;
    let result = harvester.harvest(config).await;
    after_close(result, harvester.close().await)
}

fn after_close<T>(harvest: Result<T>, close: Result<()>) -> Result<T> {
    if let Err(e) = close {
        warn!("Failed to close browser: {}", e);
    }
    harvest
}
