use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use scraper::Html;
use thirtyfour::prelude::{By, ElementQueryable, WebDriver};
use thiserror::Error;
use tokio::{sync::Semaphore, time};
use url::Url;

use crate::{
    configuration::{BrowserSettings, MarketplaceSettings},
    domain::{ExtractionOutcome, SearchQuery},
};

use super::{build_locator, Droid, ListingLocator};

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("browser launch failed: {0}")]
    Launch(String),

    #[error("browser launch timed out after {0:?}")]
    LaunchTimeout(Duration),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("search controls unavailable: {0}")]
    SearchControls(String),

    #[error("could not capture page source: {0}")]
    Capture(String),

    #[error("search session timed out after {0:?}")]
    SessionTimeout(Duration),

    #[error("invalid selector {selector:?}: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("search task aborted: {0}")]
    Aborted(String),
}

/// Produces the rendered markup of a marketplace results page.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_results_page(
        &self,
        query: &SearchQuery,
        ready_selector: &str,
    ) -> Result<String, ScrapeError>;
}

pub struct WebDriverFetcher {
    browser: BrowserSettings,
    entry_url: Url,
    search_input: String,
    search_button: String,
}

impl WebDriverFetcher {
    pub fn new(browser: &BrowserSettings, marketplace: &MarketplaceSettings) -> Self {
        WebDriverFetcher {
            browser: browser.clone(),
            entry_url: marketplace.entry_url.clone(),
            search_input: marketplace.search_input.clone(),
            search_button: marketplace.search_button.clone(),
        }
    }

    async fn search(
        &self,
        driver: &WebDriver,
        query: &SearchQuery,
        ready_selector: &str,
    ) -> Result<String, ScrapeError> {
        let timeout = self.browser.element_timeout();
        let interval = self.browser.poll_interval();

        driver
            .goto(self.entry_url.as_str())
            .await
            .map_err(|e| ScrapeError::Navigation(e.to_string()))?;

        let search_box = driver
            .query(By::Css(&self.search_input))
            .wait(timeout, interval)
            .first()
            .await
            .map_err(|e| ScrapeError::SearchControls(e.to_string()))?;
        search_box
            .send_keys(query.as_str())
            .await
            .map_err(|e| ScrapeError::SearchControls(e.to_string()))?;

        let search_button = driver
            .query(By::Css(&self.search_button))
            .and_clickable()
            .wait(timeout, interval)
            .first()
            .await
            .map_err(|e| ScrapeError::SearchControls(e.to_string()))?;
        search_button
            .click()
            .await
            .map_err(|e| ScrapeError::SearchControls(e.to_string()))?;

        // No match in time usually means an empty results page, which is
        // still worth parsing.
        if let Err(e) = driver
            .query(By::Css(ready_selector))
            .wait(timeout, interval)
            .first()
            .await
        {
            log::warn!(
                "No results rendered within {:?} for query: {} | {:?}",
                timeout,
                query,
                e
            );
        }

        driver
            .source()
            .await
            .map_err(|e| ScrapeError::Capture(e.to_string()))
    }
}

#[async_trait]
impl PageFetcher for WebDriverFetcher {
    async fn fetch_results_page(
        &self,
        query: &SearchQuery,
        ready_selector: &str,
    ) -> Result<String, ScrapeError> {
        let launch_timeout = self.browser.launch_timeout();
        let droid = match time::timeout(launch_timeout, Droid::launch(&self.browser.webdriver_url))
            .await
        {
            Ok(Ok(droid)) => droid,
            Ok(Err(e)) => return Err(ScrapeError::Launch(e.to_string())),
            Err(_) => {
                log::warn!(
                    "Browser launch timed out after {:?}, a session created late on {} is not quit",
                    launch_timeout,
                    self.browser.webdriver_url
                );
                return Err(ScrapeError::LaunchTimeout(launch_timeout));
            }
        };

        let session_timeout = self.browser.session_timeout();
        let outcome = time::timeout(
            session_timeout,
            self.search(&droid.driver, query, ready_selector),
        )
        .await;

        droid.quit(launch_timeout).await;

        match outcome {
            Ok(page_source) => page_source,
            Err(_) => Err(ScrapeError::SessionTimeout(session_timeout)),
        }
    }
}

/// Searches the marketplace and returns listing titles with their prices.
///
/// Every failure is reported as [`ExtractionOutcome::Failed`]; nothing
/// escapes to the caller. At most `max_sessions` searches run at once.
pub struct PriceExtractor {
    fetcher: Arc<dyn PageFetcher>,
    locator: Box<dyn ListingLocator>,
    permits: Arc<Semaphore>,
}

impl PriceExtractor {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        locator: Box<dyn ListingLocator>,
        max_sessions: usize,
    ) -> Self {
        PriceExtractor {
            fetcher,
            locator,
            permits: Arc::new(Semaphore::new(max_sessions.max(1))),
        }
    }

    pub fn from_settings(
        browser: &BrowserSettings,
        marketplace: &MarketplaceSettings,
    ) -> Result<Self, ScrapeError> {
        let fetcher = Arc::new(WebDriverFetcher::new(browser, marketplace));
        let locator = build_locator(marketplace)?;
        Ok(PriceExtractor::new(fetcher, locator, browser.max_sessions))
    }

    pub async fn extract(&self, query: &SearchQuery) -> ExtractionOutcome {
        let permit = match self.permits.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(e) => return ExtractionOutcome::failed(ScrapeError::Aborted(e.to_string())),
        };

        log::info!("Searching marketplace for: {}", query);

        // Runs detached so a dropped request still lets the session quit.
        // The permit travels with the task.
        let fetcher = self.fetcher.clone();
        let task_query = query.clone();
        let ready_selector = self.locator.ready_selector().to_string();
        let fetched = tokio::spawn(async move {
            let page = fetcher
                .fetch_results_page(&task_query, &ready_selector)
                .await;
            drop(permit);
            page
        })
        .await;

        let page_source = match fetched {
            Ok(Ok(page_source)) => page_source,
            Ok(Err(e)) => {
                log::error!("Extraction failed for query: {} | {}", query, e);
                return ExtractionOutcome::failed(e);
            }
            Err(e) => {
                log::error!("Extraction task failed for query: {} | {:?}", query, e);
                return ExtractionOutcome::failed(ScrapeError::Aborted(e.to_string()));
            }
        };

        let document = Html::parse_document(&page_source);
        ExtractionOutcome::Listings(self.locator.locate(&document))
    }
}
