use std::time::Duration;

use thirtyfour::{
    prelude::WebDriverResult, ChromiumLikeCapabilities, DesiredCapabilities, WebDriver,
};
use tokio::time;

/// One headless Chrome session, owned by a single extraction.
pub struct Droid {
    pub driver: WebDriver,
}

impl Droid {
    pub async fn launch(webdriver_url: &str) -> WebDriverResult<Self> {
        let mut caps = DesiredCapabilities::chrome();
        caps.set_headless()?;
        caps.set_no_sandbox()?;
        caps.set_disable_dev_shm_usage()?;
        caps.set_disable_gpu()?;
        caps.add_arg("--window-size=1920,1080")?;
        caps.add_arg(&format!("--user-agent={}", fake_user_agent::get_rua()))?;

        let driver = WebDriver::new(webdriver_url, caps).await?;

        Ok(Droid { driver })
    }

    /// Ends the WebDriver session, giving up after `limit`. A failure here is
    /// logged only, the page has already been captured or abandoned.
    pub async fn quit(self, limit: Duration) {
        // Dropping a handle that never quit blocks on another quit attempt,
        // so an unfinished handle is leaked instead.
        let handle = self.driver.clone();
        match time::timeout(limit, self.driver.quit()).await {
            Ok(Ok(())) => return,
            Ok(Err(e)) => log::error!("Failed to quit browser session: {:?}", e),
            Err(_) => log::error!(
                "Browser session did not quit within {:?}, leaving it to the server",
                limit
            ),
        }
        if let Err(e) = handle.leak() {
            log::warn!("Browser session handle already closed: {}", e);
        }
    }
}
