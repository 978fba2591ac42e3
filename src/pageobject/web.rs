//! WebDriver-backed page objects
//!
//! Every interaction waits for its element to become visible (and enabled,
//! for clicks) within the configured timeout. Stale element references and
//! intercepted clicks are retried inside the same deadline.

use async_trait::async_trait;
use std::time::Duration;
use tokio::time::{sleep, Instant};

use crate::common::config::{Config, Timeouts};
use crate::common::{Error, Result};
use crate::webdriver::{ElementRef, Locator, WebDriverClient};

use super::{
    locators, Dashboard, DialogButton, NavigationItem, WorkspaceDetails, WorkspaceDetailsTab,
    WorkspaceList,
};

/// The dashboard, driven through a remote browser session
pub struct WebDashboard {
    pub(super) driver: WebDriverClient,
    pub(super) timeouts: Timeouts,
    dashboard_url: String,
}

impl WebDashboard {
    /// Open a browser session for the configured dashboard
    pub async fn connect(config: &Config) -> Result<Self> {
        let driver = WebDriverClient::connect(&config.webdriver).await?;
        Ok(Self {
            driver,
            timeouts: config.timeouts.clone(),
            dashboard_url: config.dashboard.url.clone(),
        })
    }

    fn poll(&self) -> Duration {
        self.timeouts.poll_interval()
    }

    /// First displayed element matching `locator`, if any, right now
    pub(super) async fn visible_now(&self, locator: &Locator) -> Result<Option<ElementRef>> {
        for element in self.driver.find_all(locator).await? {
            match self.driver.is_displayed(&element).await {
                Ok(true) => return Ok(Some(element)),
                Ok(false) | Err(Error::StaleElement(_)) => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }

    /// Wait until an element matching `locator` is displayed
    pub(super) async fn wait_visible(&self, locator: &Locator, secs: u64) -> Result<ElementRef> {
        let deadline = Instant::now() + Duration::from_secs(secs);
        loop {
            if let Some(element) = self.visible_now(locator).await? {
                return Ok(element);
            }
            if Instant::now() >= deadline {
                return Err(Error::wait_timeout(format!("visibility of {}", locator), secs));
            }
            sleep(self.poll()).await;
        }
    }

    /// Wait until no element matching `locator` is displayed
    pub(super) async fn wait_invisible(&self, locator: &Locator, secs: u64) -> Result<()> {
        let deadline = Instant::now() + Duration::from_secs(secs);
        loop {
            if self.visible_now(locator).await?.is_none() {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(Error::wait_timeout(format!("invisibility of {}", locator), secs));
            }
            sleep(self.poll()).await;
        }
    }

    /// Poll for visibility and report the outcome instead of failing
    pub(super) async fn visible_within(&self, locator: &Locator, secs: u64) -> Result<bool> {
        match self.wait_visible(locator, secs).await {
            Ok(_) => Ok(true),
            Err(Error::WaitTimeout { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Click an element once it is displayed and enabled
    pub(super) async fn click(&self, locator: &Locator) -> Result<()> {
        let secs = self.timeouts.element_secs;
        let deadline = Instant::now() + Duration::from_secs(secs);
        loop {
            let attempt = async {
                let element = self.wait_visible(locator, secs).await?;
                if !self.driver.is_enabled(&element).await? {
                    return Ok(false);
                }
                self.driver.click(&element).await?;
                Ok::<bool, Error>(true)
            };

            match attempt.await {
                Ok(true) => {
                    tracing::debug!(locator = %locator, "Clicked");
                    return Ok(());
                }
                Ok(false) => {}
                Err(Error::StaleElement(_)) => {
                    tracing::debug!(locator = %locator, "Stale element, retrying click");
                }
                Err(Error::WebDriver { error, .. }) if error == "element click intercepted" => {
                    tracing::debug!(locator = %locator, "Click intercepted, retrying");
                }
                Err(e) => return Err(e),
            }

            if Instant::now() >= deadline {
                return Err(Error::wait_timeout(format!("clickable {}", locator), secs));
            }
            sleep(self.poll()).await;
        }
    }

    /// Replace the content of an input field
    pub(super) async fn type_into(&self, locator: &Locator, text: &str) -> Result<()> {
        let element = self.wait_visible(locator, self.timeouts.element_secs).await?;
        self.driver.clear(&element).await?;
        self.driver.send_keys(&element, text).await?;
        tracing::debug!(locator = %locator, text, "Entered text");
        Ok(())
    }
}

#[async_trait]
impl Dashboard for WebDashboard {
    async fn open(&self) -> Result<()> {
        tracing::info!(url = %self.dashboard_url, "Opening dashboard");
        self.driver.goto(&self.dashboard_url).await?;
        self.wait_visible(
            &locators::navigation_item(NavigationItem::Workspaces),
            self.timeouts.page_load_secs,
        )
        .await?;
        Ok(())
    }

    async fn select_navigation_item(&self, item: NavigationItem) -> Result<()> {
        self.click(&locators::navigation_item(item)).await
    }

    async fn wait_toolbar_title(&self, title: &str) -> Result<()> {
        self.wait_visible(&locators::toolbar_title(title), self.timeouts.page_load_secs)
            .await?;
        Ok(())
    }

    async fn wait_notification(&self, message: &str) -> Result<()> {
        self.wait_visible(
            &locators::notification(message),
            self.timeouts.notification_secs,
        )
        .await
        .map_err(|e| match e {
            Error::WaitTimeout { secs, .. } => {
                Error::wait_timeout(format!("notification '{}'", message), secs)
            }
            other => other,
        })?;
        Ok(())
    }

    async fn wait_notification_closed(&self) -> Result<()> {
        self.wait_invisible(&locators::any_notification(), self.timeouts.notification_secs)
            .await
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        self.driver.screenshot().await
    }

    async fn close(&self) -> Result<()> {
        self.driver.quit().await
    }
}

#[async_trait]
impl WorkspaceList for WebDashboard {
    async fn select_workspace(&self, name: &str) -> Result<()> {
        self.click(&locators::workspace_row(name)).await
    }
}

#[async_trait]
impl WorkspaceDetails for WebDashboard {
    async fn select_tab(&self, tab: WorkspaceDetailsTab) -> Result<()> {
        self.click(&locators::details_tab(tab)).await
    }

    async fn click_dialog_button(&self, button: DialogButton) -> Result<()> {
        self.click(&locators::dialog_button(button)).await
    }

    async fn click_save_changes(&self) -> Result<()> {
        self.click(&locators::save_changes_button()).await
    }
}
