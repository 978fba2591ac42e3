//! WebDriver implementations of the workspace details tabs

use async_trait::async_trait;
use std::time::Duration;
use tokio::time::{sleep, Instant};

use crate::common::{Error, Result};
use crate::webdriver::Locator;

use super::web::WebDashboard;
use super::{locators, OverviewTab, ServersTab, SshTab, VolumesTab};

impl WebDashboard {
    /// Whether a row shows `expected` in the given cell right now
    async fn cell_matches(&self, row: &Locator, cell: &Locator, expected: &str) -> Result<bool> {
        if self.visible_now(row).await?.is_none() {
            return Ok(false);
        }
        match self.visible_now(cell).await? {
            Some(element) => match self.driver.text(&element).await {
                Ok(text) => Ok(text.trim() == expected),
                Err(Error::StaleElement(_)) => Ok(false),
                Err(e) => Err(e),
            },
            None => Ok(false),
        }
    }

    /// Poll until the row/cell pair shows `expected` (or not, per `present`)
    async fn wait_cell(
        &self,
        row: &Locator,
        cell: &Locator,
        expected: &str,
        present: bool,
    ) -> Result<bool> {
        let secs = self.timeouts.element_secs;
        let deadline = Instant::now() + Duration::from_secs(secs);
        loop {
            let matches = self.cell_matches(row, cell, expected).await?;
            if matches == present {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            sleep(self.timeouts.poll_interval()).await;
        }
    }
}

#[async_trait]
impl OverviewTab for WebDashboard {
    async fn workspace_name(&self) -> Result<String> {
        let element = self
            .wait_visible(&locators::workspace_name_input(), self.timeouts.element_secs)
            .await?;
        Ok(self.driver.value(&element).await?.unwrap_or_default())
    }

    async fn delete_workspace_button_exists(&self) -> Result<bool> {
        self.visible_within(&locators::delete_workspace_button(), self.timeouts.element_secs)
            .await
    }

    async fn click_export(&self) -> Result<()> {
        self.click(&locators::export_button()).await
    }

    async fn wait_export_controls(&self) -> Result<()> {
        let secs = self.timeouts.element_secs;
        self.wait_visible(&locators::export_clipboard_button(), secs)
            .await?;
        self.wait_visible(&locators::export_download_button(), secs)
            .await?;
        Ok(())
    }

    async fn hide_export(&self) -> Result<()> {
        self.click(&locators::export_hide_button()).await
    }
}

#[async_trait]
impl ServersTab for WebDashboard {
    async fn click_add_server(&self) -> Result<()> {
        self.click(&locators::add_server_button()).await
    }

    async fn wait_add_server_dialog(&self) -> Result<()> {
        self.wait_visible(&locators::add_server_dialog(), self.timeouts.element_secs)
            .await?;
        Ok(())
    }

    async fn enter_reference(&self, reference: &str) -> Result<()> {
        self.type_into(&locators::server_reference_input(), reference)
            .await
    }

    async fn enter_port(&self, port: &str) -> Result<()> {
        self.type_into(&locators::server_port_input(), port).await
    }

    async fn enter_protocol(&self, protocol: &str) -> Result<()> {
        self.type_into(&locators::server_protocol_input(), protocol)
            .await
    }

    async fn click_edit_server(&self, reference: &str) -> Result<()> {
        self.click(&locators::edit_server_button(reference)).await
    }

    async fn click_delete_server(&self, reference: &str) -> Result<()> {
        self.click(&locators::delete_server_button(reference)).await
    }

    async fn server_exists(&self, reference: &str, port: &str) -> Result<bool> {
        self.wait_cell(
            &locators::server_row(reference),
            &locators::server_port_cell(reference),
            port,
            true,
        )
        .await
    }

    async fn wait_server_absent(&self, reference: &str, port: &str) -> Result<()> {
        let gone = self
            .wait_cell(
                &locators::server_row(reference),
                &locators::server_port_cell(reference),
                port,
                false,
            )
            .await?;
        if gone {
            Ok(())
        } else {
            Err(Error::wait_timeout(
                format!("server '{}' with port {} to disappear", reference, port),
                self.timeouts.element_secs,
            ))
        }
    }
}

#[async_trait]
impl SshTab for WebDashboard {
    async fn private_key_exists(&self) -> Result<bool> {
        self.visible_within(&locators::private_key_field(), self.timeouts.element_secs)
            .await
    }

    async fn public_key_exists(&self) -> Result<bool> {
        self.visible_within(&locators::public_key_field(), self.timeouts.element_secs)
            .await
    }

    async fn click_remove_default_key(&self) -> Result<()> {
        self.click(&locators::remove_default_ssh_key_button()).await
    }

    async fn wait_ssh_key_absent(&self) -> Result<()> {
        let secs = self.timeouts.element_secs;
        self.wait_invisible(&locators::private_key_field(), secs)
            .await?;
        self.wait_invisible(&locators::public_key_field(), secs)
            .await
    }

    async fn click_generate_key(&self) -> Result<()> {
        self.click(&locators::generate_ssh_key_button()).await
    }
}

#[async_trait]
impl VolumesTab for WebDashboard {
    async fn click_add_volume(&self) -> Result<()> {
        self.click(&locators::add_volume_button()).await
    }

    async fn enter_volume_name(&self, name: &str) -> Result<()> {
        self.type_into(&locators::volume_name_input(), name).await
    }

    async fn enter_volume_path(&self, path: &str) -> Result<()> {
        self.type_into(&locators::volume_path_input(), path).await
    }

    async fn click_edit_volume(&self, name: &str) -> Result<()> {
        self.click(&locators::edit_volume_button(name)).await
    }

    async fn click_remove_volume(&self, name: &str) -> Result<()> {
        self.click(&locators::remove_volume_button(name)).await
    }

    async fn volume_exists(&self, name: &str, path: Option<&str>) -> Result<bool> {
        match path {
            Some(path) => {
                self.wait_cell(
                    &locators::volume_row(name),
                    &locators::volume_path_cell(name),
                    path,
                    true,
                )
                .await
            }
            None => {
                self.visible_within(&locators::volume_row(name), self.timeouts.element_secs)
                    .await
            }
        }
    }

    async fn wait_volume_absent(&self, name: &str) -> Result<()> {
        self.wait_invisible(&locators::volume_row(name), self.timeouts.element_secs)
            .await
    }
}
