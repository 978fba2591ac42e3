//! Page object facade
//!
//! Semantic operations over the dashboard UI, one trait per page or tab.
//! The runner only sees these traits; raw selectors stay in [`locators`].
//!
//! `*_exists` queries answer for the current UI state. `wait_*` methods poll
//! until the condition holds and fail with [`Error::WaitTimeout`] otherwise.
//!
//! [`Error::WaitTimeout`]: crate::common::Error::WaitTimeout

pub mod locators;
mod tabs;
mod web;

use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;

use crate::common::Result;

pub use web::WebDashboard;

/// Items of the dashboard's left navigation bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationItem {
    Dashboard,
    Workspaces,
    Stacks,
    Factories,
    Administration,
}

impl NavigationItem {
    /// Route fragment the item links to
    pub fn route(&self) -> &'static str {
        match self {
            NavigationItem::Dashboard => "",
            NavigationItem::Workspaces => "workspaces",
            NavigationItem::Stacks => "stacks",
            NavigationItem::Factories => "factories",
            NavigationItem::Administration => "administration",
        }
    }

    /// Toolbar title shown once the item's page has loaded
    pub fn title(&self) -> &'static str {
        match self {
            NavigationItem::Dashboard => "Dashboard",
            NavigationItem::Workspaces => "Workspaces",
            NavigationItem::Stacks => "Stacks",
            NavigationItem::Factories => "Factories",
            NavigationItem::Administration => "Administration",
        }
    }
}

impl fmt::Display for NavigationItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Tabs of the workspace details page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkspaceDetailsTab {
    Overview,
    Servers,
    Installers,
    EnvVariables,
    Volumes,
    Config,
    Ssh,
    Projects,
    Plugins,
}

impl WorkspaceDetailsTab {
    /// Label rendered on the tab
    pub fn label(&self) -> &'static str {
        match self {
            WorkspaceDetailsTab::Overview => "Overview",
            WorkspaceDetailsTab::Servers => "Servers",
            WorkspaceDetailsTab::Installers => "Installers",
            WorkspaceDetailsTab::EnvVariables => "Env Variables",
            WorkspaceDetailsTab::Volumes => "Volumes",
            WorkspaceDetailsTab::Config => "Config",
            WorkspaceDetailsTab::Ssh => "SSH",
            WorkspaceDetailsTab::Projects => "Projects",
            WorkspaceDetailsTab::Plugins => "Plugins",
        }
    }
}

impl fmt::Display for WorkspaceDetailsTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Buttons of the modal dialogs opened from the details tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogButton {
    Add,
    Update,
    Delete,
    Cancel,
    Close,
}

impl DialogButton {
    pub fn label(&self) -> &'static str {
        match self {
            DialogButton::Add => "Add",
            DialogButton::Update => "Update",
            DialogButton::Delete => "Delete",
            DialogButton::Cancel => "Cancel",
            DialogButton::Close => "Close",
        }
    }
}

impl fmt::Display for DialogButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Dashboard frame: navigation, toolbar, notifications
#[async_trait]
pub trait Dashboard: Send + Sync {
    /// Load the dashboard root page
    async fn open(&self) -> Result<()>;

    async fn select_navigation_item(&self, item: NavigationItem) -> Result<()>;

    async fn wait_toolbar_title(&self, title: &str) -> Result<()>;

    /// Wait until a notification containing `message` is shown
    async fn wait_notification(&self, message: &str) -> Result<()>;

    /// Wait until no notification is shown
    async fn wait_notification_closed(&self) -> Result<()>;

    /// PNG of the current viewport
    async fn screenshot(&self) -> Result<Vec<u8>>;

    /// Release the browser session
    async fn close(&self) -> Result<()>;
}

/// The workspaces list page
#[async_trait]
pub trait WorkspaceList: Send + Sync {
    async fn select_workspace(&self, name: &str) -> Result<()>;
}

/// Frame of the workspace details page shared by all tabs
#[async_trait]
pub trait WorkspaceDetails: Send + Sync {
    async fn select_tab(&self, tab: WorkspaceDetailsTab) -> Result<()>;

    async fn click_dialog_button(&self, button: DialogButton) -> Result<()>;

    /// Click "Save" in the unsaved-changes bar
    async fn click_save_changes(&self) -> Result<()>;
}

#[async_trait]
pub trait OverviewTab: Send + Sync {
    /// Value of the workspace name field
    async fn workspace_name(&self) -> Result<String>;

    async fn delete_workspace_button_exists(&self) -> Result<bool>;

    async fn click_export(&self) -> Result<()>;

    /// Wait for the "copy to clipboard" and "download" buttons of the export panel
    async fn wait_export_controls(&self) -> Result<()>;

    async fn hide_export(&self) -> Result<()>;
}

#[async_trait]
pub trait ServersTab: Send + Sync {
    async fn click_add_server(&self) -> Result<()>;

    async fn wait_add_server_dialog(&self) -> Result<()>;

    async fn enter_reference(&self, reference: &str) -> Result<()>;

    async fn enter_port(&self, port: &str) -> Result<()>;

    async fn enter_protocol(&self, protocol: &str) -> Result<()>;

    async fn click_edit_server(&self, reference: &str) -> Result<()>;

    async fn click_delete_server(&self, reference: &str) -> Result<()>;

    /// Whether the list shows a server with this reference and port
    async fn server_exists(&self, reference: &str, port: &str) -> Result<bool>;

    /// Wait until no server with this reference and port is listed
    async fn wait_server_absent(&self, reference: &str, port: &str) -> Result<()>;
}

#[async_trait]
pub trait SshTab: Send + Sync {
    async fn private_key_exists(&self) -> Result<bool>;

    async fn public_key_exists(&self) -> Result<bool>;

    async fn click_remove_default_key(&self) -> Result<()>;

    /// Wait until both key fields are gone
    async fn wait_ssh_key_absent(&self) -> Result<()>;

    async fn click_generate_key(&self) -> Result<()>;
}

#[async_trait]
pub trait VolumesTab: Send + Sync {
    async fn click_add_volume(&self) -> Result<()>;

    async fn enter_volume_name(&self, name: &str) -> Result<()>;

    async fn enter_volume_path(&self, path: &str) -> Result<()>;

    async fn click_edit_volume(&self, name: &str) -> Result<()>;

    async fn click_remove_volume(&self, name: &str) -> Result<()>;

    /// Whether the list shows a volume with this name (and path, if given)
    async fn volume_exists(&self, name: &str, path: Option<&str>) -> Result<bool>;

    async fn wait_volume_absent(&self, name: &str) -> Result<()>;
}

/// Everything the scenario runner drives
pub trait DashboardUi:
    Dashboard + WorkspaceList + WorkspaceDetails + OverviewTab + ServersTab + SshTab + VolumesTab
{
}

impl<T> DashboardUi for T where
    T: Dashboard
        + WorkspaceList
        + WorkspaceDetails
        + OverviewTab
        + ServersTab
        + SshTab
        + VolumesTab
{
}
